//! SGR (Select Graphic Rendition) attribute parsing.
//!
//! Operates on parameter sequences that a CSI parser has already split
//! into numeric values and separators; yields one typed attribute per
//! logical parameter group. Underline styles (`4:3`) and extended colors
//! (`38`/`48`/`58`) consume sub-parameters, everything else maps 1:1.

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Separator preceding a parameter.
///
/// `separators[i]` is the separator between `params[i]` and
/// `params[i + 1]`; a trailing separator is ignored.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Semicolon,
    Colon,
}

/// Underline style selected by SGR 4 and its sub-parameters
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderlineStyle {
    /// Not underlined (4:0)
    None,
    /// Single underline (4 or 4:1)
    Single,
    /// Double underline (4:2)
    Double,
    /// Curly underline (4:3)
    Curly,
    /// Dotted underline (4:4)
    Dotted,
    /// Dashed underline (4:5)
    Dashed,
}

/// A single graphic rendition attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Reset all attributes to default (SGR 0)
    Unset,
    /// Bold or increased intensity (SGR 1)
    Bold,
    /// Italic (SGR 3)
    Italic,
    /// Underline with style (SGR 4, optionally 4:n)
    Underline(UnderlineStyle),
    /// 8-color foreground, index 0-7 (SGR 30-37)
    Fg8(u8),
    /// 8-color background, index 0-7 (SGR 40-47)
    Bg8(u8),
    /// 256-color foreground (SGR 38;5;n)
    Fg256(u8),
    /// 256-color background (SGR 48;5;n)
    Bg256(u8),
    /// 256-color underline (SGR 58;5;n)
    Underline256(u8),
    /// Direct-color foreground (SGR 38;2;r;g;b or 38:2::r:g:b)
    FgDirect(Rgb),
    /// Direct-color background (SGR 48;2;r;g;b or 48:2::r:g:b)
    BgDirect(Rgb),
    /// Direct-color underline (SGR 58;2;r;g;b or 58:2::r:g:b)
    UnderlineDirect(Rgb),
    /// Recognised positionally but not representable
    Unknown,
}

/// Which of 38/48/58 introduced an extended color.
#[derive(Clone, Copy)]
enum ColorSlot {
    Fg,
    Bg,
    Underline,
}

impl ColorSlot {
    fn indexed(self, index: u8) -> Attribute {
        match self {
            ColorSlot::Fg => Attribute::Fg256(index),
            ColorSlot::Bg => Attribute::Bg256(index),
            ColorSlot::Underline => Attribute::Underline256(index),
        }
    }

    fn direct(self, color: Rgb) -> Attribute {
        match self {
            ColorSlot::Fg => Attribute::FgDirect(color),
            ColorSlot::Bg => Attribute::BgDirect(color),
            ColorSlot::Underline => Attribute::UnderlineDirect(color),
        }
    }
}

/// Restartable iterator over an SGR parameter sequence.
#[derive(Default)]
pub struct SgrParser {
    params: Vec<u16>,
    separators: Vec<Separator>,
    pos: usize,
}

impl SgrParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seat the parser on a new parameter sequence and reset the cursor.
    ///
    /// Missing separators default to `Semicolon`.
    pub fn set_params(&mut self, params: &[u16], separators: &[Separator]) {
        self.params.clear();
        self.params.extend_from_slice(params);
        self.separators.clear();
        self.separators.extend_from_slice(separators);
        self.pos = 0;
    }

    /// Separator between `params[idx]` and `params[idx + 1]`.
    fn sep_after(&self, idx: usize) -> Separator {
        self.separators.get(idx).copied().unwrap_or_default()
    }

    /// Yield the next attribute, or `None` when the sequence is exhausted.
    pub fn next_attribute(&mut self) -> Option<Attribute> {
        let param = *self.params.get(self.pos)?;
        let idx = self.pos;
        self.pos += 1;

        Some(match param {
            0 => Attribute::Unset,
            1 => Attribute::Bold,
            3 => Attribute::Italic,
            4 => self.underline(idx),
            30..=37 => Attribute::Fg8((param - 30) as u8),
            40..=47 => Attribute::Bg8((param - 40) as u8),
            38 => self.extended_color(idx, ColorSlot::Fg),
            48 => self.extended_color(idx, ColorSlot::Bg),
            58 => self.extended_color(idx, ColorSlot::Underline),
            _ => {
                log::trace!("unhandled SGR parameter {param}");
                Attribute::Unknown
            }
        })
    }

    /// SGR 4: plain single underline, or a `4:n` style sub-parameter.
    fn underline(&mut self, idx: usize) -> Attribute {
        if self.sep_after(idx) == Separator::Colon {
            if let Some(&sub) = self.params.get(self.pos) {
                self.pos += 1;
                let style = match sub {
                    0 => UnderlineStyle::None,
                    1 => UnderlineStyle::Single,
                    2 => UnderlineStyle::Double,
                    3 => UnderlineStyle::Curly,
                    4 => UnderlineStyle::Dotted,
                    5 => UnderlineStyle::Dashed,
                    _ => UnderlineStyle::None,
                };
                return Attribute::Underline(style);
            }
        }
        Attribute::Underline(UnderlineStyle::Single)
    }

    /// Extended color: `N;5;index` (256-color) or `N;2;r;g;b` /
    /// `N:2[:colorspace]:r:g:b` (direct color).
    fn extended_color(&mut self, intro_idx: usize, slot: ColorSlot) -> Attribute {
        let Some(&form) = self.params.get(self.pos) else {
            return Attribute::Unknown;
        };
        let form_idx = self.pos;
        self.pos += 1;

        match form {
            5 => match self.params.get(self.pos) {
                Some(&index) => {
                    self.pos += 1;
                    slot.indexed(index.min(255) as u8)
                }
                None => Attribute::Unknown,
            },
            2 => {
                if self.sep_after(intro_idx) == Separator::Colon {
                    // ITU T.416 form: sub-parameters joined by colons. A run
                    // of four or more carries a leading colorspace id.
                    let mut run = 0;
                    while self.sep_after(form_idx + run) == Separator::Colon
                        && form_idx + run + 1 < self.params.len()
                    {
                        run += 1;
                    }
                    if run >= 4 {
                        self.pos += 1; // colorspace id
                        self.take_rgb(slot)
                    } else if run == 3 {
                        self.take_rgb(slot)
                    } else {
                        self.pos += run;
                        Attribute::Unknown
                    }
                } else {
                    self.take_rgb(slot)
                }
            }
            _ => Attribute::Unknown,
        }
    }

    /// Consume up to three r/g/b parameters. A short run consumes what is
    /// left and yields `Unknown`.
    fn take_rgb(&mut self, slot: ColorSlot) -> Attribute {
        if self.pos + 3 > self.params.len() {
            self.pos = self.params.len();
            return Attribute::Unknown;
        }
        let r = self.params[self.pos].min(255) as u8;
        let g = self.params[self.pos + 1].min(255) as u8;
        let b = self.params[self.pos + 2].min(255) as u8;
        self.pos += 3;
        slot.direct(Rgb::new(r, g, b))
    }
}

impl Iterator for SgrParser {
    type Item = Attribute;

    fn next(&mut self) -> Option<Attribute> {
        self.next_attribute()
    }
}
