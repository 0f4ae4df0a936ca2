//! Core of a virtual-terminal support library.
//!
//! Three independent engines share a vocabulary of terminal semantics:
//! a streaming OSC (Operating System Command) parser, an SGR (Select
//! Graphic Rendition) attribute iterator, and a key encoder that turns
//! structured key events into outbound escape sequences (legacy xterm,
//! xterm modifyOtherKeys level 2, and the Kitty keyboard protocol).
//! A paste-safety predicate rounds out the set.
//!
//! None of the engines perform I/O; they translate between byte streams
//! and typed values and leave transport to the embedder.

mod osc;
pub use osc::color::{ColorOp, ColorOperationSource, ColorTarget, KittyColorEntry, KittyColorKey, KittyColorValue};
pub use osc::{ClipboardPayload, OscCommand, OscParser, ProgressState, PromptKind};

mod sgr;
pub use sgr::{Attribute, Separator, SgrParser, UnderlineStyle};

pub mod paste;

mod key;
pub use key::encoder::{EncodeError, EncoderOptions, KeyEncoder, KittyFlags, OptionAsAlt};
pub use key::{Key, KeyAction, KeyEvent, Mods};

/// 24-bit RGB color value used by OSC color operations and direct-color
/// SGR attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse an X11-style color specification.
    ///
    /// Accepts `#RGB`, `#RRGGBB`, `#RRRGGGBBB`, `#RRRRGGGGBBBB` and
    /// `rgb:R/G/B` with one to four hex digits per channel. Channels are
    /// scaled to 8 bits. Returns `None` for anything else.
    pub fn parse_spec(spec: &str) -> Option<Self> {
        if let Some(hex) = spec.strip_prefix('#') {
            let len = hex.len();
            if len == 0 || len > 12 || len % 3 != 0 {
                return None;
            }
            let width = len / 3;
            let r = Self::channel(&hex[..width])?;
            let g = Self::channel(&hex[width..2 * width])?;
            let b = Self::channel(&hex[2 * width..])?;
            return Some(Self { r, g, b });
        }

        let rest = spec.strip_prefix("rgb:")?;
        let mut channels = rest.split('/');
        let r = Self::channel(channels.next()?)?;
        let g = Self::channel(channels.next()?)?;
        let b = Self::channel(channels.next()?)?;
        if channels.next().is_some() {
            return None;
        }
        Some(Self { r, g, b })
    }

    /// Scale a 1-4 digit hex channel to 8 bits.
    fn channel(digits: &str) -> Option<u8> {
        if digits.is_empty() || digits.len() > 4 {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        let max = (1u32 << (4 * digits.len() as u32)) - 1;
        Some(((value * 255 + max / 2) / max) as u8)
    }
}

/// How an OSC sequence was terminated.
///
/// Recorded on commands that may require a response so the embedder can
/// mirror the terminator the application used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    /// BEL (0x07)
    Bel,
    /// ESC \ (0x1B 0x5C)
    #[default]
    St,
}

impl Terminator {
    pub fn from_byte(byte: Option<u8>) -> Self {
        match byte {
            Some(0x07) => Terminator::Bel,
            _ => Terminator::St,
        }
    }

    /// The byte sequence that closes a response using this terminator.
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Terminator::Bel => b"\x07",
            Terminator::St => b"\x1b\\",
        }
    }
}
