//! Color operations carried by OSC sequences.
//!
//! Covers the xterm palette and dynamic-color family (OSC 4, 104, 10, 11,
//! 12, 110, 111, 112) and the Kitty color protocol (OSC 21).

use crate::Rgb;

/// Which OSC number introduced a color operation.
///
/// Responses must echo the same number, so the source is part of the
/// command value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOperationSource {
    /// OSC 4 - set/query palette entries
    Palette,
    /// OSC 104 - reset palette entries (all when bare)
    PaletteReset,
    /// OSC 10 - dynamic foreground color
    Foreground,
    /// OSC 11 - dynamic background color
    Background,
    /// OSC 12 - dynamic cursor color
    Cursor,
    /// OSC 110 - reset dynamic foreground color
    ForegroundReset,
    /// OSC 111 - reset dynamic background color
    BackgroundReset,
    /// OSC 112 - reset dynamic cursor color
    CursorReset,
}

/// What a single color operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    /// Palette entry 0-255
    Palette(u8),
    Foreground,
    Background,
    Cursor,
}

/// One set/query/reset step of a color operation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOp {
    Set { target: ColorTarget, color: Rgb },
    Query { target: ColorTarget },
    Reset { target: ColorTarget },
}

/// Keys addressable through the Kitty color protocol (OSC 21).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittyColorKey {
    Foreground,
    Background,
    SelectionForeground,
    SelectionBackground,
    Cursor,
    CursorText,
    VisualBell,
    /// Numbered palette entry 0-255
    Palette(u8),
}

impl KittyColorKey {
    /// Parse a protocol key: a well-known name or a palette index.
    pub(crate) fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "foreground" => Self::Foreground,
            "background" => Self::Background,
            "selection_foreground" => Self::SelectionForeground,
            "selection_background" => Self::SelectionBackground,
            "cursor" => Self::Cursor,
            "cursor_text" => Self::CursorText,
            "visual_bell" => Self::VisualBell,
            _ => Self::Palette(key.parse::<u8>().ok()?),
        })
    }
}

/// Value side of a Kitty color protocol entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittyColorValue {
    /// Key without value, or `key=?`
    Query,
    /// `key=` with an empty value
    Reset,
    /// `key=spec`
    Set(Rgb),
}

/// One `key[=value]` item of an OSC 21 sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KittyColorEntry {
    pub key: KittyColorKey,
    pub value: KittyColorValue,
}
