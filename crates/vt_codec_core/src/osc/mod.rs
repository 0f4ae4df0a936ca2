//! OSC (Operating System Command) parser.
//!
//! A streaming byte-at-a-time state machine. The host VT parser strips the
//! `ESC ]` introducer and the terminator and hands over the payload bytes
//! through [`OscParser::feed`]; [`OscParser::end`] validates the
//! accumulated fields and produces an [`OscCommand`]. Byte boundaries
//! between `feed` calls are arbitrary, including mid-UTF-8.
//!
//! Payload strings live in an internal arena owned by the parser; the
//! returned command borrows from it, so the borrow checker rejects any use
//! of a command after the next `feed`, `end`, or `reset`.

pub mod color;

use base64::{Engine as _, engine::general_purpose};

use crate::{Rgb, Terminator};
use self::color::{ColorOp, ColorOperationSource, ColorTarget, KittyColorEntry, KittyColorKey, KittyColorValue};

/// Entries beyond this are dropped from an OSC 21 sequence.
const MAX_KITTY_COLOR_ENTRIES: usize = 256;

/// ConEmu sleep requests are clamped to this many milliseconds.
const MAX_CONEMU_SLEEP_MS: u16 = 10_000;

/// Kind of shell-integration prompt mark (OSC 133;A).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptKind {
    /// `k=i` or unspecified
    #[default]
    Primary,
    /// `k=r` - right-aligned prompt
    Right,
    /// `k=c` - continuation prompt, input may be edited
    Continuation,
    /// `k=s` - secondary prompt, input may not be edited
    Secondary,
}

/// ConEmu progress report state (OSC 9;4).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProgressState {
    /// Remove any progress indication
    Remove,
    /// Set progress to the given percentage
    Set,
    /// Error state, optionally with a percentage
    Error,
    /// Progress of unknown duration
    Indeterminate,
    /// Paused, optionally with a percentage
    Pause,
}

impl ProgressState {
    fn from_u16(n: u16) -> Option<Self> {
        match n {
            0 => Some(Self::Remove),
            1 => Some(Self::Set),
            2 => Some(Self::Error),
            3 => Some(Self::Indeterminate),
            4 => Some(Self::Pause),
            _ => None,
        }
    }
}

/// Payload of an OSC 52 clipboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardPayload<'a> {
    /// `?` - the application asks for the clipboard contents
    Query,
    /// Decoded clipboard data
    Data(&'a [u8]),
}

/// A finalised OSC command.
///
/// Borrowed fields point into the parser's arena and are valid until the
/// next mutating call on the parser that produced the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscCommand<'a> {
    /// Unrecognised or malformed sequence
    Invalid,
    /// OSC 0 / OSC 2 - set window title
    ChangeWindowTitle(&'a str),
    /// OSC 1 - set window icon name
    ChangeWindowIcon(&'a str),
    /// OSC 133;A - start of shell prompt
    PromptStart {
        /// Application-provided id (`aid=`)
        aid: Option<&'a str>,
        kind: PromptKind,
        /// `redraw=0` asks the terminal not to redraw the prompt
        redraw: bool,
    },
    /// OSC 133;B - end of shell prompt, start of user input
    PromptEnd,
    /// OSC 133;C - end of user input, start of command output
    EndOfInput,
    /// OSC 133;D - end of command
    EndOfCommand { exit_code: Option<u8> },
    /// OSC 52 - set or query a selection buffer
    ClipboardContents { kind: u8, payload: ClipboardPayload<'a> },
    /// OSC 7 - report working directory as a file:// URL
    ReportPwd(&'a str),
    /// OSC 22 - set the mouse cursor shape
    MouseShape(&'a str),
    /// OSC 4 / 104 / 10 / 11 / 12 / 110 / 111 / 112 - palette and dynamic
    /// color operations
    ColorOperation {
        source: ColorOperationSource,
        ops: &'a [ColorOp],
        terminator: Terminator,
    },
    /// OSC 21 - Kitty color protocol
    KittyColorProtocol {
        entries: &'a [KittyColorEntry],
        terminator: Terminator,
    },
    /// OSC 9 (plain) / OSC 777;notify - desktop notification
    ShowDesktopNotification { title: &'a str, body: &'a str },
    /// OSC 8 with a URI - start of a hyperlink
    HyperlinkStart { id: Option<&'a str>, uri: &'a str },
    /// OSC 8 with an empty URI - end of a hyperlink
    HyperlinkEnd,
    /// OSC 9;1 - ConEmu sleep
    ConemuSleep { duration_ms: u16 },
    /// OSC 9;2 - ConEmu message box
    ConemuShowMessageBox(&'a str),
    /// OSC 9;3 - ConEmu tab title (`None` restores the default)
    ConemuChangeTabTitle(Option<&'a str>),
    /// OSC 9;4 - ConEmu progress report
    ConemuProgressReport {
        state: ProgressState,
        progress: Option<u8>,
    },
    /// OSC 9;5 - ConEmu wait for input
    ConemuWaitInput,
    /// OSC 9;6 - ConEmu GUI macro
    ConemuGuiMacro(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Empty,
    /// Consuming the rest of an unrecognised sequence
    Invalid,
    CommandNumber,
    /// OSC 0 / 1 / 2 - `;` is part of the title
    TitleText,
    /// OSC 7
    PwdText,
    /// OSC 22
    MouseShapeText,
    /// OSC 4 - palette index before the spec
    PaletteIndex,
    /// OSC 4 - color spec after the index
    PaletteSpec,
    /// OSC 104 - palette indexes to reset
    PaletteResetIndex,
    /// OSC 10 / 11 / 12 - specs advancing fg -> bg -> cursor
    DynamicSpec,
    /// OSC 110 / 111 / 112 - body ignored
    DynamicReset,
    /// OSC 8 - params before the URI
    HyperlinkParams,
    /// OSC 8 - URI, `;` is part of the URI
    HyperlinkUri,
    /// OSC 9 - ConEmu sub-id or start of a notification body
    Osc9SubId,
    /// Free-form notification body
    NotificationBody,
    ConemuSleepMs,
    ConemuMessageBox,
    ConemuTabTitle,
    ConemuProgressState,
    ConemuProgressValue,
    ConemuWaitInput,
    ConemuGuiMacro,
    /// OSC 52 - selection kind before the payload
    ClipboardKind,
    /// OSC 52 - base64 payload or `?`
    ClipboardPayload,
    /// OSC 133 - waiting for A/B/C/D
    SemanticSubcommand,
    /// OSC 133 - subcommand seen, waiting for options
    SemanticAfterSub,
    /// OSC 133;B / C options are consumed and discarded
    SemanticIgnore,
    SemanticOptionKey,
    SemanticOptionValue,
    /// OSC 133;D - exit code digits
    SemanticExitCode,
    /// OSC 777 - command kind, only `notify` is recognised
    RxvtKind,
    NotificationTitle,
    Notification777Body,
    /// OSC 21 - entry key
    KittyColorKeyField,
    /// OSC 21 - entry value after `=`
    KittyColorValueField,
}

/// Streaming OSC parser.
///
/// One growing byte arena holds every payload; `reset` and the start of
/// the next sequence release its contents but keep the allocation.
#[derive(Default)]
pub struct OscParser {
    state: State,
    command_num: u16,
    /// Payload arena; field boundaries are tracked as indexes into it.
    buf: Vec<u8>,
    /// Start of the current free-form field
    mark: usize,
    /// An earlier captured field (hyperlink params, clipboard kind,
    /// kitty color key, notification kind)
    span_a: (usize, usize),
    /// A second captured field (notification title)
    span_b: (usize, usize),
    /// Current numeric field, saturating
    num: u16,
    num_seen: bool,
    /// First numeric field of a two-number body (progress state)
    saved_num: Option<u16>,
    /// OSC 10/11/12 advance through these targets
    dynamic_target: u16,
    semantic_sub: u8,
    prompt_aid: Option<(usize, usize)>,
    prompt_kind: PromptKind,
    prompt_redraw: bool,
    color_ops: Vec<ColorOp>,
    kitty_entries: Vec<KittyColorEntry>,
    /// Soft-terminator ESC seen, a `\` completes the sequence
    esc_pending: bool,
    /// ESC \ consumed; further bytes are ignored until `end`
    terminated: bool,
    /// Allocation failure latch; cleared only by `reset`
    poisoned: bool,
    /// The next `feed` starts a new sequence
    fresh: bool,
}

impl OscParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a single payload byte.
    ///
    /// `0x1B` is treated as the start of a soft terminator and never lands
    /// in the payload; a following `\` completes the sequence.
    pub fn feed(&mut self, byte: u8) {
        if self.fresh {
            self.begin();
        }
        if self.poisoned || self.terminated {
            return;
        }
        if self.esc_pending {
            self.esc_pending = false;
            if byte == b'\\' {
                self.terminated = true;
                return;
            }
        }
        if byte == 0x1B {
            self.esc_pending = true;
            return;
        }

        match self.state {
            State::Empty | State::CommandNumber => self.feed_command_number(byte),
            State::Invalid | State::DynamicReset | State::SemanticIgnore | State::ConemuWaitInput => {}

            // Free-form payloads where `;` is literal
            State::TitleText
            | State::PwdText
            | State::MouseShapeText
            | State::NotificationBody
            | State::ConemuMessageBox
            | State::ConemuTabTitle
            | State::ConemuGuiMacro
            | State::Notification777Body
            | State::HyperlinkUri
            | State::ClipboardPayload => self.push_byte(byte),

            State::PaletteIndex => {
                if byte == b';' {
                    if !self.num_seen {
                        self.invalidate("OSC 4 palette index missing");
                        return;
                    }
                    self.saved_num = Some(self.num.min(255));
                    self.reset_num();
                    self.mark = self.buf.len();
                    self.state = State::PaletteSpec;
                } else if !self.accum_digit(byte) {
                    self.invalidate("OSC 4 palette index not numeric");
                }
            }
            State::PaletteSpec => {
                if byte == b';' {
                    self.finalize_palette_pair();
                    if self.state != State::Invalid {
                        self.state = State::PaletteIndex;
                    }
                } else {
                    self.push_byte(byte);
                }
            }
            State::PaletteResetIndex => {
                if byte == b';' {
                    self.finalize_palette_reset_field();
                } else if !self.accum_digit(byte) {
                    self.invalidate("OSC 104 palette index not numeric");
                }
            }
            State::DynamicSpec => {
                if byte == b';' {
                    self.finalize_dynamic_field();
                } else {
                    self.push_byte(byte);
                }
            }

            State::HyperlinkParams => {
                if byte == b';' {
                    self.span_a = (self.mark, self.buf.len());
                    self.mark = self.buf.len();
                    self.state = State::HyperlinkUri;
                } else {
                    self.push_byte(byte);
                }
            }

            State::Osc9SubId => {
                if byte == b';' {
                    self.dispatch_conemu();
                } else if self.accum_digit(byte) {
                    // Keep the digits: an unrecognised sub-id degrades to a
                    // notification carrying the whole body.
                    self.push_byte(byte);
                } else {
                    self.push_byte(byte);
                    self.state = State::NotificationBody;
                }
            }
            State::ConemuSleepMs => {
                if !self.accum_digit(byte) {
                    self.invalidate("ConEmu sleep duration not numeric");
                }
            }
            State::ConemuProgressState => {
                if byte == b';' {
                    self.saved_num = Some(self.num);
                    self.reset_num();
                    self.state = State::ConemuProgressValue;
                } else if !self.accum_digit(byte) {
                    self.invalidate("ConEmu progress state not numeric");
                }
            }
            State::ConemuProgressValue => {
                if !self.accum_digit(byte) {
                    self.invalidate("ConEmu progress value not numeric");
                }
            }

            State::ClipboardKind => {
                if byte == b';' {
                    self.span_a = (self.mark, self.buf.len());
                    self.mark = self.buf.len();
                    self.state = State::ClipboardPayload;
                } else {
                    self.push_byte(byte);
                }
            }

            State::SemanticSubcommand => match byte {
                b'A' | b'B' | b'C' | b'D' => {
                    self.semantic_sub = byte;
                    self.state = State::SemanticAfterSub;
                }
                _ => self.invalidate("unknown semantic prompt subcommand"),
            },
            State::SemanticAfterSub => {
                if byte == b';' {
                    self.mark = self.buf.len();
                    self.state = match self.semantic_sub {
                        b'A' => State::SemanticOptionKey,
                        b'D' => {
                            self.reset_num();
                            State::SemanticExitCode
                        }
                        _ => State::SemanticIgnore,
                    };
                } else {
                    self.invalidate("semantic prompt subcommand not followed by ;");
                }
            }
            State::SemanticOptionKey => match byte {
                b'=' => {
                    self.span_a = (self.mark, self.buf.len());
                    self.mark = self.buf.len();
                    self.state = State::SemanticOptionValue;
                }
                b';' => {
                    // Key without a value carries no information we track.
                    self.mark = self.buf.len();
                }
                _ => self.push_byte(byte),
            },
            State::SemanticOptionValue => {
                if byte == b';' {
                    self.finalize_semantic_option();
                    self.state = State::SemanticOptionKey;
                } else {
                    self.push_byte(byte);
                }
            }
            State::SemanticExitCode => {
                if !self.accum_digit(byte) {
                    self.invalidate("semantic prompt exit code not numeric");
                }
            }

            State::RxvtKind => {
                if byte == b';' {
                    if &self.buf[self.mark..] == b"notify" {
                        self.mark = self.buf.len();
                        self.state = State::NotificationTitle;
                    } else {
                        self.invalidate("unknown OSC 777 command");
                    }
                } else {
                    self.push_byte(byte);
                }
            }
            State::NotificationTitle => {
                if byte == b';' {
                    self.span_b = (self.mark, self.buf.len());
                    self.mark = self.buf.len();
                    self.state = State::Notification777Body;
                } else {
                    self.push_byte(byte);
                }
            }

            State::KittyColorKeyField => {
                if byte == b'=' {
                    self.span_a = (self.mark, self.buf.len());
                    self.mark = self.buf.len();
                    self.state = State::KittyColorValueField;
                } else if byte == b';' {
                    self.finalize_kitty_entry(false);
                } else {
                    self.push_byte(byte);
                }
            }
            State::KittyColorValueField => {
                if byte == b';' {
                    self.finalize_kitty_entry(true);
                    self.state = State::KittyColorKeyField;
                } else {
                    self.push_byte(byte);
                }
            }
        }
    }

    /// Finalise the sequence and produce the command.
    ///
    /// `terminator` is the byte that closed the sequence (BEL or the
    /// backslash of ST); it is recorded on commands that may need a
    /// response. Always returns a command; malformed input yields
    /// [`OscCommand::Invalid`].
    pub fn end(&mut self, terminator: Option<u8>) -> OscCommand<'_> {
        if self.fresh {
            self.begin();
        }
        // The next feed starts over; the returned borrow keeps the arena
        // untouched until then.
        self.fresh = true;
        self.esc_pending = false;
        self.terminated = false;
        if self.poisoned {
            return OscCommand::Invalid;
        }
        self.finalize(Terminator::from_byte(terminator))
    }

    /// Return to the empty state, invalidating any outstanding command.
    ///
    /// The arena keeps its allocation; its contents are released.
    pub fn reset(&mut self) {
        self.state = State::Empty;
        self.poisoned = false;
        self.esc_pending = false;
        self.terminated = false;
        self.fresh = true;
    }

    /// Clear all per-sequence state. The arena keeps its capacity.
    fn begin(&mut self) {
        self.fresh = false;
        self.state = State::Empty;
        self.command_num = 0;
        self.buf.clear();
        self.mark = 0;
        self.span_a = (0, 0);
        self.span_b = (0, 0);
        self.num = 0;
        self.num_seen = false;
        self.saved_num = None;
        self.dynamic_target = 0;
        self.semantic_sub = 0;
        self.prompt_aid = None;
        self.prompt_kind = PromptKind::Primary;
        self.prompt_redraw = true;
        self.color_ops.clear();
        self.kitty_entries.clear();
    }

    fn push_byte(&mut self, byte: u8) {
        if self.buf.try_reserve(1).is_err() {
            self.poisoned = true;
            return;
        }
        self.buf.push(byte);
    }

    fn accum_digit(&mut self, byte: u8) -> bool {
        if !byte.is_ascii_digit() {
            return false;
        }
        self.num = self.num.saturating_mul(10).saturating_add((byte - b'0') as u16);
        self.num_seen = true;
        true
    }

    fn reset_num(&mut self) {
        self.num = 0;
        self.num_seen = false;
    }

    fn invalidate(&mut self, why: &str) {
        log::debug!("invalid OSC sequence: {why}");
        self.state = State::Invalid;
    }

    fn feed_command_number(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => {
                self.state = State::CommandNumber;
                let digit = (byte - b'0') as u16;
                match self.command_num.checked_mul(10).and_then(|n| n.checked_add(digit)) {
                    Some(n) => self.command_num = n,
                    None => self.invalidate("command number overflow"),
                }
            }
            b';' => self.dispatch_command(),
            _ => self.invalidate("non-digit in command number"),
        }
    }

    /// Select the body state for the accumulated command number.
    fn dispatch_command(&mut self) {
        self.mark = self.buf.len();
        self.reset_num();
        self.state = match self.command_num {
            0 | 1 | 2 => State::TitleText,
            4 => State::PaletteIndex,
            7 => State::PwdText,
            8 => State::HyperlinkParams,
            9 => State::Osc9SubId,
            10 | 11 | 12 => {
                self.dynamic_target = self.command_num;
                State::DynamicSpec
            }
            21 => State::KittyColorKeyField,
            22 => State::MouseShapeText,
            52 => State::ClipboardKind,
            104 => State::PaletteResetIndex,
            110 | 111 | 112 => State::DynamicReset,
            133 => State::SemanticSubcommand,
            777 => State::RxvtKind,
            other => {
                log::debug!("unknown OSC command {other}");
                State::Invalid
            }
        };
    }

    /// ConEmu sub-dispatch after `9;<sub-id>;`. Unrecognised sub-ids fall
    /// back to a desktop notification carrying the whole body.
    fn dispatch_conemu(&mut self) {
        let sub = if self.num_seen { Some(self.num) } else { None };
        self.reset_num();
        self.state = match sub {
            Some(1) => State::ConemuSleepMs,
            Some(2) => State::ConemuMessageBox,
            Some(3) => State::ConemuTabTitle,
            Some(4) => State::ConemuProgressState,
            Some(5) => State::ConemuWaitInput,
            Some(6) => State::ConemuGuiMacro,
            _ => {
                self.push_byte(b';');
                State::NotificationBody
            }
        };
        if self.state != State::NotificationBody {
            self.mark = self.buf.len();
        }
    }

    /// Commit an `index;spec` pair of an OSC 4 body.
    fn finalize_palette_pair(&mut self) {
        let Some(index) = self.saved_num.take() else {
            self.invalidate("OSC 4 spec without index");
            return;
        };
        let target = ColorTarget::Palette(index as u8);
        let spec = &self.buf[self.mark..];
        let op = if spec == b"?" {
            ColorOp::Query { target }
        } else {
            match std::str::from_utf8(spec).ok().and_then(Rgb::parse_spec) {
                Some(color) => ColorOp::Set { target, color },
                None => {
                    self.invalidate("unparsable OSC 4 color spec");
                    return;
                }
            }
        };
        self.color_ops.push(op);
        self.mark = self.buf.len();
    }

    /// Commit one palette index of an OSC 104 body. Empty fields are
    /// skipped.
    fn finalize_palette_reset_field(&mut self) {
        if self.num_seen {
            self.color_ops.push(ColorOp::Reset {
                target: ColorTarget::Palette(self.num.min(255) as u8),
            });
        }
        self.reset_num();
    }

    /// Commit one spec field of an OSC 10/11/12 body and advance the
    /// dynamic color target.
    fn finalize_dynamic_field(&mut self) {
        let target = match self.dynamic_target {
            10 => Some(ColorTarget::Foreground),
            11 => Some(ColorTarget::Background),
            12 => Some(ColorTarget::Cursor),
            _ => None,
        };
        let spec = &self.buf[self.mark..];
        if let Some(target) = target {
            if spec == b"?" {
                self.color_ops.push(ColorOp::Query { target });
            } else if !spec.is_empty() {
                match std::str::from_utf8(spec).ok().and_then(Rgb::parse_spec) {
                    Some(color) => self.color_ops.push(ColorOp::Set { target, color }),
                    None => {
                        self.invalidate("unparsable dynamic color spec");
                        return;
                    }
                }
            }
        } else {
            log::trace!("dynamic color field beyond cursor ignored");
        }
        self.dynamic_target += 1;
        self.mark = self.buf.len();
    }

    /// Commit an OSC 133;A option.
    fn finalize_semantic_option(&mut self) {
        let key = self.span_a;
        let value = (self.mark, self.buf.len());
        match &self.buf[key.0..key.1] {
            b"aid" => self.prompt_aid = Some(value),
            b"redraw" => self.prompt_redraw = &self.buf[value.0..value.1] != b"0",
            b"k" => {
                self.prompt_kind = match self.buf[value.0..value.1].first() {
                    Some(b'r') => PromptKind::Right,
                    Some(b'c') => PromptKind::Continuation,
                    Some(b's') => PromptKind::Secondary,
                    _ => PromptKind::Primary,
                }
            }
            other => log::trace!("ignoring semantic prompt option {:?}", String::from_utf8_lossy(other)),
        }
        self.mark = self.buf.len();
    }

    /// Commit a `key[=value]` entry of an OSC 21 body. Unknown keys and
    /// unparsable values drop the entry, not the command.
    fn finalize_kitty_entry(&mut self, with_value: bool) {
        let (key_range, value_range) = if with_value {
            (self.span_a, (self.mark, self.buf.len()))
        } else {
            ((self.mark, self.buf.len()), (0, 0))
        };
        self.mark = self.buf.len();

        if !with_value && key_range.0 == key_range.1 {
            return;
        }
        let Some(key) = std::str::from_utf8(&self.buf[key_range.0..key_range.1])
            .ok()
            .and_then(KittyColorKey::parse)
        else {
            log::debug!("unknown kitty color protocol key");
            return;
        };
        let value = if !with_value {
            KittyColorValue::Query
        } else {
            let raw = &self.buf[value_range.0..value_range.1];
            if raw.is_empty() {
                KittyColorValue::Reset
            } else if raw == b"?" {
                KittyColorValue::Query
            } else {
                match std::str::from_utf8(raw).ok().and_then(Rgb::parse_spec) {
                    Some(color) => KittyColorValue::Set(color),
                    None => {
                        log::debug!("unparsable kitty color protocol value");
                        return;
                    }
                }
            }
        };
        if self.kitty_entries.len() < MAX_KITTY_COLOR_ENTRIES {
            self.kitty_entries.push(KittyColorEntry { key, value });
        } else {
            log::debug!("kitty color protocol entry limit reached");
        }
    }

    fn utf8(&self, start: usize, end: usize) -> Option<&str> {
        std::str::from_utf8(&self.buf[start..end]).ok()
    }

    fn finalize(&mut self, terminator: Terminator) -> OscCommand<'_> {
        // Flush the trailing field of list-shaped bodies.
        match self.state {
            State::PaletteSpec => self.finalize_palette_pair(),
            State::PaletteResetIndex => self.finalize_palette_reset_field(),
            State::DynamicSpec => self.finalize_dynamic_field(),
            State::SemanticOptionValue => self.finalize_semantic_option(),
            State::KittyColorKeyField => self.finalize_kitty_entry(false),
            State::KittyColorValueField => self.finalize_kitty_entry(true),
            _ => {}
        }

        match self.state {
            State::Empty | State::Invalid | State::SemanticSubcommand => OscCommand::Invalid,

            // A bare command number is enough for the reset families.
            State::CommandNumber => match self.command_num {
                104 => OscCommand::ColorOperation {
                    source: ColorOperationSource::PaletteReset,
                    ops: &[],
                    terminator,
                },
                110 | 111 | 112 => self.dynamic_reset_command(terminator),
                other => {
                    log::debug!("OSC {other} requires a body");
                    OscCommand::Invalid
                }
            },

            State::TitleText => match self.utf8(self.mark, self.buf.len()) {
                Some(text) if self.command_num == 1 => OscCommand::ChangeWindowIcon(text),
                Some(text) => OscCommand::ChangeWindowTitle(text),
                None => OscCommand::Invalid,
            },
            State::PwdText => match self.utf8(self.mark, self.buf.len()) {
                Some(text) => OscCommand::ReportPwd(text),
                None => OscCommand::Invalid,
            },
            State::MouseShapeText => match self.utf8(self.mark, self.buf.len()) {
                Some(text) => OscCommand::MouseShape(text),
                None => OscCommand::Invalid,
            },

            State::PaletteIndex | State::PaletteSpec => {
                // A dangling index ("4;5" with no spec) is malformed.
                if self.num_seen || self.color_ops.is_empty() {
                    OscCommand::Invalid
                } else {
                    OscCommand::ColorOperation {
                        source: ColorOperationSource::Palette,
                        ops: &self.color_ops,
                        terminator,
                    }
                }
            }
            State::PaletteResetIndex => OscCommand::ColorOperation {
                source: ColorOperationSource::PaletteReset,
                ops: &self.color_ops,
                terminator,
            },
            State::DynamicSpec => {
                if self.color_ops.is_empty() {
                    OscCommand::Invalid
                } else {
                    let source = match self.command_num {
                        10 => ColorOperationSource::Foreground,
                        11 => ColorOperationSource::Background,
                        _ => ColorOperationSource::Cursor,
                    };
                    OscCommand::ColorOperation {
                        source,
                        ops: &self.color_ops,
                        terminator,
                    }
                }
            }
            State::DynamicReset => self.dynamic_reset_command(terminator),

            State::HyperlinkParams => OscCommand::HyperlinkEnd,
            State::HyperlinkUri => {
                if self.mark == self.buf.len() {
                    return OscCommand::HyperlinkEnd;
                }
                let params = self.span_a;
                let Some(uri) = self.utf8(self.mark, self.buf.len()) else {
                    return OscCommand::Invalid;
                };
                let id = std::str::from_utf8(&self.buf[params.0..params.1])
                    .ok()
                    .and_then(|params| {
                        params
                            .split(':')
                            .find_map(|kv| kv.strip_prefix("id="))
                            .filter(|id| !id.is_empty())
                    });
                OscCommand::HyperlinkStart { id, uri }
            }

            State::Osc9SubId | State::NotificationBody => {
                // Digits-only bodies are ConEmu commands with defaults.
                if self.state == State::Osc9SubId && self.num_seen {
                    match self.num {
                        1 => return OscCommand::ConemuSleep { duration_ms: 100 },
                        2 => return OscCommand::ConemuShowMessageBox(""),
                        3 => return OscCommand::ConemuChangeTabTitle(None),
                        4 => {
                            return OscCommand::ConemuProgressReport {
                                state: ProgressState::Remove,
                                progress: None,
                            };
                        }
                        5 => return OscCommand::ConemuWaitInput,
                        6 => return OscCommand::ConemuGuiMacro(""),
                        _ => {}
                    }
                }
                match self.utf8(self.mark, self.buf.len()) {
                    Some(body) => OscCommand::ShowDesktopNotification { title: "", body },
                    None => OscCommand::Invalid,
                }
            }
            State::ConemuSleepMs => OscCommand::ConemuSleep {
                duration_ms: if self.num_seen {
                    self.num.min(MAX_CONEMU_SLEEP_MS)
                } else {
                    100
                },
            },
            State::ConemuMessageBox => match self.utf8(self.mark, self.buf.len()) {
                Some(text) => OscCommand::ConemuShowMessageBox(text),
                None => OscCommand::Invalid,
            },
            State::ConemuTabTitle => match self.utf8(self.mark, self.buf.len()) {
                Some("") => OscCommand::ConemuChangeTabTitle(None),
                Some(text) => OscCommand::ConemuChangeTabTitle(Some(text)),
                None => OscCommand::Invalid,
            },
            State::ConemuProgressState => match ProgressState::from_u16(if self.num_seen { self.num } else { 0 }) {
                Some(state) => OscCommand::ConemuProgressReport { state, progress: None },
                None => OscCommand::Invalid,
            },
            State::ConemuProgressValue => {
                let Some(state) = ProgressState::from_u16(self.saved_num.take().unwrap_or(0)) else {
                    return OscCommand::Invalid;
                };
                let progress = if self.num_seen {
                    Some(self.num.min(100) as u8)
                } else {
                    None
                };
                OscCommand::ConemuProgressReport { state, progress }
            }
            State::ConemuWaitInput => OscCommand::ConemuWaitInput,
            State::ConemuGuiMacro => match self.utf8(self.mark, self.buf.len()) {
                Some(text) => OscCommand::ConemuGuiMacro(text),
                None => OscCommand::Invalid,
            },

            State::ClipboardKind => OscCommand::Invalid,
            State::ClipboardPayload => {
                let kind = *self.buf.get(self.span_a.0).filter(|_| self.span_a.0 < self.span_a.1).unwrap_or(&b'c');
                let payload = &self.buf[self.mark..];
                if payload == b"?" {
                    return OscCommand::ClipboardContents {
                        kind,
                        payload: ClipboardPayload::Query,
                    };
                }
                match general_purpose::STANDARD.decode(payload) {
                    Ok(data) => {
                        let start = self.buf.len();
                        if self.buf.try_reserve(data.len()).is_err() {
                            self.poisoned = true;
                            return OscCommand::Invalid;
                        }
                        self.buf.extend_from_slice(&data);
                        OscCommand::ClipboardContents {
                            kind,
                            payload: ClipboardPayload::Data(&self.buf[start..]),
                        }
                    }
                    Err(_) => {
                        log::debug!("invalid base64 in OSC 52 payload");
                        OscCommand::Invalid
                    }
                }
            }

            State::SemanticAfterSub
            | State::SemanticIgnore
            | State::SemanticOptionKey
            | State::SemanticOptionValue
            | State::SemanticExitCode => match self.semantic_sub {
                b'A' => {
                    let aid = match self.prompt_aid {
                        Some((start, end)) => match self.utf8(start, end) {
                            Some(aid) => Some(aid),
                            None => return OscCommand::Invalid,
                        },
                        None => None,
                    };
                    OscCommand::PromptStart {
                        aid,
                        kind: self.prompt_kind,
                        redraw: self.prompt_redraw,
                    }
                }
                b'B' => OscCommand::PromptEnd,
                b'C' => OscCommand::EndOfInput,
                b'D' => OscCommand::EndOfCommand {
                    exit_code: if self.num_seen { Some(self.num.min(255) as u8) } else { None },
                },
                _ => OscCommand::Invalid,
            },

            State::RxvtKind => OscCommand::Invalid,
            State::NotificationTitle => match self.utf8(self.mark, self.buf.len()) {
                Some(title) => OscCommand::ShowDesktopNotification { title, body: "" },
                None => OscCommand::Invalid,
            },
            State::Notification777Body => {
                let title = self.span_b;
                match (self.utf8(title.0, title.1), self.utf8(self.mark, self.buf.len())) {
                    (Some(title), Some(body)) => OscCommand::ShowDesktopNotification { title, body },
                    _ => OscCommand::Invalid,
                }
            }

            State::KittyColorKeyField | State::KittyColorValueField => {
                if self.kitty_entries.is_empty() {
                    OscCommand::Invalid
                } else {
                    OscCommand::KittyColorProtocol {
                        entries: &self.kitty_entries,
                        terminator,
                    }
                }
            }
        }
    }

    fn dynamic_reset_command(&mut self, terminator: Terminator) -> OscCommand<'_> {
        let (source, target) = match self.command_num {
            110 => (ColorOperationSource::ForegroundReset, ColorTarget::Foreground),
            111 => (ColorOperationSource::BackgroundReset, ColorTarget::Background),
            _ => (ColorOperationSource::CursorReset, ColorTarget::Cursor),
        };
        self.color_ops.push(ColorOp::Reset { target });
        OscCommand::ColorOperation {
            source,
            ops: &self.color_ops,
            terminator,
        }
    }
}
