use vt_codec_core::{EncodeError, EncoderOptions, Key, KeyAction, KeyEncoder, KeyEvent, KittyFlags, Mods, OptionAsAlt};

fn encode(encoder: &KeyEncoder, event: &KeyEvent<'_>) -> Vec<u8> {
    let mut buf = [0u8; 128];
    let written = encoder.encode(event, &mut buf).expect("buffer large enough");
    buf[..written].to_vec()
}

fn press(key: Key) -> KeyEvent<'static> {
    KeyEvent::new(key)
}

fn press_mods(key: Key, mods: Mods) -> KeyEvent<'static> {
    KeyEvent {
        mods,
        ..KeyEvent::new(key)
    }
}

#[test]
fn test_ctrl_c_legacy() {
    let encoder = KeyEncoder::new();
    let event = press_mods(Key::KeyC, Mods::CTRL);
    assert_eq!(encode(&encoder, &event), vec![0x03]);
}

#[test]
fn test_ctrl_table() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press_mods(Key::KeyA, Mods::CTRL)), vec![0x01]);
    assert_eq!(encode(&encoder, &press_mods(Key::KeyZ, Mods::CTRL)), vec![0x1A]);
    assert_eq!(encode(&encoder, &press_mods(Key::Space, Mods::CTRL)), vec![0x00]);
    assert_eq!(encode(&encoder, &press_mods(Key::BracketLeft, Mods::CTRL)), vec![0x1B]);
    assert_eq!(encode(&encoder, &press_mods(Key::Digit8, Mods::CTRL)), vec![0x7F]);
}

#[test]
fn test_text_passthrough() {
    let encoder = KeyEncoder::new();
    let event = KeyEvent {
        utf8: "a",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"a");

    // Shift consumed by the platform to produce the text.
    let event = KeyEvent {
        mods: Mods::SHIFT,
        consumed_mods: Mods::SHIFT,
        utf8: "A",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"A");
}

#[test]
fn test_text_fallback_without_utf8() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::KeyQ)), b"q");
    assert_eq!(encode(&encoder, &press(Key::Digit7)), b"7");
}

#[test]
fn test_release_produces_nothing_legacy() {
    let encoder = KeyEncoder::new();
    let event = KeyEvent {
        action: KeyAction::Release,
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"");
}

#[test]
fn test_bare_modifier_produces_nothing() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press_mods(Key::ShiftLeft, Mods::SHIFT)), b"");
    assert_eq!(encode(&encoder, &press_mods(Key::ControlLeft, Mods::CTRL)), b"");
}

#[test]
fn test_cursor_keys() {
    let mut encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::ArrowUp)), b"\x1b[A");
    assert_eq!(encode(&encoder, &press(Key::ArrowLeft)), b"\x1b[D");
    assert_eq!(encode(&encoder, &press(Key::Home)), b"\x1b[H");
    assert_eq!(encode(&encoder, &press(Key::End)), b"\x1b[F");

    encoder.options.cursor_key_application = true;
    assert_eq!(encode(&encoder, &press(Key::ArrowUp)), b"\x1bOA");

    // Modified cursor keys use CSI regardless of the mode.
    assert_eq!(
        encode(&encoder, &press_mods(Key::ArrowUp, Mods::SHIFT)),
        b"\x1b[1;2A"
    );
    assert_eq!(
        encode(&encoder, &press_mods(Key::ArrowRight, Mods::CTRL | Mods::ALT)),
        b"\x1b[1;7C"
    );
}

#[test]
fn test_editing_pad() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::Insert)), b"\x1b[2~");
    assert_eq!(encode(&encoder, &press(Key::Delete)), b"\x1b[3~");
    assert_eq!(encode(&encoder, &press(Key::PageUp)), b"\x1b[5~");
    assert_eq!(encode(&encoder, &press_mods(Key::PageDown, Mods::CTRL)), b"\x1b[6;5~");
}

#[test]
fn test_function_keys() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::F1)), b"\x1bOP");
    assert_eq!(encode(&encoder, &press(Key::F4)), b"\x1bOS");
    assert_eq!(encode(&encoder, &press(Key::F5)), b"\x1b[15~");
    assert_eq!(encode(&encoder, &press(Key::F12)), b"\x1b[24~");
    assert_eq!(encode(&encoder, &press_mods(Key::F5, Mods::CTRL)), b"\x1b[15;5~");
    assert_eq!(encode(&encoder, &press_mods(Key::F1, Mods::SHIFT)), b"\x1b[1;2P");

    // F13-F24 are shifted F1-F12; F25 is control F1.
    assert_eq!(encode(&encoder, &press(Key::F13)), b"\x1b[1;2P");
    assert_eq!(encode(&encoder, &press(Key::F17)), b"\x1b[15;2~");
    assert_eq!(encode(&encoder, &press(Key::F25)), b"\x1b[1;5P");
}

#[test]
fn test_control_keys() {
    let encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::Enter)), b"\r");
    assert_eq!(encode(&encoder, &press(Key::Tab)), b"\t");
    assert_eq!(encode(&encoder, &press(Key::Backspace)), b"\x7f");
    assert_eq!(encode(&encoder, &press(Key::Escape)), b"\x1b");
    assert_eq!(encode(&encoder, &press_mods(Key::Tab, Mods::SHIFT)), b"\x1b[Z");
    assert_eq!(encode(&encoder, &press_mods(Key::Backspace, Mods::CTRL)), vec![0x08]);
    assert_eq!(encode(&encoder, &press_mods(Key::Escape, Mods::ALT)), b"\x1b\x1b");
}

#[test]
fn test_alt_prefix() {
    let mut encoder = KeyEncoder::new();
    let event = KeyEvent {
        mods: Mods::ALT,
        utf8: "b",
        ..KeyEvent::new(Key::KeyB)
    };
    assert_eq!(encode(&encoder, &event), b"\x1bb");

    // Meta mode sets the 8th bit instead.
    encoder.options.alt_esc_prefix = false;
    assert_eq!(encode(&encoder, &event), vec![0xE2]);
}

#[test]
fn test_keypad() {
    let mut encoder = KeyEncoder::new();
    assert_eq!(encode(&encoder, &press(Key::Numpad5)), b"5");
    assert_eq!(encode(&encoder, &press(Key::NumpadEnter)), b"\r");
    assert_eq!(encode(&encoder, &press(Key::NumpadDecimal)), b".");

    encoder.options.keypad_key_application = true;
    assert_eq!(encode(&encoder, &press(Key::Numpad0)), b"\x1bOp");
    assert_eq!(encode(&encoder, &press(Key::Numpad5)), b"\x1bOu");
    assert_eq!(encode(&encoder, &press(Key::NumpadEnter)), b"\x1bOM");
    assert_eq!(encode(&encoder, &press(Key::NumpadMultiply)), b"\x1bOj");

    // Num lock forces the numeric form when mode 1035 is set.
    encoder.options.ignore_keypad_with_numlock = true;
    assert_eq!(
        encode(&encoder, &press_mods(Key::Numpad5, Mods::NUM_LOCK)),
        b"5"
    );
    assert_eq!(encode(&encoder, &press(Key::Numpad5)), b"\x1bOu");
}

#[test]
fn test_modify_other_keys_state_2() {
    let mut encoder = KeyEncoder::new();
    encoder.options.modify_other_keys_state_2 = true;

    assert_eq!(
        encode(&encoder, &press_mods(Key::KeyA, Mods::CTRL)),
        b"\x1b[27;5;97~"
    );
    assert_eq!(
        encode(&encoder, &press_mods(Key::Enter, Mods::CTRL)),
        b"\x1b[27;5;13~"
    );
    assert_eq!(
        encode(&encoder, &press_mods(Key::KeyB, Mods::CTRL | Mods::SHIFT)),
        b"\x1b[27;6;98~"
    );

    // Unmodified keys are untouched.
    let event = KeyEvent {
        utf8: "a",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"a");
    assert_eq!(encode(&encoder, &press(Key::Enter)), b"\r");
}

#[test]
fn test_kitty_release_left_ctrl_all_flags() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::ALL;
    let event = KeyEvent {
        action: KeyAction::Release,
        mods: Mods::CTRL,
        ..KeyEvent::new(Key::ControlLeft)
    };
    assert_eq!(encode(&encoder, &event), b"\x1b[57442;5:3u");
}

#[test]
fn test_kitty_disambiguate_ctrl_keys() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE;

    assert_eq!(encode(&encoder, &press_mods(Key::KeyC, Mods::CTRL)), b"\x1b[99;5u");
    // Ctrl+I no longer collides with Tab.
    assert_eq!(encode(&encoder, &press_mods(Key::KeyI, Mods::CTRL)), b"\x1b[105;5u");
    assert_eq!(encode(&encoder, &press(Key::Tab)), b"\t");
    assert_eq!(encode(&encoder, &press(Key::Escape)), b"\x1b[27u");
}

#[test]
fn test_kitty_plain_text_stays_text() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE;

    let event = KeyEvent {
        utf8: "a",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"a");

    let event = KeyEvent {
        mods: Mods::SHIFT,
        consumed_mods: Mods::SHIFT,
        utf8: "A",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"A");
}

#[test]
fn test_kitty_functional_keys() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE;

    assert_eq!(encode(&encoder, &press(Key::ArrowUp)), b"\x1b[A");
    assert_eq!(encode(&encoder, &press_mods(Key::ArrowUp, Mods::SHIFT)), b"\x1b[1;2A");
    assert_eq!(encode(&encoder, &press(Key::F3)), b"\x1b[13~");
    assert_eq!(encode(&encoder, &press(Key::F13)), b"\x1b[57376u");
    assert_eq!(encode(&encoder, &press(Key::CapsLock)), b"\x1b[57358u");

    // Kitty ignores cursor key application mode.
    encoder.options.cursor_key_application = true;
    assert_eq!(encode(&encoder, &press(Key::ArrowUp)), b"\x1b[A");
}

#[test]
fn test_kitty_report_events() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE | KittyFlags::REPORT_EVENTS;

    assert_eq!(encode(&encoder, &press(Key::ArrowUp)), b"\x1b[1;1:1A");
    let repeat = KeyEvent {
        action: KeyAction::Repeat,
        ..KeyEvent::new(Key::ArrowUp)
    };
    assert_eq!(encode(&encoder, &repeat), b"\x1b[1;1:2A");
    let release = KeyEvent {
        action: KeyAction::Release,
        ..KeyEvent::new(Key::ArrowUp)
    };
    assert_eq!(encode(&encoder, &release), b"\x1b[1;1:3A");

    // Releases of plain text keys are still not reported.
    let release = KeyEvent {
        action: KeyAction::Release,
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &release), b"");
}

#[test]
fn test_kitty_report_all() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::REPORT_ALL;

    let event = KeyEvent {
        utf8: "a",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"\x1b[97u");
    assert_eq!(encode(&encoder, &press(Key::Enter)), b"\x1b[13u");
    assert_eq!(encode(&encoder, &press_mods(Key::ShiftLeft, Mods::SHIFT)), b"\x1b[57441;2u");
}

#[test]
fn test_kitty_alternates_and_associated_text() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::ALL;

    // No platform-reported unshifted codepoint: no base sub-parameter.
    let event = KeyEvent {
        mods: Mods::SHIFT,
        consumed_mods: Mods::SHIFT,
        utf8: "A",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"\x1b[97:65;2:1;65u");
}

#[test]
fn test_kitty_alternates_use_layout_unshifted_codepoint() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::ALL;

    // A layout where the physical E key produces a non-Latin codepoint:
    // the base sub-parameter must carry the reported unshifted codepoint
    // (233), not the US-layout value of the key (101).
    let event = KeyEvent {
        mods: Mods::SHIFT,
        consumed_mods: Mods::SHIFT,
        utf8: "\u{c9}",
        unshifted_codepoint: 0xE9,
        ..KeyEvent::new(Key::KeyE)
    };
    assert_eq!(encode(&encoder, &event), b"\x1b[233:201:233;2:1;201u");
}

#[test]
fn test_kitty_enter_tab_backspace_keep_legacy() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE;

    assert_eq!(encode(&encoder, &press(Key::Enter)), b"\r");
    assert_eq!(encode(&encoder, &press(Key::Backspace)), b"\x7f");
    assert_eq!(encode(&encoder, &press_mods(Key::Tab, Mods::SHIFT)), b"\x1b[Z");
}

#[test]
fn test_kitty_release_without_report_events() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::DISAMBIGUATE;
    let event = KeyEvent {
        action: KeyAction::Release,
        mods: Mods::CTRL,
        ..KeyEvent::new(Key::KeyC)
    };
    assert_eq!(encode(&encoder, &event), b"");
}

#[test]
fn test_composing_produces_nothing() {
    let mut encoder = KeyEncoder::new();
    let event = KeyEvent {
        composing: true,
        utf8: "\u{3042}",
        ..KeyEvent::new(Key::KeyA)
    };
    assert_eq!(encode(&encoder, &event), b"");

    encoder.options.kitty_flags = KittyFlags::ALL;
    assert_eq!(encode(&encoder, &event), b"");
}

#[test]
fn test_option_as_alt() {
    let mut encoder = KeyEncoder::new();
    let event = KeyEvent {
        mods: Mods::ALT,
        consumed_mods: Mods::ALT,
        utf8: "\u{00e5}",
        ..KeyEvent::new(Key::KeyA)
    };

    // Composed text wins by default.
    assert_eq!(encode(&encoder, &event), "\u{00e5}".as_bytes());

    // With the override, alt is re-applied to the plain key.
    encoder.options.macos_option_as_alt = OptionAsAlt::True;
    assert_eq!(encode(&encoder, &event), b"\x1ba");

    // Wrong side leaves the text alone.
    encoder.options.macos_option_as_alt = OptionAsAlt::Right;
    assert_eq!(encode(&encoder, &event), "\u{00e5}".as_bytes());

    encoder.options.macos_option_as_alt = OptionAsAlt::Left;
    assert_eq!(encode(&encoder, &event), b"\x1ba");

    let right_side = KeyEvent {
        mods: Mods::ALT | Mods::ALT_RIGHT,
        ..event
    };
    assert_eq!(encode(&encoder, &right_side), "\u{00e5}".as_bytes());
    encoder.options.macos_option_as_alt = OptionAsAlt::Right;
    assert_eq!(encode(&encoder, &right_side), b"\x1ba");
}

#[test]
fn test_size_probe_matches_written() {
    let encoder = KeyEncoder::new();
    let event = press_mods(Key::ArrowUp, Mods::SHIFT);

    let required = match encoder.encode(&event, &mut []) {
        Err(EncodeError::BufferTooSmall { required }) => required,
        Ok(n) => panic!("empty buffer unexpectedly succeeded with {n} bytes"),
    };

    let mut buf = [0u8; 64];
    let written = encoder.encode(&event, &mut buf).unwrap();
    assert_eq!(required, written);
    assert_eq!(encoder.encoded_len(&event), written);
}

#[test]
fn test_undersized_buffer_reports_required() {
    let encoder = KeyEncoder::new();
    let event = press(Key::F5); // \x1b[15~ = 5 bytes
    let mut buf = [0u8; 3];
    assert_eq!(
        encoder.encode(&event, &mut buf),
        Err(EncodeError::BufferTooSmall { required: 5 })
    );
}

#[test]
fn test_encode_determinism() {
    let mut encoder = KeyEncoder::new();
    encoder.options.kitty_flags = KittyFlags::ALL;
    let event = KeyEvent {
        mods: Mods::CTRL | Mods::SHIFT,
        utf8: "C",
        ..KeyEvent::new(Key::KeyC)
    };
    let first = encode(&encoder, &event);
    let second = encode(&encoder, &event);
    assert_eq!(first, second);
}

#[test]
fn test_empty_event_produces_nothing() {
    let encoder = KeyEncoder::new();
    let event = KeyEvent::default();
    assert_eq!(encoder.encode(&event, &mut []), Ok(0));
}

#[test]
fn test_options_snapshot_per_call() {
    let mut encoder = KeyEncoder::new();
    let event = press(Key::ArrowUp);
    assert_eq!(encode(&encoder, &event), b"\x1b[A");
    encoder.options = EncoderOptions {
        cursor_key_application: true,
        ..EncoderOptions::default()
    };
    assert_eq!(encode(&encoder, &event), b"\x1bOA");
}
