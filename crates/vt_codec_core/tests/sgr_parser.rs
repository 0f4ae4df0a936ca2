use vt_codec_core::{Attribute, Rgb, Separator, SgrParser, UnderlineStyle};

/// Build a separator list from a compact string, ':' or ';' per position.
fn seps(pattern: &str) -> Vec<Separator> {
    pattern
        .chars()
        .map(|c| match c {
            ':' => Separator::Colon,
            _ => Separator::Semicolon,
        })
        .collect()
}

fn collect(params: &[u16], separators: &[Separator]) -> Vec<Attribute> {
    let mut parser = SgrParser::new();
    parser.set_params(params, separators);
    parser.collect()
}

#[test]
fn test_simple_attributes() {
    assert_eq!(collect(&[0], &[]), vec![Attribute::Unset]);
    assert_eq!(collect(&[1], &[]), vec![Attribute::Bold]);
    assert_eq!(collect(&[3], &[]), vec![Attribute::Italic]);
    assert_eq!(
        collect(&[1, 3], &seps(";")),
        vec![Attribute::Bold, Attribute::Italic]
    );
}

#[test]
fn test_basic_colors() {
    assert_eq!(collect(&[31], &[]), vec![Attribute::Fg8(1)]);
    assert_eq!(collect(&[37], &[]), vec![Attribute::Fg8(7)]);
    assert_eq!(collect(&[40], &[]), vec![Attribute::Bg8(0)]);
    assert_eq!(collect(&[45], &[]), vec![Attribute::Bg8(5)]);
}

#[test]
fn test_underline_styles() {
    assert_eq!(
        collect(&[4], &[]),
        vec![Attribute::Underline(UnderlineStyle::Single)]
    );
    assert_eq!(
        collect(&[4, 0], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::None)]
    );
    assert_eq!(
        collect(&[4, 2], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::Double)]
    );
    assert_eq!(
        collect(&[4, 3], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::Curly)]
    );
    assert_eq!(
        collect(&[4, 4], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::Dotted)]
    );
    assert_eq!(
        collect(&[4, 5], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::Dashed)]
    );
    // Unknown sub-parameter degrades to no underline.
    assert_eq!(
        collect(&[4, 9], &seps(":")),
        vec![Attribute::Underline(UnderlineStyle::None)]
    );
}

#[test]
fn test_underline_semicolon_is_not_a_subparameter() {
    // `4;1` is single underline followed by bold.
    assert_eq!(
        collect(&[4, 1], &seps(";")),
        vec![Attribute::Underline(UnderlineStyle::Single), Attribute::Bold]
    );
}

#[test]
fn test_256_color() {
    assert_eq!(collect(&[38, 5, 123], &seps(";;")), vec![Attribute::Fg256(123)]);
    assert_eq!(collect(&[48, 5, 0], &seps(";;")), vec![Attribute::Bg256(0)]);
    assert_eq!(collect(&[58, 5, 200], &seps(";;")), vec![Attribute::Underline256(200)]);
    // The 5-form ignores the separator style.
    assert_eq!(collect(&[38, 5, 10], &seps("::")), vec![Attribute::Fg256(10)]);
    // Out of range clamps.
    assert_eq!(collect(&[38, 5, 300], &seps(";;")), vec![Attribute::Fg256(255)]);
}

#[test]
fn test_direct_color_semicolon_form() {
    assert_eq!(
        collect(&[38, 2, 10, 20, 30], &seps(";;;;")),
        vec![Attribute::FgDirect(Rgb::new(10, 20, 30))]
    );
    assert_eq!(
        collect(&[48, 2, 0, 0, 0], &seps(";;;;")),
        vec![Attribute::BgDirect(Rgb::new(0, 0, 0))]
    );
}

#[test]
fn test_direct_color_colon_form_with_colorspace() {
    // ITU T.416: 38:2:<colorspace>:r:g:b
    assert_eq!(
        collect(&[38, 2, 0, 1, 2, 3], &seps(":::::")),
        vec![Attribute::FgDirect(Rgb::new(1, 2, 3))]
    );
    // Without the colorspace id.
    assert_eq!(
        collect(&[38, 2, 1, 2, 3], &seps("::::")),
        vec![Attribute::FgDirect(Rgb::new(1, 2, 3))]
    );
}

#[test]
fn test_short_direct_color_yields_unknown() {
    assert_eq!(collect(&[38, 2, 1], &seps(";;")), vec![Attribute::Unknown]);
    assert_eq!(collect(&[38, 2], &seps(";")), vec![Attribute::Unknown]);
    assert_eq!(collect(&[38], &[]), vec![Attribute::Unknown]);
    // The colon form stops consuming at a semicolon boundary.
    assert_eq!(
        collect(&[38, 2, 1, 1], &seps("::;")),
        vec![Attribute::Unknown, Attribute::Bold]
    );
}

#[test]
fn test_unknown_parameters() {
    assert_eq!(collect(&[2], &[]), vec![Attribute::Unknown]);
    assert_eq!(collect(&[99], &[]), vec![Attribute::Unknown]);
    assert_eq!(
        collect(&[1, 99, 3], &seps(";;")),
        vec![Attribute::Bold, Attribute::Unknown, Attribute::Italic]
    );
}

#[test]
fn test_kakoune_sequence() {
    // ESC[4:3;38;2;51;51;51;48;2;170;170;170;58;2;255;97;136m
    let params = [4, 3, 38, 2, 51, 51, 51, 48, 2, 170, 170, 170, 58, 2, 255, 97, 136];
    let separators = seps(":;;;;;;;;;;;;;;;");
    assert_eq!(
        collect(&params, &separators),
        vec![
            Attribute::Underline(UnderlineStyle::Curly),
            Attribute::FgDirect(Rgb::new(51, 51, 51)),
            Attribute::BgDirect(Rgb::new(170, 170, 170)),
            Attribute::UnderlineDirect(Rgb::new(255, 97, 136)),
        ]
    );
}

#[test]
fn test_exhaustion() {
    let mut parser = SgrParser::new();
    parser.set_params(&[1, 3], &seps(";"));
    assert_eq!(parser.next_attribute(), Some(Attribute::Bold));
    assert_eq!(parser.next_attribute(), Some(Attribute::Italic));
    assert_eq!(parser.next_attribute(), None);
    assert_eq!(parser.next_attribute(), None);
}

#[test]
fn test_set_params_restarts() {
    let mut parser = SgrParser::new();
    parser.set_params(&[1], &[]);
    assert_eq!(parser.next_attribute(), Some(Attribute::Bold));
    assert_eq!(parser.next_attribute(), None);

    parser.set_params(&[31], &[]);
    assert_eq!(parser.next_attribute(), Some(Attribute::Fg8(1)));
    assert_eq!(parser.next_attribute(), None);
}

#[test]
fn test_empty_params() {
    let mut parser = SgrParser::new();
    parser.set_params(&[], &[]);
    assert_eq!(parser.next_attribute(), None);
}
