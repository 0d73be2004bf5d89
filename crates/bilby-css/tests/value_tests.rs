//! Integration tests for the property value parsers.

use bilby_css::parser::{ComponentTree, parse_list_of_component_values};
use bilby_css::values::{
    BackgroundImage, BackgroundPosition, BackgroundPositionSide, BackgroundSize,
    BackgroundSizeValue, BorderWidth, Color, CssWideKeyword, Display, ItemType, LengthPercentage,
    LengthPercentageAuto, MaxSize, Position, RepeatStyle, Rgba, ValueSource, ZIndex,
    parse_background_image, parse_background_position, parse_background_repeat,
    parse_background_size, parse_border_width, parse_color, parse_css_wide_keyword, parse_display,
    parse_length_percentage, parse_length_percentage_auto, parse_max_size, parse_position,
    parse_z_index,
};

/// Parse `input` as a component value list and return the tree.
fn values(input: &str) -> ComponentTree {
    parse_list_of_component_values(input)
}

/// A value source over the whole parsed list.
fn source(tree: &ComponentTree) -> ValueSource<'_> {
    ValueSource::children_of(tree, 0)
}

// ─── z-index ────────────────────────────────────────────────────────────

#[test]
fn test_z_index_auto() {
    let tree = values("auto");
    let mut src = source(&tree);
    assert_eq!(parse_z_index(&mut src), Some(ZIndex::Auto));
    assert!(src.is_exhausted());
}

#[test]
fn test_z_index_integer() {
    let tree = values("-7");
    let mut src = source(&tree);
    assert_eq!(parse_z_index(&mut src), Some(ZIndex::Integer(-7)));
}

#[test]
fn test_z_index_overflow_is_integer_zero() {
    // The tokenizer collapses out-of-range integers to 0; the declared
    // value is integer zero, not a parse failure.
    let tree = values("9999999999999999");
    let mut src = source(&tree);
    assert_eq!(parse_z_index(&mut src), Some(ZIndex::Integer(0)));
}

#[test]
fn test_z_index_rejects_number() {
    let tree = values("1.5");
    let mut src = source(&tree);
    let before = src.position();
    assert_eq!(parse_z_index(&mut src), None);
    // The cursor is restored on mismatch.
    assert_eq!(src.position(), before);
}

// ─── lengths ────────────────────────────────────────────────────────────

#[test]
fn test_length_percentage_px() {
    let tree = values("24px");
    let mut src = source(&tree);
    assert_eq!(
        parse_length_percentage(&mut src),
        Some(LengthPercentage::Px(24.0))
    );
}

#[test]
fn test_length_percentage_percent() {
    let tree = values("37.5%");
    let mut src = source(&tree);
    assert_eq!(
        parse_length_percentage(&mut src),
        Some(LengthPercentage::Percentage(37.5))
    );
}

#[test]
fn test_length_percentage_unitless_zero() {
    let tree = values("0");
    let mut src = source(&tree);
    assert_eq!(parse_length_percentage(&mut src), Some(LengthPercentage::Px(0.0)));
}

#[test]
fn test_length_percentage_rejects_unknown_unit() {
    let tree = values("2em");
    let mut src = source(&tree);
    assert_eq!(parse_length_percentage(&mut src), None);
}

#[test]
fn test_length_percentage_auto() {
    let tree = values("auto");
    let mut src = source(&tree);
    assert_eq!(
        parse_length_percentage_auto(&mut src),
        Some(LengthPercentageAuto::Auto)
    );
}

#[test]
fn test_max_size_none() {
    let tree = values("none");
    let mut src = source(&tree);
    assert_eq!(parse_max_size(&mut src), Some(MaxSize::None));
}

// ─── border-width ───────────────────────────────────────────────────────

#[test]
fn test_border_width_keywords() {
    for (input, expected) in [
        ("thin", BorderWidth::Thin),
        ("medium", BorderWidth::Medium),
        ("thick", BorderWidth::Thick),
    ] {
        let tree = values(input);
        let mut src = source(&tree);
        assert_eq!(parse_border_width(&mut src), Some(expected));
    }
}

#[test]
fn test_border_width_length() {
    let tree = values("3px");
    let mut src = source(&tree);
    assert_eq!(parse_border_width(&mut src), Some(BorderWidth::Px(3.0)));
}

#[test]
fn test_border_width_rejects_percentage() {
    let tree = values("10%");
    let mut src = source(&tree);
    assert_eq!(parse_border_width(&mut src), None);
}

// ─── display / position ─────────────────────────────────────────────────

#[test]
fn test_display_keywords() {
    for (input, expected) in [
        ("block", Display::Block),
        ("inline", Display::Inline),
        ("inline-block", Display::InlineBlock),
        ("none", Display::None),
    ] {
        let tree = values(input);
        let mut src = source(&tree);
        assert_eq!(parse_display(&mut src), Some(expected));
    }
}

#[test]
fn test_position_keywords() {
    for (input, expected) in [
        ("static", Position::Static),
        ("relative", Position::Relative),
        ("absolute", Position::Absolute),
    ] {
        let tree = values(input);
        let mut src = source(&tree);
        assert_eq!(parse_position(&mut src), Some(expected));
    }
}

// ─── colors ─────────────────────────────────────────────────────────────

#[test]
fn test_color_hex_six_digits() {
    let tree = values("#aabbcc");
    let mut src = source(&tree);
    assert_eq!(
        parse_color(&mut src),
        Some(Color::Rgba(Rgba::rgb(0xaa, 0xbb, 0xcc)))
    );
}

#[test]
fn test_color_hex_eight_digits_keeps_alpha() {
    let tree = values("#11223344");
    let mut src = source(&tree);
    assert_eq!(
        parse_color(&mut src),
        Some(Color::Rgba(Rgba::rgba(0x11, 0x22, 0x33, 0x44)))
    );
}

#[test]
fn test_color_hex_three_digits_replicates() {
    // "converted into six-digit form by replicating digits"
    let tree = values("#1af");
    let mut src = source(&tree);
    assert_eq!(
        parse_color(&mut src),
        Some(Color::Rgba(Rgba::rgb(0x11, 0xaa, 0xff)))
    );
}

#[test]
fn test_color_named() {
    let tree = values("teal");
    let mut src = source(&tree);
    assert_eq!(parse_color(&mut src), Some(Color::Rgba(Rgba::rgb(0, 128, 128))));
}

#[test]
fn test_color_transparent() {
    let tree = values("transparent");
    let mut src = source(&tree);
    assert_eq!(parse_color(&mut src), Some(Color::Rgba(Rgba::TRANSPARENT)));
}

#[test]
fn test_color_current_color() {
    let tree = values("currentColor");
    let mut src = source(&tree);
    assert_eq!(parse_color(&mut src), Some(Color::CurrentColor));
}

#[test]
fn test_color_rejects_unknown_keyword() {
    let tree = values("blurple");
    let mut src = source(&tree);
    assert_eq!(parse_color(&mut src), None);
}

// ─── background-image ───────────────────────────────────────────────────

#[test]
fn test_background_image_none() {
    let tree = values("none");
    let mut src = source(&tree);
    assert_eq!(parse_background_image(&mut src), Some(BackgroundImage::None));
}

#[test]
fn test_background_image_url() {
    let tree = values("url(cat.png)");
    let mut src = source(&tree);
    assert_eq!(
        parse_background_image(&mut src),
        Some(BackgroundImage::Url("cat.png".to_owned()))
    );
}

#[test]
fn test_background_image_gradient_is_unparsed() {
    let tree = values("linear-gradient(red, blue)");
    let mut src = source(&tree);
    assert_eq!(parse_background_image(&mut src), None);
}

// ─── background-repeat ──────────────────────────────────────────────────

#[test]
fn test_background_repeat_single_keyword_fills_both_axes() {
    let tree = values("round");
    let mut src = source(&tree);
    let repeat = parse_background_repeat(&mut src).expect("repeat parses");
    assert_eq!(repeat.x, RepeatStyle::Round);
    assert_eq!(repeat.y, RepeatStyle::Round);
}

#[test]
fn test_background_repeat_two_keywords() {
    let tree = values("repeat no-repeat");
    let mut src = source(&tree);
    let repeat = parse_background_repeat(&mut src).expect("repeat parses");
    assert_eq!(repeat.x, RepeatStyle::Repeat);
    assert_eq!(repeat.y, RepeatStyle::NoRepeat);
}

#[test]
fn test_background_repeat_x() {
    let tree = values("repeat-x");
    let mut src = source(&tree);
    let repeat = parse_background_repeat(&mut src).expect("repeat parses");
    assert_eq!(repeat.x, RepeatStyle::Repeat);
    assert_eq!(repeat.y, RepeatStyle::NoRepeat);
}

#[test]
fn test_background_repeat_leaves_cursor_at_mismatch() {
    // `space invalid` parses as {space, space}; only one token is
    // consumed and the cursor is left at `invalid`.
    let tree = values("space invalid");
    let mut src = source(&tree);
    let repeat = parse_background_repeat(&mut src).expect("repeat parses");
    assert_eq!(repeat.x, RepeatStyle::Space);
    assert_eq!(repeat.y, RepeatStyle::Space);

    let next = src.next().expect("the mismatching keyword remains");
    assert_eq!(next.ty, ItemType::Keyword);
    assert!(src.keyword_is(next.index, "invalid"));
}

// ─── background-position ────────────────────────────────────────────────

fn axis(position: &BackgroundPosition, x: bool) -> (BackgroundPositionSide, LengthPercentage) {
    let axis = if x { position.x } else { position.y };
    (axis.side, axis.offset)
}

#[test]
fn test_background_position_four_values() {
    // `bottom 50% left 20px` → x from the left edge by 20px, y from the
    // bottom edge by 50%.
    let tree = values("bottom 50% left 20px");
    let mut src = source(&tree);
    let position = parse_background_position(&mut src).expect("position parses");
    assert_eq!(
        axis(&position, true),
        (BackgroundPositionSide::Start, LengthPercentage::Px(20.0))
    );
    assert_eq!(
        axis(&position, false),
        (BackgroundPositionSide::End, LengthPercentage::Percentage(50.0))
    );
    assert!(src.is_exhausted());
}

#[test]
fn test_background_position_center_swallows_offset() {
    // `center center 50%` consumes all three tokens; center pins both
    // offsets to 0%.
    let tree = values("center center 50%");
    let mut src = source(&tree);
    let position = parse_background_position(&mut src).expect("position parses");
    assert_eq!(
        axis(&position, true),
        (
            BackgroundPositionSide::Center,
            LengthPercentage::Percentage(0.0)
        )
    );
    assert_eq!(
        axis(&position, false),
        (
            BackgroundPositionSide::Center,
            LengthPercentage::Percentage(0.0)
        )
    );
    assert!(src.is_exhausted(), "all three tokens are consumed");
}

#[test]
fn test_background_position_single_keyword_defaults_other_axis_to_center() {
    // `top` → x centered, y at the start edge.
    let tree = values("top");
    let mut src = source(&tree);
    let position = parse_background_position(&mut src).expect("position parses");
    assert_eq!(
        axis(&position, true),
        (
            BackgroundPositionSide::Center,
            LengthPercentage::Percentage(0.0)
        )
    );
    assert_eq!(
        axis(&position, false),
        (
            BackgroundPositionSide::Start,
            LengthPercentage::Percentage(0.0)
        )
    );
}

#[test]
fn test_background_position_two_offsets() {
    let tree = values("25% 10px");
    let mut src = source(&tree);
    let position = parse_background_position(&mut src).expect("position parses");
    assert_eq!(
        axis(&position, true),
        (
            BackgroundPositionSide::Start,
            LengthPercentage::Percentage(25.0)
        )
    );
    assert_eq!(
        axis(&position, false),
        (BackgroundPositionSide::Start, LengthPercentage::Px(10.0))
    );
}

#[test]
fn test_background_position_two_keywords_on_one_axis_is_an_error() {
    let tree = values("left right");
    let mut src = source(&tree);
    let before = src.position();
    assert_eq!(parse_background_position(&mut src), None);
    assert_eq!(src.position(), before);
}

// ─── background-size ────────────────────────────────────────────────────

#[test]
fn test_background_size_cover_contain() {
    let tree = values("cover");
    let mut src = source(&tree);
    assert_eq!(parse_background_size(&mut src), Some(BackgroundSize::Cover));

    let tree = values("contain");
    let mut src = source(&tree);
    assert_eq!(parse_background_size(&mut src), Some(BackgroundSize::Contain));
}

#[test]
fn test_background_size_one_value_defaults_height_to_auto() {
    let tree = values("50%");
    let mut src = source(&tree);
    assert_eq!(
        parse_background_size(&mut src),
        Some(BackgroundSize::Size {
            width: BackgroundSizeValue::LengthPercentage(LengthPercentage::Percentage(50.0)),
            height: BackgroundSizeValue::Auto,
        })
    );
}

#[test]
fn test_background_size_two_values() {
    let tree = values("10px auto");
    let mut src = source(&tree);
    assert_eq!(
        parse_background_size(&mut src),
        Some(BackgroundSize::Size {
            width: BackgroundSizeValue::LengthPercentage(LengthPercentage::Px(10.0)),
            height: BackgroundSizeValue::Auto,
        })
    );
}

// ─── CSS-wide keywords ──────────────────────────────────────────────────

#[test]
fn test_css_wide_keywords() {
    for (input, expected) in [
        ("initial", CssWideKeyword::Initial),
        ("inherit", CssWideKeyword::Inherit),
        ("unset", CssWideKeyword::Unset),
    ] {
        let tree = values(input);
        let mut src = source(&tree);
        assert_eq!(parse_css_wide_keyword(&mut src), Some(expected));
    }
}

#[test]
fn test_css_wide_keyword_requires_lone_identifier() {
    // `inherit inherit` is not a CSS-wide keyword declaration.
    let tree = values("inherit inherit");
    let mut src = source(&tree);
    let before = src.position();
    assert_eq!(parse_css_wide_keyword(&mut src), None);
    assert_eq!(src.position(), before);
}
