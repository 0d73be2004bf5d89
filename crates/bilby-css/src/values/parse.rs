//! Property value parsers.
//!
//! Each CSS property has a parser `fn(&mut ValueSource) -> Option<T>`
//! recognizing that property's grammar over a component range. The contract
//! is uniform: on a mismatch the parser restores the cursor to its entry
//! position and returns `None`, so the caller can try an alternative or
//! drop the declaration. Parsers do not require the source to be exhausted;
//! the declaration assembler checks for trailing junk separately.

use bilby_common::warning::warn_once;

use crate::tokenizer::{DimensionUnit, copy_ident};

use super::background::{
    BackgroundAttachment, BackgroundBox, BackgroundImage, BackgroundPosition,
    BackgroundPositionAxis, BackgroundPositionSide, BackgroundRepeat, BackgroundSize,
    BackgroundSizeValue, RepeatStyle,
};
use super::box_style::{Display, Position, ZIndex};
use super::color::{Color, Rgba};
use super::length::{BorderWidth, LengthPercentage, LengthPercentageAuto, MaxSize};
use super::source::{ItemType, ValueSource};
use super::CssWideKeyword;

/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
///
/// "All of the defaulting keywords are usable in all properties."
///
/// A CSS-wide keyword is only recognized when the declaration body consists
/// of exactly one identifier.
pub fn parse_css_wide_keyword(src: &mut ValueSource) -> Option<CssWideKeyword> {
    let saved = src.position();
    let item = src.expect(ItemType::Keyword)?;
    if !src.is_exhausted() {
        src.reset(saved);
        return None;
    }
    let keyword = src.map_keyword(
        item.index,
        &[
            ("initial", CssWideKeyword::Initial),
            ("inherit", CssWideKeyword::Inherit),
            ("unset", CssWideKeyword::Unset),
        ],
    );
    if keyword.is_none() {
        src.reset(saved);
    }
    keyword
}

/// [§ 2 display](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// `block | inline | inline-block | none`
pub fn parse_display(src: &mut ValueSource) -> Option<Display> {
    parse_keyword(
        src,
        &[
            ("block", Display::Block),
            ("inline", Display::Inline),
            ("inline-block", Display::InlineBlock),
            ("none", Display::None),
        ],
    )
}

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// `static | relative | absolute`
pub fn parse_position(src: &mut ValueSource) -> Option<Position> {
    parse_keyword(
        src,
        &[
            ("static", Position::Static),
            ("relative", Position::Relative),
            ("absolute", Position::Absolute),
        ],
    )
}

/// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
///
/// `auto | <integer>`
pub fn parse_z_index(src: &mut ValueSource) -> Option<ZIndex> {
    let saved = src.position();
    if let Some(item) = src.next() {
        match item.ty {
            ItemType::Keyword => {
                if let Some(z) = src.map_keyword(item.index, &[("auto", ZIndex::Auto)]) {
                    return Some(z);
                }
            }
            ItemType::Integer => return Some(ZIndex::Integer(src.integer(item.index))),
            _ => {}
        }
    }
    src.reset(saved);
    None
}

/// [§ 5 <length-percentage>](https://www.w3.org/TR/css-values-4/#typedef-length-percentage)
///
/// `<length> | <percentage>` where the only supported length unit is `px`.
/// A unitless `0` is accepted as a zero length.
pub fn parse_length_percentage(src: &mut ValueSource) -> Option<LengthPercentage> {
    let saved = src.position();
    if let Some(item) = src.next() {
        match item.ty {
            ItemType::Dimension => {
                let (number, unit) = src.dimension(item.index);
                if unit == DimensionUnit::Px {
                    return Some(LengthPercentage::Px(number));
                }
                warn_once("CSS", "unsupported length unit; only px is recognized");
            }
            ItemType::Percentage => {
                return Some(LengthPercentage::Percentage(src.number(item.index)));
            }
            // "0 can be written without a unit"
            ItemType::Integer if src.integer(item.index) == 0 => {
                return Some(LengthPercentage::ZERO);
            }
            _ => {}
        }
    }
    src.reset(saved);
    None
}

/// `<length-percentage> | auto` — the grammar of widths, heights, margins,
/// and box offsets.
///
/// [§ 10.2 Content width: the 'width' property](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
pub fn parse_length_percentage_auto(src: &mut ValueSource) -> Option<LengthPercentageAuto> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if src.keyword_is(item.index, "auto") {
            return Some(LengthPercentageAuto::Auto);
        }
        src.reset(saved);
        return None;
    }
    parse_length_percentage(src).map(|lp| match lp {
        LengthPercentage::Px(px) => LengthPercentageAuto::Px(px),
        LengthPercentage::Percentage(p) => LengthPercentageAuto::Percentage(p),
    })
}

/// [§ 10.4 'max-width'/'max-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// `none | <length-percentage>`
pub fn parse_max_size(src: &mut ValueSource) -> Option<MaxSize> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if src.keyword_is(item.index, "none") {
            return Some(MaxSize::None);
        }
        src.reset(saved);
        return None;
    }
    parse_length_percentage(src).map(MaxSize::LengthPercentage)
}

/// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#the-border-width)
///
/// `<length> | thin | medium | thick`
pub fn parse_border_width(src: &mut ValueSource) -> Option<BorderWidth> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if let Some(width) = src.map_keyword(
            item.index,
            &[
                ("thin", BorderWidth::Thin),
                ("medium", BorderWidth::Medium),
                ("thick", BorderWidth::Thick),
            ],
        ) {
            return Some(width);
        }
        src.reset(saved);
        return None;
    }
    match parse_length_percentage(src) {
        Some(LengthPercentage::Px(px)) => Some(BorderWidth::Px(px)),
        // Percentages are not part of the border-width grammar.
        Some(LengthPercentage::Percentage(_)) => {
            src.reset(saved);
            None
        }
        None => None,
    }
}

/// [§ 4 Representing Colors](https://www.w3.org/TR/css-color-4/#color-syntax)
///
/// `<hex-color> | <named-color> | transparent | currentColor`
pub fn parse_color(src: &mut ValueSource) -> Option<Color> {
    let saved = src.position();
    if let Some(item) = src.next() {
        match item.ty {
            ItemType::Keyword => {
                if src.keyword_is(item.index, "currentcolor") {
                    return Some(Color::CurrentColor);
                }
                let name = copy_ident(src.tree().source(), src.tree().location(item.index));
                if let Some(rgba) = Rgba::from_named(&name) {
                    return Some(Color::Rgba(rgba));
                }
            }
            ItemType::Hash => {
                // Hex digits start one byte past the `#`.
                let digits = copy_ident(src.tree().source(), src.tree().location(item.index) + 1);
                if let Some(rgba) = Rgba::from_hex(&digits) {
                    return Some(Color::Rgba(rgba));
                }
            }
            _ => {}
        }
    }
    src.reset(saved);
    None
}

/// [§ 3.6 'background-image'](https://www.w3.org/TR/css-backgrounds-3/#background-image)
///
/// `none | <url>` — gradient functions are recognized as functions but not
/// parsed, so a gradient value fails the grammar.
pub fn parse_background_image(src: &mut ValueSource) -> Option<BackgroundImage> {
    let saved = src.position();
    if let Some(item) = src.next() {
        match item.ty {
            ItemType::Keyword if src.keyword_is(item.index, "none") => {
                return Some(BackgroundImage::None);
            }
            ItemType::Url => return Some(BackgroundImage::Url(src.url(item.index))),
            _ => {}
        }
    }
    src.reset(saved);
    None
}

/// [§ 3.4 'background-repeat'](https://www.w3.org/TR/css-backgrounds-3/#background-repeat)
///
/// `repeat-x | repeat-y | [repeat | space | round | no-repeat]{1,2}`
///
/// If only one of the two-keyword form matches, the y axis defaults to the
/// x axis; the cursor is left at the mismatching component.
pub fn parse_background_repeat(src: &mut ValueSource) -> Option<BackgroundRepeat> {
    const STYLES: [(&str, RepeatStyle); 4] = [
        ("repeat", RepeatStyle::Repeat),
        ("space", RepeatStyle::Space),
        ("round", RepeatStyle::Round),
        ("no-repeat", RepeatStyle::NoRepeat),
    ];

    let saved = src.position();
    let Some(item) = src.expect(ItemType::Keyword) else {
        return None;
    };

    if src.keyword_is(item.index, "repeat-x") {
        return Some(BackgroundRepeat {
            x: RepeatStyle::Repeat,
            y: RepeatStyle::NoRepeat,
        });
    }
    if src.keyword_is(item.index, "repeat-y") {
        return Some(BackgroundRepeat {
            x: RepeatStyle::NoRepeat,
            y: RepeatStyle::Repeat,
        });
    }

    let Some(x) = src.map_keyword(item.index, &STYLES) else {
        src.reset(saved);
        return None;
    };

    let before_second = src.position();
    let y = match src.expect(ItemType::Keyword) {
        Some(second) => match src.map_keyword(second.index, &STYLES) {
            Some(y) => y,
            None => {
                src.reset(before_second);
                x
            }
        },
        None => x,
    };

    Some(BackgroundRepeat { x, y })
}

/// [§ 3.5 'background-attachment'](https://www.w3.org/TR/css-backgrounds-3/#background-attachment)
///
/// `scroll | fixed | local`
pub fn parse_background_attachment(src: &mut ValueSource) -> Option<BackgroundAttachment> {
    parse_keyword(
        src,
        &[
            ("scroll", BackgroundAttachment::Scroll),
            ("fixed", BackgroundAttachment::Fixed),
            ("local", BackgroundAttachment::Local),
        ],
    )
}

/// [§ 3.7/3.8 'background-origin' and 'background-clip'](https://www.w3.org/TR/css-backgrounds-3/#background-origin)
///
/// `border-box | padding-box | content-box`
pub fn parse_background_box(src: &mut ValueSource) -> Option<BackgroundBox> {
    parse_keyword(
        src,
        &[
            ("border-box", BackgroundBox::BorderBox),
            ("padding-box", BackgroundBox::PaddingBox),
            ("content-box", BackgroundBox::ContentBox),
        ],
    )
}

/// [§ 3.9 'background-position'](https://www.w3.org/TR/css-backgrounds-3/#background-position)
///
/// 1-4 tokens. The 3-or-4-value form (two axis-keyword pairs, each with an
/// optional offset) is tried first; on failure the cursor rewinds and the
/// 1-or-2-value form runs.
pub fn parse_background_position(src: &mut ValueSource) -> Option<BackgroundPosition> {
    if let Some(position) = parse_position_pairs(src) {
        return Some(position);
    }
    parse_position_short(src)
}

/// Which axis a position keyword names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionKeyword {
    X(BackgroundPositionSide),
    Y(BackgroundPositionSide),
    Center,
}

/// One parsed `keyword [offset]?` pair of the 3-or-4-value form.
#[derive(Debug, Clone, Copy)]
struct PositionPair {
    keyword: PositionKeyword,
    offset: LengthPercentage,
}

const POSITION_KEYWORDS: [(&str, PositionKeyword); 5] = [
    ("left", PositionKeyword::X(BackgroundPositionSide::Start)),
    ("right", PositionKeyword::X(BackgroundPositionSide::End)),
    ("top", PositionKeyword::Y(BackgroundPositionSide::Start)),
    ("bottom", PositionKeyword::Y(BackgroundPositionSide::End)),
    ("center", PositionKeyword::Center),
];

/// The 3-or-4-value form: two `keyword [offset]?` pairs.
fn parse_position_pairs(src: &mut ValueSource) -> Option<BackgroundPosition> {
    let saved = src.position();
    let Some(first) = parse_position_pair(src) else {
        src.reset(saved);
        return None;
    };
    let Some(second) = parse_position_pair(src) else {
        src.reset(saved);
        return None;
    };
    let Some(position) = assign_pair_axes(first, second) else {
        src.reset(saved);
        return None;
    };
    Some(position)
}

/// One `keyword [offset]?` pair.
///
/// `center` fixes its offset to 0%; an offset token following it is still
/// consumed, but contributes nothing.
fn parse_position_pair(src: &mut ValueSource) -> Option<PositionPair> {
    let saved = src.position();
    let item = src.expect(ItemType::Keyword)?;
    let Some(keyword) = src.map_keyword(item.index, &POSITION_KEYWORDS) else {
        src.reset(saved);
        return None;
    };
    let parsed_offset = parse_length_percentage(src);
    let offset = if keyword == PositionKeyword::Center {
        LengthPercentage::Percentage(0.0)
    } else {
        parsed_offset.unwrap_or(LengthPercentage::Percentage(0.0))
    };
    Some(PositionPair { keyword, offset })
}

/// Map two pairs onto the x and y axes. Two pairs naming the same axis are
/// a parse error.
fn assign_pair_axes(first: PositionPair, second: PositionPair) -> Option<BackgroundPosition> {
    let mut x: Option<BackgroundPositionAxis> = None;
    let mut y: Option<BackgroundPositionAxis> = None;
    let mut centers: Vec<PositionPair> = Vec::new();

    for pair in [first, second] {
        match pair.keyword {
            PositionKeyword::X(side) => {
                if x.is_some() {
                    return None;
                }
                x = Some(BackgroundPositionAxis {
                    side,
                    offset: pair.offset,
                });
            }
            PositionKeyword::Y(side) => {
                if y.is_some() {
                    return None;
                }
                y = Some(BackgroundPositionAxis {
                    side,
                    offset: pair.offset,
                });
            }
            PositionKeyword::Center => centers.push(pair),
        }
    }

    for pair in centers {
        let axis = BackgroundPositionAxis {
            side: BackgroundPositionSide::Center,
            offset: pair.offset,
        };
        if x.is_none() {
            x = Some(axis);
        } else if y.is_none() {
            y = Some(axis);
        } else {
            return None;
        }
    }

    Some(BackgroundPosition {
        x: x?,
        y: y?,
    })
}

/// A value of the 1-or-2-value form.
#[derive(Debug, Clone, Copy)]
enum PositionValue {
    Keyword(PositionKeyword),
    Offset(LengthPercentage),
}

/// The 1-or-2-value form. A missing axis defaults to `center 0%`.
fn parse_position_short(src: &mut ValueSource) -> Option<BackgroundPosition> {
    let saved = src.position();
    let Some(first) = parse_position_value(src) else {
        return None;
    };
    let second = parse_position_value(src);

    let mut x: Option<BackgroundPositionAxis> = None;
    let mut y: Option<BackgroundPositionAxis> = None;
    let mut centers = 0_u32;

    let values: [(usize, Option<PositionValue>); 2] = [(0, Some(first)), (1, second)];
    for (index, value) in values {
        let Some(value) = value else { continue };
        let filled = match value {
            PositionValue::Keyword(PositionKeyword::X(side)) => {
                fill_axis(&mut x, side, LengthPercentage::Percentage(0.0))
            }
            PositionValue::Keyword(PositionKeyword::Y(side)) => {
                fill_axis(&mut y, side, LengthPercentage::Percentage(0.0))
            }
            PositionValue::Keyword(PositionKeyword::Center) => {
                centers += 1;
                true
            }
            // A bare offset is positional: first value is x, second is y.
            PositionValue::Offset(offset) => {
                if index == 0 {
                    fill_axis(&mut x, BackgroundPositionSide::Start, offset)
                } else {
                    fill_axis(&mut y, BackgroundPositionSide::Start, offset)
                }
            }
        };
        if !filled {
            // Two values on the same axis.
            src.reset(saved);
            return None;
        }
    }

    // Deferred centers fill whichever axis is still open.
    for _ in 0..centers {
        let axis = BackgroundPositionAxis {
            side: BackgroundPositionSide::Center,
            offset: LengthPercentage::Percentage(0.0),
        };
        if x.is_none() {
            x = Some(axis);
        } else if y.is_none() {
            y = Some(axis);
        } else {
            src.reset(saved);
            return None;
        }
    }

    let center = BackgroundPositionAxis {
        side: BackgroundPositionSide::Center,
        offset: LengthPercentage::Percentage(0.0),
    };
    Some(BackgroundPosition {
        x: x.unwrap_or(center),
        y: y.unwrap_or(center),
    })
}

fn fill_axis(
    slot: &mut Option<BackgroundPositionAxis>,
    side: BackgroundPositionSide,
    offset: LengthPercentage,
) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(BackgroundPositionAxis { side, offset });
    true
}

/// One keyword-or-offset value of the 1-or-2-value form.
fn parse_position_value(src: &mut ValueSource) -> Option<PositionValue> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if let Some(keyword) = src.map_keyword(item.index, &POSITION_KEYWORDS) {
            return Some(PositionValue::Keyword(keyword));
        }
        src.reset(saved);
        return None;
    }
    parse_length_percentage(src).map(PositionValue::Offset)
}

/// [§ 3.10 'background-size'](https://www.w3.org/TR/css-backgrounds-3/#background-size)
///
/// `cover | contain | [<length-percentage> | auto]{1,2}`
///
/// A single value sets the width; the height defaults to `auto`.
pub fn parse_background_size(src: &mut ValueSource) -> Option<BackgroundSize> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if let Some(size) = src.map_keyword(
            item.index,
            &[
                ("cover", BackgroundSize::Cover),
                ("contain", BackgroundSize::Contain),
            ],
        ) {
            return Some(size);
        }
        src.reset(saved);
        // "auto" falls through to the two-value form.
    }

    let Some(width) = parse_background_size_value(src) else {
        src.reset(saved);
        return None;
    };
    let height = parse_background_size_value(src).unwrap_or(BackgroundSizeValue::Auto);
    Some(BackgroundSize::Size { width, height })
}

fn parse_background_size_value(src: &mut ValueSource) -> Option<BackgroundSizeValue> {
    let saved = src.position();
    if let Some(item) = src.expect(ItemType::Keyword) {
        if src.keyword_is(item.index, "auto") {
            return Some(BackgroundSizeValue::Auto);
        }
        src.reset(saved);
        return None;
    }
    parse_length_percentage(src).map(BackgroundSizeValue::LengthPercentage)
}

/// Match a single keyword against a table, resetting the cursor on any
/// mismatch. Table names must be lowercase.
fn parse_keyword<T: Copy>(src: &mut ValueSource, table: &[(&str, T)]) -> Option<T> {
    let saved = src.position();
    let item = src.expect(ItemType::Keyword)?;
    let value = src.map_keyword(item.index, table);
    if value.is_none() {
        src.reset(saved);
    }
    value
}
