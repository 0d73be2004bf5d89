//! Declared values and declaration-block parsing.
//!
//! [§ 4.1 Declared Values](https://www.w3.org/TR/css-cascade-4/#declared)
//!
//! "Each property declaration applied to an element contributes a declared
//! value for that property associated with the element."
//!
//! A declaration block (`{ ... }`) parses into one [`Declarations`] record
//! per importance level: each supported property either carries a typed
//! value or one of the CSS-wide keywords. Unknown properties and invalid
//! values contribute nothing, as if the declaration were absent.

use bilby_common::warning::warn_once;
use serde::Serialize;

use crate::parser::{ComponentIndex, ComponentTag, ComponentTree};
use crate::tokenizer::copy_ident;
use crate::values::{
    BackgroundAttachment, BackgroundBox, BackgroundImage, BackgroundPosition, BackgroundRepeat,
    BackgroundSize, BorderWidth, Color, CssWideKeyword, Display, LengthPercentage,
    LengthPercentageAuto, MaxSize, Position, ValueSource, ZIndex, parse_background_attachment,
    parse_background_box, parse_background_image, parse_background_position,
    parse_background_repeat, parse_background_size, parse_border_width, parse_color,
    parse_css_wide_keyword, parse_display, parse_length_percentage, parse_length_percentage_auto,
    parse_max_size, parse_position, parse_z_index,
};

/// [§ 4.1 Declared Values](https://www.w3.org/TR/css-cascade-4/#declared) /
/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
///
/// A declared value: either a parsed property value or a CSS-wide keyword
/// deferring to the defaulting rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Declared<T> {
    /// A parsed, property-specific value.
    Value(T),
    /// "initial: the property's initial value"
    Initial,
    /// "inherit: the computed value of the property on the parent"
    Inherit,
    /// "unset: inherit if the property is inherited, initial otherwise"
    Unset,
}

impl<T> From<CssWideKeyword> for Declared<T> {
    fn from(keyword: CssWideKeyword) -> Self {
        match keyword {
            CssWideKeyword::Initial => Self::Initial,
            CssWideKeyword::Inherit => Self::Inherit,
            CssWideKeyword::Unset => Self::Unset,
        }
    }
}

/// The declared values of every supported property, each optional.
///
/// [§ 6.1 Cascaded Values](https://www.w3.org/TR/css-cascade-4/#cascaded)
///
/// "The cascaded value represents the result of the cascade: it is the
/// declared value that wins the cascade."
///
/// The first half of the record is consumed by the box-generation layout
/// stage, the second half by the cosmetic stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Declarations {
    // Box-generation stage ------------------------------------------------
    /// `display`
    pub display: Option<Declared<Display>>,
    /// `position`
    pub position: Option<Declared<Position>>,
    /// `z-index`
    pub z_index: Option<Declared<ZIndex>>,
    /// `width`
    pub width: Option<Declared<LengthPercentageAuto>>,
    /// `min-width`
    pub min_width: Option<Declared<LengthPercentage>>,
    /// `max-width`
    pub max_width: Option<Declared<MaxSize>>,
    /// `height`
    pub height: Option<Declared<LengthPercentageAuto>>,
    /// `min-height`
    pub min_height: Option<Declared<LengthPercentage>>,
    /// `max-height`
    pub max_height: Option<Declared<MaxSize>>,
    /// `margin-top`
    pub margin_top: Option<Declared<LengthPercentageAuto>>,
    /// `margin-right`
    pub margin_right: Option<Declared<LengthPercentageAuto>>,
    /// `margin-bottom`
    pub margin_bottom: Option<Declared<LengthPercentageAuto>>,
    /// `margin-left`
    pub margin_left: Option<Declared<LengthPercentageAuto>>,
    /// `border-top-width`
    pub border_top_width: Option<Declared<BorderWidth>>,
    /// `border-right-width`
    pub border_right_width: Option<Declared<BorderWidth>>,
    /// `border-bottom-width`
    pub border_bottom_width: Option<Declared<BorderWidth>>,
    /// `border-left-width`
    pub border_left_width: Option<Declared<BorderWidth>>,
    /// `padding-top`
    pub padding_top: Option<Declared<LengthPercentage>>,
    /// `padding-right`
    pub padding_right: Option<Declared<LengthPercentage>>,
    /// `padding-bottom`
    pub padding_bottom: Option<Declared<LengthPercentage>>,
    /// `padding-left`
    pub padding_left: Option<Declared<LengthPercentage>>,
    /// `top`
    pub inset_top: Option<Declared<LengthPercentageAuto>>,
    /// `right`
    pub inset_right: Option<Declared<LengthPercentageAuto>>,
    /// `bottom`
    pub inset_bottom: Option<Declared<LengthPercentageAuto>>,
    /// `left`
    pub inset_left: Option<Declared<LengthPercentageAuto>>,

    // Cosmetic stage ------------------------------------------------------
    /// `color`
    pub color: Option<Declared<Color>>,
    /// `background-color`
    pub background_color: Option<Declared<Color>>,
    /// `background-image`
    pub background_image: Option<Declared<BackgroundImage>>,
    /// `background-repeat`
    pub background_repeat: Option<Declared<BackgroundRepeat>>,
    /// `background-position`
    pub background_position: Option<Declared<BackgroundPosition>>,
    /// `background-size`
    pub background_size: Option<Declared<BackgroundSize>>,
    /// `background-clip`
    pub background_clip: Option<Declared<BackgroundBox>>,
    /// `background-origin`
    pub background_origin: Option<Declared<BackgroundBox>>,
    /// `background-attachment`
    pub background_attachment: Option<Declared<BackgroundAttachment>>,
    /// `border-top-color`
    pub border_top_color: Option<Declared<Color>>,
    /// `border-right-color`
    pub border_right_color: Option<Declared<Color>>,
    /// `border-bottom-color`
    pub border_bottom_color: Option<Declared<Color>>,
    /// `border-left-color`
    pub border_left_color: Option<Declared<Color>>,
}

impl Declarations {
    /// Fill every unset field from `other`.
    ///
    /// [§ 6.1 Cascaded Values](https://www.w3.org/TR/css-cascade-4/#cascaded)
    ///
    /// The cascade applies declaration sets from highest to lowest
    /// precedence; a later (lower-precedence) set only contributes where
    /// nothing has won yet.
    pub fn fill_from(&mut self, other: &Self) {
        fn fill<T: Clone>(slot: &mut Option<Declared<T>>, value: &Option<Declared<T>>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }

        fill(&mut self.display, &other.display);
        fill(&mut self.position, &other.position);
        fill(&mut self.z_index, &other.z_index);
        fill(&mut self.width, &other.width);
        fill(&mut self.min_width, &other.min_width);
        fill(&mut self.max_width, &other.max_width);
        fill(&mut self.height, &other.height);
        fill(&mut self.min_height, &other.min_height);
        fill(&mut self.max_height, &other.max_height);
        fill(&mut self.margin_top, &other.margin_top);
        fill(&mut self.margin_right, &other.margin_right);
        fill(&mut self.margin_bottom, &other.margin_bottom);
        fill(&mut self.margin_left, &other.margin_left);
        fill(&mut self.border_top_width, &other.border_top_width);
        fill(&mut self.border_right_width, &other.border_right_width);
        fill(&mut self.border_bottom_width, &other.border_bottom_width);
        fill(&mut self.border_left_width, &other.border_left_width);
        fill(&mut self.padding_top, &other.padding_top);
        fill(&mut self.padding_right, &other.padding_right);
        fill(&mut self.padding_bottom, &other.padding_bottom);
        fill(&mut self.padding_left, &other.padding_left);
        fill(&mut self.inset_top, &other.inset_top);
        fill(&mut self.inset_right, &other.inset_right);
        fill(&mut self.inset_bottom, &other.inset_bottom);
        fill(&mut self.inset_left, &other.inset_left);
        fill(&mut self.color, &other.color);
        fill(&mut self.background_color, &other.background_color);
        fill(&mut self.background_image, &other.background_image);
        fill(&mut self.background_repeat, &other.background_repeat);
        fill(&mut self.background_position, &other.background_position);
        fill(&mut self.background_size, &other.background_size);
        fill(&mut self.background_clip, &other.background_clip);
        fill(&mut self.background_origin, &other.background_origin);
        fill(&mut self.background_attachment, &other.background_attachment);
        fill(&mut self.border_top_color, &other.border_top_color);
        fill(&mut self.border_right_color, &other.border_right_color);
        fill(&mut self.border_bottom_color, &other.border_bottom_color);
        fill(&mut self.border_left_color, &other.border_left_color);
    }
}

/// The declared values of one declaration block, split by importance.
///
/// [§ 6.4.2 Important Declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// "An important declaration takes precedence over a normal declaration."
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CascadedValues {
    /// Declarations without `!important`.
    pub normal: Declarations,
    /// Declarations with `!important`.
    pub important: Declarations,
}

impl CascadedValues {
    /// Fill both importance levels from `other` where unset.
    pub fn fill_from(&mut self, other: &Self) {
        self.normal.fill_from(&other.normal);
        self.important.fill_from(&other.important);
    }
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
///
/// Parse the contents of a `{}` block into cascaded values. Later
/// declarations of the same property override earlier ones within the
/// block; invalid declarations are dropped silently.
#[must_use]
pub fn parse_declaration_block(tree: &ComponentTree, block: ComponentIndex) -> CascadedValues {
    let mut result = CascadedValues::default();
    let end = tree.next_sibling(block);
    let mut index = block + 1;

    while index < end {
        match tree.tag(index) {
            // "<whitespace-token>" / "<semicolon-token>" — "Do nothing."
            ComponentTag::TokenWhitespace
            | ComponentTag::TokenComment
            | ComponentTag::TokenSemicolon => {
                index = tree.next_sibling(index);
            }

            // "<ident-token>" — "Consume a declaration."
            ComponentTag::TokenIdent => {
                index = parse_declaration(tree, index, end, &mut result);
            }

            // "anything else" — "This is a parse error... consume a
            // component value and throw away the returned value" until the
            // next semicolon.
            _ => {
                index = skip_to_semicolon(tree, index, end);
            }
        }
    }

    result
}

/// Skip components until one past the next top-level semicolon (or `end`).
fn skip_to_semicolon(
    tree: &ComponentTree,
    mut index: ComponentIndex,
    end: ComponentIndex,
) -> ComponentIndex {
    while index < end {
        let tag = tree.tag(index);
        index = tree.next_sibling(index);
        if tag == ComponentTag::TokenSemicolon {
            break;
        }
    }
    index
}

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// `name` sits at `name_index`; returns the index one past the declaration.
fn parse_declaration(
    tree: &ComponentTree,
    name_index: ComponentIndex,
    end: ComponentIndex,
    out: &mut CascadedValues,
) -> ComponentIndex {
    // "While the next input token is a <whitespace-token>, consume it."
    let mut index = tree.next_sibling(name_index);
    while index < end
        && matches!(
            tree.tag(index),
            ComponentTag::TokenWhitespace | ComponentTag::TokenComment
        )
    {
        index = tree.next_sibling(index);
    }

    // "If the next input token is anything other than a <colon-token>, this
    // is a parse error."
    if index >= end || tree.tag(index) != ComponentTag::TokenColon {
        return skip_to_semicolon(tree, index, end);
    }
    let value_start = tree.next_sibling(index);

    // The value runs to the next top-level semicolon.
    let mut value_end = value_start;
    while value_end < end && tree.tag(value_end) != ComponentTag::TokenSemicolon {
        value_end = tree.next_sibling(value_end);
    }
    let after = if value_end < end {
        tree.next_sibling(value_end)
    } else {
        value_end
    };

    // [§ 6.4.2 Important Declarations](https://www.w3.org/TR/css-cascade-4/#importance)
    // "if the last two (non-whitespace, non-comment) tokens in its value are
    // a <delim-token> with the value '!' followed by an <ident-token> with a
    // value that is an ASCII case-insensitive match for 'important'."
    let (value_end, important) = strip_important(tree, value_start, value_end);

    let name = copy_ident(tree.source(), tree.location(name_index)).to_ascii_lowercase();
    let declarations = if important {
        &mut out.important
    } else {
        &mut out.normal
    };
    apply_declaration(declarations, &name, tree, value_start, value_end);

    after
}

/// Detect and strip a trailing `!important`, returning the new value end
/// and whether the annotation was present.
fn strip_important(
    tree: &ComponentTree,
    start: ComponentIndex,
    end: ComponentIndex,
) -> (ComponentIndex, bool) {
    // Walk the value once, remembering the last two significant components.
    let mut last: Option<ComponentIndex> = None;
    let mut second_last: Option<ComponentIndex> = None;
    let mut index = start;
    while index < end {
        if !matches!(
            tree.tag(index),
            ComponentTag::TokenWhitespace | ComponentTag::TokenComment
        ) {
            second_last = last;
            last = Some(index);
        }
        index = tree.next_sibling(index);
    }

    let (Some(bang), Some(word)) = (second_last, last) else {
        return (end, false);
    };
    let is_important = tree.tag(bang) == ComponentTag::TokenDelim
        && tree.extra(bang).codepoint() == Some('!')
        && tree.tag(word) == ComponentTag::TokenIdent
        && crate::tokenizer::ident_eq_ignore_case(tree.source(), tree.location(word), "important");

    if is_important {
        (bang, true)
    } else {
        (end, false)
    }
}

/// Dispatch one declaration by property name, parsing its value and storing
/// the declared value. Unknown properties warn once and contribute nothing.
fn apply_declaration(
    out: &mut Declarations,
    name: &str,
    tree: &ComponentTree,
    start: ComponentIndex,
    end: ComponentIndex,
) {
    /// Parse one property value: CSS-wide keywords first, then the
    /// property's own grammar; trailing junk invalidates the declaration.
    fn set<T>(
        slot: &mut Option<Declared<T>>,
        tree: &ComponentTree,
        start: ComponentIndex,
        end: ComponentIndex,
        parse: impl Fn(&mut ValueSource) -> Option<T>,
    ) {
        let mut src = ValueSource::new(tree, start, end);
        if let Some(keyword) = parse_css_wide_keyword(&mut src) {
            *slot = Some(keyword.into());
            return;
        }
        if let Some(value) = parse(&mut src) {
            if src.is_exhausted() {
                *slot = Some(Declared::Value(value));
            }
        }
    }

    match name {
        "display" => set(&mut out.display, tree, start, end, parse_display),
        "position" => set(&mut out.position, tree, start, end, parse_position),
        "z-index" => set(&mut out.z_index, tree, start, end, parse_z_index),
        "width" => set(&mut out.width, tree, start, end, parse_length_percentage_auto),
        "min-width" => set(&mut out.min_width, tree, start, end, parse_length_percentage),
        "max-width" => set(&mut out.max_width, tree, start, end, parse_max_size),
        "height" => set(&mut out.height, tree, start, end, parse_length_percentage_auto),
        "min-height" => set(&mut out.min_height, tree, start, end, parse_length_percentage),
        "max-height" => set(&mut out.max_height, tree, start, end, parse_max_size),
        "margin-top" => set(&mut out.margin_top, tree, start, end, parse_length_percentage_auto),
        "margin-right" => set(
            &mut out.margin_right,
            tree,
            start,
            end,
            parse_length_percentage_auto,
        ),
        "margin-bottom" => set(
            &mut out.margin_bottom,
            tree,
            start,
            end,
            parse_length_percentage_auto,
        ),
        "margin-left" => set(
            &mut out.margin_left,
            tree,
            start,
            end,
            parse_length_percentage_auto,
        ),
        "border-top-width" => set(&mut out.border_top_width, tree, start, end, parse_border_width),
        "border-right-width" => set(
            &mut out.border_right_width,
            tree,
            start,
            end,
            parse_border_width,
        ),
        "border-bottom-width" => set(
            &mut out.border_bottom_width,
            tree,
            start,
            end,
            parse_border_width,
        ),
        "border-left-width" => set(
            &mut out.border_left_width,
            tree,
            start,
            end,
            parse_border_width,
        ),
        "padding-top" => set(&mut out.padding_top, tree, start, end, parse_length_percentage),
        "padding-right" => set(&mut out.padding_right, tree, start, end, parse_length_percentage),
        "padding-bottom" => set(
            &mut out.padding_bottom,
            tree,
            start,
            end,
            parse_length_percentage,
        ),
        "padding-left" => set(&mut out.padding_left, tree, start, end, parse_length_percentage),
        "top" => set(&mut out.inset_top, tree, start, end, parse_length_percentage_auto),
        "right" => set(&mut out.inset_right, tree, start, end, parse_length_percentage_auto),
        "bottom" => set(&mut out.inset_bottom, tree, start, end, parse_length_percentage_auto),
        "left" => set(&mut out.inset_left, tree, start, end, parse_length_percentage_auto),
        "color" => set(&mut out.color, tree, start, end, parse_color),
        "background-color" => set(&mut out.background_color, tree, start, end, parse_color),
        "background-image" => set(
            &mut out.background_image,
            tree,
            start,
            end,
            parse_background_image,
        ),
        "background-repeat" => set(
            &mut out.background_repeat,
            tree,
            start,
            end,
            parse_background_repeat,
        ),
        "background-position" => set(
            &mut out.background_position,
            tree,
            start,
            end,
            parse_background_position,
        ),
        "background-size" => set(
            &mut out.background_size,
            tree,
            start,
            end,
            parse_background_size,
        ),
        "background-clip" => set(
            &mut out.background_clip,
            tree,
            start,
            end,
            parse_background_box,
        ),
        "background-origin" => set(
            &mut out.background_origin,
            tree,
            start,
            end,
            parse_background_box,
        ),
        "background-attachment" => set(
            &mut out.background_attachment,
            tree,
            start,
            end,
            parse_background_attachment,
        ),
        "border-top-color" => set(&mut out.border_top_color, tree, start, end, parse_color),
        "border-right-color" => set(&mut out.border_right_color, tree, start, end, parse_color),
        "border-bottom-color" => set(&mut out.border_bottom_color, tree, start, end, parse_color),
        "border-left-color" => set(&mut out.border_left_color, tree, start, end, parse_color),
        _ => warn_once("CSS", &format!("unsupported property '{name}'")),
    }
}
