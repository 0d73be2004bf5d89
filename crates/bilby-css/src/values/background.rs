//! Background value types.
//!
//! [CSS Backgrounds and Borders Module Level 3](https://www.w3.org/TR/css-backgrounds-3/)

use serde::Serialize;

use super::length::LengthPercentage;

/// [§ 3.6 'background-image'](https://www.w3.org/TR/css-backgrounds-3/#background-image)
///
/// "Value: <bg-image># ; <bg-image> = <image> | none"
///
/// Gradients are not parsed; a gradient function fails the grammar and the
/// declaration is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BackgroundImage {
    /// "none: A value of none counts as an image layer but draws nothing."
    None,
    /// A `url(...)` reference, decoded to its text. Resolution against the
    /// host's image table happens in the cosmetic pass.
    Url(String),
}

/// [§ 3.4 'background-repeat'](https://www.w3.org/TR/css-backgrounds-3/#background-repeat)
///
/// "Values have the following meanings:
///
/// repeat: The image is repeated in this direction as often as needed...
/// space: The image is repeated as often as will fit... the first and last
///   images are pinned to either side
/// round: The image is repeated as often as will fit... rescaled
/// no-repeat: The image is placed once and not repeated"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RepeatStyle {
    /// "repeat" — the initial value.
    #[default]
    Repeat,
    /// "space"
    Space,
    /// "round"
    Round,
    /// "no-repeat"
    NoRepeat,
}

/// The two-axis repeat value.
///
/// "If a single keyword is given, the second keyword defaults to the first"
/// (except `repeat-x`/`repeat-y`, which expand to mixed pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BackgroundRepeat {
    /// Repeat style along the horizontal axis.
    pub x: RepeatStyle,
    /// Repeat style along the vertical axis.
    pub y: RepeatStyle,
}

/// [§ 3.5 'background-attachment'](https://www.w3.org/TR/css-backgrounds-3/#background-attachment)
///
/// "Value: <attachment># ; <attachment> = scroll | fixed | local"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BackgroundAttachment {
    /// "The image is fixed with regard to the element itself." — initial.
    #[default]
    Scroll,
    /// "The image is fixed with regard to the viewport."
    Fixed,
    /// "The image is fixed with regard to the element's contents."
    Local,
}

/// [§ 3.7 'background-origin'](https://www.w3.org/TR/css-backgrounds-3/#background-origin) and
/// [§ 3.8 'background-clip'](https://www.w3.org/TR/css-backgrounds-3/#background-clip)
///
/// "Value: <box># ; <box> = border-box | padding-box | content-box"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackgroundBox {
    /// "The border box."
    BorderBox,
    /// "The padding box."
    PaddingBox,
    /// "The content box."
    ContentBox,
}

/// One axis of a background position.
///
/// [§ 3.9 'background-position'](https://www.w3.org/TR/css-backgrounds-3/#background-position)
///
/// The side the offset measures from, plus the offset itself. `center`
/// carries an implicit zero offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundPositionAxis {
    /// Which edge the offset is measured from.
    pub side: BackgroundPositionSide,
    /// Offset from that edge.
    pub offset: LengthPercentage,
}

/// The reference side of a background position axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackgroundPositionSide {
    /// `left` on the x axis, `top` on the y axis.
    Start,
    /// `right` on the x axis, `bottom` on the y axis.
    End,
    /// "center": centered within the positioning area.
    Center,
}

/// [§ 3.9 'background-position'](https://www.w3.org/TR/css-backgrounds-3/#background-position)
///
/// "If only one value is specified, the second value is assumed to be
/// center."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundPosition {
    /// Horizontal placement.
    pub x: BackgroundPositionAxis,
    /// Vertical placement.
    pub y: BackgroundPositionAxis,
}

impl Default for BackgroundPosition {
    /// "Initial: 0% 0%"
    fn default() -> Self {
        Self {
            x: BackgroundPositionAxis {
                side: BackgroundPositionSide::Start,
                offset: LengthPercentage::Percentage(0.0),
            },
            y: BackgroundPositionAxis {
                side: BackgroundPositionSide::Start,
                offset: LengthPercentage::Percentage(0.0),
            },
        }
    }
}

/// One axis of `background-size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BackgroundSizeValue {
    /// "An auto value for one dimension is resolved by using the image's
    /// intrinsic ratio."
    Auto,
    /// An explicit extent.
    LengthPercentage(LengthPercentage),
}

/// [§ 3.10 'background-size'](https://www.w3.org/TR/css-backgrounds-3/#background-size)
///
/// "Value: <bg-size># ; <bg-size> = [<length-percentage> | auto]{1,2} |
/// cover | contain"
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BackgroundSize {
    /// "Scale the image... to the smallest size such that both its width
    /// and its height can completely cover the background positioning area."
    Cover,
    /// "Scale the image... to the largest size such that both its width and
    /// its height can fit inside the background positioning area."
    Contain,
    /// Explicit per-axis sizing.
    Size {
        /// Horizontal extent.
        width: BackgroundSizeValue,
        /// Vertical extent.
        height: BackgroundSizeValue,
    },
}

impl Default for BackgroundSize {
    /// "Initial: auto"
    fn default() -> Self {
        Self::Size {
            width: BackgroundSizeValue::Auto,
            height: BackgroundSizeValue::Auto,
        }
    }
}
