//! Length, percentage, and sizing value types.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

/// [§ 5 <length-percentage>](https://www.w3.org/TR/css-values-4/#typedef-length-percentage)
///
/// "Where <length-percentage> is used, it represents a value that can be
/// either a <length> or a <percentage>."
///
/// Lengths are pixel-valued at declaration time (`px` is the one supported
/// unit); percentages stay symbolic until layout provides the reference box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentage {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 5.1.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// "Percentage values are always relative to another quantity."
    /// Stored as the raw value (50.0 for `50%`).
    Percentage(f32),
}

impl LengthPercentage {
    /// The zero length.
    pub const ZERO: Self = Self::Px(0.0);
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// `<length-percentage> | auto`, the grammar of widths, heights, margins,
/// and box offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentageAuto {
    /// An absolute pixel length.
    Px(f32),
    /// A percentage of the reference box.
    Percentage(f32),
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// "If both 'margin-left' and 'margin-right' are 'auto', their used
    /// values are equal." — resolved during layout.
    Auto,
}

impl LengthPercentageAuto {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// "Value: <length> | <percentage> | none" — the grammar of `max-width` and
/// `max-height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MaxSize {
    /// "No limit on the width of the box."
    None,
    /// A concrete limit.
    LengthPercentage(LengthPercentage),
}

/// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#the-border-width)
///
/// "Value: <line-width> = <length> | thin | medium | thick"
///
/// "The lengths corresponding to thin, medium and thick are not specified,
/// but ... thin ≤ medium ≤ thick."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BorderWidth {
    /// An explicit length, in pixels.
    Px(f32),
    /// "thin"
    Thin,
    /// "medium" — the initial value.
    Medium,
    /// "thick"
    Thick,
}

impl BorderWidth {
    /// Resolve the keyword widths to pixels (1/3/5, the common UA choice).
    #[must_use]
    pub const fn to_px(self) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Thin => 1.0,
            Self::Medium => 3.0,
            Self::Thick => 5.0,
        }
    }
}
