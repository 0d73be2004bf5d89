//! CSS value types and property value parsing
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)
//! - [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)

mod background;
mod box_style;
mod color;
mod length;
/// Property value parsers over component ranges.
pub mod parse;
/// The backtracking cursor property parsers read through.
pub mod source;

use serde::Serialize;

pub use background::{
    BackgroundAttachment, BackgroundBox, BackgroundImage, BackgroundPosition,
    BackgroundPositionAxis, BackgroundPositionSide, BackgroundRepeat, BackgroundSize,
    BackgroundSizeValue, RepeatStyle,
};
pub use box_style::{Display, Position, ZIndex};
pub use color::{Color, Rgba};
pub use length::{BorderWidth, LengthPercentage, LengthPercentageAuto, MaxSize};
pub use parse::{
    parse_background_attachment, parse_background_box, parse_background_image,
    parse_background_position, parse_background_repeat, parse_background_size,
    parse_border_width, parse_color, parse_css_wide_keyword, parse_display,
    parse_length_percentage, parse_length_percentage_auto, parse_max_size, parse_position,
    parse_z_index,
};
pub use source::{Item, ItemType, ValueSource};

/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
///
/// "CSS-wide keywords... usable in all properties."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CssWideKeyword {
    /// "initial: the property's initial value"
    Initial,
    /// "inherit: the computed value of the property on the element's parent"
    Inherit,
    /// "unset: acts as either inherit or initial, depending on whether the
    /// property is inherited or not"
    Unset,
}
