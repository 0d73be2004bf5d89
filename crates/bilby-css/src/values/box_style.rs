//! Display, positioning, and stack-level value types.

use serde::Serialize;

/// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// "The display property defines an element's display type, which consists
/// of the two basic qualities of how an element generates boxes."
///
/// The engine's flow layout distinguishes exactly these display types; text
/// runs are generated for text elements without a display value of their
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Display {
    /// "The element generates a block-level box."
    Block,
    /// "The element generates an inline-level box." — the initial value.
    #[default]
    Inline,
    /// "The element generates an inline-level box that establishes a new
    /// block formatting context" (`inline flow-root`).
    InlineBlock,
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    /// "The element and its descendants generate no boxes or text runs."
    None,
}

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the 'top',
    /// 'right', 'bottom', and 'left' properties."
    Absolute,
}

/// [§ 9.9.1 Specifying the stack level: the 'z-index' property](https://www.w3.org/TR/CSS2/visuren.html#z-index)
///
/// "For a positioned box, the 'z-index' property specifies:
///
/// 1. The stack level of the box in the current stacking context.
/// 2. Whether the box establishes a stacking context."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ZIndex {
    /// "The stack level of the generated box in the current stacking
    /// context is 0."
    #[default]
    Auto,
    /// "This integer is the stack level of the generated box in the current
    /// stacking context."
    Integer(i32),
}
