//! Color value types.
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use serde::Serialize;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
///
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rgba {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, the initial background color.
    ///
    /// [§ 3.1 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    /// "Initial: transparent"
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque black, the conventional initial text color.
    ///
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    /// "Initial: CanvasText" — rendered as black here.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// "The syntax of a <hex-color> is a <hash-token> token whose value
    /// consists of 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            // [§ 4.2.1]
            // "The three-digit RGB notation (#RGB) is converted into
            // six-digit form (#RRGGBB) by replicating digits, not by adding
            // zeros."
            3 | 4 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
                let r = digit(0)?;
                let g = digit(1)?;
                let b = digit(2)?;
                let a = if hex.len() == 4 { digit(3)? } else { 255 };
                Some(Self { r, g, b, a })
            }
            6 | 8 => {
                let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                let r = pair(0)?;
                let g = pair(2)?;
                let b = pair(4)?;
                let a = if hex.len() == 8 { pair(6)? } else { 255 };
                Some(Self { r, g, b, a })
            }
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// "CSS defines a large set of named colors..."
    ///
    /// The basic color keywords plus `transparent`.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "black" => Some(Self::rgb(0, 0, 0)),
            "white" => Some(Self::rgb(255, 255, 255)),
            "red" => Some(Self::rgb(255, 0, 0)),
            "green" => Some(Self::rgb(0, 128, 0)),
            "blue" => Some(Self::rgb(0, 0, 255)),
            "yellow" => Some(Self::rgb(255, 255, 0)),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            "aqua" | "cyan" => Some(Self::rgb(0, 255, 255)),
            "fuchsia" | "magenta" => Some(Self::rgb(255, 0, 255)),
            "lime" => Some(Self::rgb(0, 255, 0)),
            "maroon" => Some(Self::rgb(128, 0, 0)),
            "navy" => Some(Self::rgb(0, 0, 128)),
            "olive" => Some(Self::rgb(128, 128, 0)),
            "purple" => Some(Self::rgb(128, 0, 128)),
            "silver" => Some(Self::rgb(192, 192, 192)),
            "teal" => Some(Self::rgb(0, 128, 128)),
            "orange" => Some(Self::rgb(255, 165, 0)),
            _ => None,
        }
    }
}

/// A declared color value.
///
/// [§ 3.1 'currentColor'](https://www.w3.org/TR/css-color-4/#currentcolor-color)
///
/// "The currentColor keyword represents the value of the color property.
/// Its computed and used value... is the computed/used value of color."
///
/// `currentColor` stays symbolic until the cosmetic pass, where it resolves
/// against the element's computed `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    /// A concrete sRGB color.
    Rgba(Rgba),
    /// The value of the `color` property at resolution time.
    CurrentColor,
}

impl Color {
    /// Resolve against the current `color` value.
    #[must_use]
    pub const fn resolve(self, current: Rgba) -> Rgba {
        match self {
            Self::Rgba(c) => c,
            Self::CurrentColor => current,
        }
    }
}
