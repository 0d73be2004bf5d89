//! Fixed-point subpixel geometry used throughout layout.
//!
//! [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
//!
//! "1px = 1/96th of 1in"
//!
//! All internal geometry is expressed in integer subpixel units
//! ([`UNITS_PER_PIXEL`] units to the CSS pixel). Integer arithmetic keeps
//! layout deterministic and comparison exact; conversion to and from pixels
//! happens only at the engine boundary.

use serde::Serialize;

/// A distance in subpixel layout units.
///
/// One CSS pixel is [`UNITS_PER_PIXEL`] units. Negative values are legal
/// (negative margins, offsets above the containing block edge).
pub type Unit = i32;

/// Number of layout units per CSS pixel.
///
/// Quarter-pixel resolution: fine enough for font advances, coarse enough
/// that a `u16` block count times a viewport width never overflows `i32`.
pub const UNITS_PER_PIXEL: Unit = 4;

/// Convert CSS pixels to layout units, rounding to the nearest unit.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn units(px: f32) -> Unit {
    (px * UNITS_PER_PIXEL as f32).round() as Unit
}

/// Convert layout units to CSS pixels.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pixels(u: Unit) -> f32 {
    u as f32 / UNITS_PER_PIXEL as f32
}

/// A point in 2D space, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Vector {
    /// Horizontal component.
    pub x: Unit,
    /// Vertical component.
    pub y: Unit,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: Unit, y: Unit) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// A 2D extent, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Size {
    /// Horizontal extent.
    pub w: Unit,
    /// Vertical extent.
    pub h: Unit,
}

impl Size {
    /// The zero size.
    pub const ZERO: Self = Self { w: 0, h: 0 };

    /// Create a new size.
    #[must_use]
    pub const fn new(w: Unit, h: Unit) -> Self {
        Self { w, h }
    }
}

/// A rectangle positioned in 2D space, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: Unit,
    /// Vertical position of the top-left corner.
    pub y: Unit,
    /// Width of the rectangle.
    pub w: Unit,
    /// Height of the rectangle.
    pub h: Unit,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: Unit, y: Unit, w: Unit, h: Unit) -> Self {
        Self { x, y, w, h }
    }

    /// The rectangle's top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vector {
        Vector {
            x: self.x,
            y: self.y,
        }
    }

    /// The rectangle's extent.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            w: self.w,
            h: self.h,
        }
    }

    /// The same rectangle shifted by `offset`.
    #[must_use]
    pub const fn translate(&self, offset: Vector) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            w: self.w,
            h: self.h,
        }
    }
}
