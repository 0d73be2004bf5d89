//! Image data types shared between the host and the layout engine.
//!
//! [§ 3.2 The 'background-image' property](https://www.w3.org/TR/css-backgrounds-3/#background-image)

/// Decoded image data for a loaded image resource.
///
/// The host decodes images before layout runs; the engine only reads the
/// intrinsic dimensions. Pixel data is carried through untouched for the
/// renderer.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Intrinsic width of the image in pixels.
    width: u32,
    /// Intrinsic height of the image in pixels.
    height: u32,
    /// Raw RGBA pixel data (`width * height * 4` bytes), if decoded.
    rgba_data: Option<Vec<u8>>,
}

impl ImageData {
    /// Create a new `ImageData` from decoded RGBA pixel data.
    #[must_use]
    pub const fn new(width: u32, height: u32, rgba_data: Option<Vec<u8>>) -> Self {
        Self {
            width,
            height,
            rgba_data,
        }
    }

    /// Create an `ImageData` carrying only intrinsic dimensions.
    ///
    /// Useful for tests and for hosts that rasterize lazily.
    #[must_use]
    pub const fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba_data: None,
        }
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data, if decoded.
    #[must_use]
    pub fn rgba_data(&self) -> Option<&[u8]> {
        self.rgba_data.as_deref()
    }
}
