//! The layout engine: normal flow, stacking contexts, and the box tree.
//!
//! [CSS 2.2 § 9 Visual formatting model](https://www.w3.org/TR/CSS22/visuren.html)
//!
//! # Module Structure
//!
//! - [`box_tree`] - the flat, skip-encoded box tree layout produces
//! - [`flow`] - block and inline box generation (the first pass)
//! - [`inline`] - inline formatting contexts and the font collaborator
//! - [`stacking`] - the stacking-context tree and its manager
//! - [`cosmetic`] - color, background, and border resolution (the second
//!   pass)
//!
//! Layout runs in two passes over the same element tree: box generation
//! decides geometry and paint order, the cosmetic pass fills in colors and
//! backgrounds. [`do_layout`] runs both and returns the finished
//! [`BoxTree`].

/// The box tree and its parallel columns.
pub mod box_tree;
/// The cosmetic pass.
pub mod cosmetic;
/// Block and inline box generation.
pub mod flow;
/// Inline formatting contexts, line boxes, and font metrics.
pub mod inline;
/// Stacking contexts and painting order.
pub mod stacking;

use bilby_common::image::ImageData;
use bilby_common::units::Size;
use bilby_dom::{ElementId, ElementTree};
use thiserror::Error;

use crate::style::CascadedValueStore;

pub use box_tree::{
    BlockIndex, BlockRef, BlockType, BorderWidths, BoxOffsets, BoxTree, IfcId, Margins, Subtree,
    SubtreeId,
};
pub use cosmetic::{BackgroundPaint, ResolvedBackgroundImage, ResolvedBorderColors};
pub use inline::{
    ApproximateFont, FontHandle, FragmentContent, InlineFormattingContext, InlineFragment,
    LineBox, ShapedGlyph, TextRun,
};
pub use stacking::{
    StackingContextId, StackingContextInfo, StackingContextManager, StackingContextTree,
};

/// Failures layout can surface.
///
/// Grammar and value problems never reach here (they are recovered during
/// parsing and cascade); these are capacity and internal-consistency
/// failures. The box tree under construction is dropped in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A computed value reached layout in a state the cascade should have
    /// prevented.
    #[error("invalid computed value reached layout")]
    InvalidValue,
    /// An arena or column allocation failed.
    #[error("out of memory")]
    OutOfMemory,
    /// Identifier space (stacking contexts) exhausted.
    #[error("out of identifiers")]
    OutOfRefs,
    /// More block subtrees than the engine can address.
    #[error("too many block subtrees")]
    TooManyBlockSubtrees,
    /// More blocks in one subtree than the engine can address.
    #[error("too many blocks")]
    TooManyBlocks,
    /// More inline formatting contexts than the engine can address.
    #[error("too many inline formatting contexts")]
    TooManyIfcs,
    /// More inline fragments in one IFC than the engine can address.
    #[error("too many inline boxes")]
    TooManyInlineBoxes,
}

/// Identifier of an image in the host's image table.
pub type ImageId = u16;

/// One host-provided image: the url it answers to plus its decoded data.
#[derive(Debug, Clone)]
pub struct NamedImage {
    /// The url `background-image` declarations resolve against.
    pub url: String,
    /// The decoded image.
    pub data: ImageData,
}

/// The read-only image collaborator: a slice of decoded images indexed by
/// stable id.
///
/// The engine never does I/O; the host decodes images ahead of layout and
/// hands them in here. Urls that resolve to no image paint as if
/// `background-image` were `none`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Images<'a> {
    images: &'a [NamedImage],
}

impl<'a> Images<'a> {
    /// Wrap a host-provided image table.
    #[must_use]
    pub const fn new(images: &'a [NamedImage]) -> Self {
        Self { images }
    }

    /// An empty image table.
    #[must_use]
    pub const fn none() -> Images<'static> {
        Images { images: &[] }
    }

    /// The image with the given id.
    #[must_use]
    pub fn get(&self, id: ImageId) -> Option<&'a ImageData> {
        self.images.get(usize::from(id)).map(|entry| &entry.data)
    }

    /// Look up an image id by url.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn id_of(&self, url: &str) -> Option<ImageId> {
        self.images
            .iter()
            .position(|entry| entry.url == url)
            .map(|index| index as ImageId)
    }
}

/// Lay out a document: element tree plus cascaded values in, box tree out.
///
/// [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
///
/// Runs box generation and the cosmetic pass. Either returns a complete
/// box tree or a typed error; nothing is partially committed. The engine
/// is single-threaded and synchronous; the element tree and images are
/// only read.
///
/// # Errors
/// Returns a [`LayoutError`] when a capacity limit is exceeded.
pub fn do_layout(
    tree: &ElementTree,
    cascaded: &CascadedValueStore,
    root: ElementId,
    font: &dyn FontHandle,
    images: &Images<'_>,
    viewport: Size,
) -> Result<BoxTree, LayoutError> {
    let mut box_tree = flow::run_box_gen(tree, cascaded, root, font, viewport)?;
    cosmetic::run_cosmetic(tree, cascaded, root, images, &mut box_tree);
    Ok(box_tree)
}
