//! The box tree: the positioned, sized, painted output of layout.
//!
//! [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
//!
//! Like the component tree, the box tree is flat and skip-encoded, stored
//! as parallel columns indexed by [`BlockIndex`]: a subtree starting at `i`
//! ends at `i + skip[i]`. Layout opens a new block *subtree* per stacking
//! context root that needs one (the initial containing block, each
//! inline-block); a [`BlockRef`] names a block across subtrees.

use bilby_common::units::{Size, Unit, Vector};
use bilby_dom::ElementId;

use crate::values::Rgba;

use super::cosmetic::{BackgroundPaint, ResolvedBorderColors};
use super::inline::InlineFormattingContext;
use super::stacking::{StackingContextId, StackingContextTree};

/// Index of a block within one subtree's columns.
pub type BlockIndex = u16;

/// Identifier of a block subtree.
pub type SubtreeId = u16;

/// Identifier of an inline formatting context.
pub type IfcId = u16;

/// A block addressed across subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    /// The subtree holding the block.
    pub subtree: SubtreeId,
    /// The block's index within that subtree.
    pub index: BlockIndex,
}

/// What a block is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// An ordinary block-level box.
    Block,
    /// A block hosting an inline formatting context; the IFC's lines and
    /// fragments live in [`BoxTree::ifcs`].
    IfcContainer(IfcId),
    /// A placeholder whose content lives in another subtree (an
    /// inline-block's flow). Geometry columns describe the outer box.
    SubtreeProxy(SubtreeId),
}

/// The geometry of one block.
///
/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
///
/// `border_pos` is relative to the containing block's content-box origin;
/// `content_pos` is relative to the block's own border-box origin. An
/// ordered traversal accumulates positions without back-references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxOffsets {
    /// Border-box top-left, relative to the parent block's content box.
    pub border_pos: Vector,
    /// Border-box extent.
    pub border_size: Size,
    /// Content-box top-left, relative to this block's border box.
    pub content_pos: Vector,
    /// Content-box extent.
    pub content_size: Size,
}

/// Per-side border widths of one block, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderWidths {
    /// Left border width.
    pub left: Unit,
    /// Right border width.
    pub right: Unit,
    /// Top border width.
    pub top: Unit,
    /// Bottom border width.
    pub bottom: Unit,
}

/// Per-side used margins of one block, in layout units.
///
/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// Margins may be negative; overlap is legal and unclamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Margins {
    /// Used left margin.
    pub left: Unit,
    /// Used right margin.
    pub right: Unit,
    /// Used top margin.
    pub top: Unit,
    /// Used bottom margin.
    pub bottom: Unit,
}

/// One block subtree: parallel columns indexed by [`BlockIndex`].
#[derive(Debug, Default)]
pub struct Subtree {
    /// The proxy block in the parent subtree, if this is not subtree 0.
    pub parent: Option<BlockRef>,
    skip: Vec<BlockIndex>,
    ty: Vec<BlockType>,
    box_offsets: Vec<BoxOffsets>,
    borders: Vec<BorderWidths>,
    margins: Vec<Margins>,
    element: Vec<Option<ElementId>>,
    stacking_context: Vec<Option<StackingContextId>>,
    background: Vec<BackgroundPaint>,
    border_colors: Vec<ResolvedBorderColors>,
}

impl Subtree {
    /// Number of blocks in this subtree.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> BlockIndex {
        self.skip.len() as BlockIndex
    }

    /// Whether the subtree holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skip.is_empty()
    }

    /// Append a block with placeholder geometry, returning its index.
    ///
    /// The caller writes the final record once the block's contents are
    /// laid out (skips and sizes are only known then).
    pub fn append_block(&mut self, ty: BlockType) -> Result<BlockIndex, super::LayoutError> {
        if self.skip.len() >= usize::from(BlockIndex::MAX) {
            return Err(super::LayoutError::TooManyBlocks);
        }
        let index = self.len();
        self.skip.push(1);
        self.ty.push(ty);
        self.box_offsets.push(BoxOffsets::default());
        self.borders.push(BorderWidths::default());
        self.margins.push(Margins::default());
        self.element.push(None);
        self.stacking_context.push(None);
        self.background.push(BackgroundPaint::default());
        self.border_colors.push(ResolvedBorderColors::default());
        Ok(index)
    }

    /// The skip of the block at `index`: 1 plus the sizes of its children.
    #[must_use]
    pub fn skip(&self, index: BlockIndex) -> BlockIndex {
        self.skip[usize::from(index)]
    }

    /// Set the skip of the block at `index`.
    pub fn set_skip(&mut self, index: BlockIndex, skip: BlockIndex) {
        self.skip[usize::from(index)] = skip;
    }

    /// The type of the block at `index`.
    #[must_use]
    pub fn block_type(&self, index: BlockIndex) -> BlockType {
        self.ty[usize::from(index)]
    }

    /// The geometry of the block at `index`.
    #[must_use]
    pub fn box_offsets(&self, index: BlockIndex) -> BoxOffsets {
        self.box_offsets[usize::from(index)]
    }

    /// Write the geometry of the block at `index`.
    pub fn set_box_offsets(&mut self, index: BlockIndex, offsets: BoxOffsets) {
        self.box_offsets[usize::from(index)] = offsets;
    }

    /// The border widths of the block at `index`.
    #[must_use]
    pub fn borders(&self, index: BlockIndex) -> BorderWidths {
        self.borders[usize::from(index)]
    }

    /// Write the border widths of the block at `index`.
    pub fn set_borders(&mut self, index: BlockIndex, borders: BorderWidths) {
        self.borders[usize::from(index)] = borders;
    }

    /// The used margins of the block at `index`.
    #[must_use]
    pub fn margins(&self, index: BlockIndex) -> Margins {
        self.margins[usize::from(index)]
    }

    /// Write the used margins of the block at `index`.
    pub fn set_margins(&mut self, index: BlockIndex, margins: Margins) {
        self.margins[usize::from(index)] = margins;
    }

    /// The element that generated the block at `index`, if any.
    #[must_use]
    pub fn element(&self, index: BlockIndex) -> Option<ElementId> {
        self.element[usize::from(index)]
    }

    /// Record the generating element of the block at `index`.
    pub fn set_element(&mut self, index: BlockIndex, element: ElementId) {
        self.element[usize::from(index)] = Some(element);
    }

    /// The stacking context owned by the block at `index`, if any.
    #[must_use]
    pub fn stacking_context(&self, index: BlockIndex) -> Option<StackingContextId> {
        self.stacking_context[usize::from(index)]
    }

    /// Record the stacking context owned by the block at `index`.
    pub fn set_stacking_context(&mut self, index: BlockIndex, id: Option<StackingContextId>) {
        self.stacking_context[usize::from(index)] = id;
    }

    /// The resolved background of the block at `index` (cosmetic column).
    #[must_use]
    pub fn background(&self, index: BlockIndex) -> &BackgroundPaint {
        &self.background[usize::from(index)]
    }

    /// Write the resolved background of the block at `index`.
    pub fn set_background(&mut self, index: BlockIndex, background: BackgroundPaint) {
        self.background[usize::from(index)] = background;
    }

    /// The resolved border colors of the block at `index` (cosmetic column).
    #[must_use]
    pub fn border_colors(&self, index: BlockIndex) -> ResolvedBorderColors {
        self.border_colors[usize::from(index)]
    }

    /// Write the resolved border colors of the block at `index`.
    pub fn set_border_colors(&mut self, index: BlockIndex, colors: ResolvedBorderColors) {
        self.border_colors[usize::from(index)] = colors;
    }

    /// Iterate over the direct children of the block at `index`.
    pub fn children(&self, index: BlockIndex) -> impl Iterator<Item = BlockIndex> + '_ {
        let end = index + self.skip(index);
        let mut current = index + 1;
        std::iter::from_fn(move || {
            if current >= end {
                return None;
            }
            let child = current;
            current += self.skip(child);
            Some(child)
        })
    }
}

/// The complete output of layout: block subtrees, inline formatting
/// contexts, and the stacking-context tree that orders painting.
///
/// Owns all layout-produced memory; dropping it releases everything.
#[derive(Debug, Default)]
pub struct BoxTree {
    /// Block subtrees; subtree 0 is rooted at the initial containing block.
    pub subtrees: Vec<Subtree>,
    /// Inline formatting contexts, indexed by [`IfcId`].
    pub ifcs: Vec<InlineFormattingContext>,
    /// Paint order over the subtrees.
    pub sc_tree: StackingContextTree,
    /// The viewport the initial containing block was sized to.
    pub icb_size: Size,
    /// The canvas background resolved by the cosmetic pass.
    pub canvas_background: Rgba,
}

impl BoxTree {
    /// Open a new block subtree.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new_subtree(&mut self, parent: Option<BlockRef>) -> Result<SubtreeId, super::LayoutError> {
        if self.subtrees.len() >= usize::from(SubtreeId::MAX) {
            return Err(super::LayoutError::TooManyBlockSubtrees);
        }
        let id = self.subtrees.len() as SubtreeId;
        self.subtrees.push(Subtree {
            parent,
            ..Subtree::default()
        });
        Ok(id)
    }

    /// The subtree with the given id.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    #[must_use]
    pub fn subtree(&self, id: SubtreeId) -> &Subtree {
        &self.subtrees[usize::from(id)]
    }

    /// Mutable access to the subtree with the given id.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn subtree_mut(&mut self, id: SubtreeId) -> &mut Subtree {
        &mut self.subtrees[usize::from(id)]
    }

    /// Register an inline formatting context, returning its id.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append_ifc(
        &mut self,
        ifc: InlineFormattingContext,
    ) -> Result<IfcId, super::LayoutError> {
        if self.ifcs.len() >= usize::from(IfcId::MAX) {
            return Err(super::LayoutError::TooManyIfcs);
        }
        let id = self.ifcs.len() as IfcId;
        self.ifcs.push(ifc);
        Ok(id)
    }
}
