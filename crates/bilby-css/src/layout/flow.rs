//! Normal-flow layout: block and inline box generation.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! "Boxes in the normal flow belong to a formatting context, which may be
//! block or inline. Block-level boxes participate in a block formatting
//! context. Inline-level boxes participate in an inline formatting
//! context."
//!
//! The box-generation pass is a stack machine over the element tree: block
//! frames lay out block-level boxes one below the other, inline frames
//! drive a [`LineBuilder`] across runs of inline-level content, and
//! inline-blocks suspend the inline frame while their own flow runs in a
//! fresh block subtree. CSS nests without bound, so the main loop never
//! recurses natively.

use bilby_common::units::{Size, Unit, Vector, units};
use bilby_dom::{Category, ElementId, ElementTree};

use crate::style::{BoxStyle, CascadedValueStore, StyleComputer};
use crate::values::{Display, LengthPercentage, LengthPercentageAuto, MaxSize, Position, ZIndex};

use super::LayoutError;
use super::box_tree::{
    BlockIndex, BlockRef, BlockType, BorderWidths, BoxOffsets, BoxTree, IfcId, Margins, SubtreeId,
};
use super::inline::{FontHandle, FragmentContent, InlineFormattingContext, LineBuilder};
use super::stacking::{StackingContextId, StackingContextInfo, StackingContextManager};

/// Run box generation: element tree in, geometry-complete box tree out.
pub(crate) fn run_box_gen(
    tree: &ElementTree,
    store: &CascadedValueStore,
    root: ElementId,
    font: &dyn FontHandle,
    viewport: Size,
) -> Result<BoxTree, LayoutError> {
    let mut machine = Machine {
        tree,
        computer: StyleComputer::new(tree, store),
        font,
        box_tree: BoxTree::default(),
        sc: StackingContextManager::new(),
        stack: Vec::new(),
    };
    match machine.run(root, viewport) {
        Ok(()) => {
            debug_assert!(machine.sc.is_complete());
            Ok(machine.box_tree)
        }
        Err(error) => {
            // The partial box tree is dropped whole; release the manager's
            // construction state with it.
            machine.sc.abandon();
            Err(error)
        }
    }
}

/// Used values solved for one block before its children run.
#[derive(Debug, Clone, Copy, Default)]
struct UsedSizes {
    margins: Margins,
    borders: BorderWidths,
    padding_left: Unit,
    padding_right: Unit,
    padding_top: Unit,
    padding_bottom: Unit,
    /// Used content width; `None` means shrink-to-fit (resolved on pop).
    width: Option<Unit>,
    min_width: Unit,
    max_width: Option<Unit>,
    /// Definite content height; `None` means content-derived.
    height: Option<Unit>,
    min_height: Unit,
    max_height: Option<Unit>,
    /// Border-box position within the parent's content box (the static
    /// position; absolutes may override it on pop).
    border_pos: Vector,
    /// Relative-positioning offset, applied on pop.
    relative_offset: Vector,
    /// Resolved insets for absolutely positioned boxes.
    inset_left: Option<Unit>,
    inset_top: Option<Unit>,
    inset_right: Option<Unit>,
}

/// Why a block frame exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// The initial containing block.
    Icb,
    /// An in-flow block-level child.
    InFlow,
    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    /// "the box is removed from the normal flow entirely"
    Absolute,
    /// The root of an inline-block's subtree; `proxy` is its placeholder
    /// in the enclosing subtree.
    InlineBlockRoot {
        proxy: BlockIndex,
        element: ElementId,
    },
}

/// A block being laid out.
#[derive(Debug)]
struct BlockFrame {
    subtree: SubtreeId,
    block: BlockIndex,
    element: Option<ElementId>,
    kind: BlockKind,
    /// Next element child to process, if any.
    next_child: Option<ElementId>,
    /// Content width available to children.
    containing_width: Unit,
    /// Definite content height, for percentage resolution in children.
    containing_height: Option<Unit>,
    /// Running content height from in-flow children.
    auto_height: Unit,
    /// Widest child margin box or line; shrink-to-fit sizing reads this.
    max_child_width: Unit,
    /// Subtree size accumulated so far (this block plus closed children).
    skip: BlockIndex,
    sizes: UsedSizes,
}

/// An inline formatting context being filled.
#[derive(Debug)]
struct InlineFrame {
    subtree: SubtreeId,
    /// The block hosting the IFC.
    container_block: BlockIndex,
    /// Slot reserved in [`BoxTree::ifcs`].
    ifc_id: IfcId,
    builder: LineBuilder,
    /// Next inline-level element to consume.
    cursor: Option<ElementId>,
    /// Open `display: inline` elements whose children are being walked.
    inline_stack: Vec<ElementId>,
    /// The block-level sibling that ended the run, handed back to the
    /// parent block frame.
    stop: Option<ElementId>,
    /// A just-finished inline-block waiting to be placed on a line.
    pending_atom: Option<PendingAtom>,
    available_width: Unit,
    /// Vertical position of the IFC within the parent's content box.
    top_y: Unit,
    /// Number of subtree-proxy blocks appended under the container.
    atom_count: BlockIndex,
}

/// A finished inline-block, margin-box sized, awaiting line placement.
#[derive(Debug, Clone, Copy)]
struct PendingAtom {
    element: ElementId,
    proxy: BlockIndex,
    size: Size,
}

/// One stack entry of the layout machine.
#[derive(Debug)]
enum Frame {
    Block(BlockFrame),
    Inline(InlineFrame),
}

struct Machine<'a> {
    tree: &'a ElementTree,
    computer: StyleComputer<'a>,
    font: &'a dyn FontHandle,
    box_tree: BoxTree,
    sc: StackingContextManager,
    stack: Vec<Frame>,
}

impl Machine<'_> {
    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block... the dimensions of the
    /// viewport."
    fn run(&mut self, root: ElementId, viewport: Size) -> Result<(), LayoutError> {
        let subtree = self.box_tree.new_subtree(None)?;
        let icb = self
            .box_tree
            .subtree_mut(subtree)
            .append_block(BlockType::Block)?;

        // The root stacking context: parentable, implicit stack level 0.
        // Declared z-index on the root element is ignored.
        let root_sc = self.sc.push(
            StackingContextInfo::Parentable(0),
            &mut self.box_tree,
            BlockRef {
                subtree,
                index: icb,
            },
        );
        self.box_tree
            .subtree_mut(subtree)
            .set_stacking_context(icb, root_sc);

        self.stack.push(Frame::Block(BlockFrame {
            subtree,
            block: icb,
            element: None,
            kind: BlockKind::Icb,
            next_child: Some(root),
            containing_width: viewport.w,
            containing_height: Some(viewport.h),
            auto_height: 0,
            max_child_width: 0,
            skip: 1,
            sizes: UsedSizes {
                width: Some(viewport.w),
                height: Some(viewport.h),
                ..UsedSizes::default()
            },
        }));
        self.box_tree.icb_size = viewport;

        loop {
            let is_block = match self.stack.last() {
                None => break,
                Some(Frame::Block(_)) => true,
                Some(Frame::Inline(_)) => false,
            };
            if is_block {
                self.step_block()?;
            } else {
                self.step_inline()?;
            }
        }
        Ok(())
    }

    fn top_block_mut(&mut self) -> &mut BlockFrame {
        match self.stack.last_mut() {
            Some(Frame::Block(frame)) => frame,
            _ => unreachable!("top frame is a block frame"),
        }
    }

    fn top_inline_mut(&mut self) -> &mut InlineFrame {
        match self.stack.last_mut() {
            Some(Frame::Inline(frame)) => frame,
            _ => unreachable!("top frame is an inline frame"),
        }
    }

    /// Whether the current block frame is the initial containing block with
    /// nothing beneath it (so its next child is the root element).
    fn at_root_element(&self) -> bool {
        self.stack.len() == 1
            && matches!(
                self.stack.first(),
                Some(Frame::Block(BlockFrame {
                    kind: BlockKind::Icb,
                    ..
                }))
            )
    }

    /// One step of a block frame: dispatch the next child, or finalize.
    fn step_block(&mut self) -> Result<(), LayoutError> {
        let tree = self.tree;
        let Some(child) = self.top_block_mut().next_child else {
            return self.finalize_block();
        };

        if tree.category(child) == Category::Text {
            self.open_inline_frame(child)?;
            return Ok(());
        }

        // The root element goes through set_root_element; everything else
        // descends with push_element.
        let at_root = self.at_root_element();
        if at_root {
            self.computer.set_root_element(child);
        } else {
            self.computer.push_element(child);
        }

        let box_style = self.computer.specified_box_style();
        let mut display = box_style.display;
        // "Root elements with inline or inline-block are treated as block."
        if at_root && matches!(display, Display::Inline | Display::InlineBlock) {
            display = Display::Block;
        }

        match display {
            Display::None => {
                self.computer.pop_element();
                let next = tree.next_sibling(child);
                self.top_block_mut().next_child = next;
            }
            Display::Block => {
                let next = tree.next_sibling(child);
                self.top_block_mut().next_child = next;
                self.push_block_child(child, box_style, display)?;
            }
            Display::Inline | Display::InlineBlock => {
                self.computer.pop_element();
                self.open_inline_frame(child)?;
            }
        }
        Ok(())
    }

    /// Open an inline formatting context starting at `first`.
    fn open_inline_frame(&mut self, first: ElementId) -> Result<(), LayoutError> {
        let (subtree, available_width, top_y) = {
            let frame = self.top_block_mut();
            (frame.subtree, frame.containing_width, frame.auto_height)
        };

        let ifc_id = self
            .box_tree
            .append_ifc(InlineFormattingContext::default())?;
        let container_block = self
            .box_tree
            .subtree_mut(subtree)
            .append_block(BlockType::IfcContainer(ifc_id))?;

        self.stack.push(Frame::Inline(InlineFrame {
            subtree,
            container_block,
            ifc_id,
            builder: LineBuilder::new(available_width),
            cursor: Some(first),
            inline_stack: Vec::new(),
            stop: None,
            pending_atom: None,
            available_width,
            top_y,
            atom_count: 0,
        }));
        Ok(())
    }

    /// One step of an inline frame: place the pending atom, consume the
    /// next inline-level element, or finalize the run.
    fn step_inline(&mut self) -> Result<(), LayoutError> {
        let tree = self.tree;
        let font = self.font;

        if let Some(atom) = self.top_inline_mut().pending_atom.take() {
            let next = tree.next_sibling(atom.element);
            let frame = self.top_inline_mut();
            frame
                .builder
                .place_atom(atom.proxy, atom.size.w, atom.size.h)?;
            frame.cursor = next;
            return Ok(());
        }

        let Some(element) = self.top_inline_mut().cursor else {
            // End of a sibling run: either climb out of an open inline
            // element or finish the whole IFC.
            let open = self.top_inline_mut().inline_stack.pop();
            if let Some(open) = open {
                let next = tree.next_sibling(open);
                self.top_inline_mut().cursor = next;
                self.computer.pop_element();
                return Ok(());
            }
            return self.finalize_inline();
        };

        match tree.category(element) {
            Category::Text => {
                let text = tree.text(element).unwrap_or_default();
                let frame = self.top_inline_mut();
                frame.builder.place_text(element, text, font)?;
                frame.cursor = tree.next_sibling(element);
                Ok(())
            }
            Category::Normal => {
                self.computer.push_element(element);
                let box_style = self.computer.specified_box_style();
                let inside_inline = !self.top_inline_mut().inline_stack.is_empty();
                match box_style.display {
                    Display::None => {
                        self.computer.pop_element();
                        let next = tree.next_sibling(element);
                        self.top_inline_mut().cursor = next;
                        Ok(())
                    }
                    Display::Inline => {
                        // Walk into the inline element; its text
                        // participates in this IFC directly.
                        match tree.first_child(element) {
                            Some(first) => {
                                let frame = self.top_inline_mut();
                                frame.inline_stack.push(element);
                                frame.cursor = Some(first);
                            }
                            None => {
                                self.computer.pop_element();
                                let next = tree.next_sibling(element);
                                self.top_inline_mut().cursor = next;
                            }
                        }
                        Ok(())
                    }
                    Display::Block if !inside_inline => {
                        // A block-level sibling ends the inline run; the
                        // parent block frame resumes at it.
                        self.computer.pop_element();
                        let frame = self.top_inline_mut();
                        frame.stop = Some(element);
                        frame.cursor = None;
                        Ok(())
                    }
                    // An inline-block, or a block inside an open inline
                    // element (laid out as an atomic inline; no splitting).
                    Display::Block | Display::InlineBlock => {
                        self.start_inline_block(element, box_style)
                    }
                }
            }
        }
    }

    /// Start an inline-block: open its subtree, push its root block frame,
    /// and suspend the inline frame until it finishes.
    fn start_inline_block(
        &mut self,
        element: ElementId,
        box_style: BoxStyle,
    ) -> Result<(), LayoutError> {
        let (host_subtree, available_width) = {
            let frame = self.top_inline_mut();
            (frame.subtree, frame.available_width)
        };

        // Inline-blocks always get a non-parentable context: their flow
        // lives in a subtree of its own, and contexts created beneath them
        // become siblings.
        let z_index = match box_style.position {
            Position::Static => 0,
            Position::Relative | Position::Absolute => z_level(self.computer.specified_z_index()),
        };
        self.check_sc_capacity()?;
        let sc_id = self
            .sc
            .push_without_block(StackingContextInfo::NonParentable(z_index), &mut self.box_tree);

        let new_subtree = self.box_tree.new_subtree(None)?;
        let proxy = self
            .box_tree
            .subtree_mut(host_subtree)
            .append_block(BlockType::SubtreeProxy(new_subtree))?;
        self.box_tree.subtree_mut(new_subtree).parent = Some(BlockRef {
            subtree: host_subtree,
            index: proxy,
        });
        let root_block = self
            .box_tree
            .subtree_mut(new_subtree)
            .append_block(BlockType::Block)?;
        if let Some(id) = sc_id {
            self.sc.set_block(
                &mut self.box_tree,
                id,
                BlockRef {
                    subtree: new_subtree,
                    index: root_block,
                },
            );
        }
        self.box_tree
            .subtree_mut(new_subtree)
            .set_stacking_context(root_block, sc_id);
        self.box_tree
            .subtree_mut(new_subtree)
            .set_element(root_block, element);
        self.top_inline_mut().atom_count += 1;

        let sizes = self.solve_sizes(available_width, None, true);
        let containing_width = sizes.width.unwrap_or_else(|| {
            (available_width
                - sizes.margins.left
                - sizes.margins.right
                - sizes.borders.left
                - sizes.borders.right
                - sizes.padding_left
                - sizes.padding_right)
                .max(0)
        });

        self.stack.push(Frame::Block(BlockFrame {
            subtree: new_subtree,
            block: root_block,
            element: Some(element),
            kind: BlockKind::InlineBlockRoot { proxy, element },
            next_child: self.tree.first_child(element),
            containing_width,
            containing_height: sizes.height,
            auto_height: 0,
            max_child_width: 0,
            skip: 1,
            sizes,
        }));
        Ok(())
    }

    /// Push a frame for a block-level element child.
    fn push_block_child(
        &mut self,
        element: ElementId,
        box_style: BoxStyle,
        display: Display,
    ) -> Result<(), LayoutError> {
        let (subtree, containing_width, containing_height, flow_y) = {
            let frame = self.top_block_mut();
            (
                frame.subtree,
                frame.containing_width,
                frame.containing_height,
                frame.auto_height,
            )
        };

        let absolute = box_style.position == Position::Absolute;
        let mut sizes = self.solve_sizes(containing_width, containing_height, absolute);

        // Static position: below the flow so far, after the top margin.
        sizes.border_pos = Vector::new(sizes.margins.left, flow_y + sizes.margins.top);

        // [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
        if box_style.position == Position::Relative {
            sizes.relative_offset = self.relative_offset(containing_width, containing_height);
        }

        let z = self.computer.specified_z_index();
        self.computer.set_computed_box_style(BoxStyle {
            display,
            position: box_style.position,
        });
        self.computer.set_computed_z_index(z);

        // Positioned boxes create a stacking context; `z-index: auto`
        // contributes stack level 0.
        let info = match box_style.position {
            Position::Static => StackingContextInfo::None,
            Position::Relative => StackingContextInfo::Parentable(z_level(z)),
            Position::Absolute => StackingContextInfo::NonParentable(z_level(z)),
        };

        let block = self
            .box_tree
            .subtree_mut(subtree)
            .append_block(BlockType::Block)?;
        self.box_tree.subtree_mut(subtree).set_element(block, element);

        self.check_sc_capacity()?;
        let sc_id = self.sc.push(
            info,
            &mut self.box_tree,
            BlockRef {
                subtree,
                index: block,
            },
        );
        self.box_tree
            .subtree_mut(subtree)
            .set_stacking_context(block, sc_id);

        let containing_width_inner = sizes.width.unwrap_or_else(|| {
            (containing_width
                - sizes.margins.left
                - sizes.margins.right
                - sizes.borders.left
                - sizes.borders.right
                - sizes.padding_left
                - sizes.padding_right)
                .max(0)
        });

        self.stack.push(Frame::Block(BlockFrame {
            subtree,
            block,
            element: Some(element),
            kind: if absolute {
                BlockKind::Absolute
            } else {
                BlockKind::InFlow
            },
            next_child: self.tree.first_child(element),
            containing_width: containing_width_inner,
            containing_height: sizes.height,
            auto_height: 0,
            max_child_width: 0,
            skip: 1,
            sizes,
        }));
        Ok(())
    }

    /// Solve used margins, borders, padding, width, and height for the
    /// style computer's current element.
    ///
    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
    /// 'padding-right' + 'border-right-width' + 'margin-right' = width of
    /// containing block"
    fn solve_sizes(
        &mut self,
        containing_width: Unit,
        containing_height: Option<Unit>,
        shrink_to_fit: bool,
    ) -> UsedSizes {
        let content_width = self.computer.specified_content_width();
        let content_height = self.computer.specified_content_height();
        let horizontal = self.computer.specified_horizontal_edges();
        let vertical = self.computer.specified_vertical_edges();
        let insets = self.computer.specified_insets();

        self.computer.set_computed_content_width(content_width);
        self.computer.set_computed_content_height(content_height);
        self.computer.set_computed_horizontal_edges(horizontal);
        self.computer.set_computed_vertical_edges(vertical);
        self.computer.set_computed_insets(insets);

        let mut sizes = UsedSizes {
            borders: BorderWidths {
                left: units(horizontal.border_start.to_px()),
                right: units(horizontal.border_end.to_px()),
                top: units(vertical.border_start.to_px()),
                bottom: units(vertical.border_end.to_px()),
            },
            padding_left: resolve_lp(horizontal.padding_start, containing_width),
            padding_right: resolve_lp(horizontal.padding_end, containing_width),
            // [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
            // "The percentage is calculated with respect to the *width* of
            // the generated box's containing block" — for all four sides.
            padding_top: resolve_lp(vertical.padding_start, containing_width),
            padding_bottom: resolve_lp(vertical.padding_end, containing_width),
            ..UsedSizes::default()
        };

        sizes.min_width = resolve_lp(content_width.min, containing_width);
        sizes.max_width = resolve_max(content_width.max, Some(containing_width));
        sizes.min_height = containing_height.map_or(0, |h| resolve_lp(content_height.min, h));
        sizes.max_height = resolve_max(content_height.max, containing_height);

        // Vertical auto margins compute to 0 in normal flow.
        // [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
        sizes.margins.top = resolve_lpa(vertical.margin_start, containing_width).unwrap_or(0);
        sizes.margins.bottom = resolve_lpa(vertical.margin_end, containing_width).unwrap_or(0);

        let edges =
            sizes.borders.left + sizes.borders.right + sizes.padding_left + sizes.padding_right;

        let margin_left = resolve_lpa(horizontal.margin_start, containing_width);
        let margin_right = resolve_lpa(horizontal.margin_end, containing_width);

        match resolve_lpa(content_width.size, containing_width) {
            Some(width) => {
                // Used width honors the min/max clamps before margins are
                // solved.
                let width = clamp_size(width, sizes.min_width, sizes.max_width);
                sizes.width = Some(width);
                if shrink_to_fit {
                    // Inline-level and absolute boxes: auto margins are 0,
                    // no constraint to satisfy.
                    sizes.margins.left = margin_left.unwrap_or(0);
                    sizes.margins.right = margin_right.unwrap_or(0);
                } else {
                    let available = containing_width - width - edges;
                    let (ml, mr) = solve_auto_margins(margin_left, margin_right, available);
                    sizes.margins.left = ml;
                    sizes.margins.right = mr;
                }
            }
            None if shrink_to_fit => {
                // Width resolves from the contents on pop.
                sizes.width = None;
                sizes.margins.left = margin_left.unwrap_or(0);
                sizes.margins.right = margin_right.unwrap_or(0);
            }
            None => {
                // "If 'width' is 'auto', any other 'auto' values become '0'
                // and 'width' follows from the resulting equality."
                sizes.margins.left = margin_left.unwrap_or(0);
                sizes.margins.right = margin_right.unwrap_or(0);
                let width =
                    (containing_width - sizes.margins.left - sizes.margins.right - edges).max(0);
                sizes.width = Some(clamp_size(width, sizes.min_width, sizes.max_width));
            }
        }

        // Height: definite when a length, or a percentage against a
        // definite containing height.
        sizes.height = match content_height.size {
            LengthPercentageAuto::Px(px) => Some(units(px)),
            LengthPercentageAuto::Percentage(p) => containing_height.map(|h| resolve_percent(p, h)),
            LengthPercentageAuto::Auto => None,
        }
        .map(|h| clamp_size(h, sizes.min_height, sizes.max_height));

        sizes.inset_left = resolve_lpa(insets.left, containing_width);
        sizes.inset_right = resolve_lpa(insets.right, containing_width);
        sizes.inset_top = match insets.top {
            LengthPercentageAuto::Px(px) => Some(units(px)),
            LengthPercentageAuto::Percentage(p) => containing_height.map(|h| resolve_percent(p, h)),
            LengthPercentageAuto::Auto => None,
        };

        sizes
    }

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "If both 'left' and 'right' are 'auto', the used values are both 0.
    /// If 'left' is 'auto', its used value is minus the value of 'right'...
    /// If neither is 'auto'... the value of 'left' wins."
    fn relative_offset(&self, containing_width: Unit, containing_height: Option<Unit>) -> Vector {
        let insets = self.computer.specified_insets();
        let left = resolve_lpa(insets.left, containing_width);
        let right = resolve_lpa(insets.right, containing_width);
        let vertical_base = containing_height.unwrap_or(0);
        let top = resolve_lpa(insets.top, vertical_base);
        let bottom = resolve_lpa(insets.bottom, vertical_base);

        let x = match (left, right) {
            (None, None) => 0,
            (Some(l), _) => l,
            (None, Some(r)) => -r,
        };
        let y = match (top, bottom) {
            (None, None) => 0,
            (Some(t), _) => t,
            (None, Some(b)) => -b,
        };
        Vector::new(x, y)
    }

    /// Finalize the top block frame: resolve its remaining sizes, write
    /// its record, and fold it into its parent.
    fn finalize_block(&mut self) -> Result<(), LayoutError> {
        let Some(Frame::Block(frame)) = self.stack.pop() else {
            unreachable!("finalize_block pops a block frame");
        };
        let mut sizes = frame.sizes;

        // Shrink-to-fit width resolves from the widest child now.
        // [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
        // "min(max(preferred minimum width, available width), preferred
        // width)"
        let width = sizes.width.unwrap_or_else(|| {
            clamp_size(
                frame.max_child_width.min(frame.containing_width),
                sizes.min_width,
                sizes.max_width,
            )
        });

        // "used height = either content-derived or resolved block-size"
        let height = sizes
            .height
            .unwrap_or_else(|| clamp_size(frame.auto_height, sizes.min_height, sizes.max_height));

        let border_size = Size::new(
            width + sizes.padding_left + sizes.padding_right + sizes.borders.left
                + sizes.borders.right,
            height + sizes.padding_top + sizes.padding_bottom + sizes.borders.top
                + sizes.borders.bottom,
        );

        // Absolutes place against their containing block's content box,
        // falling back to the static position per axis.
        if frame.kind == BlockKind::Absolute {
            if let Some(left) = sizes.inset_left {
                sizes.border_pos.x = left + sizes.margins.left;
            } else if let Some(right) = sizes.inset_right {
                let cb = self.containing_width_of_parent();
                sizes.border_pos.x = cb - right - border_size.w - sizes.margins.right;
            }
            if let Some(top) = sizes.inset_top {
                sizes.border_pos.y = top + sizes.margins.top;
            }
        }

        let final_pos = sizes.border_pos.add(sizes.relative_offset);

        let subtree = self.box_tree.subtree_mut(frame.subtree);
        subtree.set_skip(frame.block, frame.skip);
        subtree.set_box_offsets(
            frame.block,
            BoxOffsets {
                border_pos: final_pos,
                border_size,
                content_pos: Vector::new(
                    sizes.borders.left + sizes.padding_left,
                    sizes.borders.top + sizes.padding_top,
                ),
                content_size: Size::new(width, height),
            },
        );
        subtree.set_borders(frame.block, sizes.borders);
        subtree.set_margins(frame.block, sizes.margins);

        self.sc.pop(&mut self.box_tree);
        if frame.element.is_some() {
            self.computer.pop_element();
        }

        match frame.kind {
            BlockKind::Icb => {}
            BlockKind::InFlow => {
                let margin_box_w = border_size.w + sizes.margins.left + sizes.margins.right;
                let margin_box_h = border_size.h + sizes.margins.top + sizes.margins.bottom;
                let parent = self.top_block_mut();
                parent.auto_height += margin_box_h;
                parent.skip += frame.skip;
                parent.max_child_width = parent.max_child_width.max(margin_box_w);
            }
            BlockKind::Absolute => {
                // Out of flow: takes space in the tree, not in the parent's
                // auto height.
                let parent = self.top_block_mut();
                parent.skip += frame.skip;
            }
            BlockKind::InlineBlockRoot { proxy, element } => {
                let margin_box = Size::new(
                    border_size.w + sizes.margins.left + sizes.margins.right,
                    border_size.h + sizes.margins.top + sizes.margins.bottom,
                );
                // The proxy mirrors the outer geometry in the host subtree;
                // its border position lands when the line is finished.
                let host = self.top_inline_mut().subtree;
                let host_subtree = self.box_tree.subtree_mut(host);
                host_subtree.set_box_offsets(
                    proxy,
                    BoxOffsets {
                        border_pos: Vector::ZERO,
                        border_size,
                        content_pos: Vector::new(
                            sizes.borders.left + sizes.padding_left,
                            sizes.borders.top + sizes.padding_top,
                        ),
                        content_size: Size::new(width, height),
                    },
                );
                host_subtree.set_margins(proxy, sizes.margins);
                host_subtree.set_borders(proxy, sizes.borders);
                self.top_inline_mut().pending_atom = Some(PendingAtom {
                    element,
                    proxy,
                    size: margin_box,
                });
            }
        }
        Ok(())
    }

    /// Containing width of the nearest enclosing block frame (used for
    /// right-anchored absolutes after their frame has been popped).
    fn containing_width_of_parent(&self) -> Unit {
        for frame in self.stack.iter().rev() {
            if let Frame::Block(block) = frame {
                return block.containing_width;
            }
        }
        0
    }

    /// Finalize the top inline frame: close the last line, write the IFC
    /// and its container block, and resume the parent block frame.
    fn finalize_inline(&mut self) -> Result<(), LayoutError> {
        let Some(Frame::Inline(frame)) = self.stack.pop() else {
            unreachable!("finalize_inline pops an inline frame");
        };

        let container_ref = BlockRef {
            subtree: frame.subtree,
            index: frame.container_block,
        };
        let ifc = frame.builder.finish(container_ref);
        let content_height = ifc.content_height;
        let max_line_width = ifc.max_line_width;

        // Atom fragments position their proxy blocks: fragment rects are
        // margin boxes relative to the IFC content box.
        let subtree = self.box_tree.subtree_mut(frame.subtree);
        for fragment in &ifc.fragments {
            if let FragmentContent::InlineBlock(proxy) = &fragment.content {
                let proxy = *proxy;
                let margins = subtree.margins(proxy);
                let mut offsets = subtree.box_offsets(proxy);
                offsets.border_pos = Vector::new(
                    fragment.rect.x + margins.left,
                    fragment.rect.y + margins.top,
                );
                subtree.set_box_offsets(proxy, offsets);
            }
        }

        // The container block spans the available width.
        subtree.set_skip(frame.container_block, 1 + frame.atom_count);
        subtree.set_box_offsets(
            frame.container_block,
            BoxOffsets {
                border_pos: Vector::new(0, frame.top_y),
                border_size: Size::new(frame.available_width, content_height),
                content_pos: Vector::ZERO,
                content_size: Size::new(frame.available_width, content_height),
            },
        );

        self.box_tree.ifcs[usize::from(frame.ifc_id)] = ifc;
        self.sc.add_ifc(&mut self.box_tree, frame.ifc_id);

        let parent = self.top_block_mut();
        parent.auto_height += content_height;
        parent.skip += 1 + frame.atom_count;
        parent.max_child_width = parent.max_child_width.max(max_line_width);
        parent.next_child = frame.stop;
        Ok(())
    }

    /// Stacking-context ids are 16-bit; fail with a typed error before the
    /// allocator can wrap.
    fn check_sc_capacity(&self) -> Result<(), LayoutError> {
        if self.box_tree.sc_tree.len() >= StackingContextId::MAX - 1 {
            return Err(LayoutError::OutOfRefs);
        }
        Ok(())
    }
}

/// The stack level a positioned box contributes.
///
/// `z-index: auto` boxes still create a context here, stacking at level 0
/// (see the z-ordering tests).
const fn z_level(z: ZIndex) -> i32 {
    match z {
        ZIndex::Auto => 0,
        ZIndex::Integer(value) => value,
    }
}

/// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// Distribute the remaining space over the auto margins.
///
/// "If both 'margin-left' and 'margin-right' are 'auto', their used values
/// are equal. This horizontally centers the element... If there is exactly
/// one value specified as 'auto', its used value follows from the
/// equality. ... ignore the value for 'margin-right'."
fn solve_auto_margins(left: Option<Unit>, right: Option<Unit>, available: Unit) -> (Unit, Unit) {
    match (left, right) {
        (None, None) => {
            if available >= 0 {
                let half = available / 2;
                (half, available - half)
            } else {
                // Over-wide content: auto margins are treated as zero and
                // the box overflows to the right.
                (0, available)
            }
        }
        (Some(l), None) => (l, available - l),
        (None, Some(r)) => (available - r, r),
        (Some(l), Some(_)) => (l, available - l),
    }
}

/// `clamp(min, max)` with an optional maximum.
fn clamp_size(value: Unit, min: Unit, max: Option<Unit>) -> Unit {
    let value = max.map_or(value, |m| value.min(m));
    value.max(min)
}

/// Resolve a length-percentage to units against a base.
fn resolve_lp(lp: LengthPercentage, base: Unit) -> Unit {
    match lp {
        LengthPercentage::Px(px) => units(px),
        LengthPercentage::Percentage(p) => resolve_percent(p, base),
    }
}

/// Resolve `auto | <length-percentage>`; `None` means auto.
fn resolve_lpa(lpa: LengthPercentageAuto, base: Unit) -> Option<Unit> {
    match lpa {
        LengthPercentageAuto::Px(px) => Some(units(px)),
        LengthPercentageAuto::Percentage(p) => Some(resolve_percent(p, base)),
        LengthPercentageAuto::Auto => None,
    }
}

/// Resolve `none | <length-percentage>`; `None` means no limit.
fn resolve_max(max: MaxSize, base: Option<Unit>) -> Option<Unit> {
    match max {
        MaxSize::None => None,
        MaxSize::LengthPercentage(LengthPercentage::Px(px)) => Some(units(px)),
        MaxSize::LengthPercentage(LengthPercentage::Percentage(p)) => {
            base.map(|b| resolve_percent(p, b))
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn resolve_percent(percentage: f32, base: Unit) -> Unit {
    (f64::from(base) * f64::from(percentage) / 100.0).round() as Unit
}
