//! Stacking contexts and painting order.
//!
//! [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers)
//!
//! "An element in CSS 2 may have a stack level, which describes its
//! position within a set of elements sharing the same stacking context."
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html) describes
//! painting order in full. The engine tracks it with a flat, skip-encoded
//! tree of stacking contexts, built incrementally *during* layout by the
//! [`StackingContextManager`]. Children of a context are kept sorted by
//! z-index as they are inserted; among equal z-indices, document order is
//! preserved, so a preorder walk of the finished tree is the paint order.

use std::collections::HashSet;

use super::box_tree::{BlockRef, BoxTree, IfcId, SubtreeId};

/// Identifier of a stacking context. Ids are stable; positions within the
/// tree shift as siblings are inserted.
pub type StackingContextId = u16;

/// A block reference that is not yet known.
///
/// Used by [`StackingContextManager::push_without_block`]; the owning block
/// must be patched in with [`StackingContextManager::set_block`] before the
/// tree is complete.
const PENDING_BLOCK: BlockRef = BlockRef {
    subtree: SubtreeId::MAX,
    index: 0,
};

/// The finished stacking-context tree: a skip-encoded array of
/// `{skip, id, z_index, block, ifcs}` columns.
///
/// Children of each context are non-decreasing in z-index; equal z-indices
/// appear in insertion (document) order. Preorder over the array is paint
/// order.
#[derive(Debug, Default)]
pub struct StackingContextTree {
    skip: Vec<u16>,
    id: Vec<StackingContextId>,
    z_index: Vec<i32>,
    block: Vec<BlockRef>,
    ifcs: Vec<Vec<IfcId>>,
}

impl StackingContextTree {
    /// Number of stacking contexts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u16 {
        self.skip.len() as u16
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skip.is_empty()
    }

    /// The skip (subtree size) of the context at `position`.
    #[must_use]
    pub fn skip(&self, position: u16) -> u16 {
        self.skip[usize::from(position)]
    }

    /// The id of the context at `position`.
    #[must_use]
    pub fn id(&self, position: u16) -> StackingContextId {
        self.id[usize::from(position)]
    }

    /// The z-index of the context at `position`.
    #[must_use]
    pub fn z_index(&self, position: u16) -> i32 {
        self.z_index[usize::from(position)]
    }

    /// The owning block of the context at `position`.
    #[must_use]
    pub fn block(&self, position: u16) -> BlockRef {
        self.block[usize::from(position)]
    }

    /// The inline formatting contexts painted with the context at
    /// `position`.
    #[must_use]
    pub fn ifcs(&self, position: u16) -> &[IfcId] {
        &self.ifcs[usize::from(position)]
    }

    /// Find the position of a context by its id.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn position_of(&self, id: StackingContextId) -> Option<u16> {
        self.id.iter().position(|&i| i == id).map(|p| p as u16)
    }

    /// Iterate over the direct children of the context at `position`.
    pub fn children(&self, position: u16) -> impl Iterator<Item = u16> + '_ {
        let end = position + self.skip(position);
        let mut current = position + 1;
        std::iter::from_fn(move || {
            if current >= end {
                return None;
            }
            let child = current;
            current += self.skip(child);
            Some(child)
        })
    }

    /// Insert a new context at `position` with `skip = 1`.
    fn insert(&mut self, position: usize, id: StackingContextId, z_index: i32, block: BlockRef) {
        self.skip.insert(position, 1);
        self.id.insert(position, id);
        self.z_index.insert(position, z_index);
        self.block.insert(position, block);
        self.ifcs.insert(position, Vec::new());
    }
}

/// How a block participates in stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingContextInfo {
    /// The block creates no stacking context.
    None,
    /// [§ 9.9.1](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    /// "The box also establishes a new stacking context" — and may host
    /// descendant contexts (relatively positioned boxes, the root).
    Parentable(i32),
    /// A context that cannot host descendants: contexts created beneath it
    /// become its *siblings* (absolutely positioned boxes, inline-blocks,
    /// whose contents live in a separate block subtree).
    NonParentable(i32),
}

/// What a push recorded, for the matching pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushKind {
    None,
    Parentable,
    NonParentable,
}

/// An open parentable context: its current position in the tree and its
/// accumulated subtree size (folded into the parent on pop).
#[derive(Debug, Clone, Copy)]
struct OpenContext {
    position: usize,
    skip: u16,
}

/// Debug-only tracking of contexts whose owning block is not yet assigned.
///
/// The release impl is a zero-sized no-op; the debug impl catches layout
/// paths that push a context without ever patching its block in.
pub trait IncompleteTracking: Default {
    /// Record a context with a pending block reference.
    fn insert(&mut self, id: StackingContextId);
    /// Clear a context whose block has been assigned.
    fn remove(&mut self, id: StackingContextId);
    /// Whether any context is still pending.
    fn is_empty(&self) -> bool;
}

/// [`IncompleteTracking`] backed by a `HashSet` (debug builds).
#[derive(Debug, Default)]
pub struct DebugIncompleteSet {
    pending: HashSet<StackingContextId>,
}

impl IncompleteTracking for DebugIncompleteSet {
    fn insert(&mut self, id: StackingContextId) {
        let _ = self.pending.insert(id);
    }

    fn remove(&mut self, id: StackingContextId) {
        let _ = self.pending.remove(&id);
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Zero-sized [`IncompleteTracking`] (release builds).
#[derive(Debug, Default)]
pub struct NoopIncompleteSet;

impl IncompleteTracking for NoopIncompleteSet {
    fn insert(&mut self, _id: StackingContextId) {}

    fn remove(&mut self, _id: StackingContextId) {}

    fn is_empty(&self) -> bool {
        true
    }
}

/// The incomplete-context set selected at build time.
#[cfg(debug_assertions)]
pub type DefaultIncompleteSet = DebugIncompleteSet;

/// The incomplete-context set selected at build time.
#[cfg(not(debug_assertions))]
pub type DefaultIncompleteSet = NoopIncompleteSet;

/// Builds the stacking-context tree during layout.
///
/// Layout calls [`StackingContextManager::push`] for every block it enters
/// and [`StackingContextManager::pop`] when it leaves; pushes that create a
/// context insert into the tree at the z-index-sorted position within the
/// current parentable context's children.
#[derive(Debug, Default)]
pub struct StackingContextManager<I: IncompleteTracking = DefaultIncompleteSet> {
    /// One entry per enclosing block: what its push created.
    tag_stack: Vec<PushKind>,
    /// Currently open parentable contexts, outermost first.
    context_stack: Vec<OpenContext>,
    /// Monotonic id allocator.
    next_id: StackingContextId,
    /// Position of the innermost open parentable context.
    current_index: usize,
    /// Contexts pushed without a block, not yet patched.
    incompletes: I,
}

impl<I: IncompleteTracking> StackingContextManager<I> {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag_stack: Vec::new(),
            context_stack: Vec::new(),
            next_id: 0,
            current_index: 0,
            incompletes: I::default(),
        }
    }

    /// Enter a block. Creates a stacking context when `info` asks for one,
    /// returning its id.
    pub fn push(
        &mut self,
        info: StackingContextInfo,
        tree: &mut BoxTree,
        block: BlockRef,
    ) -> Option<StackingContextId> {
        self.push_with_block(info, tree, block, false)
    }

    /// Like [`StackingContextManager::push`], but the owning block is not
    /// known yet. The caller must patch it in with
    /// [`StackingContextManager::set_block`] before layout completes.
    pub fn push_without_block(
        &mut self,
        info: StackingContextInfo,
        tree: &mut BoxTree,
    ) -> Option<StackingContextId> {
        self.push_with_block(info, tree, PENDING_BLOCK, true)
    }

    fn push_with_block(
        &mut self,
        info: StackingContextInfo,
        tree: &mut BoxTree,
        block: BlockRef,
        pending: bool,
    ) -> Option<StackingContextId> {
        let (z_index, parentable) = match info {
            StackingContextInfo::None => {
                self.tag_stack.push(PushKind::None);
                return None;
            }
            StackingContextInfo::Parentable(z) => (z, true),
            StackingContextInfo::NonParentable(z) => (z, false),
        };

        let position = self.insertion_position(&tree.sc_tree, z_index);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        tree.sc_tree.insert(position, id, z_index, block);
        if pending {
            self.incompletes.insert(id);
        }

        if parentable {
            self.tag_stack.push(PushKind::Parentable);
            self.context_stack.push(OpenContext { position, skip: 1 });
            self.current_index = position;
        } else {
            self.tag_stack.push(PushKind::NonParentable);
            // Non-parentable contexts are complete immediately; fold them
            // into the enclosing parentable context right away.
            if let Some(parent) = self.context_stack.last_mut() {
                parent.skip += 1;
            }
        }

        Some(id)
    }

    /// Find where a new child of the current parentable context belongs:
    /// after every existing child whose z-index is less than or equal to
    /// the new one. Equal z-indices keep document order, so siblings paint
    /// back-to-front in source order.
    fn insertion_position(&self, sc_tree: &StackingContextTree, z_index: i32) -> usize {
        let Some(parent) = self.context_stack.last() else {
            // First context: the tree is empty and this becomes the root.
            return sc_tree.skip.len();
        };

        let begin = parent.position + 1;
        let end = parent.position + usize::from(parent.skip);
        let mut position = begin;
        while position < end {
            if sc_tree.z_index[position] > z_index {
                break;
            }
            position += usize::from(sc_tree.skip[position]);
        }
        position
    }

    /// Leave a block, undoing its push. Parentable contexts write their
    /// final skip into the tree and fold it into the enclosing context.
    pub fn pop(&mut self, tree: &mut BoxTree) {
        let Some(kind) = self.tag_stack.pop() else {
            return;
        };
        if kind != PushKind::Parentable {
            return;
        }

        let Some(frame) = self.context_stack.pop() else {
            return;
        };
        tree.sc_tree.skip[frame.position] = frame.skip;
        if let Some(parent) = self.context_stack.last_mut() {
            parent.skip += frame.skip;
            self.current_index = parent.position;
        } else {
            self.current_index = 0;
        }
    }

    /// Patch the owning block of a context created with
    /// [`StackingContextManager::push_without_block`].
    pub fn set_block(&mut self, tree: &mut BoxTree, id: StackingContextId, block: BlockRef) {
        if let Some(position) = tree.sc_tree.position_of(id) {
            tree.sc_tree.block[usize::from(position)] = block;
        }
        self.incompletes.remove(id);
    }

    /// Associate an inline formatting context with the current stacking
    /// context; IFCs paint after their context's block backgrounds.
    pub fn add_ifc(&mut self, tree: &mut BoxTree, ifc: IfcId) {
        if self.context_stack.is_empty() {
            return;
        }
        tree.sc_tree.ifcs[self.current_index].push(ifc);
    }

    /// Whether construction finished cleanly: both stacks unwound and no
    /// context left without an owning block.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tag_stack.is_empty() && self.context_stack.is_empty() && self.incompletes.is_empty()
    }

    /// Discard all construction state. Layout calls this when it aborts
    /// with an error and the partial tree is about to be dropped.
    pub fn abandon(&mut self) {
        self.tag_stack.clear();
        self.context_stack.clear();
        self.incompletes = I::default();
    }
}

impl<I: IncompleteTracking> Drop for StackingContextManager<I> {
    fn drop(&mut self) {
        debug_assert!(
            self.tag_stack.is_empty(),
            "stacking-context manager dropped with unpopped tags"
        );
        debug_assert!(
            self.context_stack.is_empty(),
            "stacking-context manager dropped with open contexts"
        );
        debug_assert!(
            self.incompletes.is_empty(),
            "stacking-context manager dropped with incomplete contexts"
        );
    }
}
