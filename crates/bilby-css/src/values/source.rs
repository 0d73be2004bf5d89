//! The value source: a backtracking cursor over a component range.
//!
//! Property parsers read declaration values through this cursor. It walks a
//! sibling range of the component tree, skips whitespace and comments, and
//! classifies each component into the handful of shapes the property
//! grammars care about. On a grammar mismatch the parser restores the
//! cursor to wherever it was, so alternatives can be tried in sequence.

use crate::parser::{ComponentIndex, ComponentTag, ComponentTree};
use crate::tokenizer::{DimensionUnit, decode_url, ident_eq_ignore_case};

/// The grammar-level shape of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// An identifier (`auto`, `repeat-x`, ...).
    Keyword,
    /// An integer `<number-token>`.
    Integer,
    /// A `<percentage-token>`.
    Percentage,
    /// A `<dimension-token>`.
    Dimension,
    /// A `<url-token>`.
    Url,
    /// A `<hash-token>` of either type (hex colors).
    Hash,
    /// A function component (with its argument subtree).
    Function,
    /// Anything else.
    Unknown,
}

/// A classified component: its index in the tree plus its shape.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// Index of the component in the tree.
    pub index: ComponentIndex,
    /// Grammar-level classification.
    pub ty: ItemType,
}

/// A cursor over a sibling range `[index, end)` of a component tree.
#[derive(Debug, Clone, Copy)]
pub struct ValueSource<'a> {
    tree: &'a ComponentTree,
    index: ComponentIndex,
    end: ComponentIndex,
}

impl<'a> ValueSource<'a> {
    /// Create a cursor over `[start, end)`.
    #[must_use]
    pub const fn new(tree: &'a ComponentTree, start: ComponentIndex, end: ComponentIndex) -> Self {
        Self {
            tree,
            index: start,
            end,
        }
    }

    /// Create a cursor over the children of a container component.
    #[must_use]
    pub fn children_of(tree: &'a ComponentTree, container: ComponentIndex) -> Self {
        Self {
            tree,
            index: container + 1,
            end: tree.next_sibling(container),
        }
    }

    /// The tree this cursor walks.
    #[must_use]
    pub const fn tree(&self) -> &'a ComponentTree {
        self.tree
    }

    /// The cursor's current position, for [`ValueSource::reset`].
    #[must_use]
    pub const fn position(&self) -> ComponentIndex {
        self.index
    }

    /// Backtrack to a previously saved position.
    pub const fn reset(&mut self, position: ComponentIndex) {
        self.index = position;
    }

    /// Whether only whitespace and comments remain.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        let mut probe = *self;
        probe.next().is_none()
    }

    /// Advance past whitespace and comments, classify the current
    /// component, and step over its subtree.
    pub fn next(&mut self) -> Option<Item> {
        while self.index < self.end {
            let index = self.index;
            let tag = self.tree.tag(index);
            self.index = self.tree.next_sibling(index);
            let ty = match tag {
                ComponentTag::TokenWhitespace | ComponentTag::TokenComment => continue,
                ComponentTag::TokenIdent => ItemType::Keyword,
                ComponentTag::TokenInteger => ItemType::Integer,
                ComponentTag::TokenPercentage => ItemType::Percentage,
                ComponentTag::TokenDimension => ItemType::Dimension,
                ComponentTag::TokenUrl => ItemType::Url,
                ComponentTag::TokenHashId | ComponentTag::TokenHashUnrestricted => ItemType::Hash,
                ComponentTag::Function => ItemType::Function,
                _ => ItemType::Unknown,
            };
            return Some(Item { index, ty });
        }
        None
    }

    /// Like [`ValueSource::next`], but the cursor is restored if the item's
    /// type does not match.
    pub fn expect(&mut self, ty: ItemType) -> Option<Item> {
        let saved = self.position();
        match self.next() {
            Some(item) if item.ty == ty => Some(item),
            _ => {
                self.reset(saved);
                None
            }
        }
    }

    /// The pre-parsed integer payload of the component at `index`.
    #[must_use]
    pub fn integer(&self, index: ComponentIndex) -> i32 {
        self.tree.extra(index).integer().unwrap_or(0)
    }

    /// The pre-parsed numeric payload of the component at `index`.
    #[must_use]
    pub fn number(&self, index: ComponentIndex) -> f32 {
        self.tree.extra(index).number().unwrap_or(0.0)
    }

    /// The pre-parsed dimension payload of the component at `index`.
    #[must_use]
    pub fn dimension(&self, index: ComponentIndex) -> (f32, DimensionUnit) {
        self.tree
            .extra(index)
            .dimension()
            .unwrap_or((0.0, DimensionUnit::Unrecognized))
    }

    /// Case-insensitive keyword lookup: the first table entry whose name
    /// matches the identifier at `index` wins.
    ///
    /// Table names must be lowercase.
    #[must_use]
    pub fn map_keyword<T: Copy>(&self, index: ComponentIndex, table: &[(&str, T)]) -> Option<T> {
        let location = self.tree.location(index);
        table
            .iter()
            .find(|(name, _)| ident_eq_ignore_case(self.tree.source(), location, name))
            .map(|&(_, value)| value)
    }

    /// Whether the identifier at `index` equals `name` (lowercase),
    /// ASCII case-insensitively.
    #[must_use]
    pub fn keyword_is(&self, index: ComponentIndex, name: &str) -> bool {
        ident_eq_ignore_case(self.tree.source(), self.tree.location(index), name)
    }

    /// Decode the url text of the `<url-token>` at `index`.
    #[must_use]
    pub fn url(&self, index: ComponentIndex) -> String {
        decode_url(self.tree.source(), self.tree.location(index))
    }
}
