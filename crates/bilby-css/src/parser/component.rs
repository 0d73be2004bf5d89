//! The component tree: parsed CSS as a flat, skip-encoded tree.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! "The input to the parsing stage is a stream of tokens from the
//! tokenization stage. The output depends on how the parser is invoked."
//!
//! Instead of an owning-pointer tree, the output is one dense array of
//! tagged nodes. Every node records `next_sibling`, the index one past its
//! whole subtree, so a consumer can skip a subtree in O(1) and enumerate a
//! sibling range without chasing pointers. The cascade and the value parsers
//! traverse the same node set several times; the flat layout keeps those
//! passes cache-friendly.

use crate::tokenizer::{DimensionUnit, Location, token_extent};

/// Index of a component within a [`ComponentTree`].
pub type ComponentIndex = u32;

/// The kind of a component-tree node.
///
/// Container tags own the nodes between their index and their
/// `next_sibling`; `token_*` tags are leaves mirroring the preserved tokens
/// of [CSS Syntax Level 3 § 5](https://www.w3.org/TR/css-syntax-3/#parsing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentTag {
    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    /// The root of a parsed stylesheet.
    RuleList,

    /// [§ 5.4.9 Consume a list of component values](https://www.w3.org/TR/css-syntax-3/#consume-list-of-component-values)
    /// The root of a parsed component value list.
    ComponentValueList,

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    /// Location points at the at-keyword token; `extra` holds the index of
    /// the `{}` block that ends the prelude, if the rule has one.
    AtRule,

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    /// `extra` holds the index of the `{}` block that ends the prelude.
    QualifiedRule,

    /// [§ 5.4.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    /// A `{}` block.
    SimpleBlockCurly,

    /// A `[]` block.
    SimpleBlockBracket,

    /// A `()` block.
    SimpleBlockParen,

    /// [§ 5.4.9 Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    /// Location points at the function token (name + `(`).
    Function,

    /// A preserved `<ident-token>`.
    TokenIdent,

    /// A preserved `<at-keyword-token>` outside rule position.
    TokenAtKeyword,

    /// A preserved `<hash-token>` with type flag "id".
    TokenHashId,

    /// A preserved `<hash-token>` with type flag "unrestricted".
    TokenHashUnrestricted,

    /// A preserved `<string-token>`.
    TokenString,

    /// A preserved `<bad-string-token>`.
    TokenBadString,

    /// A preserved `<url-token>`.
    TokenUrl,

    /// A preserved `<bad-url-token>`.
    TokenBadUrl,

    /// A preserved `<delim-token>`; `extra` holds the code point.
    TokenDelim,

    /// A preserved integer `<number-token>`; `extra` holds the value.
    TokenInteger,

    /// A preserved non-integer `<number-token>`; `extra` holds the value.
    TokenNumber,

    /// A preserved `<percentage-token>`; `extra` holds the numeric value.
    TokenPercentage,

    /// A preserved `<dimension-token>`; `extra` holds value and unit class.
    TokenDimension,

    /// A preserved `<whitespace-token>`.
    TokenWhitespace,

    /// A preserved comment.
    TokenComment,

    /// A preserved `<CDO-token>`.
    TokenCdo,

    /// A preserved `<CDC-token>`.
    TokenCdc,

    /// A preserved `<colon-token>`.
    TokenColon,

    /// A preserved `<semicolon-token>`.
    TokenSemicolon,

    /// A preserved `<comma-token>`.
    TokenComma,
}

impl ComponentTag {
    /// Whether nodes of this tag own the range up to their `next_sibling`.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::RuleList
                | Self::ComponentValueList
                | Self::AtRule
                | Self::QualifiedRule
                | Self::SimpleBlockCurly
                | Self::SimpleBlockBracket
                | Self::SimpleBlockParen
                | Self::Function
        )
    }
}

/// Per-tag payload of a component node.
///
/// For `at_rule`/`qualified_rule` this names the index of the block that
/// ends the prelude; for `token_delim` it holds the delimiter code point;
/// for numeric tokens, the pre-parsed number.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Extra {
    /// No payload.
    #[default]
    None,
    /// An index into the same tree (a rule's body block).
    Index(ComponentIndex),
    /// A delimiter code point.
    Codepoint(char),
    /// A pre-parsed integer value.
    Integer(i32),
    /// A pre-parsed numeric value.
    Number(f32),
    /// A pre-parsed dimension: numeric value plus unit class.
    Dimension {
        /// The numeric part.
        number: f32,
        /// The classified unit.
        unit: DimensionUnit,
    },
}

impl Extra {
    /// The payload as a tree index, if it is one.
    #[must_use]
    pub const fn index(self) -> Option<ComponentIndex> {
        match self {
            Self::Index(i) => Some(i),
            _ => None,
        }
    }

    /// The payload as a delimiter code point, if it is one.
    #[must_use]
    pub const fn codepoint(self) -> Option<char> {
        match self {
            Self::Codepoint(c) => Some(c),
            _ => None,
        }
    }

    /// The payload as an integer, if it is one.
    #[must_use]
    pub const fn integer(self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// The payload as a number. Integer payloads convert; percentages and
    /// dimensions yield their numeric part.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn number(self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(n),
            Self::Integer(i) => Some(i as f32),
            Self::Dimension { number, .. } => Some(number),
            _ => None,
        }
    }

    /// The payload as a dimension, if it is one.
    #[must_use]
    pub const fn dimension(self) -> Option<(f32, DimensionUnit)> {
        match self {
            Self::Dimension { number, unit } => Some((number, unit)),
            _ => None,
        }
    }
}

/// A single node of the component tree.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    /// The node's kind.
    pub tag: ComponentTag,
    /// Byte offset of the node's first token in the source.
    pub location: Location,
    /// One past this node's subtree: for a container at index `i`, every
    /// node in `[i + 1, next_sibling)` is a descendant. Leaves store
    /// `index + 1`.
    pub next_sibling: ComponentIndex,
    /// Per-tag payload.
    pub extra: Extra,
}

/// A parsed stylesheet or component value list as a flat, skip-encoded tree.
///
/// Owns the source text; tokens and component nodes stay addressable until
/// the tree is dropped.
#[derive(Debug)]
pub struct ComponentTree {
    source: String,
    components: Vec<Component>,
}

impl ComponentTree {
    pub(crate) fn new(source: String) -> Self {
        Self {
            source,
            components: Vec::new(),
        }
    }

    pub(crate) fn components_mut(&mut self) -> &mut Vec<Component> {
        &mut self.components
    }

    /// The source text this tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of components in the tree.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> ComponentIndex {
        self.components.len() as ComponentIndex
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The component at `index`.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    #[must_use]
    pub fn get(&self, index: ComponentIndex) -> &Component {
        &self.components[index as usize]
    }

    /// The tag of the component at `index`.
    #[must_use]
    pub fn tag(&self, index: ComponentIndex) -> ComponentTag {
        self.get(index).tag
    }

    /// The source location of the component at `index`.
    #[must_use]
    pub fn location(&self, index: ComponentIndex) -> Location {
        self.get(index).location
    }

    /// One past the subtree of the component at `index`.
    #[must_use]
    pub fn next_sibling(&self, index: ComponentIndex) -> ComponentIndex {
        self.get(index).next_sibling
    }

    /// The payload of the component at `index`.
    #[must_use]
    pub fn extra(&self, index: ComponentIndex) -> Extra {
        self.get(index).extra
    }

    /// Iterate over the direct children of the container at `index`.
    pub fn children(&self, index: ComponentIndex) -> impl Iterator<Item = ComponentIndex> + '_ {
        let end = self.next_sibling(index);
        let mut current = index + 1;
        std::iter::from_fn(move || {
            if current >= end {
                return None;
            }
            let child = current;
            current = self.next_sibling(child);
            Some(child)
        })
    }

    /// Serialize the tree back to CSS text.
    ///
    /// [§ 9 Serialization](https://www.w3.org/TR/css-syntax-3/#serialization)
    ///
    /// "This specification does not define how to serialize CSS in general."
    /// The property this serializer maintains is the useful one: tokenizing
    /// the output again yields the tree's non-whitespace, non-comment tokens
    /// in order. Leaf text is recovered from the source by token extent;
    /// structural delimiters are re-emitted around containers.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        // Closers pending at a given component index, innermost last.
        let mut closers: Vec<(ComponentIndex, &str)> = Vec::new();

        for index in 0..self.len() {
            while let Some(&(at, closer)) = closers.last() {
                if index < at {
                    break;
                }
                out.push_str(closer);
                let _ = closers.pop();
            }

            let component = self.get(index);
            match component.tag {
                ComponentTag::RuleList | ComponentTag::ComponentValueList => {}
                ComponentTag::AtRule => {
                    // The at-keyword token itself; the terminating `;` is
                    // re-added for block-less rules.
                    out.push_str(self.token_text(component.location));
                    let closer = if component.extra.index().is_some() {
                        ""
                    } else {
                        ";"
                    };
                    closers.push((component.next_sibling, closer));
                }
                ComponentTag::QualifiedRule => {}
                ComponentTag::SimpleBlockCurly => {
                    out.push('{');
                    closers.push((component.next_sibling, "}"));
                }
                ComponentTag::SimpleBlockBracket => {
                    out.push('[');
                    closers.push((component.next_sibling, "]"));
                }
                ComponentTag::SimpleBlockParen => {
                    out.push('(');
                    closers.push((component.next_sibling, ")"));
                }
                ComponentTag::Function => {
                    // The function token text already includes the `(`.
                    out.push_str(self.token_text(component.location));
                    closers.push((component.next_sibling, ")"));
                }
                // Leaves: the token's own source text.
                _ => out.push_str(self.token_text(component.location)),
            }
        }

        while let Some((_, closer)) = closers.pop() {
            out.push_str(closer);
        }
        out
    }

    /// The source text of the token starting at `location`.
    fn token_text(&self, location: Location) -> &str {
        let start = location as usize;
        let len = token_extent(&self.source, location);
        &self.source[start..start + len]
    }
}
