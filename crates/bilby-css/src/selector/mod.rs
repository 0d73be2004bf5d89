//! CSS selector parsing and matching
//!
//! This module implements selector parsing and matching per
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/).
//!
//! Selectors are parsed out of a qualified rule's prelude — a range of the
//! component tree — and matched top-down, right-to-left against elements of
//! a [`bilby_dom::ElementTree`]. Namespace prefixes are resolved at parse
//! time against the stylesheet's prefix map, so matching compares interned
//! [`NamespaceId`]s instead of strings.

use std::collections::HashMap;

use bilby_common::warning::warn_once;
use bilby_dom::{Category, ElementId, ElementTree, NamespaceId};

use crate::parser::{ComponentIndex, ComponentTag, ComponentTree};
use crate::tokenizer::{copy_ident, decode_string};

/// The namespace constraint of a type or universal selector.
///
/// [§ 6.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
///
/// "The namespace component may be left empty (no namespace component) to
/// indicate that the selector is only to represent elements with no
/// namespace... an asterisk may be used for the namespace prefix,
/// indicating that the selector represents elements in any namespace."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `*|E` — elements in any namespace, or no namespace.
    Any,
    /// `|E` — elements with no namespace.
    NoNamespace,
    /// `ns|E` or unprefixed `E` under a default namespace.
    Specific(NamespaceId),
}

impl NamespaceConstraint {
    /// Whether an element's namespace satisfies this constraint.
    #[must_use]
    pub fn matches(self, namespace: Option<NamespaceId>) -> bool {
        match self {
            Self::Any => true,
            Self::NoNamespace => namespace.is_none(),
            Self::Specific(id) => namespace == Some(id),
        }
    }
}

/// [§ 6 Simple selectors](https://www.w3.org/TR/selectors-3/#selector-syntax)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 6.1 Type selector](https://www.w3.org/TR/selectors-3/#type-selectors)
    /// "A type selector is the name of a document language element type."
    Type {
        /// Resolved namespace constraint.
        namespace: NamespaceConstraint,
        /// The element's local name.
        name: String,
    },

    /// [§ 6.2 Universal selector](https://www.w3.org/TR/selectors-3/#universal-selector)
    /// "The universal selector, written as a CSS qualified name with an
    /// asterisk as the local name, represents the qualified name of any
    /// element type."
    Universal {
        /// Resolved namespace constraint.
        namespace: NamespaceConstraint,
    },

    /// [§ 6.4 Class selector](https://www.w3.org/TR/selectors-3/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.5 ID selector](https://www.w3.org/TR/selectors-3/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    Attribute(AttributeSelector),

    /// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
    /// Structural pseudo-class that requires tree context to match.
    PseudoClass(PseudoClass),

    /// Pseudo-class or pseudo-element that never matches in this engine
    /// (interactive states, functional pseudo-classes, `::before`-style
    /// pseudo-elements). Its presence does not invalidate the selector.
    NeverMatch,
}

/// Structural pseudo-classes per [§ 6.6.4](https://www.w3.org/TR/selectors-3/#structural-pseudos)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// ":root pseudo-class represents an element that is the root of the
    /// document."
    Root,
    /// ":first-child pseudo-class represents an element that is the first
    /// child of some other element."
    FirstChild,
    /// ":last-child pseudo-class represents an element that is the last
    /// child of some other element."
    LastChild,
    /// ":empty pseudo-class represents an element that has no children at
    /// all."
    Empty,
}

/// Attribute selectors per [§ 6.3](https://www.w3.org/TR/selectors-3/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]` — "Represents an element with the att attribute, whatever
    /// the value of the attribute."
    Exists(String),
    /// `[attr=val]` — "whose value is exactly 'val'."
    Equals(String, String),
    /// `[attr~=val]` — "a whitespace-separated list of words, one of which
    /// is exactly 'val'."
    Includes(String, String),
    /// `[attr|=val]` — "exactly 'val' or beginning with 'val' immediately
    /// followed by '-'."
    DashMatch(String, String),
    /// `[attr^=val]` — "begins with the prefix 'val'."
    PrefixMatch(String, String),
    /// `[attr$=val]` — "ends with the suffix 'val'."
    SuffixMatch(String, String),
    /// `[attr*=val]` — "contains at least one instance of the substring
    /// 'val'."
    SubstringMatch(String, String),
}

/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
///
/// "A sequence of simple selectors is a chain of simple selectors that are
/// not separated by a combinator... represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors of this compound, all of which must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 8.1 Descendant combinator](https://www.w3.org/TR/selectors-3/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,
    /// [§ 8.2 Child combinator](https://www.w3.org/TR/selectors-3/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    Child,
    /// [§ 8.3.1 Adjacent sibling combinator](https://www.w3.org/TR/selectors-3/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A."
    NextSibling,
    /// [§ 8.3.2 General sibling combinator](https://www.w3.org/TR/selectors-3/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately)."
    SubsequentSibling,
}

/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
///
/// "A selector is a chain of one or more sequences of simple selectors
/// separated by combinators."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector — the subject of the selector.
    pub subject: CompoundSelector,
    /// Chain of `(combinator, compound)` pairs going left from the subject.
    /// Matching walks this chain upward/backward from the subject element.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 9 Calculating a selector's specificity](https://www.w3.org/TR/selectors-3/#specificity)
///
/// "A selector's specificity is calculated as follows:
///  - count the number of ID selectors in the selector (= a)
///  - count the number of class selectors, attributes selectors, and
///    pseudo-classes in the selector (= b)
///  - count the number of type selectors and pseudo-elements in the
///    selector (= c)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A parsed complex selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
    /// The specificity of this selector.
    pub specificity: Specificity,
}

/// A comma-separated selector list.
///
/// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)
///
/// "A comma-separated list of selectors represents the union of all
/// elements selected by each of the individual selectors in the list."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// The selectors of the list, in source order.
    pub selectors: Vec<ParsedSelector>,
}

impl SelectorList {
    /// Whether any selector of the list matches the element.
    ///
    /// Returns the highest specificity among the matching selectors, or
    /// `None` when nothing matches.
    #[must_use]
    pub fn match_element(&self, tree: &ElementTree, element: ElementId) -> Option<Specificity> {
        self.selectors
            .iter()
            .filter(|s| s.matches(tree, element))
            .map(|s| s.specificity)
            .max()
    }
}

/// Namespace context for selector parsing: the stylesheet's prefix map and
/// default namespace.
///
/// [§ 6.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
///
/// "If the namespace prefix is declared... element type selectors without a
/// namespace component... represent elements in the default namespace."
#[derive(Debug, Clone, Copy)]
pub struct NamespaceContext<'a> {
    /// Declared prefix → namespace bindings.
    pub prefixes: &'a HashMap<String, NamespaceId>,
    /// The declared default namespace, if any.
    pub default: Option<NamespaceId>,
}

impl NamespaceContext<'_> {
    /// The constraint of an unprefixed type/universal selector.
    fn unprefixed(&self) -> NamespaceConstraint {
        self.default
            .map_or(NamespaceConstraint::Any, NamespaceConstraint::Specific)
    }

    /// Resolve an explicit prefix. `None` for undeclared prefixes, which
    /// invalidate the selector.
    fn resolve(&self, prefix: &str) -> Option<NamespaceConstraint> {
        self.prefixes
            .get(prefix)
            .copied()
            .map(NamespaceConstraint::Specific)
    }
}

impl ParsedSelector {
    /// [§ 3 Case sensitivity](https://www.w3.org/TR/selectors-3/#casesens) /
    /// matching entry point.
    ///
    /// Match this selector against an element with full tree context.
    /// The subject compound is tested first; the combinator chain is then
    /// walked right-to-left, moving to ancestors or preceding siblings as
    /// each combinator demands.
    #[must_use]
    pub fn matches(&self, tree: &ElementTree, element: ElementId) -> bool {
        if !compound_matches(&self.complex.subject, tree, element) {
            return false;
        }

        let mut current = element;
        for (combinator, compound) in &self.complex.combinators {
            match combinator {
                // "an element B that is an arbitrary descendant of some
                // ancestor element A"
                Combinator::Descendant => {
                    let matched = tree
                        .ancestors(current)
                        .find(|&ancestor| compound_matches(compound, tree, ancestor));
                    match matched {
                        Some(ancestor) => current = ancestor,
                        None => return false,
                    }
                }

                // "an element B that is a direct child of element A"
                Combinator::Child => {
                    let Some(parent) = tree.parent(current) else {
                        return false;
                    };
                    if !compound_matches(compound, tree, parent) {
                        return false;
                    }
                    current = parent;
                }

                // "an element B that immediately follows element A"
                Combinator::NextSibling => {
                    let Some(prev) = previous_normal_sibling(tree, current) else {
                        return false;
                    };
                    if !compound_matches(compound, tree, prev) {
                        return false;
                    }
                    current = prev;
                }

                // "an element B that follows element A (not necessarily
                // immediately)"
                Combinator::SubsequentSibling => {
                    let matched = tree
                        .preceding_siblings(current)
                        .filter(|&s| tree.category(s) == Category::Normal)
                        .find(|&s| compound_matches(compound, tree, s));
                    match matched {
                        Some(sibling) => current = sibling,
                        None => return false,
                    }
                }
            }
        }

        true
    }
}

/// The nearest preceding sibling that is a normal element (text elements do
/// not participate in sibling combinators).
fn previous_normal_sibling(tree: &ElementTree, element: ElementId) -> Option<ElementId> {
    tree.preceding_siblings(element)
        .find(|&s| tree.category(s) == Category::Normal)
}

/// Check whether every simple selector of a compound matches the element.
fn compound_matches(compound: &CompoundSelector, tree: &ElementTree, element: ElementId) -> bool {
    if tree.category(element) != Category::Normal {
        return false;
    }
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, element))
}

fn simple_matches(simple: &SimpleSelector, tree: &ElementTree, element: ElementId) -> bool {
    match simple {
        // "A type selector... represents an instance of that element type in
        // the document tree."
        SimpleSelector::Type { namespace, name } => tree.name(element).is_some_and(|n| {
            namespace.matches(n.namespace) && n.local.eq_ignore_ascii_case(name)
        }),

        // "The universal selector... represents the qualified name of any
        // element type."
        SimpleSelector::Universal { namespace } => tree
            .name(element)
            .is_some_and(|n| namespace.matches(n.namespace)),

        // "The class selector is given as a full stop immediately followed
        // by an identifier."
        SimpleSelector::Class(class) => tree
            .attribute(element, "class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|w| w == class)),

        // "An ID selector represents an element instance that has an
        // identifier that matches the identifier in the ID selector."
        SimpleSelector::Id(id) => tree.attribute(element, "id").is_some_and(|v| v == id),

        SimpleSelector::Attribute(attr) => attribute_matches(attr, tree, element),

        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, element),

        SimpleSelector::NeverMatch => false,
    }
}

/// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
fn attribute_matches(attr: &AttributeSelector, tree: &ElementTree, element: ElementId) -> bool {
    match attr {
        AttributeSelector::Exists(name) => tree.attribute(element, name).is_some(),
        AttributeSelector::Equals(name, val) => {
            tree.attribute(element, name).is_some_and(|v| v == val)
        }
        AttributeSelector::Includes(name, val) => tree
            .attribute(element, name)
            .is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val)),
        AttributeSelector::DashMatch(name, val) => tree.attribute(element, name).is_some_and(|v| {
            v == val || (v.starts_with(val.as_str()) && v[val.len()..].starts_with('-'))
        }),
        AttributeSelector::PrefixMatch(name, val) => tree
            .attribute(element, name)
            .is_some_and(|v| v.starts_with(val.as_str())),
        AttributeSelector::SuffixMatch(name, val) => tree
            .attribute(element, name)
            .is_some_and(|v| v.ends_with(val.as_str())),
        AttributeSelector::SubstringMatch(name, val) => tree
            .attribute(element, name)
            .is_some_and(|v| v.contains(val.as_str())),
    }
}

/// [§ 6.6.4 Structural pseudo-classes](https://www.w3.org/TR/selectors-3/#structural-pseudos)
fn pseudo_class_matches(pc: PseudoClass, tree: &ElementTree, element: ElementId) -> bool {
    match pc {
        // ":root pseudo-class represents an element that is the root of the
        // document."
        PseudoClass::Root => tree.parent(element).is_none(),

        // ":first-child... an element that is the first child of some other
        // element." Text siblings are ignored.
        PseudoClass::FirstChild => tree.parent(element).is_some_and(|parent| {
            tree.children(parent)
                .iter()
                .find(|&&c| tree.category(c) == Category::Normal)
                == Some(&element)
        }),

        // ":last-child... an element that is the last child of some other
        // element."
        PseudoClass::LastChild => tree.parent(element).is_some_and(|parent| {
            tree.children(parent)
                .iter()
                .rev()
                .find(|&&c| tree.category(c) == Category::Normal)
                == Some(&element)
        }),

        // ":empty pseudo-class represents an element that has no children
        // at all." Whitespace-only text counts as empty here.
        PseudoClass::Empty => tree.children(element).iter().all(|&c| {
            tree.text(c).is_some_and(|t| t.trim().is_empty())
        }),
    }
}

impl ComplexSelector {
    /// [§ 9 Calculating a selector's specificity](https://www.w3.org/TR/selectors-3/#specificity)
    ///
    /// Sum the specificity of every compound in the chain.
    #[must_use]
    pub fn calculate_specificity(&self) -> Specificity {
        let mut spec = compound_specificity(&self.subject);
        for (_, compound) in &self.combinators {
            let s = compound_specificity(compound);
            spec.0 += s.0;
            spec.1 += s.1;
            spec.2 += s.2;
        }
        spec
    }
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    let mut spec = Specificity::default();
    for simple in &compound.simple_selectors {
        match simple {
            // "count the number of ID selectors in the selector (= a)"
            SimpleSelector::Id(_) => spec.0 += 1,
            // "count the number of class selectors, attributes selectors,
            // and pseudo-classes in the selector (= b)"
            SimpleSelector::Class(_)
            | SimpleSelector::Attribute(_)
            | SimpleSelector::PseudoClass(_) => spec.1 += 1,
            // "count the number of type selectors... (= c)"
            SimpleSelector::Type { .. } => spec.2 += 1,
            // "Ignore the universal selector."
            SimpleSelector::Universal { .. } | SimpleSelector::NeverMatch => {}
        }
    }
    spec
}

/// Parse a comma-separated selector list from a prelude range
/// `[start, end)` of the component tree.
///
/// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)
///
/// "If just one of these selectors were invalid, the entire group of
/// selectors would be invalid." Returns `None` in that case; the caller
/// drops the rule.
#[must_use]
pub fn parse_selector_list(
    tree: &ComponentTree,
    start: ComponentIndex,
    end: ComponentIndex,
    namespaces: NamespaceContext<'_>,
) -> Option<SelectorList> {
    let mut parser = SelectorParser {
        tree,
        index: start,
        end,
        namespaces,
    };
    let mut selectors = Vec::new();

    loop {
        let selector = parser.parse_complex_selector()?;
        selectors.push(selector);
        if !parser.consume_comma() {
            break;
        }
    }
    if !parser.at_end() {
        return None;
    }
    if selectors.is_empty() {
        return None;
    }
    Some(SelectorList { selectors })
}

/// Component-range selector parser state.
struct SelectorParser<'a> {
    tree: &'a ComponentTree,
    index: ComponentIndex,
    end: ComponentIndex,
    namespaces: NamespaceContext<'a>,
}

impl SelectorParser<'_> {
    /// Skip whitespace and comments; report whether any were skipped.
    fn skip_space(&mut self) -> bool {
        let mut skipped = false;
        while self.index < self.end
            && matches!(
                self.tree.tag(self.index),
                ComponentTag::TokenWhitespace | ComponentTag::TokenComment
            )
        {
            self.index = self.tree.next_sibling(self.index);
            skipped = true;
        }
        skipped
    }

    fn at_end(&mut self) -> bool {
        let _ = self.skip_space();
        self.index >= self.end
    }

    /// Consume a comma if one is next (after whitespace).
    fn consume_comma(&mut self) -> bool {
        let _ = self.skip_space();
        if self.index < self.end && self.tree.tag(self.index) == ComponentTag::TokenComma {
            self.index = self.tree.next_sibling(self.index);
            return true;
        }
        false
    }

    fn peek_tag(&self) -> Option<ComponentTag> {
        (self.index < self.end).then(|| self.tree.tag(self.index))
    }

    fn advance(&mut self) {
        self.index = self.tree.next_sibling(self.index);
    }

    fn delim(&self) -> Option<char> {
        self.tree.extra(self.index).codepoint()
    }

    /// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
    ///
    /// Parse one complex selector: compound selectors joined by
    /// combinators. Whitespace between compounds is the descendant
    /// combinator unless an explicit combinator follows it.
    fn parse_complex_selector(&mut self) -> Option<ParsedSelector> {
        let _ = self.skip_space();

        let mut compounds = vec![self.parse_compound_selector()?];
        let mut combinators_between = Vec::new();

        loop {
            let had_space = self.skip_space();
            let Some(tag) = self.peek_tag() else { break };

            // Explicit combinator?
            let explicit = match tag {
                ComponentTag::TokenDelim => match self.delim() {
                    Some('>') => Some(Combinator::Child),
                    Some('+') => Some(Combinator::NextSibling),
                    Some('~') => Some(Combinator::SubsequentSibling),
                    _ => None,
                },
                _ => None,
            };

            if let Some(combinator) = explicit {
                self.advance();
                let _ = self.skip_space();
                combinators_between.push(combinator);
                compounds.push(self.parse_compound_selector()?);
                continue;
            }

            // A comma ends this selector; anything else after whitespace is
            // a descendant combinator.
            if tag == ComponentTag::TokenComma {
                break;
            }
            if !had_space {
                // Two compounds with no separator — invalid.
                return None;
            }
            combinators_between.push(Combinator::Descendant);
            compounds.push(self.parse_compound_selector()?);
        }

        // "The elements represented by a selector are the elements matched
        // by the last sequence of simple selectors."
        let subject = compounds.pop()?;

        // Pair each remaining compound with the combinator to its right, in
        // right-to-left order, so matching can walk up from the subject.
        let mut chain = Vec::new();
        for (compound, combinator) in compounds.into_iter().zip(combinators_between).rev() {
            chain.push((combinator, compound));
        }

        let complex = ComplexSelector {
            subject,
            combinators: chain,
        };
        let specificity = complex.calculate_specificity();
        Some(ParsedSelector {
            complex,
            specificity,
        })
    }

    /// [§ 4](https://www.w3.org/TR/selectors-3/#selector-syntax)
    ///
    /// Parse a sequence of simple selectors with no intervening whitespace.
    fn parse_compound_selector(&mut self) -> Option<CompoundSelector> {
        let mut simple_selectors = Vec::new();

        loop {
            let Some(tag) = self.peek_tag() else { break };
            match tag {
                // Type selector or `ns|E` qualified name.
                ComponentTag::TokenIdent => {
                    let name = copy_ident(self.tree.source(), self.tree.location(self.index));
                    self.advance();
                    simple_selectors.push(self.finish_qualified_name(Some(name))?);
                }

                // `#id`
                ComponentTag::TokenHashId => {
                    let id = copy_ident(self.tree.source(), self.tree.location(self.index) + 1);
                    self.advance();
                    simple_selectors.push(SimpleSelector::Id(id));
                }

                // A hash whose value is not an identifier cannot be an ID
                // selector.
                ComponentTag::TokenHashUnrestricted => return None,

                // `.class`, `*`, `|E`
                ComponentTag::TokenDelim => match self.delim() {
                    Some('.') => {
                        self.advance();
                        if self.peek_tag() != Some(ComponentTag::TokenIdent) {
                            return None;
                        }
                        let class =
                            copy_ident(self.tree.source(), self.tree.location(self.index));
                        self.advance();
                        simple_selectors.push(SimpleSelector::Class(class));
                    }
                    Some('*') => {
                        self.advance();
                        simple_selectors.push(self.finish_qualified_name(None)?);
                    }
                    Some('|') => {
                        // `|E` — explicit no-namespace qualified name.
                        self.advance();
                        simple_selectors
                            .push(self.parse_local_name(NamespaceConstraint::NoNamespace)?);
                    }
                    _ => break,
                },

                // `:pseudo-class`, `::pseudo-element`
                ComponentTag::TokenColon => {
                    self.advance();
                    simple_selectors.push(self.parse_pseudo()?);
                }

                // `[attr...]`
                ComponentTag::SimpleBlockBracket => {
                    let attr = self.parse_attribute_selector()?;
                    simple_selectors.push(SimpleSelector::Attribute(attr));
                }

                _ => break,
            }
        }

        if simple_selectors.is_empty() {
            return None;
        }
        Some(CompoundSelector { simple_selectors })
    }

    /// Complete a qualified name whose first part was `name` (ident) or `*`
    /// (`None`). If a `|` follows immediately, the first part was a
    /// namespace prefix and the local name comes after.
    ///
    /// [§ 6.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
    fn finish_qualified_name(&mut self, name: Option<String>) -> Option<SimpleSelector> {
        let followed_by_bar = self.peek_tag() == Some(ComponentTag::TokenDelim)
            && self.delim() == Some('|');
        // `a|b` but not `a|=b` (that form only occurs inside brackets).
        if followed_by_bar {
            let namespace = match &name {
                Some(prefix) => match self.namespaces.resolve(prefix) {
                    Some(ns) => ns,
                    None => {
                        warn_once("CSS", "selector uses undeclared namespace prefix");
                        return None;
                    }
                },
                None => NamespaceConstraint::Any,
            };
            self.advance(); // |
            return self.parse_local_name(namespace);
        }

        let namespace = self.namespaces.unprefixed();
        Some(match name {
            Some(name) => SimpleSelector::Type { namespace, name },
            None => SimpleSelector::Universal { namespace },
        })
    }

    /// The local-name half of a qualified name: `E` or `*`.
    fn parse_local_name(&mut self, namespace: NamespaceConstraint) -> Option<SimpleSelector> {
        match self.peek_tag()? {
            ComponentTag::TokenIdent => {
                let name = copy_ident(self.tree.source(), self.tree.location(self.index));
                self.advance();
                Some(SimpleSelector::Type { namespace, name })
            }
            ComponentTag::TokenDelim if self.delim() == Some('*') => {
                self.advance();
                Some(SimpleSelector::Universal { namespace })
            }
            _ => None,
        }
    }

    /// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes) /
    /// [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
    ///
    /// The colon has been consumed. Structural pseudo-classes the engine
    /// understands are matched; everything else (interactive states,
    /// functional forms, pseudo-elements) degrades to [`SimpleSelector::NeverMatch`]
    /// without invalidating the rule.
    fn parse_pseudo(&mut self) -> Option<SimpleSelector> {
        // Second colon: pseudo-element.
        let is_pseudo_element = self.peek_tag() == Some(ComponentTag::TokenColon);
        if is_pseudo_element {
            self.advance();
        }

        match self.peek_tag()? {
            ComponentTag::TokenIdent => {
                let location = self.tree.location(self.index);
                let name = copy_ident(self.tree.source(), location).to_ascii_lowercase();
                self.advance();
                if is_pseudo_element {
                    return Some(SimpleSelector::NeverMatch);
                }
                Some(match name.as_str() {
                    "root" => SimpleSelector::PseudoClass(PseudoClass::Root),
                    "first-child" => SimpleSelector::PseudoClass(PseudoClass::FirstChild),
                    "last-child" => SimpleSelector::PseudoClass(PseudoClass::LastChild),
                    "empty" => SimpleSelector::PseudoClass(PseudoClass::Empty),
                    // Interactive states and unknown pseudo-classes never
                    // match but keep the rule alive.
                    _ => SimpleSelector::NeverMatch,
                })
            }
            // Functional pseudo-class (`:nth-child(...)`, `:not(...)`):
            // skip the whole function subtree.
            ComponentTag::Function => {
                self.advance();
                Some(SimpleSelector::NeverMatch)
            }
            _ => None,
        }
    }

    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    ///
    /// Parse the contents of a `[...]` block.
    fn parse_attribute_selector(&mut self) -> Option<AttributeSelector> {
        let block = self.index;
        let mut inner = SelectorParser {
            tree: self.tree,
            index: block + 1,
            end: self.tree.next_sibling(block),
            namespaces: self.namespaces,
        };
        self.advance(); // past the whole block

        let _ = inner.skip_space();
        if inner.peek_tag() != Some(ComponentTag::TokenIdent) {
            return None;
        }
        let name = copy_ident(inner.tree.source(), inner.tree.location(inner.index));
        inner.advance();
        let _ = inner.skip_space();

        // `[attr]`
        if inner.index >= inner.end {
            return Some(AttributeSelector::Exists(name));
        }

        // Operator: `=`, or one of `~ | ^ $ *` immediately followed by `=`.
        if inner.peek_tag() != Some(ComponentTag::TokenDelim) {
            return None;
        }
        let op = inner.delim()?;
        inner.advance();
        let op = match op {
            '=' => '=',
            '~' | '|' | '^' | '$' | '*' => {
                if inner.peek_tag() != Some(ComponentTag::TokenDelim)
                    || inner.delim() != Some('=')
                {
                    return None;
                }
                inner.advance();
                op
            }
            _ => return None,
        };

        let _ = inner.skip_space();
        let value = match inner.peek_tag()? {
            ComponentTag::TokenIdent => {
                copy_ident(inner.tree.source(), inner.tree.location(inner.index))
            }
            ComponentTag::TokenString => {
                decode_string(inner.tree.source(), inner.tree.location(inner.index))
            }
            _ => return None,
        };
        inner.advance();
        if !inner.at_end() {
            return None;
        }

        Some(match op {
            '=' => AttributeSelector::Equals(name, value),
            '~' => AttributeSelector::Includes(name, value),
            '|' => AttributeSelector::DashMatch(name, value),
            '^' => AttributeSelector::PrefixMatch(name, value),
            '$' => AttributeSelector::SuffixMatch(name, value),
            '*' => AttributeSelector::SubstringMatch(name, value),
            _ => return None,
        })
    }
}
