//! Stylesheet assembly.
//!
//! [§ 3 Tokenizing and Parsing CSS](https://www.w3.org/TR/css-syntax-3/#parsing-overview)
//!
//! The assembler walks a parsed rule list and produces a [`Stylesheet`]:
//! style rules with parsed selector lists and typed declarations, plus the
//! sheet's namespace declarations. Declarations are parsed eagerly so the
//! component tree can be dropped once assembly finishes.

use std::collections::HashMap;

use bilby_common::warning::warn_once;
use bilby_dom::NamespaceId;

use crate::parser::{ComponentIndex, ComponentTag, ComponentTree};
use crate::selector::{NamespaceContext, SelectorList, parse_selector_list};
use crate::style::{CascadedValues, parse_declaration_block};
use crate::tokenizer::{copy_ident, decode_string, decode_url, ident_eq_ignore_case};

/// Engine-level environment shared between stylesheets and element trees.
///
/// [Namespaces in XML](https://www.w3.org/TR/xml-names/)
///
/// Namespace URLs are interned once; stylesheets and elements carry
/// [`NamespaceId`]s and matching compares ids.
#[derive(Debug, Default)]
pub struct Environment {
    namespaces: Vec<String>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a namespace URL, returning its stable id.
    pub fn intern_namespace(&mut self, url: &str) -> NamespaceId {
        if let Some(index) = self.namespaces.iter().position(|n| n == url) {
            return NamespaceId(index);
        }
        self.namespaces.push(url.to_owned());
        NamespaceId(self.namespaces.len() - 1)
    }

    /// The URL a namespace id was interned from.
    #[must_use]
    pub fn namespace_url(&self, id: NamespaceId) -> Option<&str> {
        self.namespaces.get(id.0).map(String::as_str)
    }
}

/// A style rule: a selector list and the declarations of its block.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// The rule's parsed selector list.
    pub selectors: SelectorList,
    /// The rule's declared values, split by importance.
    pub declarations: CascadedValues,
}

/// An assembled stylesheet.
///
/// Owns its rules, selectors, and declarations; the component tree it was
/// built from is no longer needed afterwards.
#[derive(Debug, Default)]
pub struct Stylesheet {
    /// Style rules in document order.
    pub rules: Vec<StyleRule>,
    /// Declared namespace prefixes.
    pub namespace_prefixes: HashMap<String, NamespaceId>,
    /// The declared default namespace, if any.
    pub default_namespace: Option<NamespaceId>,
}

/// Assemble a stylesheet from a parsed rule list.
///
/// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
///
/// Dispatches each top-level child by tag: `@namespace` updates the prefix
/// map, `@import` and unknown at-rules are logged and skipped, and
/// qualified rules become style rules. Rules whose selector list fails to
/// parse are dropped whole.
#[must_use]
pub fn build_stylesheet(tree: &ComponentTree, env: &mut Environment) -> Stylesheet {
    let mut sheet = Stylesheet::default();
    if tree.is_empty() || tree.tag(0) != ComponentTag::RuleList {
        return sheet;
    }

    for rule in tree.children(0) {
        match tree.tag(rule) {
            ComponentTag::AtRule => consume_at_rule(tree, rule, env, &mut sheet),
            ComponentTag::QualifiedRule => consume_style_rule(tree, rule, &mut sheet),
            _ => {}
        }
    }

    sheet
}

/// Handle one top-level at-rule.
fn consume_at_rule(
    tree: &ComponentTree,
    rule: ComponentIndex,
    env: &mut Environment,
    sheet: &mut Stylesheet,
) {
    // The at-keyword's name starts one byte past the `@`.
    let name_location = tree.location(rule) + 1;
    if ident_eq_ignore_case(tree.source(), name_location, "namespace") {
        consume_namespace_rule(tree, rule, env, sheet);
    } else if ident_eq_ignore_case(tree.source(), name_location, "import") {
        // Imports require fetching; the engine does no I/O.
        warn_once("CSS", "@import is not supported; rule skipped");
    } else {
        let name = copy_ident(tree.source(), name_location);
        warn_once("CSS", &format!("unknown at-rule '@{name}' skipped"));
    }
}

/// [CSS Namespaces Module Level 3 § 2](https://www.w3.org/TR/css-namespaces-3/#declaration)
///
/// "@namespace <prefix>? [ <string> | <url> ] ;"
///
/// "A syntactically invalid @namespace rule (whether malformed or
/// misplaced) must be ignored" — any extra tokens invalidate the rule and
/// leave the prefix map unchanged.
fn consume_namespace_rule(
    tree: &ComponentTree,
    rule: ComponentIndex,
    env: &mut Environment,
    sheet: &mut Stylesheet,
) {
    // A namespace rule has no block; its prelude is everything after the
    // at-keyword.
    if tree.extra(rule).index().is_some() {
        warn_once("CSS", "invalid @namespace rule skipped");
        return;
    }

    let end = tree.next_sibling(rule);
    let mut prefix: Option<String> = None;
    let mut url: Option<String> = None;
    let mut valid = true;

    let mut index = rule + 1;
    while index < end {
        match tree.tag(index) {
            ComponentTag::TokenWhitespace | ComponentTag::TokenComment => {}
            ComponentTag::TokenIdent if prefix.is_none() && url.is_none() => {
                prefix = Some(copy_ident(tree.source(), tree.location(index)));
            }
            ComponentTag::TokenUrl if url.is_none() => {
                url = Some(decode_url(tree.source(), tree.location(index)));
            }
            ComponentTag::TokenString if url.is_none() => {
                url = Some(decode_string(tree.source(), tree.location(index)));
            }
            _ => {
                valid = false;
                break;
            }
        }
        index = tree.next_sibling(index);
    }

    let Some(url) = url else {
        warn_once("CSS", "invalid @namespace rule skipped");
        return;
    };
    if !valid {
        warn_once("CSS", "invalid @namespace rule skipped");
        return;
    }

    let id = env.intern_namespace(&url);
    match prefix {
        Some(prefix) => {
            let _ = sheet.namespace_prefixes.insert(prefix, id);
        }
        None => sheet.default_namespace = Some(id),
    }
}

/// Handle one qualified rule: parse the prelude as a selector list and the
/// body as declarations.
fn consume_style_rule(tree: &ComponentTree, rule: ComponentIndex, sheet: &mut Stylesheet) {
    let Some(body) = tree.extra(rule).index() else {
        return;
    };

    let namespaces = NamespaceContext {
        prefixes: &sheet.namespace_prefixes,
        default: sheet.default_namespace,
    };
    let Some(selectors) = parse_selector_list(tree, rule + 1, body, namespaces) else {
        warn_once("CSS", "rule with unparsable selector list skipped");
        return;
    };

    let declarations = parse_declaration_block(tree, body);
    sheet.rules.push(StyleRule {
        selectors,
        declarations,
    });
}
