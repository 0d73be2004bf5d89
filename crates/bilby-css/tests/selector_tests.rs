//! Integration tests for selector parsing and matching.

use std::collections::HashMap;

use bilby_css::parser::parse_list_of_component_values;
use bilby_css::selector::{
    Combinator, NamespaceContext, SelectorList, SimpleSelector, Specificity, parse_selector_list,
};
use bilby_dom::{ElementId, ElementTree, NamespaceId};

/// Parse a bare selector list string (no namespaces declared).
fn parse(selector: &str) -> Option<SelectorList> {
    let tree = parse_list_of_component_values(selector);
    let prefixes = HashMap::new();
    parse_selector_list(
        &tree,
        1,
        tree.len(),
        NamespaceContext {
            prefixes: &prefixes,
            default: None,
        },
    )
}

/// Parse with a declared prefix map and optional default namespace.
fn parse_ns(
    selector: &str,
    prefixes: &HashMap<String, NamespaceId>,
    default: Option<NamespaceId>,
) -> Option<SelectorList> {
    let tree = parse_list_of_component_values(selector);
    parse_selector_list(
        &tree,
        1,
        tree.len(),
        NamespaceContext { prefixes, default },
    )
}

/// A small fixture:
/// `<article id="a" class="post featured"> <p> <span/> <em/> </p> <p/> </article>`
struct Fixture {
    tree: ElementTree,
    article: ElementId,
    p1: ElementId,
    span: ElementId,
    em: ElementId,
    p2: ElementId,
}

fn fixture() -> Fixture {
    let mut tree = ElementTree::new();
    let article = tree.alloc_element("article");
    tree.set_attribute(article, "id", "a");
    tree.set_attribute(article, "class", "post featured");
    let p1 = tree.alloc_element("p");
    let span = tree.alloc_element("span");
    tree.set_attribute(span, "lang", "en-US");
    let em = tree.alloc_element("em");
    let p2 = tree.alloc_element("p");
    tree.append_child(article, p1);
    tree.append_child(p1, span);
    tree.append_child(p1, em);
    tree.append_child(article, p2);
    Fixture {
        tree,
        article,
        p1,
        span,
        em,
        p2,
    }
}

fn matches(selector: &str, tree: &ElementTree, element: ElementId) -> bool {
    parse(selector)
        .expect("selector parses")
        .match_element(tree, element)
        .is_some()
}

// ─── parsing ────────────────────────────────────────────────────────────

#[test]
fn test_parse_type_selector() {
    let list = parse("div").expect("parses");
    assert_eq!(list.selectors.len(), 1);
    let subject = &list.selectors[0].complex.subject;
    assert!(matches!(
        &subject.simple_selectors[0],
        SimpleSelector::Type { name, .. } if name == "div"
    ));
}

#[test]
fn test_parse_compound_selector() {
    let list = parse("p.note#main[lang]").expect("parses");
    let subject = &list.selectors[0].complex.subject;
    assert_eq!(subject.simple_selectors.len(), 4);
}

#[test]
fn test_parse_selector_list_splits_on_commas() {
    let list = parse("h1, h2 , h3").expect("parses");
    assert_eq!(list.selectors.len(), 3);
}

#[test]
fn test_parse_combinators() {
    let list = parse("a > b + c ~ d e").expect("parses");
    let complex = &list.selectors[0].complex;
    // Chain is stored right-to-left from the subject.
    let chain: Vec<Combinator> = complex.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        chain,
        vec![
            Combinator::Descendant,
            Combinator::SubsequentSibling,
            Combinator::NextSibling,
            Combinator::Child,
        ]
    );
}

#[test]
fn test_invalid_selector_invalidates_the_list() {
    // One bad selector poisons the whole group.
    assert!(parse("div, 42%").is_none());
}

#[test]
fn test_unknown_pseudo_class_keeps_rule_alive() {
    let list = parse("a:hover").expect("parses");
    let subject = &list.selectors[0].complex.subject;
    assert!(subject
        .simple_selectors
        .iter()
        .any(|s| matches!(s, SimpleSelector::NeverMatch)));
}

// ─── specificity ────────────────────────────────────────────────────────

#[test]
fn test_specificity_counts() {
    // "#a .b c" → one id, one class, one type.
    let list = parse("#a .b c").expect("parses");
    assert_eq!(list.selectors[0].specificity, Specificity(1, 1, 1));
}

#[test]
fn test_specificity_ignores_universal() {
    let list = parse("*").expect("parses");
    assert_eq!(list.selectors[0].specificity, Specificity(0, 0, 0));
}

#[test]
fn test_specificity_ordering() {
    assert!(Specificity(1, 0, 0) > Specificity(0, 9, 9));
    assert!(Specificity(0, 1, 0) > Specificity(0, 0, 9));
}

// ─── matching ───────────────────────────────────────────────────────────

#[test]
fn test_match_type_and_universal() {
    let f = fixture();
    assert!(matches("article", &f.tree, f.article));
    assert!(matches("*", &f.tree, f.article));
    assert!(!matches("section", &f.tree, f.article));
}

#[test]
fn test_match_type_is_case_insensitive() {
    let f = fixture();
    assert!(matches("ARTICLE", &f.tree, f.article));
}

#[test]
fn test_match_class_and_id() {
    let f = fixture();
    assert!(matches(".post", &f.tree, f.article));
    assert!(matches(".featured", &f.tree, f.article));
    assert!(!matches(".missing", &f.tree, f.article));
    assert!(matches("#a", &f.tree, f.article));
    assert!(!matches("#b", &f.tree, f.article));
}

#[test]
fn test_match_attribute_forms() {
    let f = fixture();
    assert!(matches("[lang]", &f.tree, f.span));
    assert!(matches("[lang=en-US]", &f.tree, f.span));
    assert!(!matches("[lang=en]", &f.tree, f.span));
    assert!(matches("[lang|=en]", &f.tree, f.span));
    assert!(matches("[class~=featured]", &f.tree, f.article));
    assert!(matches("[lang^=en]", &f.tree, f.span));
    assert!(matches("[lang$=US]", &f.tree, f.span));
    assert!(matches("[lang*=n-U]", &f.tree, f.span));
}

#[test]
fn test_match_descendant_combinator() {
    let f = fixture();
    assert!(matches("article span", &f.tree, f.span));
    assert!(matches("article p span", &f.tree, f.span));
    assert!(!matches("section span", &f.tree, f.span));
}

#[test]
fn test_match_child_combinator() {
    let f = fixture();
    assert!(matches("p > span", &f.tree, f.span));
    assert!(!matches("article > span", &f.tree, f.span));
}

#[test]
fn test_match_sibling_combinators() {
    let f = fixture();
    assert!(matches("span + em", &f.tree, f.em));
    assert!(!matches("em + span", &f.tree, f.span));
    assert!(matches("span ~ em", &f.tree, f.em));
    assert!(matches("p ~ p", &f.tree, f.p2));
    assert!(!matches("p ~ p", &f.tree, f.p1));
}

#[test]
fn test_match_structural_pseudo_classes() {
    let f = fixture();
    assert!(matches(":root", &f.tree, f.article));
    assert!(!matches(":root", &f.tree, f.p1));
    assert!(matches("p:first-child", &f.tree, f.p1));
    assert!(!matches("p:first-child", &f.tree, f.p2));
    assert!(matches("p:last-child", &f.tree, f.p2));
    assert!(matches("span:empty", &f.tree, f.span));
    assert!(!matches("p:empty", &f.tree, f.p1));
}

#[test]
fn test_never_match_pseudo_never_matches() {
    let f = fixture();
    assert!(!matches("article:hover", &f.tree, f.article));
    assert!(!matches("p:nth-child(2)", &f.tree, f.p2));
}

// ─── namespaces ─────────────────────────────────────────────────────────

#[test]
fn test_namespace_prefix_resolution() {
    let svg = NamespaceId(0);
    let mut prefixes = HashMap::new();
    let _ = prefixes.insert("svg".to_owned(), svg);

    let mut tree = ElementTree::new();
    let rect = tree.alloc_element_ns(Some(svg), "rect");
    let plain = tree.alloc_element("rect");

    let list = parse_ns("svg|rect", &prefixes, None).expect("parses");
    assert!(list.match_element(&tree, rect).is_some());
    assert!(list.match_element(&tree, plain).is_none());
}

#[test]
fn test_default_namespace_applies_to_unprefixed() {
    let svg = NamespaceId(0);
    let prefixes = HashMap::new();

    let mut tree = ElementTree::new();
    let rect = tree.alloc_element_ns(Some(svg), "rect");
    let plain = tree.alloc_element("rect");

    // With a default namespace, a bare type selector is constrained to it.
    let list = parse_ns("rect", &prefixes, Some(svg)).expect("parses");
    assert!(list.match_element(&tree, rect).is_some());
    assert!(list.match_element(&tree, plain).is_none());

    // Without one, it matches any namespace.
    let list = parse_ns("rect", &prefixes, None).expect("parses");
    assert!(list.match_element(&tree, rect).is_some());
    assert!(list.match_element(&tree, plain).is_some());
}

#[test]
fn test_no_namespace_form() {
    let svg = NamespaceId(0);
    let prefixes = HashMap::new();

    let mut tree = ElementTree::new();
    let rect = tree.alloc_element_ns(Some(svg), "rect");
    let plain = tree.alloc_element("rect");

    // `|rect` selects only elements with no namespace, even under a
    // default namespace.
    let list = parse_ns("|rect", &prefixes, Some(svg)).expect("parses");
    assert!(list.match_element(&tree, plain).is_some());
    assert!(list.match_element(&tree, rect).is_none());
}

#[test]
fn test_undeclared_prefix_invalidates_selector() {
    assert!(parse("missing|rect").is_none());
}
