//! Integration tests for stylesheet assembly.

use bilby_css::parser::parse_stylesheet;
use bilby_css::style::Declared;
use bilby_css::stylesheet::{Environment, build_stylesheet};
use bilby_css::values::{Color, Display, LengthPercentageAuto, Rgba};

fn build(css: &str) -> (bilby_css::stylesheet::Stylesheet, Environment) {
    let tree = parse_stylesheet(css);
    let mut env = Environment::new();
    let sheet = build_stylesheet(&tree, &mut env);
    (sheet, env)
}

#[test]
fn test_style_rule_with_declarations() {
    let (sheet, _env) = build("div { display: block; width: 120px; color: #ff0000 }");
    assert_eq!(sheet.rules.len(), 1);
    let decls = &sheet.rules[0].declarations.normal;
    assert_eq!(decls.display, Some(Declared::Value(Display::Block)));
    assert_eq!(
        decls.width,
        Some(Declared::Value(LengthPercentageAuto::Px(120.0)))
    );
    assert_eq!(
        decls.color,
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0xff, 0, 0))))
    );
}

#[test]
fn test_later_declaration_wins_within_a_block() {
    let (sheet, _env) = build("div { width: 1px; width: 2px }");
    assert_eq!(
        sheet.rules[0].declarations.normal.width,
        Some(Declared::Value(LengthPercentageAuto::Px(2.0)))
    );
}

#[test]
fn test_invalid_value_is_dropped() {
    // `width: nonsense` contributes nothing; the valid declaration stays.
    let (sheet, _env) = build("div { width: nonsense; display: block }");
    let decls = &sheet.rules[0].declarations.normal;
    assert_eq!(decls.width, None);
    assert_eq!(decls.display, Some(Declared::Value(Display::Block)));
}

#[test]
fn test_trailing_junk_invalidates_declaration() {
    let (sheet, _env) = build("div { width: 10px 20px }");
    assert_eq!(sheet.rules[0].declarations.normal.width, None);
}

#[test]
fn test_important_is_recognized_and_stripped() {
    let (sheet, _env) = build("div { width: 10px !important; display: block }");
    let cascaded = &sheet.rules[0].declarations;
    assert_eq!(
        cascaded.important.width,
        Some(Declared::Value(LengthPercentageAuto::Px(10.0)))
    );
    assert_eq!(cascaded.normal.width, None);
    assert_eq!(
        cascaded.normal.display,
        Some(Declared::Value(Display::Block))
    );
}

#[test]
fn test_important_with_inner_whitespace() {
    let (sheet, _env) = build("div { width: 10px ! important }");
    assert_eq!(
        sheet.rules[0].declarations.important.width,
        Some(Declared::Value(LengthPercentageAuto::Px(10.0)))
    );
}

#[test]
fn test_css_wide_keywords_are_stored() {
    let (sheet, _env) = build("div { width: inherit; display: initial; color: unset }");
    let decls = &sheet.rules[0].declarations.normal;
    assert_eq!(decls.width, Some(Declared::Inherit));
    assert_eq!(decls.display, Some(Declared::Initial));
    assert_eq!(decls.color, Some(Declared::Unset));
}

#[test]
fn test_unknown_property_is_skipped() {
    let (sheet, _env) = build("div { flavor: vanilla; display: block }");
    let decls = &sheet.rules[0].declarations.normal;
    assert_eq!(decls.display, Some(Declared::Value(Display::Block)));
}

#[test]
fn test_unparsable_selector_drops_the_rule() {
    let (sheet, _env) = build("42% { display: block } div { display: block }");
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_namespace_default() {
    let (sheet, env) = build("@namespace url(http://www.w3.org/2000/svg); rect {}");
    let id = sheet.default_namespace.expect("default namespace set");
    assert_eq!(env.namespace_url(id), Some("http://www.w3.org/2000/svg"));
    assert!(sheet.namespace_prefixes.is_empty());
}

#[test]
fn test_namespace_prefixed() {
    let (sheet, env) = build("@namespace svg url(http://www.w3.org/2000/svg); svg|rect {}");
    let id = *sheet
        .namespace_prefixes
        .get("svg")
        .expect("prefix recorded");
    assert_eq!(env.namespace_url(id), Some("http://www.w3.org/2000/svg"));
    assert_eq!(sheet.default_namespace, None);
    // The prefixed selector resolved against the declared namespace.
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_namespace_accepts_string_form() {
    let (sheet, env) = build("@namespace \"http://example.com/ns\";");
    let id = sheet.default_namespace.expect("default namespace set");
    assert_eq!(env.namespace_url(id), Some("http://example.com/ns"));
}

#[test]
fn test_namespace_with_trailing_tokens_is_ignored() {
    // Extra tokens invalidate the rule; the prefix map stays unchanged.
    let (sheet, _env) = build("@namespace svg url(http://www.w3.org/2000/svg) junk;");
    assert!(sheet.namespace_prefixes.is_empty());
    assert_eq!(sheet.default_namespace, None);
}

#[test]
fn test_import_is_skipped_without_panicking() {
    let (sheet, _env) = build("@import url(other.css); div { display: block }");
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_unknown_at_rule_is_skipped() {
    let (sheet, _env) = build("@whatever { div { display: block } } p { display: block }");
    assert_eq!(sheet.rules.len(), 1);
}

#[test]
fn test_environment_interns_namespaces_once() {
    let mut env = Environment::new();
    let a = env.intern_namespace("http://example.com/a");
    let b = env.intern_namespace("http://example.com/b");
    let a_again = env.intern_namespace("http://example.com/a");
    assert_eq!(a, a_again);
    assert_ne!(a, b);
}
