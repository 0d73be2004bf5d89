//! Integration tests for the cascade and the style computer.

use bilby_css::parser::parse_stylesheet;
use bilby_css::style::{CascadedValueStore, Declared, StyleComputer, apply_stylesheet};
use bilby_css::stylesheet::{Environment, build_stylesheet};
use bilby_css::values::{Color, Display, LengthPercentageAuto, Position, Rgba};
use bilby_dom::{ElementId, ElementTree};

fn cascade(css: &str, tree: &ElementTree) -> CascadedValueStore {
    let parsed = parse_stylesheet(css);
    let mut env = Environment::new();
    let sheet = build_stylesheet(&parsed, &mut env);
    let mut store = CascadedValueStore::new();
    apply_stylesheet(tree, &sheet, &mut store);
    store
}

/// `<body> <p class="note"/> </body>`
fn body_and_p() -> (ElementTree, ElementId, ElementId) {
    let mut tree = ElementTree::new();
    let body = tree.alloc_element("body");
    let p = tree.alloc_element("p");
    tree.set_attribute(p, "class", "note");
    tree.append_child(body, p);
    (tree, body, p)
}

#[test]
fn test_matching_rule_contributes_declarations() {
    let (tree, body, _p) = body_and_p();
    let store = cascade("body { color: #333333 }", &tree);
    let cascaded = store.get(body).expect("body has cascaded values");
    assert_eq!(
        cascaded.normal.color,
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0x33, 0x33, 0x33))))
    );
}

#[test]
fn test_specificity_overrides_document_order() {
    // The class selector outranks the type selector regardless of order.
    let (tree, _body, p) = body_and_p();
    let store = cascade(".note { color: #00ff00 } p { color: #ff0000 }", &tree);
    let cascaded = store.get(p).expect("p has cascaded values");
    assert_eq!(
        cascaded.normal.color,
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0, 0xff, 0))))
    );
}

#[test]
fn test_document_order_breaks_specificity_ties() {
    let (tree, _body, p) = body_and_p();
    let store = cascade("p { color: #ff0000 } p { color: #0000ff }", &tree);
    let cascaded = store.get(p).expect("p has cascaded values");
    assert_eq!(
        cascaded.normal.color,
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0, 0, 0xff))))
    );
}

#[test]
fn test_important_beats_higher_specificity_normal() {
    let (tree, _body, p) = body_and_p();
    let store = cascade(
        "p { color: #ff0000 !important } .note { color: #00ff00 }",
        &tree,
    );
    let cascaded = store.get(p).expect("p has cascaded values");

    // The cascade keeps the two importance levels separate...
    assert_eq!(
        cascaded.important.color,
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0xff, 0, 0))))
    );
    // ...and the computer resolves important over normal.
    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(p);
    assert_eq!(computer.specified_color(), Rgba::rgb(0xff, 0, 0));
}

#[test]
fn test_host_provided_values_win_over_stylesheet() {
    // Pre-populated entries model inline style; the stylesheet must not
    // overwrite them.
    let (tree, _body, p) = body_and_p();
    let parsed = parse_stylesheet("p { display: block }");
    let mut env = Environment::new();
    let sheet = build_stylesheet(&parsed, &mut env);

    let mut store = CascadedValueStore::new();
    store.entry_mut(p).normal.display = Some(Declared::Value(Display::InlineBlock));
    apply_stylesheet(&tree, &sheet, &mut store);

    assert_eq!(
        store.get(p).unwrap().normal.display,
        Some(Declared::Value(Display::InlineBlock))
    );
}

#[test]
fn test_color_inherits_through_the_computer() {
    let (tree, body, p) = body_and_p();
    let store = cascade("body { color: #112233 }", &tree);

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let body_color = computer.specified_color();
    computer.set_computed_color(body_color);

    computer.push_element(p);
    assert_eq!(computer.specified_color(), Rgba::rgb(0x11, 0x22, 0x33));
    computer.pop_element();
}

#[test]
fn test_display_does_not_inherit() {
    let (tree, body, p) = body_and_p();
    let store = cascade("body { display: inline-block }", &tree);

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let body_style = computer.specified_box_style();
    assert_eq!(body_style.display, Display::InlineBlock);
    computer.set_computed_box_style(body_style);

    computer.push_element(p);
    // `display` is not inherited; p falls back to the initial value.
    assert_eq!(computer.specified_box_style().display, Display::Inline);
}

#[test]
fn test_explicit_inherit_on_non_inherited_property() {
    let (tree, body, p) = body_and_p();
    let store = cascade(
        "body { display: block } p { display: inherit }",
        &tree,
    );

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let body_style = computer.specified_box_style();
    computer.set_computed_box_style(body_style);

    computer.push_element(p);
    assert_eq!(computer.specified_box_style().display, Display::Block);
}

#[test]
fn test_initial_resets_to_initial_value() {
    let (tree, body, p) = body_and_p();
    let store = cascade(
        "body { color: #ff0000 } p { color: initial }",
        &tree,
    );

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let c = computer.specified_color();
    computer.set_computed_color(c);

    computer.push_element(p);
    assert_eq!(computer.specified_color(), Rgba::BLACK);
}

#[test]
fn test_unset_inherits_for_inherited_properties() {
    let (tree, body, p) = body_and_p();
    let store = cascade(
        "body { color: #ff0000 } p { color: unset }",
        &tree,
    );

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let c = computer.specified_color();
    computer.set_computed_color(c);

    computer.push_element(p);
    assert_eq!(computer.specified_color(), Rgba::rgb(0xff, 0, 0));
}

#[test]
fn test_unset_resets_non_inherited_properties() {
    let (tree, body, p) = body_and_p();
    let store = cascade(
        "body { position: relative } p { position: unset }",
        &tree,
    );

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let style = computer.specified_box_style();
    assert_eq!(style.position, Position::Relative);
    computer.set_computed_box_style(style);

    computer.push_element(p);
    assert_eq!(computer.specified_box_style().position, Position::Static);
}

#[test]
fn test_current_color_on_color_inherits() {
    let (tree, body, p) = body_and_p();
    let store = cascade(
        "body { color: #0000ff } p { color: currentColor }",
        &tree,
    );

    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    let c = computer.specified_color();
    computer.set_computed_color(c);

    computer.push_element(p);
    assert_eq!(computer.specified_color(), Rgba::rgb(0, 0, 0xff));
}

#[test]
fn test_advance_element_moves_between_siblings() {
    let mut tree = ElementTree::new();
    let body = tree.alloc_element("body");
    let a = tree.alloc_element("a");
    let b = tree.alloc_element("b");
    tree.append_child(body, a);
    tree.append_child(body, b);

    let store = cascade("a { width: 10px } b { width: 20px }", &tree);
    let mut computer = StyleComputer::new(&tree, &store);
    computer.set_root_element(body);
    computer.push_element(a);
    assert_eq!(
        computer.specified_content_width().size,
        LengthPercentageAuto::Px(10.0)
    );
    computer.advance_element(b);
    assert_eq!(
        computer.specified_content_width().size,
        LengthPercentageAuto::Px(20.0)
    );
    computer.pop_element();
}
