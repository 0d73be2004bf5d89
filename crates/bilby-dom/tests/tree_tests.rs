//! Integration tests for the element tree.

use bilby_dom::{Category, ElementTree, NamespaceId};

#[test]
fn test_append_child_wires_relationships() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let a = tree.alloc_element("a");
    let b = tree.alloc_element("b");
    tree.append_child(root, a);
    tree.append_child(root, b);

    assert_eq!(tree.parent(a), Some(root));
    assert_eq!(tree.parent(b), Some(root));
    assert_eq!(tree.children(root), &[a, b]);
    assert_eq!(tree.first_child(root), Some(a));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_categories() {
    let mut tree = ElementTree::new();
    let element = tree.alloc_element("div");
    let text = tree.alloc_text("hello");

    assert_eq!(tree.category(element), Category::Normal);
    assert_eq!(tree.category(text), Category::Text);
    assert_eq!(tree.text(text), Some("hello"));
    assert_eq!(tree.text(element), None);
    assert!(tree.name(element).is_some());
    assert!(tree.name(text).is_none());
}

#[test]
fn test_attributes() {
    let mut tree = ElementTree::new();
    let element = tree.alloc_element("div");
    tree.set_attribute(element, "id", "main");

    assert_eq!(tree.attribute(element, "id"), Some("main"));
    assert_eq!(tree.attribute(element, "class"), None);
}

#[test]
fn test_namespaced_names() {
    let mut tree = ElementTree::new();
    let svg = NamespaceId(7);
    let rect = tree.alloc_element_ns(Some(svg), "rect");
    let plain = tree.alloc_element("rect");

    assert_eq!(tree.name(rect).unwrap().namespace, Some(svg));
    assert_eq!(tree.name(plain).unwrap().namespace, None);
}

#[test]
fn test_ancestors_nearest_first() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mid = tree.alloc_element("mid");
    let leaf = tree.alloc_element("leaf");
    tree.append_child(root, mid);
    tree.append_child(mid, leaf);

    let ancestors: Vec<_> = tree.ancestors(leaf).collect();
    assert_eq!(ancestors, vec![mid, root]);
}

#[test]
fn test_preceding_siblings_nearest_first() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let a = tree.alloc_element("a");
    let b = tree.alloc_element("b");
    let c = tree.alloc_element("c");
    tree.append_child(root, a);
    tree.append_child(root, b);
    tree.append_child(root, c);

    let preceding: Vec<_> = tree.preceding_siblings(c).collect();
    assert_eq!(preceding, vec![b, a]);
}
