//! Element tree consumed by the Bilby layout engine.
//!
//! This crate provides an arena-based element tree. The layout engine reads
//! it but never mutates it; the host (an HTML parser, a test fixture, a
//! document model) builds it up front.
//!
//! # Design
//!
//! The tree uses arena allocation with [`ElementId`] indices for all
//! relationships, providing O(1) access and traversal without borrow checker
//! issues. Elements come in two categories: *normal* elements, which carry a
//! namespaced name and attributes, and *text* elements, which carry a string
//! of text and generate inline content during layout.

use std::collections::HashMap;

/// Map of attribute names to values for an element.
///
/// NOTE: This is a simplified representation. Attributes are compared
/// case-sensitively; namespaced attributes are not supported.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the element tree.
///
/// `ElementId` provides O(1) access to any element in the tree without
/// borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// An interned namespace, assigned by the engine's environment.
///
/// [Namespaces in XML](https://www.w3.org/TR/xml-names/) names are long
/// URLs; the engine interns them once and elements and selectors compare
/// small ids instead of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(pub usize);

/// The category of an element.
///
/// [§ 2 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
///
/// "Text runs are generated for contiguous sequences of text."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// An ordinary element with a name and attributes.
    Normal,
    /// A text element; its content participates in inline layout.
    Text,
}

/// A namespaced element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    /// The element's namespace, if it belongs to one.
    pub namespace: Option<NamespaceId>,
    /// The element's local name (e.g. `div`).
    pub local: String,
}

/// A single element in the tree.
///
/// Stores indices for parent/child/sibling relationships, enabling O(1)
/// traversal in any direction.
#[derive(Debug, Clone)]
pub struct Element {
    /// Whether this is a normal or a text element.
    pub category: Category,
    /// The element's name. `None` for text elements.
    pub name: Option<ElementName>,
    /// Text content. `None` for normal elements.
    pub text: Option<String>,
    /// The element's attribute list. Empty for text elements.
    pub attrs: AttributesMap,
    /// The element's parent, or `None` for a root.
    pub parent: Option<ElementId>,
    /// The element's children, in document order.
    pub children: Vec<ElementId>,
    /// The element immediately following this one among its siblings.
    pub next_sibling: Option<ElementId>,
    /// The element immediately preceding this one among its siblings.
    pub prev_sibling: Option<ElementId>,
}

/// An arena-allocated element tree.
///
/// Built by the host before layout; read-only during layout.
#[derive(Debug, Default)]
pub struct ElementTree {
    elements: Vec<Element>,
}

impl ElementTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new normal element with the given local name and no
    /// namespace. Returns its id; the element starts detached.
    pub fn alloc_element(&mut self, local: impl Into<String>) -> ElementId {
        self.alloc_element_ns(None, local)
    }

    /// Allocate a new normal element with an explicit namespace.
    pub fn alloc_element_ns(
        &mut self,
        namespace: Option<NamespaceId>,
        local: impl Into<String>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            category: Category::Normal,
            name: Some(ElementName {
                namespace,
                local: local.into(),
            }),
            text: None,
            attrs: AttributesMap::new(),
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Allocate a new text element. Returns its id; the element starts
    /// detached.
    pub fn alloc_text(&mut self, text: impl Into<String>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            category: Category::Text,
            name: None,
            text: Some(text.into()),
            attrs: AttributesMap::new(),
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Append `child` as the last child of `parent`, wiring sibling links.
    ///
    /// # Panics
    /// Panics if either id is out of range.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let prev = self.elements[parent.0].children.last().copied();
        if let Some(prev_id) = prev {
            self.elements[prev_id.0].next_sibling = Some(child);
        }
        self.elements[child.0].parent = Some(parent);
        self.elements[child.0].prev_sibling = prev;
        self.elements[parent.0].children.push(child);
    }

    /// Set an attribute on an element.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let _ = self.elements[id.0].attrs.insert(name.into(), value.into());
    }

    /// Number of elements in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by id.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// The category of an element.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    #[must_use]
    pub fn category(&self, id: ElementId) -> Category {
        self.elements[id.0].category
    }

    /// The element's parent, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.parent)
    }

    /// The element's children, in document order.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    /// The element's first child, if any.
    #[must_use]
    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.children.first().copied())
    }

    /// The element immediately following `id` among its siblings.
    #[must_use]
    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.next_sibling)
    }

    /// The element's namespaced name, if it is a normal element.
    #[must_use]
    pub fn name(&self, id: ElementId) -> Option<&ElementName> {
        self.get(id).and_then(|e| e.name.as_ref())
    }

    /// The element's text content, if it is a text element.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(|e| e.text.as_deref())
    }

    /// Look up an attribute value on an element.
    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.attrs.get(name)).map(String::as_str)
    }

    /// Iterate over the element's ancestors, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// Iterate over the element's preceding siblings, nearest first.
    pub fn preceding_siblings(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        let mut current = self.get(id).and_then(|e| e.prev_sibling);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.get(next).and_then(|e| e.prev_sibling);
            Some(next)
        })
    }
}
