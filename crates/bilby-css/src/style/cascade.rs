//! The cascade: matching stylesheet rules onto elements.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! "The cascade takes an unordered list of declared values for a given
//! property on a given element, sorts them by their declaration's
//! precedence, and outputs a single cascaded value."

use bilby_dom::{Category, ElementId, ElementTree};

use crate::selector::Specificity;
use crate::stylesheet::Stylesheet;

use super::declared::CascadedValues;

/// Per-element cascaded declarations.
///
/// [§ 6.1 Cascaded Values](https://www.w3.org/TR/css-cascade-4/#cascaded)
///
/// The element tree itself stays free of engine types; this store carries
/// the per-element declaration sets next to it. Hosts may pre-populate
/// entries (the equivalent of inline style, which outranks stylesheet
/// rules) before running [`apply_stylesheet`].
#[derive(Debug, Default)]
pub struct CascadedValueStore {
    values: Vec<CascadedValues>,
}

impl CascadedValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cascaded values of an element, if any were recorded.
    #[must_use]
    pub fn get(&self, element: ElementId) -> Option<&CascadedValues> {
        self.values.get(element.0)
    }

    /// Mutable access to an element's cascaded values, growing the store as
    /// needed.
    pub fn entry_mut(&mut self, element: ElementId) -> &mut CascadedValues {
        if element.0 >= self.values.len() {
            self.values.resize_with(element.0 + 1, CascadedValues::default);
        }
        &mut self.values[element.0]
    }
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// "Sort the declarations according to... specificity: The Specificity of
/// the selector... Order of Appearance: the last declaration in document
/// order wins."
///
/// Matches every rule of the stylesheet against every normal element and
/// folds the winning declarations into the store. Values already present
/// in an element's entry (host-provided inline declarations) take
/// precedence over everything the stylesheet contributes.
pub fn apply_stylesheet(tree: &ElementTree, sheet: &Stylesheet, store: &mut CascadedValueStore) {
    for raw in 0..tree.len() {
        let element = ElementId(raw);
        if tree.category(element) != Category::Normal {
            continue;
        }

        // (specificity, document order) pairs of the matching rules.
        let mut matched: Vec<(Specificity, usize)> = sheet
            .rules
            .iter()
            .enumerate()
            .filter_map(|(order, rule)| {
                rule.selectors
                    .match_element(tree, element)
                    .map(|specificity| (specificity, order))
            })
            .collect();

        if matched.is_empty() {
            continue;
        }

        // Ascending (specificity, order); applied in reverse so the highest
        // precedence fills first and later sets only contribute where
        // nothing has won yet.
        matched.sort();
        let entry = store.entry_mut(element);
        for &(_, order) in matched.iter().rev() {
            entry.fill_from(&sheet.rules[order].declarations);
        }
    }
}
