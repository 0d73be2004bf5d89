//! CSS parser module.

/// The flat, skip-encoded component tree produced by parsing.
pub mod component;
/// Stack-machine parser per [CSS Syntax Level 3 § 5](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;

pub use component::{Component, ComponentIndex, ComponentTag, ComponentTree, Extra};
pub use parser::{parse_list_of_component_values, parse_stylesheet};
