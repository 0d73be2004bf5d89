//! CSS tokenizer, parser, selector matching, cascade, and flow layout for
//! the Bilby engine.
//!
//! # Scope
//!
//! This crate implements the pipeline that turns CSS source text plus an
//! element tree into a box tree — a positioned, sized, painted description
//! of boxes ready for rendering:
//!
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Location-addressed tokens; identifier text decoded lazily
//!   - Pre-parsed numeric values; comment and whitespace tokens preserved
//!
//! - **Component-Tree Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - A stack machine producing one flat, skip-encoded tree of rules,
//!     blocks, functions, and preserved tokens
//!
//! - **Value Parsers** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/),
//!   [CSS Backgrounds Level 3](https://www.w3.org/TR/css-backgrounds-3/))
//!   - Backtracking property grammars over component ranges
//!
//! - **Selectors** ([Selectors Level 3](https://www.w3.org/TR/selectors-3/))
//!   - Complex selector lists with namespaces; right-to-left matching
//!
//! - **Cascade and Style Computation** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Specificity-ordered cascade into per-element declaration sets
//!   - A two-stage style computer with ancestry-stack inheritance
//!
//! - **Flow Layout** ([CSS 2.2 § 9/10](https://www.w3.org/TR/CSS22/visuren.html))
//!   - Stack-driven block and inline layout, inline-block subtrees
//!   - A skip-encoded stacking-context tree ordering the paint
//!   - A cosmetic pass resolving colors, backgrounds, and border colors
//!
//! # Not Implemented
//!
//! - Tables, floats, writing modes, animations and transitions
//! - `@import` resolution (the rule is recognized and skipped)
//! - Shadow DOM
//! - Length units beyond `px` and percentages

/// CSS layout: flow, stacking contexts, and the box tree.
pub mod layout;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// CSS selector parsing and matching per [Selectors Level 3](https://www.w3.org/TR/selectors-3/).
pub mod selector;
/// Style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// Stylesheet assembly.
pub mod stylesheet;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// CSS value types and property value parsing.
pub mod values;

// Re-exports for convenience
pub use layout::{ApproximateFont, BoxTree, FontHandle, Images, LayoutError, do_layout};
pub use parser::{ComponentTag, ComponentTree, parse_list_of_component_values, parse_stylesheet};
pub use selector::{ParsedSelector, SelectorList, Specificity};
pub use style::{CascadedValueStore, StyleComputer, apply_stylesheet};
pub use stylesheet::{Environment, Stylesheet, build_stylesheet};
pub use tokenizer::{Token, TokenTag, Tokenizer};
pub use values::{Color, Rgba};
