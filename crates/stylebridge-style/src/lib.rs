//! Stylesheet side of Stylebridge.
//!
//! This crate parses LESS-like stylesheet text and compares it with styles
//! coming from a design:
//!
//! - **Parsing**: Nested selector blocks, `@variables` and the `&` parent
//!   reference, tokenized with `cssparser`
//! - **Scopes**: Lexical scope tree with selector composition, variable
//!   lookup and computed (inherited) styles
//! - **Source ranges**: Zero-based line/column spans for every declaration
//!   and selector
//! - **Reconciliation**: Shorthand-aware, color-aware diff of a scope against
//!   a design layer
//!
//! # Example
//!
//! ```
//! use stylebridge_core::CssPropertyMap;
//! use stylebridge_style::prelude::*;
//!
//! let tree = parse_stylesheet(".button {\n  color: #FFF;\n  padding: 4px 8px;\n}\n").unwrap();
//! let button = tree.get_scope("body .button").unwrap();
//!
//! let layer: CssPropertyMap = [("color", "#FFFFFF"), ("padding-left", "8px"), ("font-size", "12px")]
//!     .into_iter()
//!     .collect();
//! let result = reconcile(&tree.computed_style(button), &layer);
//!
//! assert_eq!(result.missing.get("font-size"), Some("12px"));
//! assert!(result.mismatched.is_empty());
//! ```

mod color;
mod diff;
mod error;
pub mod parser;
pub mod scope;
mod shorthand;
pub mod source;

pub use color::CssColor;
pub use diff::{
    Mismatch, Reconciliation, diff_intersecting_properties, find_missing_properties, reconcile,
    values_equal,
};
pub use error::{Error, Result};
pub use parser::{StylesheetParser, parse_stylesheet};
pub use scope::{ComputedStyle, ScopeKey, ScopeTree, StylesheetScope};
pub use shorthand::{expand_shorthand, is_shorthand};
pub use source::{LineIndex, Position, SourceRange};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::diff::{Reconciliation, reconcile};
    pub use crate::parser::{StylesheetParser, parse_stylesheet};
    pub use crate::scope::{ComputedStyle, ScopeKey, ScopeTree, StylesheetScope};
    pub use crate::source::{Position, SourceRange};
}
