//! Design-document side of Stylebridge.
//!
//! This crate turns a design document fetched from the design service into
//! the style information the reconciler compares against a stylesheet:
//!
//! - **Node model**: Serde model of the design service JSON
//! - **Style extraction**: Canonical CSS property map of a single node
//! - **Layer tree**: Arena of layers with pruned paths and derived styles
//! - **Dependency order**: Components sorted after the components they instantiate
//! - **Rule generation**: LESS rules for components tagged with a selector directive
//! - **Source**: The fetch boundary and the freshness cache
//!
//! # Example
//!
//! ```
//! use stylebridge_design::prelude::*;
//!
//! let json = r#"{
//!     "id": "1:2", "name": "Button", "type": "COMPONENT",
//!     "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 } }],
//!     "cornerRadius": 4
//! }"#;
//! let node: DesignNode = serde_json::from_str(json).unwrap();
//!
//! let tree = LayerTree::build("kit", &node);
//! let style = tree.derived_style(tree.root());
//! assert_eq!(style.get("background-color"), Some("#FF0000"));
//! assert_eq!(style.get("border-radius"), Some("4px"));
//! ```

pub mod color;
mod directive;
mod error;
mod extract;
pub mod generate;
pub mod layer;
pub mod node;
pub mod order;
pub mod source;

pub use color::css_color;
pub use directive::selector_directive;
pub use error::{Error, Result};
pub use extract::extract_style;
pub use generate::{GeneratedRule, RuleGenerator, generate_rules};
pub use layer::{Layer, LayerId, LayerKey, LayerTree};
pub use node::{DesignNode, NodeKind, NodeType, Rgba};
pub use order::{DependencyGraph, order_components};
pub use source::{ComponentMeta, DesignCache, DesignSnapshot, DesignSource, MemorySource};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::layer::{Layer, LayerId, LayerKey, LayerTree};
    pub use crate::node::{DesignNode, NodeKind, NodeType, Paint, Rgba, Visual};
    pub use crate::source::{ComponentMeta, DesignCache, DesignSnapshot, DesignSource};
    pub use crate::{css_color, extract_style, generate_rules, selector_directive};
}
