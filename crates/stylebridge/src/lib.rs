//! Stylebridge keeps a design document and a LESS stylesheet in agreement.
//!
//! Designers link layers of a design document to scopes of a stylesheet.
//! Stylebridge derives CSS from each linked layer, computes the effective
//! style of each linked scope, and reports where they disagree:
//!
//! - [`design`]: Design node model, style extraction, layer tree pruning,
//!   component ordering and LESS rule generation
//! - [`style`]: Stylesheet parsing into a scope tree, variable resolution
//!   and the property diff
//! - Core runtime pieces re-exported at the root: [`TaskQueue`], [`Pending`],
//!   [`CssPropertyMap`] and the [`logging`] targets
//! - [`Session`]: One design plus one stylesheet, their links and the
//!   resulting [`Diagnostic`]s
//!
//! # Quick start
//!
//! ```no_run
//! use stylebridge::prelude::*;
//!
//! fn check(stylesheet: &str) -> stylebridge::Result<()> {
//!     let config = SyncConfig::load("stylebridge.toml")?;
//!     let mut session = Session::open(config)?;
//!
//!     let mut source = MemorySource::new();
//!     source.insert("doc", DesignSnapshot::from_json(&std::fs::read_to_string("design.json").unwrap())?);
//!     pollster::block_on(session.refresh_design(&source))?;
//!     session.parse_stylesheet(stylesheet)?;
//!
//!     for diagnostic in session.diagnostics() {
//!         println!("{diagnostic}");
//!     }
//!     session.save_links()
//! }
//! ```

pub mod config;
mod error;
pub mod links;
pub mod session;

pub use stylebridge_core::*;

/// Design-document side: node model, layer tree, rule generation.
pub mod design {
    pub use stylebridge_design::*;
}

/// Stylesheet side: parser, scope tree, diff.
pub mod style {
    pub use stylebridge_style::*;
}

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use links::{Link, LinkStore};
pub use session::{Diagnostic, ResolvedLink, Session, SessionStatus, Severity};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::config::SyncConfig;
    pub use crate::links::{Link, LinkStore};
    pub use crate::session::{Diagnostic, Session, SessionStatus, Severity};
    pub use stylebridge_core::{CssPropertyMap, Pending, TaskQueue};
    pub use stylebridge_design::{DesignSnapshot, DesignSource, LayerId, LayerTree, MemorySource};
    pub use stylebridge_style::{ScopeTree, SourceRange, StylesheetParser};
}
