//! Core systems for Stylebridge.
//!
//! This crate provides the small runtime pieces shared by the design and
//! stylesheet halves of the reconciliation engine:
//!
//! - **Task Queue**: Deferred work posted by the engine and drained by the host
//! - **Pending**: Single-shot promise with ordered continuations and a `Future` impl
//! - **CssPropertyMap**: The flat property map both sides of a comparison produce
//! - **Errors**: Transport-level failures (fetch, rejected parse, cancellation)
//! - **Logging**: `tracing` targets used across the workspace
//!
//! # Example
//!
//! ```
//! use stylebridge_core::{Pending, TaskQueue};
//!
//! let mut queue = TaskQueue::new();
//! let (settler, pending) = Pending::<u32>::channel();
//!
//! queue.post(move || settler.resolve(42));
//!
//! pending.on_settled(|result| {
//!     assert_eq!(result.ok().copied(), Some(42));
//! });
//!
//! queue.process_all();
//! assert!(pending.is_settled());
//! ```

mod error;
pub mod logging;
mod pending;
mod properties;
mod task;

pub use error::{Error, Result};
pub use pending::{Pending, Settler};
pub use properties::CssPropertyMap;
pub use task::{TaskId, TaskQueue};
