//! Logging facilities for Stylebridge.
//!
//! Stylebridge uses the `tracing` crate for instrumentation. Nothing here
//! installs a subscriber; the host application decides where logs go:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("stylebridge::style=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Deferred task processing.
    pub const TASK: &str = "stylebridge::task";
    /// Design extraction, layer pruning and dependency ordering.
    pub const DESIGN: &str = "stylebridge::design";
    /// Stylesheet parsing and scope resolution.
    pub const STYLE: &str = "stylebridge::style";
    /// Link persistence and re-resolution.
    pub const LINKS: &str = "stylebridge::links";
    /// Session lifecycle (tree swaps, freshness checks).
    pub const SESSION: &str = "stylebridge::session";
}

/// A guard that records the duration of an operation as a tracing span.
///
/// ```
/// use stylebridge_core::logging::PerfSpan;
///
/// let _span = PerfSpan::new("parse_stylesheet");
/// // ... work ...
/// // span closes on drop
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "stylebridge::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perf_span_without_subscriber() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn targets_share_prefix() {
        for target in [
            targets::TASK,
            targets::DESIGN,
            targets::STYLE,
            targets::LINKS,
            targets::SESSION,
        ] {
            assert!(target.starts_with("stylebridge::"));
        }
    }
}
