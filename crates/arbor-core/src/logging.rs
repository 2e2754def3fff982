//! Logging facilities for Arbor.
//!
//! Arbor uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Build component trees...
//! }
//! ```
//!
//! Subsystems log under the targets listed in [`targets`], so a filter such
//! as `RUST_LOG=arbor::component=debug` isolates validity propagation.

/// Span names used throughout Arbor for tracing.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "arbor::signal";
    /// Validity recomputation span.
    pub const VALIDITY: &str = "arbor::validity";
    /// Structural tree mutation span.
    pub const STRUCTURE: &str = "arbor::structure";
    /// Preference load/save span.
    pub const PREFERENCES: &str = "arbor::preferences";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal system target.
    pub const SIGNAL: &str = "arbor_core::signal";
    /// Object identity target.
    pub const OBJECT: &str = "arbor_core::object";
    /// Value and selection models target.
    pub const MODEL: &str = "arbor::model";
    /// Component tree target.
    pub const COMPONENT: &str = "arbor::component";
    /// Preference store target.
    pub const PREFERENCES: &str = "arbor::preferences";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of tree-wide operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "arbor::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
