//! Logging facilities for Horizon Fetch.
//!
//! Horizon Fetch uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_fetch=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! The constants below name the targets each subsystem logs under, so they
//! can be used directly in filter directives.

/// Span names used throughout Horizon Fetch for tracing.
pub mod span_names {
    /// A single load or send cycle.
    pub const LOAD_CYCLE: &str = "horizon_fetch::load_cycle";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_fetch_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_fetch_core::signal";
    /// Deferred task queue target.
    pub const TASK: &str = "horizon_fetch_core::task";
    /// Loader lifecycle target.
    pub const LOADER: &str = "horizon_fetch::loader";
    /// HTTP backend target.
    pub const HTTP: &str = "horizon_fetch::http";
    /// Transport implementations target.
    pub const TRANSPORT: &str = "horizon_fetch::transport";
    /// Platform capabilities (filesystem, bundled assets) target.
    pub const PLATFORM: &str = "horizon_fetch::platform";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::LOADER, targets::HTTP, targets::TRANSPORT, targets::PLATFORM] {
            assert!(target.starts_with("horizon_fetch::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
        assert!(targets::TASK.starts_with(targets::CORE));
    }

    #[test]
    fn test_span_names_share_target_namespace() {
        assert!(span_names::LOAD_CYCLE.starts_with("horizon_fetch::"));
        assert!(!span_names::LOAD_CYCLE.starts_with(targets::CORE));
    }
}
