//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ConnectionSelector::resolve
//!     → routing::observer (TracingObserver)
//!         → logging.rs (structured log events via tracing)
//!         → metrics.rs (resolution outcome counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional, `watch` mode)
//! ```
//!
//! # Design Decisions
//! - The core never installs a subscriber; binaries call `logging::init`
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
