//! Routing subsystem: URL → connection configuration.
//!
//! # Data Flow
//! ```text
//! Setup (registration):
//!     (template string, config)
//!     → selector.rs register → template::compile (eager)
//!     → stored in insertion order, keyed by the original string
//!
//! Lookup:
//!     outbound URL
//!     → selector.rs resolve (evaluate every compiled pattern)
//!     → specificity tie-break (literal templates win)
//!     → Matched | NotFound | Ambiguous
//!     → observer.rs (structured diagnostics)
//! ```
//!
//! # Design Decisions
//! - Selectors are built, then frozen; shared.rs swaps whole selectors
//! - Deterministic: same registry and URL always give the same outcome
//! - NotFound and Ambiguous are values, never errors

pub mod observer;
pub mod selector;
pub mod shared;

pub use observer::{NoopObserver, ResolutionEvent, ResolutionObserver, TracingObserver};
pub use selector::{ConnectionSelector, Resolution};
pub use shared::SharedSelector;
