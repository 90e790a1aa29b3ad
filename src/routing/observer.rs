//! Resolution diagnostics.
//!
//! The selector never logs directly; every lookup outcome is handed to a
//! [`ResolutionObserver`] as a structured [`ResolutionEvent`].

use crate::observability::metrics;

/// Structured outcome of a single `resolve` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionEvent<'a> {
    Matched { url: &'a str, template: &'a str },
    NotFound { url: &'a str },
    Ambiguous { url: &'a str, conflicting: &'a [&'a str] },
}

impl ResolutionEvent<'_> {
    /// Short outcome label, used for metrics and reports.
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolutionEvent::Matched { .. } => "matched",
            ResolutionEvent::NotFound { .. } => "not_found",
            ResolutionEvent::Ambiguous { .. } => "ambiguous",
        }
    }
}

/// Receives every resolution outcome.
pub trait ResolutionObserver: Send + Sync + std::fmt::Debug {
    fn observe(&self, event: &ResolutionEvent<'_>);
}

/// Logs outcomes through `tracing` and counts them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn observe(&self, event: &ResolutionEvent<'_>) {
        metrics::record_resolution(event.outcome());

        match event {
            ResolutionEvent::Matched { url, template } => {
                tracing::debug!(%url, %template, "Connection config selected");
            }
            ResolutionEvent::NotFound { url } => {
                tracing::warn!(%url, "No custom http config found for URL");
            }
            ResolutionEvent::Ambiguous { url, conflicting } => {
                tracing::error!(
                    %url,
                    matched_templates = %conflicting.join(", "),
                    "More than one URL template matched; proxy and TLS settings won't be applied"
                );
            }
        }
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResolutionObserver for NoopObserver {
    fn observe(&self, _event: &ResolutionEvent<'_>) {}
}
