//! Outbound connection configuration.
//!
//! # Data Flow
//! ```text
//! SelectorConfig (validated)
//!     → factory.rs add_configuration / reload
//!         → client.rs builds a reqwest::Client per HTTP(S) repository
//!         → routing::ConnectionSelector registers it under the repo uri
//!
//! Outbound URL
//!     → factory.rs create
//!     → selector resolve
//!     → Connection (configured client, or the default client on no decision)
//! ```
//!
//! # Design Decisions
//! - Clients are built at registration so proxy or TLS errors surface early
//! - Non-HTTP repository URIs (ssh, file) are never registered
//! - NotFound and Ambiguous both fall back to the default client

pub mod client;
pub mod factory;

pub use client::{build_client, Credentials, TransportError};
pub use factory::{Connection, ConnectionFactory, Fallback, Source, TransportProfile};
