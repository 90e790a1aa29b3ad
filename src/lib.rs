//! URI-template based connection configuration selector.
//!
//! Outbound HTTP(S) URLs are mapped to per-endpoint transport settings
//! (proxy, TLS validation, credentials) registered under URI templates such
//! as `https://git.example.com/{team}/{repo:[a-z-]+}.git`.

pub mod config;
pub mod observability;
pub mod routing;
pub mod template;
pub mod transport;

pub use config::SelectorConfig;
pub use routing::{ConnectionSelector, Resolution, SharedSelector};
pub use template::{compile, CompiledTemplate, TemplateError};
pub use transport::ConnectionFactory;
