//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, template compilation)
//!     → SelectorConfig (validated, immutable)
//!     → transport::ConnectionFactory registers each HTTP(S) repository
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → factory rebuilds its selector and swaps it in atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LogFormat, ObservabilityConfig, ProxyConfig, ProxyScheme, ProxySettings, RepositoryConfig,
    SelectorConfig,
};
pub use validation::ValidationError;
