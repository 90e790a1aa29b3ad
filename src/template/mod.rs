//! URI template compilation.
//!
//! # Data Flow
//! ```text
//! template string, e.g. "https://{host}/{repo:[a-z]+}.git"
//!     → compiler.rs (single left-to-right scan, brace depth counter)
//!     → CompiledTemplate (anchored regex + placeholder list)
//!     → routing::selector evaluates it against outbound URLs
//! ```
//!
//! # Design Decisions
//! - Literal text is regex-escaped; only `{name:regex}` bodies are trusted as regex
//! - Plain placeholders match `[^/]*` (never cross a path separator)
//! - Every pattern ends with `.*` so trailing paths and query strings still match
//! - Placeholder boundaries follow brace depth, so custom regexes may use `{m,n}`

pub mod compiler;
pub mod error;

pub use compiler::{compile, CompiledTemplate, Placeholder};
pub use error::{Malformation, TemplateError};
