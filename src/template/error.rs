//! Template compilation errors.

use thiserror::Error;

/// Error raised while compiling a URI template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template violates the placeholder grammar.
    #[error("malformed URI template {template:?}: {reason}")]
    MalformedTemplate {
        template: String,
        reason: Malformation,
    },

    /// A custom placeholder regex was rejected by the regex engine.
    #[error("URI template {template:?} contains an invalid regular expression: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

impl TemplateError {
    /// The template string that failed to compile.
    pub fn template(&self) -> &str {
        match self {
            TemplateError::MalformedTemplate { template, .. } => template,
            TemplateError::InvalidPattern { template, .. } => template,
        }
    }
}

/// Why a template is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("no custom regular expression specified after ':' in {placeholder:?}")]
    EmptyRegex { placeholder: String },

    #[error("placeholder {placeholder:?} is never closed")]
    Unterminated { placeholder: String },

    #[error("unmatched '}}' at byte {offset}")]
    UnmatchedBrace { offset: usize },
}
