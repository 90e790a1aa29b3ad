//! Template registry and URL lookup.
//!
//! # Responsibilities
//! - Store configurations keyed by their original template string
//! - Compile templates eagerly so bad syntax fails at registration
//! - Resolve a URL to exactly one configuration, or report why not
//!
//! # Design Decisions
//! - Insertion order is preserved; re-registering a key keeps its slot
//! - Configurations are opaque; only the template strings are inspected
//! - Several candidates are narrowed to literal (placeholder-free) templates;
//!   anything but a single survivor is ambiguous
//! - `resolve` takes `&self`, so a built selector can be shared freely

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::observer::{ResolutionEvent, ResolutionObserver, TracingObserver};
use crate::template::{compile, CompiledTemplate, TemplateError};

/// Outcome of a lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, C> {
    /// A single configuration applies.
    Matched { template: &'a str, config: &'a C },
    /// No registered template matches the URL.
    NotFound,
    /// Several templates match and none is more specific.
    Ambiguous { conflicting: Vec<&'a str> },
}

impl<'a, C> Resolution<'a, C> {
    /// The selected configuration, if any.
    pub fn config(&self) -> Option<&'a C> {
        match self {
            Resolution::Matched { config, .. } => Some(*config),
            _ => None,
        }
    }

    /// The template that produced the match, if any.
    pub fn template(&self) -> Option<&'a str> {
        match self {
            Resolution::Matched { template, .. } => Some(*template),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    fn event<'e>(&'e self, url: &'e str) -> ResolutionEvent<'e> {
        match self {
            Resolution::Matched { template, .. } => ResolutionEvent::Matched {
                url,
                template: *template,
            },
            Resolution::NotFound => ResolutionEvent::NotFound { url },
            Resolution::Ambiguous { conflicting } => ResolutionEvent::Ambiguous {
                url,
                conflicting: conflicting.as_slice(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<C> {
    template: CompiledTemplate,
    config: C,
}

impl<C> Entry<C> {
    fn matched(&self) -> Resolution<'_, C> {
        Resolution::Matched {
            template: self.template.template(),
            config: &self.config,
        }
    }
}

/// Selects the configuration whose URI template best matches a URL.
#[derive(Debug, Clone)]
pub struct ConnectionSelector<C> {
    entries: Vec<Entry<C>>,
    /// Template string → position in `entries`.
    index: HashMap<String, usize>,
    observer: Arc<dyn ResolutionObserver>,
}

impl<C> ConnectionSelector<C> {
    /// Create an empty selector that reports through `tracing`.
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    /// Create an empty selector with a custom observer.
    pub fn with_observer(observer: Arc<dyn ResolutionObserver>) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            observer,
        }
    }

    /// Register `config` under a URI template.
    ///
    /// Replaces the configuration of an identical template string. On error
    /// the registry is left untouched.
    pub fn register(&mut self, template: &str, config: C) -> Result<(), TemplateError> {
        if let Some(&slot) = self.index.get(template) {
            self.entries[slot].config = config;
            return Ok(());
        }

        let template = compile(template)?;
        self.index
            .insert(template.template().to_string(), self.entries.len());
        self.entries.push(Entry { template, config });
        Ok(())
    }

    /// Find the configuration for `url`.
    pub fn resolve(&self, url: &str) -> Resolution<'_, C> {
        let candidates: Vec<&Entry<C>> = self
            .entries
            .iter()
            .filter(|entry| entry.template.is_match(url))
            .collect();

        let resolution = match candidates.as_slice() {
            [] => Resolution::NotFound,
            [only] => only.matched(),
            _ => {
                let mut literal = candidates
                    .iter()
                    .copied()
                    .filter(|entry| entry.template.is_literal());
                match (literal.next(), literal.next()) {
                    (Some(exact), None) => exact.matched(),
                    _ => Resolution::Ambiguous {
                        conflicting: candidates
                            .iter()
                            .map(|entry| entry.template.template())
                            .collect(),
                    },
                }
            }
        };

        self.observer.observe(&resolution.event(url));
        resolution
    }

    /// Look up the configuration registered under an exact template string.
    pub fn get(&self, template: &str) -> Option<&C> {
        self.index.get(template).map(|&slot| &self.entries[slot].config)
    }

    /// The compiled form of a registered template string.
    pub fn compiled(&self, template: &str) -> Option<&CompiledTemplate> {
        self.index.get(template).map(|&slot| &self.entries[slot].template)
    }

    /// Registered templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &CompiledTemplate> {
        self.entries.iter().map(|entry| &entry.template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for ConnectionSelector<C> {
    fn default() -> Self {
        Self::new()
    }
}
