//! URI template → regex compiler.
//!
//! # Responsibilities
//! - Parse `{name}` and `{name:regex}` placeholders out of a URI template
//! - Escape literal text so plain URLs are matched verbatim
//! - Produce an anchored pattern that tolerates any trailing suffix
//!
//! # Design Decisions
//! - One pass over the template; a depth counter finds the closing brace, so a
//!   custom regex such as `[0-9]{2,4}` keeps its quantifier braces
//! - A placeholder ends at the `}` that returns the depth to zero; leftover
//!   depth at end of input, or a `}` at depth zero, is a malformed template
//! - Placeholder names are not validated; only their presence matters

use regex::Regex;

use crate::template::error::{Malformation, TemplateError};

/// Capture used for placeholders without a custom regex.
const DEFAULT_CAPTURE: &str = "([^/]*)";

/// Trailing path or query string is never relevant to a match.
const TRAILING_SUFFIX: &str = ".*";

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Name between the opening brace and the first `:`.
    pub name: String,
    /// Custom regex after the first `:`, if any.
    pub regex: Option<String>,
    /// Index of the capture group wrapping this placeholder.
    group: usize,
}

/// A template string together with its compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: String,
    pattern: Regex,
    placeholders: Vec<Placeholder>,
}

impl CompiledTemplate {
    /// The original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The compiled, anchored pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Placeholders in template order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// True when the template is a plain URL with no placeholder at all.
    pub fn is_literal(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Returns true if the whole URL matches this template.
    pub fn is_match(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// Extract placeholder values from a matching URL.
    ///
    /// Returns `None` if the URL does not match. Placeholders whose group did
    /// not participate in the match are omitted.
    pub fn captures<'t, 'u>(&'t self, url: &'u str) -> Option<Vec<(&'t str, &'u str)>> {
        let caps = self.pattern.captures(url)?;
        Some(
            self.placeholders
                .iter()
                .filter_map(|p| caps.get(p.group).map(|m| (p.name.as_str(), m.as_str())))
                .collect(),
        )
    }
}

/// Compile a URI template into an anchored matching pattern.
pub fn compile(template: &str) -> Result<CompiledTemplate, TemplateError> {
    let malformed = |reason| TemplateError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');

    let mut buffer = String::new();
    let mut placeholders = Vec::new();
    let mut depth = 0usize;
    // Group 0 is the whole match.
    let mut next_group = 1usize;

    for (offset, c) in template.char_indices() {
        match c {
            '{' => {
                depth += 1;
                if depth == 1 {
                    pattern.push_str(&regex::escape(&buffer));
                    buffer.clear();
                    continue;
                }
            }
            '}' => {
                if depth == 0 {
                    return Err(malformed(Malformation::UnmatchedBrace { offset }));
                }
                depth -= 1;
                if depth == 0 {
                    let placeholder = match buffer.split_once(':') {
                        None => {
                            pattern.push_str(DEFAULT_CAPTURE);
                            Placeholder {
                                name: buffer.clone(),
                                regex: None,
                                group: next_group,
                            }
                        }
                        Some((_, "")) => {
                            return Err(malformed(Malformation::EmptyRegex {
                                placeholder: buffer.clone(),
                            }));
                        }
                        Some((name, regex)) => {
                            let inner_groups = count_groups(template, regex)?;
                            pattern.push('(');
                            pattern.push_str(regex);
                            pattern.push(')');
                            let placeholder = Placeholder {
                                name: name.to_string(),
                                regex: Some(regex.to_string()),
                                group: next_group,
                            };
                            next_group += inner_groups;
                            placeholder
                        }
                    };
                    next_group += 1;
                    placeholders.push(placeholder);
                    buffer.clear();
                    continue;
                }
            }
            _ => {}
        }
        buffer.push(c);
    }

    if depth > 0 {
        return Err(malformed(Malformation::Unterminated {
            placeholder: buffer,
        }));
    }

    pattern.push_str(&regex::escape(&buffer));
    pattern.push_str(TRAILING_SUFFIX);
    pattern.push('$');

    let pattern = Regex::new(&pattern).map_err(|source| TemplateError::InvalidPattern {
        template: template.to_string(),
        source,
    })?;

    Ok(CompiledTemplate {
        template: template.to_string(),
        pattern,
        placeholders,
    })
}

/// Number of capture groups a custom regex opens on its own.
fn count_groups(template: &str, regex: &str) -> Result<usize, TemplateError> {
    let fragment = Regex::new(regex).map_err(|source| TemplateError::InvalidPattern {
        template: template.to_string(),
        source,
    })?;
    Ok(fragment.captures_len() - 1)
}
