//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every HTTP(S) repository uri compiles as a URI template
//! - Validate value ranges (timeouts > 0, proxy ports valid)
//! - Detect duplicate repository names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SelectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{ProxyScheme, RepositoryConfig, SelectorConfig};
use crate::template::{compile, TemplateError};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("repository {repository:?}: uri must not be empty")]
    MissingUri { repository: String },

    #[error("repository {repository:?}: {source}")]
    Template {
        repository: String,
        #[source]
        source: TemplateError,
    },

    #[error("repository {repository:?}: timeout_secs must be greater than zero")]
    ZeroTimeout { repository: String },

    #[error("repository {repository:?}: password given without username")]
    PasswordWithoutUsername { repository: String },

    #[error("repository {repository:?}: {scheme} proxy host must not be empty")]
    EmptyProxyHost {
        repository: String,
        scheme: ProxyScheme,
    },

    #[error("repository {repository:?}: {scheme} proxy port must not be zero")]
    ZeroProxyPort {
        repository: String,
        scheme: ProxyScheme,
    },

    #[error("repository {repository:?}: {scheme} proxy password given without username")]
    ProxyPasswordWithoutUsername {
        repository: String,
        scheme: ProxyScheme,
    },

    #[error("duplicate repository name {0:?}")]
    DuplicateName(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SelectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // The default repository is optional.
    if !config.default.uri.is_empty() {
        validate_repository(&config.default, &mut errors);
    }

    let mut names = HashSet::new();
    for repo in &config.repos {
        if !repo.name.is_empty() && !names.insert(repo.name.as_str()) {
            errors.push(ValidationError::DuplicateName(repo.name.clone()));
        }
        if repo.uri.is_empty() {
            errors.push(ValidationError::MissingUri {
                repository: repo.display_name().to_string(),
            });
            continue;
        }
        validate_repository(repo, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_repository(repo: &RepositoryConfig, errors: &mut Vec<ValidationError>) {
    let repository = repo.display_name().to_string();

    if repo.is_http() {
        if let Err(source) = compile(&repo.uri) {
            errors.push(ValidationError::Template {
                repository: repository.clone(),
                source,
            });
        }
    }

    if repo.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            repository: repository.clone(),
        });
    }

    if repo.password.is_some() && repo.username.is_none() {
        errors.push(ValidationError::PasswordWithoutUsername {
            repository: repository.clone(),
        });
    }

    for (scheme, proxy) in repo.proxy.iter() {
        if proxy.host.trim().is_empty() {
            errors.push(ValidationError::EmptyProxyHost {
                repository: repository.clone(),
                scheme,
            });
        }
        if proxy.port == 0 {
            errors.push(ValidationError::ZeroProxyPort {
                repository: repository.clone(),
                scheme,
            });
        }
        if proxy.password.is_some() && proxy.username.is_none() {
            errors.push(ValidationError::ProxyPasswordWithoutUsername {
                repository: repository.clone(),
                scheme,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProxyConfig;

    fn repo(name: &str, uri: &str) -> RepositoryConfig {
        RepositoryConfig {
            name: name.into(),
            uri: uri.into(),
            ..RepositoryConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn test_non_http_uri_is_not_compiled() {
        let mut config = SelectorConfig::default();
        config.repos.push(repo("local", "file:///srv/{broken:}"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SelectorConfig::default();
        config.default = repo("", "https://{bad:}");

        let mut team = repo("team", "https://git.example.com/{team}");
        team.timeout_secs = 0;
        team.password = Some("secret".into());
        team.proxy.https = Some(ProxyConfig {
            host: " ".into(),
            port: 0,
            username: None,
            password: None,
            non_proxy_hosts: Vec::new(),
        });
        config.repos.push(team);
        config.repos.push(repo("team", "https://other.example.com/"));
        config.repos.push(repo("empty", ""));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(matches!(&errors[0], ValidationError::Template { repository, .. } if repository == "default"));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateName(name) if name == "team")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingUri { repository } if repository == "empty")));
    }
}
