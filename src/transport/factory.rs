//! Connection factory.
//!
//! # Responsibilities
//! - Register one transport profile per HTTP(S) repository
//! - Hand out a configured client for each outbound URL
//! - Fall back to an unconfigured client when no single profile applies

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::config::schema::{RepositoryConfig, SelectorConfig};
use crate::observability::metrics;
use crate::routing::{
    ConnectionSelector, Resolution, ResolutionObserver, SharedSelector, TracingObserver,
};
use crate::transport::client::{build_client, Credentials, TransportError};

/// Configuration object stored in the selector for one repository.
#[derive(Debug, Clone)]
pub struct TransportProfile {
    repository: String,
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl TransportProfile {
    pub fn from_repository(repo: &RepositoryConfig) -> Result<Self, TransportError> {
        Ok(Self {
            repository: repo.display_name().to_string(),
            client: build_client(repo)?,
            credentials: Credentials::from_repository(repo),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Why a connection uses the default client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    NotFound,
    Ambiguous { conflicting: Vec<String> },
}

/// Where a connection's settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Configured { template: String, repository: String },
    Default(Fallback),
}

/// An outbound connection ready to issue requests.
#[derive(Debug, Clone)]
pub struct Connection {
    destination: String,
    url: Url,
    client: reqwest::Client,
    credentials: Option<Credentials>,
    source: Source,
}

impl Connection {
    /// The destination exactly as the caller passed it to `create`.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.source, Source::Configured { .. })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Start a request to the connection's URL, with credentials applied.
    pub fn request(&self, method: Method) -> RequestBuilder {
        let builder = self.client.request(method, self.url.clone());
        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.username, creds.password.as_ref()),
            None => builder,
        }
    }

    pub fn get(&self) -> RequestBuilder {
        self.request(Method::GET)
    }
}

/// Builds outbound connections from per-repository transport settings.
#[derive(Debug)]
pub struct ConnectionFactory {
    selector: SharedSelector<TransportProfile>,
    default_client: reqwest::Client,
    observer: Arc<dyn ResolutionObserver>,
}

impl ConnectionFactory {
    /// Create a factory with no repositories, logging through `tracing`.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn ResolutionObserver>) -> Result<Self, TransportError> {
        let default_client =
            reqwest::Client::builder()
                .build()
                .map_err(|source| TransportError::Client {
                    repository: "<unconfigured>".to_string(),
                    source,
                })?;

        Ok(Self {
            selector: SharedSelector::new(ConnectionSelector::with_observer(observer.clone())),
            default_client,
            observer,
        })
    }

    /// Register the default repository and every named one on top of the
    /// current registrations. Returns the number of templates registered.
    pub fn add_configuration(&self, config: &SelectorConfig) -> Result<usize, TransportError> {
        let profiles = build_profiles(config)?;

        self.selector.update(|selector| register_all(selector, profiles))?;

        let count = self.selector.load().len();
        metrics::record_registered(count);
        tracing::info!(templates = count, "Connection configuration added");
        Ok(count)
    }

    /// Replace every registration with those of `config`.
    pub fn reload(&self, config: &SelectorConfig) -> Result<usize, TransportError> {
        let mut selector = ConnectionSelector::with_observer(self.observer.clone());
        register_all(&mut selector, build_profiles(config)?)?;

        let count = selector.len();
        self.selector.replace(selector);
        metrics::record_registered(count);
        tracing::info!(templates = count, "Connection configuration reloaded");
        Ok(count)
    }

    /// Snapshot of the active selector.
    pub fn selector(&self) -> Arc<ConnectionSelector<TransportProfile>> {
        self.selector.load()
    }

    /// Build the connection for a destination URL.
    ///
    /// Templates are matched against `destination` as written; parsing only
    /// rejects URLs a client could not request.
    pub fn create(&self, destination: &str) -> Result<Connection, TransportError> {
        let url = Url::parse(destination).map_err(|source| TransportError::InvalidUrl {
            url: destination.to_string(),
            source,
        })?;
        let selector = self.selector.load();

        let (client, credentials, source) = match selector.resolve(destination) {
            Resolution::Matched { template, config } => (
                config.client.clone(),
                config.credentials.clone(),
                Source::Configured {
                    template: template.to_string(),
                    repository: config.repository.clone(),
                },
            ),
            Resolution::NotFound => (
                self.default_client.clone(),
                None,
                Source::Default(Fallback::NotFound),
            ),
            Resolution::Ambiguous { conflicting } => (
                self.default_client.clone(),
                None,
                Source::Default(Fallback::Ambiguous {
                    conflicting: conflicting.into_iter().map(str::to_string).collect(),
                }),
            ),
        };

        Ok(Connection {
            destination: destination.to_string(),
            url,
            client,
            credentials,
            source,
        })
    }
}

fn build_profiles(config: &SelectorConfig) -> Result<Vec<(String, TransportProfile)>, TransportError> {
    config
        .repositories()
        .filter(|repo| repo.is_http())
        .map(|repo| TransportProfile::from_repository(repo).map(|profile| (repo.uri.clone(), profile)))
        .collect()
}

fn register_all(
    selector: &mut ConnectionSelector<TransportProfile>,
    profiles: Vec<(String, TransportProfile)>,
) -> Result<(), TransportError> {
    for (uri, profile) in profiles {
        let repository = profile.repository.clone();
        selector
            .register(&uri, profile)
            .map_err(|source| TransportError::Template { repository, source })?;
        tracing::debug!(%uri, "Registered connection template");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::NoopObserver;

    fn factory() -> ConnectionFactory {
        ConnectionFactory::with_observer(Arc::new(NoopObserver)).unwrap()
    }

    fn repo(name: &str, uri: &str) -> RepositoryConfig {
        RepositoryConfig {
            name: name.into(),
            uri: uri.into(),
            ..RepositoryConfig::default()
        }
    }

    #[test]
    fn test_only_http_repositories_are_registered() {
        let mut config = SelectorConfig::default();
        config.default = repo("", "https://git.example.com/{team}");
        config.repos.push(repo("ssh", "ssh://git@git.example.com/repo.git"));
        config.repos.push(repo("file", "file:///srv/repo"));

        let f = factory();
        assert_eq!(f.add_configuration(&config).unwrap(), 1);
    }

    #[test]
    fn test_empty_default_is_skipped() {
        let mut config = SelectorConfig::default();
        config.repos.push(repo("a", "https://a.example.com/"));

        let f = factory();
        assert_eq!(f.add_configuration(&config).unwrap(), 1);
    }

    #[test]
    fn test_credentials_applied_to_requests() {
        let mut config = SelectorConfig::default();
        let mut secured = repo("secured", "https://git.example.com/");
        secured.username = Some("deploy".into());
        secured.password = Some("s3cret".into());
        config.repos.push(secured);

        let f = factory();
        f.add_configuration(&config).unwrap();

        let conn = f.create("https://git.example.com/repo.git/info/refs").unwrap();
        assert!(conn.is_configured());
        let request = conn.get().build().unwrap();
        let auth = request.headers().get("authorization").unwrap();
        assert!(auth.to_str().unwrap().starts_with("Basic "));

        let other = f.create("https://elsewhere.example.com/").unwrap();
        assert_eq!(other.source(), &Source::Default(Fallback::NotFound));
        let request = other.get().build().unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_failed_add_keeps_previous_registrations() {
        let f = factory();
        let mut good = SelectorConfig::default();
        good.repos.push(repo("a", "https://a.example.com/"));
        f.add_configuration(&good).unwrap();

        let mut bad = SelectorConfig::default();
        bad.repos.push(repo("b", "https://b.example.com/{x:}"));
        assert!(matches!(
            f.add_configuration(&bad),
            Err(TransportError::Template { .. })
        ));
        assert_eq!(f.selector().len(), 1);
    }

    #[test]
    fn test_unparseable_destination_is_rejected() {
        let f = factory();
        assert!(matches!(
            f.create("git.example.com/repo.git"),
            Err(TransportError::InvalidUrl { .. })
        ));
    }
}
