//! HTTP client construction from repository settings.

use std::time::Duration;

use reqwest::{NoProxy, Proxy};
use thiserror::Error;

use crate::config::schema::{ProxyConfig, ProxyScheme, RepositoryConfig};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("repository {repository:?}: invalid {scheme} proxy {target}: {source}")]
    Proxy {
        repository: String,
        scheme: ProxyScheme,
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("repository {repository:?}: failed to build HTTP client: {source}")]
    Client {
        repository: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("repository {repository:?}: {source}")]
    Template {
        repository: String,
        #[source]
        source: crate::template::TemplateError,
    },

    #[error("invalid destination URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Basic credentials applied to every request on a configured connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn from_repository(repo: &RepositoryConfig) -> Option<Self> {
        repo.username.as_ref().map(|username| Self {
            username: username.clone(),
            password: repo.password.clone(),
        })
    }
}

/// Build a client honoring the repository's timeout, TLS and proxy settings.
pub fn build_client(repo: &RepositoryConfig) -> Result<reqwest::Client, TransportError> {
    let timeout = Duration::from_secs(repo.timeout_secs);
    let mut builder = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout);

    if repo.skip_ssl_validation {
        tracing::warn!(repository = %repo.display_name(), "TLS certificate validation disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    for (scheme, proxy) in repo.proxy.iter() {
        builder = builder.proxy(build_proxy(repo, scheme, proxy)?);
    }

    builder.build().map_err(|source| TransportError::Client {
        repository: repo.display_name().to_string(),
        source,
    })
}

fn build_proxy(
    repo: &RepositoryConfig,
    scheme: ProxyScheme,
    proxy: &ProxyConfig,
) -> Result<Proxy, TransportError> {
    let target = format!("http://{}:{}", proxy.host, proxy.port);
    let built = match scheme {
        ProxyScheme::Http => Proxy::http(&target),
        ProxyScheme::Https => Proxy::https(&target),
    };
    let mut built = built.map_err(|source| TransportError::Proxy {
        repository: repo.display_name().to_string(),
        scheme,
        target: target.clone(),
        source,
    })?;

    if let Some(username) = &proxy.username {
        built = built.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
    }
    if !proxy.non_proxy_hosts.is_empty() {
        built = built.no_proxy(NoProxy::from_string(&proxy.non_proxy_hosts.join(",")));
    }
    Ok(built)
}
