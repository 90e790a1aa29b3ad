//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the selector.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// The default repository; skipped when its uri is empty.
    pub default: RepositoryConfig,

    /// Additional repositories, registered in file order.
    pub repos: Vec<RepositoryConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl SelectorConfig {
    /// The default repository followed by every named one.
    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryConfig> {
        std::iter::once(&self.default).chain(self.repos.iter())
    }
}

/// Transport settings for one repository URI (or URI template).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository identifier for logging and reports.
    pub name: String,

    /// URI or URI template, e.g. `https://git.example.com/{team}/config.git`.
    pub uri: String,

    /// Accept invalid TLS certificates for this endpoint.
    pub skip_ssl_validation: bool,

    /// Connect and request timeout in seconds.
    pub timeout_secs: u64,

    /// Proxies by the scheme they apply to.
    pub proxy: ProxySettings,

    /// Basic credentials for the endpoint itself.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RepositoryConfig {
    /// Name used in logs; the default repository may leave it empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "default"
        } else {
            &self.name
        }
    }

    /// Only HTTP(S) URIs get a custom connection configuration.
    pub fn is_http(&self) -> bool {
        self.uri.starts_with("http")
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            uri: String::new(),
            skip_ssl_validation: false,
            timeout_secs: 5,
            proxy: ProxySettings::default(),
            username: None,
            password: None,
        }
    }
}

/// Per-scheme proxy table (`[repos.proxy.http]`, `[repos.proxy.https]`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<ProxyConfig>,
    pub https: Option<ProxyConfig>,
}

impl ProxySettings {
    /// Configured proxies with their scheme.
    pub fn iter(&self) -> impl Iterator<Item = (ProxyScheme, &ProxyConfig)> {
        [
            (ProxyScheme::Http, self.http.as_ref()),
            (ProxyScheme::Https, self.https.as_ref()),
        ]
        .into_iter()
        .filter_map(|(scheme, proxy)| proxy.map(|p| (scheme, p)))
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Scheme of the outbound URLs a proxy is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyScheme {
    Http,
    Https,
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyScheme::Http => f.write_str("http"),
            ProxyScheme::Https => f.write_str("https"),
        }
    }
}

/// Forward proxy settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProxyConfig {
    /// Proxy host name or address.
    pub host: String,

    /// Proxy port.
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Hosts reached directly, bypassing the proxy.
    #[serde(default)]
    pub non_proxy_hosts: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
