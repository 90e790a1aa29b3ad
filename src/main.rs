//! `conn-selector` command line tool.
//!
//! ```text
//! conn-selector --config selector.toml resolve https://git.example.com/team/config.git
//! conn-selector --config selector.toml check
//! conn-selector --config selector.toml watch --metrics-address 127.0.0.1:9090
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use conn_selector::config::{load_config, watcher::ConfigWatcher};
use conn_selector::observability::{logging, metrics};
use conn_selector::transport::{ConnectionFactory, Fallback, Source};

#[derive(Parser)]
#[command(name = "conn-selector")]
#[command(about = "Select per-endpoint HTTP transport settings by URI template", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "selector.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which configuration each URL resolves to
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Validate the configuration and list compiled templates
    Check,
    /// Keep the configuration loaded and reload it on change
    Watch {
        /// Expose Prometheus metrics on this address.
        #[arg(long)]
        metrics_address: Option<SocketAddr>,
    },
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    url: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conflicting: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> ResolveReport<'a> {
    fn new(url: &'a str, outcome: &'static str) -> Self {
        Self {
            url,
            outcome,
            template: None,
            repository: None,
            variables: BTreeMap::new(),
            conflicting: Vec::new(),
            error: None,
        }
    }
}

#[derive(Serialize)]
struct TemplateReport<'a> {
    template: &'a str,
    repository: &'a str,
    pattern: &'a str,
    literal: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability)?;

    tracing::info!(config = ?cli.config, "conn-selector v0.1.0 starting");

    let factory = ConnectionFactory::new()?;
    factory.add_configuration(&config)?;

    match cli.command {
        Commands::Resolve { urls } => {
            for raw in &urls {
                let report = resolve(&factory, raw);
                println!("{}", serde_json::to_string(&report)?);
            }
        }
        Commands::Check => {
            let selector = factory.selector();
            let reports: Vec<_> = selector
                .templates()
                .filter_map(|t| {
                    selector.get(t.template()).map(|profile| TemplateReport {
                        template: t.template(),
                        repository: profile.repository(),
                        pattern: t.pattern().as_str(),
                        literal: t.is_literal(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Watch { metrics_address } => {
            if let Some(addr) = metrics_address {
                metrics::init_metrics(addr)?;
            }

            let (watcher, mut updates) = ConfigWatcher::new(&cli.config);
            let _watch = watcher.run()?;

            loop {
                tokio::select! {
                    Some(config) = updates.recv() => {
                        if let Err(e) = factory.reload(&config) {
                            tracing::error!(error = %e, "Reload rejected; keeping current configuration");
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn resolve<'a>(factory: &ConnectionFactory, raw: &'a str) -> ResolveReport<'a> {
    let connection = match factory.create(raw) {
        Ok(connection) => connection,
        Err(e) => {
            let mut report = ResolveReport::new(raw, "invalid_url");
            report.error = Some(e.to_string());
            return report;
        }
    };

    match connection.source() {
        Source::Configured {
            template,
            repository,
        } => {
            let mut report = ResolveReport::new(raw, "matched");
            let selector = factory.selector();
            if let Some(caps) = selector
                .compiled(template)
                .and_then(|t| t.captures(raw))
            {
                report.variables = caps
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
            }
            report.template = Some(template.clone());
            report.repository = Some(repository.clone());
            report
        }
        Source::Default(Fallback::NotFound) => ResolveReport::new(raw, "not_found"),
        Source::Default(Fallback::Ambiguous { conflicting }) => {
            let mut report = ResolveReport::new(raw, "ambiguous");
            report.conflicting = conflicting.clone();
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conn_selector::config::parse_config;
    use conn_selector::routing::NoopObserver;
    use serde_json::json;
    use std::sync::Arc;

    fn factory() -> ConnectionFactory {
        let factory = ConnectionFactory::with_observer(Arc::new(NoopObserver)).unwrap();
        let config = parse_config(
            r#"
            [default]
            uri = "https://git.example.com/{team}/{repo:[a-z]+}.git"

            [[repos]]
            name = "build"
            uri = "https://build.example.com/{id:[0-9]+}"

            [[repos]]
            name = "any-build"
            uri = "https://build.example.com/{slug}"
            "#,
        )
        .unwrap();
        factory.add_configuration(&config).unwrap();
        factory
    }

    fn report(raw: &str) -> serde_json::Value {
        serde_json::to_value(resolve(&factory(), raw)).unwrap()
    }

    #[test]
    fn test_matched_report_carries_variables() {
        assert_eq!(
            report("https://git.example.com/payments/config.git/info/refs"),
            json!({
                "url": "https://git.example.com/payments/config.git/info/refs",
                "outcome": "matched",
                "template": "https://git.example.com/{team}/{repo:[a-z]+}.git",
                "repository": "default",
                "variables": { "team": "payments", "repo": "config" },
            })
        );
    }

    #[test]
    fn test_ambiguous_report_lists_templates() {
        assert_eq!(
            report("https://build.example.com/42"),
            json!({
                "url": "https://build.example.com/42",
                "outcome": "ambiguous",
                "conflicting": [
                    "https://build.example.com/{id:[0-9]+}",
                    "https://build.example.com/{slug}",
                ],
            })
        );
    }

    #[test]
    fn test_not_found_and_invalid_reports() {
        assert_eq!(
            report("https://elsewhere.example.com/repo"),
            json!({ "url": "https://elsewhere.example.com/repo", "outcome": "not_found" })
        );

        let invalid = report("not a url");
        assert_eq!(invalid["outcome"], "invalid_url");
        assert!(invalid["error"].is_string());
    }
}
