//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SelectorConfig;

/// Watches the configuration file and emits every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<SelectorConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reloaded configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<SelectorConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| handle_event(&path, &tx, res),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload on modify/create events; a config that fails to load is dropped.
fn handle_event(
    path: &Path,
    tx: &mpsc::UnboundedSender<SelectorConfig>,
    res: notify::Result<Event>,
) {
    match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            tracing::info!(path = ?path, "Config file change detected, reloading");
            match load_config(path) {
                Ok(config) => {
                    if tx.send(config).is_err() {
                        tracing::debug!("Config receiver dropped; ignoring reload");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to reload config; keeping current configuration");
                }
            }
        }
        Ok(_) => {}
        Err(e) => tracing::error!(error = ?e, "Watch error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, EventKind, ModifyKind};

    fn modified() -> notify::Result<Event> {
        Ok(Event::new(EventKind::Modify(ModifyKind::Any)))
    }

    #[test]
    fn test_reload_paths() {
        let path = std::env::temp_dir().join(format!("conn_selector_watch_{}.toml", std::process::id()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        std::fs::write(
            &path,
            "[[repos]]\nname = \"a\"\nuri = \"https://a.example.com/{repo}\"\n",
        )
        .unwrap();
        handle_event(&path, &tx, modified());
        let config = rx.try_recv().unwrap();
        assert_eq!(config.repos[0].uri, "https://a.example.com/{repo}");

        // Access events never reload.
        handle_event(&path, &tx, Ok(Event::new(EventKind::Access(AccessKind::Any))));
        assert!(rx.try_recv().is_err());

        // A broken template keeps the previous configuration.
        std::fs::write(&path, "[[repos]]\nname = \"a\"\nuri = \"https://a.example.com/{repo\"\n").unwrap();
        handle_event(&path, &tx, modified());
        assert!(rx.try_recv().is_err());

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
