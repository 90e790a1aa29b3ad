//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use conn_selector::routing::{ConnectionSelector, ResolutionEvent, ResolutionObserver};

/// One recorded resolution outcome, owned so it outlives the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Matched { url: String, template: String },
    NotFound { url: String },
    Ambiguous { url: String, conflicting: Vec<String> },
}

/// Observer that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }
}

impl ResolutionObserver for RecordingObserver {
    fn observe(&self, event: &ResolutionEvent<'_>) {
        let recorded = match *event {
            ResolutionEvent::Matched { url, template } => Recorded::Matched {
                url: url.into(),
                template: template.into(),
            },
            ResolutionEvent::NotFound { url } => Recorded::NotFound { url: url.into() },
            ResolutionEvent::Ambiguous { url, conflicting } => Recorded::Ambiguous {
                url: url.into(),
                conflicting: conflicting.iter().map(|s| s.to_string()).collect(),
            },
        };
        self.events.lock().unwrap().push(recorded);
    }
}

/// A selector wired to a fresh recorder.
#[allow(dead_code)]
pub fn recording_selector<C>() -> (ConnectionSelector<C>, Arc<RecordingObserver>) {
    let recorder = Arc::new(RecordingObserver::default());
    (ConnectionSelector::with_observer(recorder.clone()), recorder)
}

/// Configuration with a templated default, two named repos and an ssh mirror.
#[allow(dead_code)]
pub const SAMPLE_CONFIG: &str = r#"
[default]
uri = "https://git.example.com/{team}/config.git"

[[repos]]
name = "billing"
uri = "https://git.example.com/billing/config.git"
timeout_secs = 30
username = "deploy"
password = "s3cret"

[repos.proxy.https]
host = "proxy.internal"
port = 3128

[[repos]]
name = "numbered"
uri = "https://build.example.com/{id:[0-9]+}"
skip_ssl_validation = true

[[repos]]
name = "any-build"
uri = "https://build.example.com/{slug}"

[[repos]]
name = "mirror"
uri = "git@github.com:example/mirror.git"
"#;
