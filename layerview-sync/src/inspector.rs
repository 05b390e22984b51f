//! On-demand resource detail for a single application.
//!
//! Fetches run on their own task with their own cancellation token, apart
//! from the stream controller. A cancelled fetch publishes nothing, so a
//! consumer that has lost interest never sees a late result.

use crate::source::ApplicationSource;
use layerview_status::{summarize_resources, ResourceSummary};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Detail state of one application's resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Loaded(ResourceSummary),
    Failed(String),
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading)
    }
}

/// Resource detail for one application.
pub struct ResourceInspector {
    source: Arc<dyn ApplicationSource>,
    name: String,
    namespace: String,
    tx: Arc<watch::Sender<DetailState>>,
    rx: watch::Receiver<DetailState>,
    in_flight: Option<CancellationToken>,
}

impl ResourceInspector {
    pub fn new(
        source: Arc<dyn ApplicationSource>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        let (tx, rx) = watch::channel(DetailState::Idle);
        Self {
            source,
            name: name.into(),
            namespace: namespace.into(),
            tx: Arc::new(tx),
            rx,
            in_flight: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts a fetch, abandoning any fetch still in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch(&mut self) {
        self.cancel();
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.tx.send_replace(DetailState::Loading);

        let source = Arc::clone(&self.source);
        let tx = Arc::clone(&self.tx);
        let name = self.name.clone();
        let namespace = self.namespace.clone();
        tokio::spawn(async move {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(app = %name, "resource fetch abandoned");
                    return;
                }
                fetched = source.resource_tree(&name, &namespace) => fetched,
            };
            let state = match fetched {
                Ok(tree) => DetailState::Loaded(summarize_resources(&name, &tree.nodes)),
                Err(err) => {
                    warn!(app = %name, error = %err, "resource fetch failed");
                    DetailState::Failed(err.to_string())
                }
            };
            tx.send_if_modified(|current| {
                if cancel.is_cancelled() {
                    return false;
                }
                *current = state;
                true
            });
        });
    }

    /// Abandons the in-flight fetch, if any. The published state is left
    /// as it was.
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            // The fetch task checks its token under the same lock.
            self.tx.send_if_modified(|_| {
                token.cancel();
                false
            });
        }
    }

    pub fn state(&self) -> DetailState {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.rx.clone()
    }

    /// Waits until the state is no longer [`DetailState::Loading`].
    pub async fn settled(&mut self) -> DetailState {
        let settled = self
            .rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.rx.borrow().clone())
    }
}

impl Drop for ResourceInspector {
    fn drop(&mut self) {
        self.cancel();
    }
}
