//! Reconnecting stream controller.
//!
//! One controller task owns the [`EntityStore`]. It connects to the live
//! stream, applies every decoded batch, and publishes a fresh [`LiveView`]
//! through a watch channel. On failure it waits out an exponential backoff
//! and connects again, until cancelled. While the stream is down the full
//! listing is pulled again every [`ControllerConfig::poll_interval`].
//!
//! ```text
//! Disconnected ──► Connecting ──► Streaming
//!      ▲               │              │
//!      └───── failure ─┴── EOF/error ─┘
//!
//! any state ── cancel ──► Stopped
//! ```

use crate::applicator::apply_batch;
use crate::error::{SyncError, SyncResult};
use crate::frame::FrameDecoder;
use crate::source::{ApplicationSource, ByteStream};
use futures::StreamExt;
use layerview_store::{EntityStore, GroupedSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Where the controller is in its connection lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Streaming,
    /// Terminal; reached only through cancellation.
    Stopped,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Streaming => "streaming",
            ConnectionState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a presentation layer needs, published as one value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveView {
    pub snapshot: GroupedSnapshot,
    pub connected: bool,
    /// Most recent failure. Survives disconnects and is cleared only when a
    /// stream is established again.
    pub last_error: Option<String>,
    pub state: ConnectionState,
    /// Bumped once per publication.
    pub revision: u64,
}

/// Exponential reconnect delay: `min(base * 2^attempt, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay before reconnect attempt `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

/// Controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Pull the full listing once if the very first connection fails.
    pub cold_start_list: bool,
    /// How often to re-pull the full listing while disconnected. `None`
    /// disables polling.
    pub poll_interval: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            cold_start_list: true,
            poll_interval: Some(Duration::from_secs(10)),
        }
    }
}

impl ControllerConfig {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.base_delay, self.max_delay)
    }
}

/// Starts a controller task that owns `store`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_controller(
    source: Arc<dyn ApplicationSource>,
    store: EntityStore,
    config: ControllerConfig,
) -> ControllerHandle {
    let initial = LiveView {
        snapshot: store.snapshot_grouped(),
        ..Default::default()
    };
    let (tx, _) = watch::channel(initial);
    let tx = Arc::new(tx);
    let cancel = CancellationToken::new();

    let controller = Controller {
        source,
        store,
        backoff: config.backoff(),
        cold_start_pending: config.cold_start_list,
        poll_interval: config.poll_interval,
        next_refresh: None,
        cancel: cancel.clone(),
        tx: Arc::clone(&tx),
        attempt: 0,
        state: ConnectionState::Disconnected,
        connected: false,
        last_error: None,
        revision: 0,
    };
    let task = tokio::spawn(controller.run());

    ControllerHandle { tx, cancel, task }
}

/// Handle to a running controller.
///
/// Dropping the handle does not stop the task; call [`cancel`](Self::cancel)
/// or [`stop`](Self::stop).
pub struct ControllerHandle {
    tx: Arc<watch::Sender<LiveView>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// A receiver that sees every publication from now on.
    pub fn subscribe(&self) -> watch::Receiver<LiveView> {
        self.tx.subscribe()
    }

    /// The most recently published view.
    pub fn current(&self) -> LiveView {
        self.tx.borrow().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        if self.cancel.is_cancelled() {
            ConnectionState::Stopped
        } else {
            self.tx.borrow().state
        }
    }

    /// The controller's token. Cancelling it directly stops the task but
    /// may let a publication already in progress land afterwards; use
    /// [`cancel`](Self::cancel) for a hard cut-off.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels the controller. Once this returns the published view no
    /// longer changes.
    pub fn cancel(&self) {
        // Publications check the token under the same lock.
        self.tx.send_if_modified(|_| {
            self.cancel.cancel();
            false
        });
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the controller and waits for its task to exit.
    pub async fn stop(self) -> SyncResult<()> {
        self.cancel();
        self.task
            .await
            .map_err(|e| SyncError::Task(e.to_string()))
    }
}

enum StreamEnd {
    Cancelled,
    Failed(SyncError),
}

struct Controller {
    source: Arc<dyn ApplicationSource>,
    store: EntityStore,
    backoff: Backoff,
    cold_start_pending: bool,
    poll_interval: Option<Duration>,
    /// When the next listing is due. Set only while disconnected.
    next_refresh: Option<Instant>,
    cancel: CancellationToken,
    tx: Arc<watch::Sender<LiveView>>,
    attempt: u32,
    state: ConnectionState,
    connected: bool,
    last_error: Option<String>,
    revision: u64,
}

impl Controller {
    async fn run(mut self) {
        info!("stream controller starting");
        let cancel = self.cancel.clone();
        let source = Arc::clone(&self.source);

        loop {
            self.state = ConnectionState::Connecting;
            self.publish();

            let opened = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                opened = source.open_stream() => opened,
            };
            let first_attempt = std::mem::take(&mut self.cold_start_pending);

            match opened {
                Ok(stream) => {
                    self.on_connected();
                    match self.pump(stream).await {
                        StreamEnd::Cancelled => break,
                        StreamEnd::Failed(err) => self.on_failure(err),
                    }
                }
                Err(err) => {
                    self.on_failure(err);
                    if first_attempt && !self.refresh_listing().await {
                        break;
                    }
                }
            }

            let delay = self.backoff.delay(self.attempt);
            debug!(attempt = self.attempt, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
            self.attempt = self.attempt.saturating_add(1);

            if !self.wait_for_retry(delay).await {
                break;
            }
        }

        info!("stream controller stopped");
    }

    /// Reads until the stream ends, fails, or the controller is cancelled.
    async fn pump(&mut self, mut stream: ByteStream) -> StreamEnd {
        let cancel = self.cancel.clone();
        let mut decoder = FrameDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return StreamEnd::Cancelled,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    let events = decoder.push(&chunk);
                    if events.is_empty() {
                        trace!(bytes = chunk.len(), pending = decoder.pending(), "no complete frame");
                        continue;
                    }
                    let count = events.len();
                    let outcome = apply_batch(&mut self.store, events);
                    debug!(
                        events = count,
                        inserted = outcome.inserted,
                        replaced = outcome.replaced,
                        removed = outcome.removed,
                        "applied batch"
                    );
                    if outcome.changed() {
                        self.publish();
                    }
                }
                Some(Err(err)) => return StreamEnd::Failed(err),
                None => return StreamEnd::Failed(SyncError::StreamClosed),
            }
        }
    }

    /// Sleeps out the reconnect delay, pulling the listing whenever one
    /// falls due. Returns false if cancelled.
    async fn wait_for_retry(&mut self, delay: Duration) -> bool {
        let cancel = self.cancel.clone();
        let wake = Instant::now() + delay;

        loop {
            let due = self.next_refresh;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep_until(wake) => return true,
                _ = tokio::time::sleep_until(due.unwrap_or(wake)), if due.is_some() => {
                    if !self.refresh_listing().await {
                        return false;
                    }
                }
            }
        }
    }

    /// Replaces the store with the pull listing. A failed pull is recorded
    /// as the last error. Returns false if cancelled meanwhile.
    async fn refresh_listing(&mut self) -> bool {
        let cancel = self.cancel.clone();
        let source = Arc::clone(&self.source);
        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            listed = source.list_applications() => listed,
        };

        match listed {
            Ok(apps) => {
                info!(count = apps.len(), "loaded application listing");
                self.store.replace_all(apps);
            }
            Err(err) => {
                warn!(error = %err, "application listing failed");
                self.last_error = Some(err.to_string());
            }
        }
        self.next_refresh = self.poll_interval.map(|every| Instant::now() + every);
        self.publish();
        true
    }

    fn on_connected(&mut self) {
        info!(after_attempts = self.attempt, "stream connected");
        self.state = ConnectionState::Streaming;
        self.connected = true;
        self.last_error = None;
        self.attempt = 0;
        self.next_refresh = None;
        self.publish();
    }

    fn on_failure(&mut self, err: SyncError) {
        warn!(error = %err, attempt = self.attempt, "stream unavailable");
        self.state = ConnectionState::Disconnected;
        self.connected = false;
        self.last_error = Some(err.to_string());
        if self.next_refresh.is_none() {
            self.next_refresh = self.poll_interval.map(|every| Instant::now() + every);
        }
        self.publish();
    }

    fn publish(&mut self) {
        let view = LiveView {
            snapshot: self.store.snapshot_grouped(),
            connected: self.connected,
            last_error: self.last_error.clone(),
            state: self.state,
            revision: self.revision + 1,
        };
        let cancel = &self.cancel;
        let sent = self.tx.send_if_modified(|current| {
            if cancel.is_cancelled() {
                return false;
            }
            *current = view;
            true
        });
        if sent {
            self.revision += 1;
        }
    }
}
