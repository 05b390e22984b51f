//! Source abstraction.
//!
//! The controller and the resource inspector only ever talk to an
//! [`ApplicationSource`], so they can run against the real HTTP backend or
//! against a scripted source in tests.

use crate::error::{SyncError, SyncResult};
use crate::protocol::{resource_tree_path, APPLICATIONS_PATH, STREAM_PATH};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use layerview_types::{Application, ApplicationList, ResourceTree};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Raw chunks of the live stream, in arrival order.
pub type ByteStream = BoxStream<'static, SyncResult<Vec<u8>>>;

/// A backend that can list applications, stream their changes and
/// describe their resources.
#[async_trait]
pub trait ApplicationSource: Send + Sync + 'static {
    /// Full listing of every application.
    async fn list_applications(&self) -> SyncResult<Vec<Application>>;

    /// Opens the live change stream. The returned stream ends when the
    /// backend closes the connection.
    async fn open_stream(&self) -> SyncResult<ByteStream>;

    /// Resource tree of one application.
    async fn resource_tree(&self, name: &str, namespace: &str) -> SyncResult<ResourceTree>;
}

/// Connection settings for [`HttpSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Applies to connecting and to the pull endpoints. The live stream is
    /// never cut off by it once open.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// [`ApplicationSource`] backed by the HTTP API.
pub struct HttpSource {
    config: ApiConfig,
    client: Client,
}

impl HttpSource {
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.config.url(path));
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder, what: &str) -> SyncResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{what} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status().as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ApplicationSource for HttpSource {
    async fn list_applications(&self) -> SyncResult<Vec<Application>> {
        let request = self
            .get(APPLICATIONS_PATH)
            .timeout(self.config.request_timeout);
        let response = Self::send(request, "application list").await?;
        let list: ApplicationList = response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("failed to parse application list: {e}")))?;

        let total = list.items.len();
        let apps: Vec<Application> = list
            .items
            .into_iter()
            .filter(Application::has_identity)
            .collect();
        debug!(total, kept = apps.len(), "listed applications");
        Ok(apps)
    }

    async fn open_stream(&self) -> SyncResult<ByteStream> {
        let request = self.get(STREAM_PATH).header(ACCEPT, "text/event-stream");
        let response = Self::send(request, "stream connect").await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| SyncError::Network(format!("stream read failed: {e}")))
            })
            .boxed();
        Ok(stream)
    }

    async fn resource_tree(&self, name: &str, namespace: &str) -> SyncResult<ResourceTree> {
        let request = self
            .get(&resource_tree_path(name))
            .query(&[("appNamespace", namespace)])
            .timeout(self.config.request_timeout);
        let response = Self::send(request, "resource tree").await?;
        response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("failed to parse resource tree: {e}")))
    }
}

/// A scripted source for testing.
pub mod mock {
    use super::*;
    use futures::channel::mpsc;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    enum Connect {
        Refuse(String),
        Stream(mpsc::UnboundedReceiver<SyncResult<Vec<u8>>>),
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live end of a scripted stream.
    ///
    /// Dropping the feed ends the stream, as a backend closing the
    /// connection would.
    pub struct StreamFeed {
        tx: mpsc::UnboundedSender<SyncResult<Vec<u8>>>,
    }

    impl StreamFeed {
        /// Delivers `text` as one read.
        pub fn send(&self, text: &str) {
            let _ = self.tx.unbounded_send(Ok(text.as_bytes().to_vec()));
        }

        /// Delivers raw bytes as one read.
        pub fn send_bytes(&self, bytes: &[u8]) {
            let _ = self.tx.unbounded_send(Ok(bytes.to_vec()));
        }

        /// Fails the next read.
        pub fn fail(&self, message: &str) {
            let _ = self.tx.unbounded_send(Err(SyncError::Network(message.to_string())));
        }

        /// Ends the stream.
        pub fn close(self) {}
    }

    /// Connection attempts are answered from a queue. Once the queue is
    /// empty, connecting succeeds with a stream that never yields.
    #[derive(Default)]
    pub struct MockSource {
        connects: Mutex<VecDeque<Connect>>,
        listing: Mutex<Option<Vec<Application>>>,
        listing_error: Mutex<Option<String>>,
        trees: Mutex<HashMap<String, ResourceTree>>,
        tree_delay: Mutex<Option<Duration>>,
        opens: AtomicUsize,
        lists: AtomicUsize,
        tree_fetches: AtomicUsize,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a refused connection attempt.
        pub fn push_refusal(&self, message: &str) {
            lock(&self.connects).push_back(Connect::Refuse(message.to_string()));
        }

        /// Queues a successful connection and returns its feed.
        pub fn push_stream(&self) -> StreamFeed {
            let (tx, rx) = mpsc::unbounded();
            lock(&self.connects).push_back(Connect::Stream(rx));
            StreamFeed { tx }
        }

        /// Sets the result of the pull listing.
        pub fn set_listing(&self, apps: Vec<Application>) {
            *lock(&self.listing) = Some(apps);
            *lock(&self.listing_error) = None;
        }

        /// Makes the pull listing fail.
        pub fn fail_listing(&self, message: &str) {
            *lock(&self.listing_error) = Some(message.to_string());
        }

        pub fn set_tree(&self, name: &str, tree: ResourceTree) {
            lock(&self.trees).insert(name.to_string(), tree);
        }

        /// Delays every resource tree response.
        pub fn set_tree_delay(&self, delay: Duration) {
            *lock(&self.tree_delay) = Some(delay);
        }

        pub fn open_count(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        pub fn list_count(&self) -> usize {
            self.lists.load(Ordering::SeqCst)
        }

        pub fn tree_fetch_count(&self) -> usize {
            self.tree_fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApplicationSource for MockSource {
        async fn list_applications(&self) -> SyncResult<Vec<Application>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = lock(&self.listing_error).clone() {
                return Err(SyncError::Network(message));
            }
            Ok(lock(&self.listing).clone().unwrap_or_default())
        }

        async fn open_stream(&self) -> SyncResult<ByteStream> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            // Lets observers see the Connecting state.
            tokio::task::yield_now().await;
            let next = lock(&self.connects).pop_front();
            match next {
                Some(Connect::Refuse(message)) => Err(SyncError::Network(message)),
                Some(Connect::Stream(rx)) => Ok(rx.boxed()),
                None => Ok(futures::stream::pending::<SyncResult<Vec<u8>>>().boxed()),
            }
        }

        async fn resource_tree(&self, name: &str, _namespace: &str) -> SyncResult<ResourceTree> {
            self.tree_fetches.fetch_add(1, Ordering::SeqCst);
            let delay = *lock(&self.tree_delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let tree = lock(&self.trees).get(name).cloned();
            tree.ok_or(SyncError::HttpStatus(404))
        }
    }
}
