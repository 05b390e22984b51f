//! Live stream ingest for layerview.
//!
//! Keeps an [`EntityStore`](layerview_store::EntityStore) current with the
//! backend's application stream and publishes what a presentation layer
//! needs to draw it.
//!
//! # Architecture
//!
//! - **Source**: [`ApplicationSource`] abstracts the backend. [`HttpSource`]
//!   talks to the real API; [`source::mock::MockSource`] is scripted for
//!   tests.
//! - **Frames**: [`FrameDecoder`] turns arbitrary byte chunks into
//!   [`WatchEvent`]s. A bad frame is dropped, never fatal.
//! - **Controller**: [`spawn_controller`] runs the connect, stream and
//!   back-off loop on one task that owns the store, and publishes a
//!   [`LiveView`] after every batch.
//! - **Inspector**: [`ResourceInspector`] fetches one application's
//!   resources on demand, independently of the stream.
//!
//! # Example
//!
//! ```no_run
//! use layerview_store::EntityStore;
//! use layerview_sync::{spawn_controller, ApiConfig, ControllerConfig, HttpSource};
//! use std::sync::Arc;
//!
//! # async fn run() -> layerview_sync::SyncResult<()> {
//! let source = HttpSource::new(ApiConfig::new("http://localhost:8080"))?;
//! let handle = spawn_controller(Arc::new(source), EntityStore::new(), ControllerConfig::default());
//!
//! let mut view = handle.subscribe();
//! while view.changed().await.is_ok() {
//!     println!("{} applications", view.borrow().snapshot.total());
//! }
//! # Ok(())
//! # }
//! ```

pub mod applicator;
mod controller;
mod error;
pub mod frame;
mod inspector;
pub mod protocol;
pub mod source;

pub use applicator::{apply_batch, BatchOutcome};
pub use controller::{
    spawn_controller, Backoff, ConnectionState, ControllerConfig, ControllerHandle, LiveView,
};
pub use error::{SyncError, SyncResult};
pub use frame::FrameDecoder;
pub use inspector::{DetailState, ResourceInspector};
pub use protocol::{EventType, StreamEnvelope, WatchEvent, DATA_PREFIX};
pub use source::{ApiConfig, ApplicationSource, ByteStream, HttpSource};
