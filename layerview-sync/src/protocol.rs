//! Wire format of the backend API.
//!
//! The live endpoint speaks a line-oriented event stream. Each meaningful
//! line is `data:` followed by a JSON envelope:
//!
//! ```text
//! data: {"result":{"type":"MODIFIED","application":{...}}}
//! ```
//!
//! Any other line (blank, `event:`, `id:`, `:` comments) carries nothing
//! and is skipped by the decoder.

use crate::error::SyncResult;
use layerview_types::Application;
use serde::{Deserialize, Serialize};

/// Prefix marking a frame that carries an event payload.
pub const DATA_PREFIX: &str = "data:";

/// Pull listing of all applications.
pub const APPLICATIONS_PATH: &str = "/api/v1/applications";

/// Live event stream.
pub const STREAM_PATH: &str = "/api/v1/stream/applications";

/// Path of the resource tree for one application.
pub fn resource_tree_path(name: &str) -> String {
    format!("{APPLICATIONS_PATH}/{name}/resource-tree")
}

/// What happened to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Added,
    Modified,
    Deleted,
}

/// One decoded change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    pub application: Application,
}

impl WatchEvent {
    pub fn added(application: Application) -> Self {
        Self {
            kind: EventType::Added,
            application,
        }
    }

    pub fn modified(application: Application) -> Self {
        Self {
            kind: EventType::Modified,
            application,
        }
    }

    pub fn deleted(application: Application) -> Self {
        Self {
            kind: EventType::Deleted,
            application,
        }
    }

    /// Encodes this event as one complete stream frame, terminator included.
    pub fn to_frame(&self) -> SyncResult<String> {
        let envelope = StreamEnvelope {
            result: self.clone(),
        };
        Ok(format!("{DATA_PREFIX} {}\n\n", serde_json::to_string(&envelope)?))
    }
}

/// JSON document carried after the `data:` prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    pub result: WatchEvent,
}
