//! Core type definitions for layerview.
//!
//! This crate defines the types every other layerview crate speaks:
//! - [`Application`], the deployed entity reported by the GitOps backend,
//!   together with its sync, health and operation state
//! - [`ResourceNode`] and [`ResourceTree`], the sub-resources owned by an
//!   application, fetched on demand
//! - [`LayerConfig`] and [`LayerTable`], the static, dependency-ordered
//!   description of the delivery pipeline
//!
//! The wire shapes follow the backend's JSON closely. Almost every nested
//! field is optional upstream, so deserialization is lenient: unknown or
//! absent status strings collapse to an `Unknown` variant instead of failing.

mod application;
mod layer;
mod resource;
mod time;

pub use application::{
    Application, ApplicationList, ApplicationMetadata, ApplicationSpec, ApplicationStatus,
    Destination, HealthStatus, HealthStatusCode, HookPhase, HookResult, OperationPhase,
    OperationState, Source, SyncPhase, SyncResult, SyncStatus, SyncStatusCode,
    CATEGORY_LABEL_KEY, UNCATEGORIZED,
};
pub use layer::{LayerConfig, LayerTable};
pub use resource::{ResourceNode, ResourceTree};
pub use time::format_relative;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading model types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate layer key: {0}")]
    DuplicateLayer(String),

    #[error("layer {layer} depends on unknown layer {missing}")]
    UnknownDependency { layer: String, missing: String },

    #[error("layer dependency cycle through {0}")]
    DependencyCycle(String),
}
