//! Sub-resources owned by an application.
//!
//! These are fetched separately from the application itself and only ever
//! counted, never tracked individually.

use crate::application::{HealthStatus, HealthStatusCode};
use serde::{Deserialize, Serialize};

/// A single Kubernetes object in an application's resource tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ResourceNode {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the reported health.
    pub fn with_health(mut self, status: HealthStatusCode) -> Self {
        self.health = Some(HealthStatus {
            status,
            message: None,
        });
        self
    }

    /// Reported health; nodes without a health block count as unknown.
    pub fn health_status(&self) -> HealthStatusCode {
        self.health
            .as_ref()
            .map(|h| h.status)
            .unwrap_or(HealthStatusCode::Unknown)
    }
}

/// Response of `GET /api/v1/applications/{name}/resource-tree`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTree {
    #[serde(default)]
    pub nodes: Vec<ResourceNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphaned_nodes: Vec<ResourceNode>,
}
