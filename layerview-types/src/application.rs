//! Application model, as reported by the GitOps backend.
//!
//! An [`Application`] is identified by `metadata.name`. Each record received
//! from upstream is complete: a newer record for the same name replaces the
//! previous one wholesale, so nothing in this module merges fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label carrying the pipeline category an application belongs to.
pub const CATEGORY_LABEL_KEY: &str = "jeebon.ai/category";

/// Category used for applications that carry no category label.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Whether the live state matches the declared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncStatusCode {
    Synced,
    OutOfSync,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Operational well-being of an application's resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatusCode {
    Healthy,
    Progressing,
    Degraded,
    Suspended,
    Missing,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Phase of the current (or most recent) sync operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationPhase {
    Running,
    Succeeded,
    Failed,
    Error,
    Terminating,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Outcome of a single hook run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPhase {
    Running,
    Succeeded,
    Failed,
    Error,
    Terminating,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Sync wave a resource or hook belongs to.
///
/// Used both for a hook's role (`hookType`) and for the grouping label of a
/// sync result entry (`syncPhase`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncPhase {
    PreSync,
    Sync,
    PostSync,
    SyncFail,
    Skip,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A deployed application tracked by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub metadata: ApplicationMetadata,
    #[serde(default)]
    pub spec: ApplicationSpec,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(default)]
    pub sync: SyncStatus,
    #[serde(default)]
    pub health: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_state: Option<OperationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub status: SyncStatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: HealthStatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// State of the most recent sync operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<OperationPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_result: Option<SyncResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    #[serde(default)]
    pub resources: Vec<HookResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// One resource touched by the most recent operation.
///
/// Hooks are the entries carrying a `hook_type`; plain resources leave it
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResult {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_phase: Option<HookPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<SyncPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_phase: Option<SyncPhase>,
}

impl HookResult {
    /// Creates a hook entry with the given role and outcome.
    pub fn hook(
        kind: impl Into<String>,
        name: impl Into<String>,
        role: SyncPhase,
        outcome: HookPhase,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            hook_type: Some(role),
            hook_phase: Some(outcome),
            sync_phase: Some(role),
            ..Default::default()
        }
    }

    /// Attaches a free-text message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether this entry is a PreSync or PostSync hook.
    pub fn is_lifecycle_hook(&self) -> bool {
        matches!(self.hook_type, Some(SyncPhase::PreSync | SyncPhase::PostSync))
    }

    /// Whether this entry is a PostSync hook.
    pub fn is_post_sync(&self) -> bool {
        self.hook_type == Some(SyncPhase::PostSync)
    }

    /// Label used when grouping hooks for display: the hook role, falling
    /// back to the sync phase.
    pub fn phase_label(&self) -> Option<SyncPhase> {
        self.hook_type.or(self.sync_phase)
    }
}

/// Pull listing response: `GET /api/v1/applications`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Application>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Application>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Application>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Application {
    /// Creates an application with only an identity; every status is unknown.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ApplicationMetadata {
                name: name.into(),
                namespace: String::new(),
                labels: BTreeMap::new(),
                annotations: BTreeMap::new(),
                creation_timestamp: None,
            },
            spec: ApplicationSpec::default(),
            status: ApplicationStatus::default(),
        }
    }

    /// Sets the namespace the application object lives in.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = namespace.into();
        self
    }

    /// Sets the pipeline category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata
            .labels
            .insert(CATEGORY_LABEL_KEY.to_string(), category.into());
        self
    }

    /// Sets the sync status.
    pub fn with_sync(mut self, status: SyncStatusCode) -> Self {
        self.status.sync.status = status;
        self
    }

    /// Sets the health status.
    pub fn with_health(mut self, status: HealthStatusCode) -> Self {
        self.status.health.status = status;
        self
    }

    /// Replaces the operation state with one in `phase` carrying `hooks`.
    pub fn with_operation(mut self, phase: OperationPhase, hooks: Vec<HookResult>) -> Self {
        self.status.operation_state = Some(OperationState {
            phase: Some(phase),
            sync_result: Some(SyncResult {
                resources: hooks,
                revision: None,
            }),
            ..Default::default()
        });
        self
    }

    /// The application's identity.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Namespace of the application object itself (not its destination).
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Whether the record carries a usable identity.
    pub fn has_identity(&self) -> bool {
        !self.metadata.name.trim().is_empty()
    }

    /// Pipeline category, or [`UNCATEGORIZED`] when the label is absent.
    pub fn category(&self) -> &str {
        self.metadata
            .labels
            .get(CATEGORY_LABEL_KEY)
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn sync_status(&self) -> SyncStatusCode {
        self.status.sync.status
    }

    pub fn health_status(&self) -> HealthStatusCode {
        self.status.health.status
    }

    /// Phase of the current operation, if one is recorded.
    pub fn operation_phase(&self) -> Option<OperationPhase> {
        self.status.operation_state.as_ref().and_then(|op| op.phase)
    }

    /// When the most recent operation completed.
    pub fn last_finished_at(&self) -> Option<&str> {
        self.status
            .operation_state
            .as_ref()
            .and_then(|op| op.finished_at.as_deref())
    }

    /// Every resource result from the most recent operation, in wire order.
    pub fn hook_results(&self) -> &[HookResult] {
        self.status
            .operation_state
            .as_ref()
            .and_then(|op| op.sync_result.as_ref())
            .map(|r| r.resources.as_slice())
            .unwrap_or(&[])
    }

    /// PreSync and PostSync hooks from the most recent operation.
    pub fn hooks(&self) -> Vec<&HookResult> {
        self.hook_results()
            .iter()
            .filter(|h| h.is_lifecycle_hook())
            .collect()
    }

    /// PostSync hooks only; these make up the validation signal.
    pub fn post_sync_hooks(&self) -> impl Iterator<Item = &HookResult> {
        self.hook_results().iter().filter(|h| h.is_post_sync())
    }
}
