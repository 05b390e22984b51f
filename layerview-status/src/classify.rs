//! Per-application classification rules.

use crate::tier::{Classification, HookIcon, StatusTier};
use layerview_types::{
    Application, HealthStatusCode, HookPhase, HookResult, OperationPhase, SyncStatusCode,
};
use serde::Serialize;

/// Icon and tier for a single hook outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HookBadge {
    pub icon: HookIcon,
    pub tier: StatusTier,
}

pub fn classify_hook(outcome: Option<HookPhase>) -> HookBadge {
    let (icon, tier) = match outcome {
        Some(HookPhase::Succeeded) => (HookIcon::Check, StatusTier::Ok),
        Some(HookPhase::Failed | HookPhase::Error) => (HookIcon::Cross, StatusTier::Error),
        Some(HookPhase::Running) => (HookIcon::Circle, StatusTier::Running),
        _ => (HookIcon::Dash, StatusTier::Pending),
    };
    HookBadge { icon, tier }
}

/// Sync classification. A running operation dominates whatever the sync
/// status says, including when health is simultaneously degraded.
pub fn classify_sync(sync: SyncStatusCode, operation: Option<OperationPhase>) -> Classification {
    if operation == Some(OperationPhase::Running) {
        return Classification::new(StatusTier::Running, "Syncing");
    }
    match sync {
        SyncStatusCode::Synced => Classification::new(StatusTier::Ok, "Synced"),
        SyncStatusCode::OutOfSync => Classification::new(StatusTier::Warning, "OutOfSync"),
        SyncStatusCode::Unknown => Classification::new(StatusTier::Pending, "Unknown"),
    }
}

pub fn classify_health(health: HealthStatusCode) -> Classification {
    match health {
        HealthStatusCode::Healthy => Classification::new(StatusTier::Ok, "Healthy"),
        HealthStatusCode::Progressing => Classification::new(StatusTier::Running, "Progressing"),
        HealthStatusCode::Degraded => Classification::new(StatusTier::Error, "Degraded"),
        HealthStatusCode::Missing => Classification::new(StatusTier::Error, "Missing"),
        HealthStatusCode::Suspended => Classification::new(StatusTier::Warning, "Suspended"),
        HealthStatusCode::Unknown => Classification::new(StatusTier::Pending, "Unknown"),
    }
}

/// Validation classification over the PostSync hooks of the latest operation.
///
/// Non-PostSync entries in `hooks` are ignored.
pub fn classify_validation<'a, I>(hooks: I) -> Classification
where
    I: IntoIterator<Item = &'a HookResult>,
{
    let outcomes: Vec<Option<HookPhase>> = hooks
        .into_iter()
        .filter(|h| h.is_post_sync())
        .map(|h| h.hook_phase)
        .collect();

    if outcomes.is_empty() {
        return Classification::new(StatusTier::Pending, "No validation");
    }
    if outcomes
        .iter()
        .any(|o| matches!(o, Some(HookPhase::Failed | HookPhase::Error)))
    {
        return Classification::new(StatusTier::Error, "Validation failed");
    }
    if outcomes.contains(&Some(HookPhase::Running)) {
        return Classification::new(StatusTier::Running, "Validating");
    }
    if outcomes.iter().all(|o| *o == Some(HookPhase::Succeeded)) {
        return Classification::new(StatusTier::Ok, "Validated");
    }
    Classification::new(StatusTier::Pending, "Unknown")
}

/// The three status dots shown for one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppStatus {
    pub sync: Classification,
    pub health: Classification,
    pub validation: Classification,
}

pub fn classify_app(app: &Application) -> AppStatus {
    AppStatus {
        sync: classify_sync(app.sync_status(), app.operation_phase()),
        health: classify_health(app.health_status()),
        validation: classify_validation(app.hook_results()),
    }
}

/// Border status of a whole layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerHealth {
    Healthy,
    Warning,
    Error,
}

impl LayerHealth {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Rolls a layer's applications up into one border status.
///
/// An empty layer is healthy.
pub fn layer_status<'a, I>(apps: I) -> LayerHealth
where
    I: IntoIterator<Item = &'a Application>,
{
    let mut warning = false;
    for app in apps {
        match app.health_status() {
            HealthStatusCode::Degraded | HealthStatusCode::Missing => return LayerHealth::Error,
            HealthStatusCode::Progressing => warning = true,
            _ => {}
        }
        if app.sync_status() == SyncStatusCode::OutOfSync {
            warning = true;
        }
    }
    if warning {
        LayerHealth::Warning
    } else {
        LayerHealth::Healthy
    }
}
