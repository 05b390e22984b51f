use layerview_types::{Application, HealthStatusCode, HookPhase, OperationPhase, SyncStatusCode};
use std::sync::Arc;

/// Whether an application is currently doing something: progressing,
/// drifted, mid-operation, or running a PostSync hook.
pub fn is_app_active(app: &Application) -> bool {
    app.health_status() == HealthStatusCode::Progressing
        || app.sync_status() == SyncStatusCode::OutOfSync
        || app.operation_phase() == Some(OperationPhase::Running)
        || app
            .post_sync_hooks()
            .any(|h| h.hook_phase == Some(HookPhase::Running))
}

/// A layer is active if any of its applications is.
pub fn is_layer_active(apps: &[Arc<Application>]) -> bool {
    apps.iter().any(|app| is_app_active(app))
}
