//! Built-in demo fleet.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use layerview_types::{
    Application, ApplicationSpec, Destination, HealthStatusCode, HookPhase, HookResult,
    OperationPhase, OperationState, ResourceNode, ResourceTree, Source, SyncPhase,
    SyncStatusCode,
};
use HealthStatusCode::{Healthy, Progressing};
use SyncStatusCode::{OutOfSync, Synced};

const REVISION: &str = "a1b2c3d4e5f6789012345678abcdef0123456789";
const CONTROL_NAMESPACE: &str = "argocd";
const REPO_URL: &str = "https://gitlab.com/jeebon/jeebon.git";

/// Application whose state the live stream keeps cycling.
pub const DEMO_APP: &str = "immich";

fn minutes_ago(now: DateTime<Utc>, minutes: i64) -> String {
    (now - TimeDelta::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn hook(name: &str, role: SyncPhase, outcome: HookPhase) -> HookResult {
    let message = match outcome {
        HookPhase::Failed => "job failed: BackoffLimitExceeded",
        HookPhase::Running => "job is running",
        _ => "job completed",
    };
    let mut hook = HookResult::hook("Job", name, role, outcome).with_message(message);
    hook.group = "batch".to_string();
    hook.version = "v1".to_string();
    hook.namespace = CONTROL_NAMESPACE.to_string();
    hook.status = if outcome == HookPhase::Succeeded {
        "Synced".to_string()
    } else {
        "OutOfSync".to_string()
    };
    hook
}

fn operation(now: DateTime<Utc>, phase: OperationPhase, hooks: Vec<HookResult>) -> OperationState {
    OperationState {
        phase: Some(phase),
        message: None,
        sync_result: Some(layerview_types::SyncResult {
            resources: hooks,
            revision: Some(REVISION.to_string()),
        }),
        started_at: Some(minutes_ago(now, 5)),
        finished_at: (phase != OperationPhase::Running).then(|| minutes_ago(now, 4)),
    }
}

struct AppFixture {
    name: &'static str,
    category: &'static str,
    destination: &'static str,
    sync: SyncStatusCode,
    health: HealthStatusCode,
}

impl AppFixture {
    const fn new(
        name: &'static str,
        category: &'static str,
        destination: &'static str,
        sync: SyncStatusCode,
        health: HealthStatusCode,
    ) -> Self {
        Self {
            name,
            category,
            destination,
            sync,
            health,
        }
    }

    fn build(&self, now: DateTime<Utc>, op: OperationState) -> Application {
        let mut app = Application::new(self.name)
            .with_namespace(CONTROL_NAMESPACE)
            .with_category(self.category)
            .with_sync(self.sync)
            .with_health(self.health);
        app.metadata.creation_timestamp = Some(minutes_ago(now, 60 * 24));
        app.spec = ApplicationSpec {
            source: Some(Source {
                repo_url: Some(REPO_URL.to_string()),
                path: Some(format!("gitops/apps/{}/{}", self.category, self.name)),
                target_revision: Some("HEAD".to_string()),
                chart: None,
            }),
            destination: Some(Destination {
                server: Some("https://kubernetes.default.svc".to_string()),
                namespace: Some(self.destination.to_string()),
            }),
            project: Some("default".to_string()),
        };
        app.status.sync.revision = Some(REVISION.to_string());
        app.status.operation_state = Some(op);
        app.status.reconciled_at = Some(minutes_ago(now, 1));
        app
    }
}

const FLEET: &[AppFixture] = &[
    AppFixture::new("argocd", "foundation", "argocd", Synced, Healthy),
    AppFixture::new("traefik", "foundation", "kube-system", Synced, Healthy),
    AppFixture::new("dex", "foundation", "argocd", Synced, Healthy),
    AppFixture::new("cert-manager", "foundation", "cert-manager", Synced, Healthy),
    AppFixture::new("kargo", "foundation", "kargo", Synced, Healthy),
    AppFixture::new("oauth2-proxy", "foundation", "infra", Synced, Healthy),
    AppFixture::new("argo-rollouts", "foundation", "argo-rollouts", Synced, Healthy),
    AppFixture::new("eso", "operators", "infra", Synced, Healthy),
    AppFixture::new("crossplane", "operators", "crossplane-system", Synced, Healthy),
    AppFixture::new("provider-cloudflare", "operators", "crossplane-system", Synced, Healthy),
    AppFixture::new("kube-prometheus-stack", "monitoring", "monitoring", Synced, Healthy),
    AppFixture::new("loki", "monitoring", "monitoring", Synced, Healthy),
    AppFixture::new("alloy", "monitoring", "monitoring", Synced, Healthy),
    AppFixture::new("r2-logs-bucket", "monitoring", "monitoring", OutOfSync, Healthy),
    AppFixture::new("openbao", "secrets", "infra", Synced, Healthy),
    AppFixture::new("secret-store", "secrets", "infra", Synced, Healthy),
    AppFixture::new("postgres", "database", "jeebon-test", Synced, Healthy),
    AppFixture::new("mariadb", "database", "jeebon-test", Synced, Healthy),
    AppFixture::new("redis", "database", "jeebon-test", Synced, Healthy),
    AppFixture::new("zitadel", "auth", "jeebon-test", Synced, Healthy),
    AppFixture::new("temporal", "workflows", "jeebon-test", Synced, Healthy),
    AppFixture::new("seafile", "content", "jeebon-test", Synced, Healthy),
    AppFixture::new("paperless", "content", "jeebon-test", OutOfSync, Healthy),
    AppFixture::new(DEMO_APP, "content", "jeebon-test", Synced, Progressing),
];

fn hooks_for(name: &str) -> (OperationPhase, Vec<HookResult>) {
    use HookPhase::{Failed, Succeeded};
    use SyncPhase::{PostSync, PreSync};
    match name {
        "postgres" => (
            OperationPhase::Succeeded,
            vec![hook("postgres-verify", PostSync, Succeeded)],
        ),
        "zitadel" => (
            OperationPhase::Succeeded,
            vec![
                hook("zitadel-presync-migration", PreSync, Succeeded),
                hook("zitadel-postsync-verify", PostSync, Succeeded),
            ],
        ),
        "seafile" => (
            OperationPhase::Succeeded,
            vec![hook("seafile-postsync-verify", PostSync, Succeeded)],
        ),
        "paperless" => (
            OperationPhase::Failed,
            vec![hook("paperless-postsync-verify", PostSync, Failed)],
        ),
        _ => (OperationPhase::Succeeded, Vec::new()),
    }
}

/// The demo fleet, timestamped relative to `now`.
pub fn demo_fleet(now: DateTime<Utc>) -> Vec<Application> {
    FLEET
        .iter()
        .map(|fixture| {
            let (phase, hooks) = hooks_for(fixture.name);
            fixture.build(now, operation(now, phase, hooks))
        })
        .collect()
}

/// State of the demo application at stream step `step`.
///
/// Even steps start a sync with its verification hook running; odd steps
/// finish it.
pub fn demo_update(app: &Application, step: u64, now: DateTime<Utc>) -> Application {
    let mut app = app.clone();
    let verify = format!("{}-postsync-verify", app.name());
    let op = if step % 2 == 0 {
        app.status.health.status = HealthStatusCode::Progressing;
        operation(
            now,
            OperationPhase::Running,
            vec![hook(&verify, SyncPhase::PostSync, HookPhase::Running)],
        )
    } else {
        app.status.health.status = HealthStatusCode::Healthy;
        operation(
            now,
            OperationPhase::Succeeded,
            vec![hook(&verify, SyncPhase::PostSync, HookPhase::Succeeded)],
        )
    };
    app.status.operation_state = Some(op);
    app.status.reconciled_at = Some(now.to_rfc3339_opts(SecondsFormat::Secs, true));
    app
}

/// Resource tree served for `app`.
pub fn resource_tree(app: &Application, now: DateTime<Utc>) -> ResourceTree {
    let name = app.name();
    let namespace = app
        .spec
        .destination
        .as_ref()
        .and_then(|d| d.namespace.clone())
        .unwrap_or_default();
    let node = |group: &str, kind: &str, node_name: String, uid: String, age: i64| ResourceNode {
        group: group.to_string(),
        version: "v1".to_string(),
        kind: kind.to_string(),
        namespace: namespace.clone(),
        name: node_name,
        uid: Some(uid),
        health: None,
        created_at: Some(minutes_ago(now, age)),
    }
    .with_health(HealthStatusCode::Healthy);

    ResourceTree {
        nodes: vec![
            node("apps", "Deployment", name.to_string(), format!("uid-deploy-{name}"), 60),
            node("", "Service", name.to_string(), format!("uid-svc-{name}"), 60),
            node(
                "batch",
                "Job",
                format!("{name}-postsync-verify"),
                format!("uid-hook-{name}"),
                5,
            ),
        ],
        orphaned_nodes: Vec::new(),
    }
}
