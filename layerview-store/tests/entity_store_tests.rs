use layerview_store::EntityStore;
use layerview_types::{Application, HealthStatusCode, UNCATEGORIZED};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn app(name: &str, category: &str) -> Application {
    Application::new(name).with_category(category)
}

fn names(apps: &[std::sync::Arc<Application>]) -> HashSet<String> {
    apps.iter().map(|a| a.name().to_string()).collect()
}

// ── Upsert ──────────────────────────────────────────────────────

#[test]
fn upsert_inserts_then_replaces() {
    let mut store = EntityStore::new();
    assert!(!store.upsert(app("postgres", "database")));
    assert!(store.upsert(app("postgres", "database").with_health(HealthStatusCode::Degraded)));

    assert_eq!(store.len(), 1);
    let current = store.get("postgres").unwrap();
    assert_eq!(current.health_status(), HealthStatusCode::Degraded);
}

#[test]
fn replacement_is_wholesale() {
    let mut store = EntityStore::new();
    store.upsert(
        app("redis", "database")
            .with_health(HealthStatusCode::Healthy)
            .with_namespace("argocd"),
    );
    store.upsert(Application::new("redis"));

    let current = store.get("redis").unwrap();
    assert_eq!(current.health_status(), HealthStatusCode::Unknown);
    assert_eq!(current.category(), UNCATEGORIZED);
    assert_eq!(current.namespace(), "");
}

#[test]
fn upsert_moves_between_categories() {
    let mut store = EntityStore::new();
    store.upsert(app("vault", "secrets"));
    store.upsert(app("vault", "operators"));

    let snapshot = store.snapshot_grouped();
    assert!(!snapshot.contains_category("secrets"));
    assert_eq!(names(snapshot.apps("operators")), HashSet::from(["vault".to_string()]));
}

// ── Remove ──────────────────────────────────────────────────────

#[test]
fn remove_existing() {
    let mut store = EntityStore::new();
    store.upsert(app("loki", "monitoring"));
    assert!(store.remove("loki"));
    assert!(store.is_empty());
    assert!(store.get("loki").is_none());
}

#[test]
fn remove_absent_is_noop() {
    let mut store = EntityStore::new();
    store.upsert(app("loki", "monitoring"));
    assert!(!store.remove("tempo"));
    assert_eq!(store.len(), 1);
}

// ── Replace all ─────────────────────────────────────────────────

#[test]
fn replace_all_discards_previous_contents() {
    let mut store = EntityStore::new();
    store.upsert(app("old", "foundation"));
    store.replace_all(vec![app("a", "auth"), app("b", "auth")]);

    assert!(!store.contains("old"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.snapshot_grouped().apps("auth").len(), 2);
}

// ── Snapshots ───────────────────────────────────────────────────

#[test]
fn snapshot_groups_by_category_with_default_bucket() {
    let mut store = EntityStore::new();
    store.upsert(app("argocd", "foundation"));
    store.upsert(app("traefik", "foundation"));
    store.upsert(Application::new("stray"));

    let snapshot = store.snapshot_grouped();
    assert_eq!(snapshot.total(), 3);
    assert_eq!(
        names(snapshot.apps("foundation")),
        HashSet::from(["argocd".to_string(), "traefik".to_string()])
    );
    assert_eq!(names(snapshot.apps(UNCATEGORIZED)), HashSet::from(["stray".to_string()]));
    assert!(snapshot.apps("missing").is_empty());
}

#[test]
fn snapshot_is_independent_of_later_writes() {
    let mut store = EntityStore::new();
    store.upsert(app("immich", "content").with_health(HealthStatusCode::Progressing));
    let before = store.snapshot_grouped();

    store.upsert(app("immich", "content").with_health(HealthStatusCode::Healthy));
    store.upsert(app("seafile", "content"));
    store.remove("immich");

    assert_eq!(before.total(), 1);
    assert_eq!(
        before.find("immich").unwrap().health_status(),
        HealthStatusCode::Progressing
    );
}

#[test]
fn empty_store_has_empty_snapshot() {
    let snapshot = EntityStore::new().snapshot_grouped();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.categories().count(), 0);
}

#[test]
fn find_and_iter_cover_all_groups() {
    let mut store = EntityStore::new();
    store.upsert(app("a", "x"));
    store.upsert(app("b", "y"));
    let snapshot = store.snapshot_grouped();

    assert!(snapshot.find("b").is_some());
    assert!(snapshot.find("c").is_none());
    let cats: Vec<&str> = snapshot.iter().map(|(c, _)| c).collect();
    assert_eq!(cats, vec!["x", "y"]);
}
