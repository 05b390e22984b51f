use chrono::{TimeZone, Utc};
use layerview_devserver::fixtures::{demo_fleet, demo_update, resource_tree, DEMO_APP};
use layerview_status::{classify_app, StatusTier};
use layerview_types::{HealthStatusCode, HookPhase, LayerTable, OperationPhase};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn fleet_names_are_unique() {
    let fleet = demo_fleet(now());
    let names: HashSet<&str> = fleet.iter().map(|a| a.name()).collect();
    assert_eq!(names.len(), fleet.len());
}

#[test]
fn fleet_categories_are_configured_layers() {
    let table = LayerTable::default();
    for app in demo_fleet(now()) {
        assert!(table.contains(app.category()), "{} in {}", app.name(), app.category());
    }
}

#[test]
fn failed_validation_in_fleet() {
    let fleet = demo_fleet(now());
    let paperless = fleet.iter().find(|a| a.name() == "paperless").unwrap();
    let status = classify_app(paperless);
    assert_eq!(status.validation.tier, StatusTier::Error);
    assert_eq!(paperless.operation_phase(), Some(OperationPhase::Failed));
}

#[test]
fn finished_at_is_four_minutes_back() {
    let fleet = demo_fleet(now());
    assert_eq!(fleet[0].last_finished_at(), Some("2026-03-01T11:56:00Z"));
}

#[test]
fn demo_update_alternates() {
    let fleet = demo_fleet(now());
    let demo = fleet.iter().find(|a| a.name() == DEMO_APP).unwrap();

    let running = demo_update(demo, 0, now());
    assert_eq!(running.health_status(), HealthStatusCode::Progressing);
    assert_eq!(running.operation_phase(), Some(OperationPhase::Running));
    assert_eq!(running.last_finished_at(), None);
    let hook = running.post_sync_hooks().next().unwrap();
    assert_eq!(hook.hook_phase, Some(HookPhase::Running));

    let done = demo_update(demo, 1, now());
    assert_eq!(done.health_status(), HealthStatusCode::Healthy);
    assert_eq!(done.operation_phase(), Some(OperationPhase::Succeeded));
    assert_eq!(done.name(), DEMO_APP);
    assert_eq!(done.category(), demo.category());
}

#[test]
fn tree_uses_destination_namespace() {
    let fleet = demo_fleet(now());
    let postgres = fleet.iter().find(|a| a.name() == "postgres").unwrap();
    let tree = resource_tree(postgres, now());
    assert!(tree.nodes.iter().all(|n| n.namespace == "jeebon-test"));
    assert_eq!(tree.nodes[2].name, "postgres-postsync-verify");
}
