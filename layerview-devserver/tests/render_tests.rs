use chrono::{TimeZone, Utc};
use layerview_devserver::fixtures::demo_fleet;
use layerview_devserver::render_summary;
use layerview_store::EntityStore;
use layerview_sync::{ConnectionState, LiveView};
use layerview_topology::build_topology;
use layerview_types::LayerTable;

fn view_of_demo_fleet() -> (LiveView, chrono::DateTime<Utc>) {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let mut store = EntityStore::new();
    for app in demo_fleet(now) {
        store.upsert(app);
    }
    let view = LiveView {
        snapshot: store.snapshot_grouped(),
        connected: true,
        last_error: None,
        state: ConnectionState::Streaming,
        revision: 3,
    };
    (view, now)
}

#[test]
fn header_line() {
    let (view, now) = view_of_demo_fleet();
    let topology = build_topology(&LayerTable::default(), &view.snapshot);
    let text = render_summary(&view, &topology, now);
    assert!(text.starts_with("[streaming] 24 applications, revision 3\n"));
    assert!(!text.contains("last error"));
}

#[test]
fn stages_in_rank_order() {
    let (view, now) = view_of_demo_fleet();
    let topology = build_topology(&LayerTable::default(), &view.snapshot);
    let text = render_summary(&view, &topology, now);

    let foundation = text.find("Foundation").unwrap();
    let database = text.find("Database").unwrap();
    let content = text.find("Content").unwrap();
    assert!(foundation < database && database < content);
    assert!(text.contains("4m ago"));
}

#[test]
fn active_stages_marked() {
    let (view, now) = view_of_demo_fleet();
    let topology = build_topology(&LayerTable::default(), &view.snapshot);
    let text = render_summary(&view, &topology, now);
    // immich is Progressing and r2-logs-bucket is OutOfSync.
    assert!(text.contains("(active)"));
    assert!(text.contains("flowing"));
}

#[test]
fn last_error_shown() {
    let (mut view, now) = view_of_demo_fleet();
    view.connected = false;
    view.state = ConnectionState::Disconnected;
    view.last_error = Some("stream closed".to_string());
    let topology = build_topology(&LayerTable::default(), &view.snapshot);
    let text = render_summary(&view, &topology, now);
    assert!(text.starts_with("[disconnected]"));
    assert!(text.contains("  last error: stream closed\n"));
}

#[test]
fn empty_layer_says_no_apps() {
    let (view, now) = view_of_demo_fleet();
    // The demo fleet has nothing in the pipeline layer.
    let topology = build_topology(&LayerTable::default(), &view.snapshot);
    let text = render_summary(&view, &topology, now);
    let pipeline = text.find("Pipeline").unwrap();
    assert!(text[pipeline..].lines().nth(1).unwrap().trim() == "No apps");
}
