use layerview_status::{classify_resource_rollup, kind_priority, summarize_resources, StatusTier};
use layerview_types::{HealthStatusCode, ResourceNode};
use pretty_assertions::assert_eq;

fn node(kind: &str, name: &str, health: HealthStatusCode) -> ResourceNode {
    ResourceNode::new(kind, name).with_health(health)
}

#[test]
fn empty_listing_is_pending() {
    let summary = summarize_resources("app", &[]);
    assert!(summary.kinds.is_empty());
    assert_eq!(summary.tier, StatusTier::Pending);
    assert_eq!(summary.total(), 0);
}

#[test]
fn counts_per_kind() {
    let nodes = vec![
        node("Pod", "web-0", HealthStatusCode::Healthy),
        node("Pod", "web-1", HealthStatusCode::Progressing),
        node("Pod", "web-2", HealthStatusCode::Degraded),
        node("Pod", "web-3", HealthStatusCode::Missing),
        ResourceNode::new("Pod", "web-4"),
    ];
    let summary = summarize_resources("web", &nodes);
    let pods = summary.kind("Pod").unwrap();
    assert_eq!(pods.total, 5);
    assert_eq!(pods.healthy, 1);
    assert_eq!(pods.progressing, 1);
    assert_eq!(pods.degraded, 2);
    assert_eq!(pods.tier, StatusTier::Error);
    assert_eq!(summary.app, "web");
}

#[test]
fn all_healthy_is_ok() {
    let nodes = vec![
        node("Deployment", "api", HealthStatusCode::Healthy),
        node("Service", "api", HealthStatusCode::Healthy),
    ];
    let summary = summarize_resources("api", &nodes);
    assert_eq!(summary.tier, StatusTier::Ok);
    assert!(summary.kinds.iter().all(|k| k.tier == StatusTier::Ok));
}

#[test]
fn unknown_health_keeps_kind_pending() {
    let nodes = vec![
        node("Deployment", "api", HealthStatusCode::Healthy),
        ResourceNode::new("ConfigMap", "api-config"),
    ];
    let summary = summarize_resources("api", &nodes);
    assert_eq!(summary.kind("ConfigMap").unwrap().tier, StatusTier::Pending);
    assert_eq!(summary.tier, StatusTier::Pending);
}

#[test]
fn progressing_beats_healthy_but_not_degraded() {
    let nodes = vec![
        node("Deployment", "api", HealthStatusCode::Healthy),
        node("StatefulSet", "db", HealthStatusCode::Progressing),
    ];
    assert_eq!(summarize_resources("x", &nodes).tier, StatusTier::Running);

    let nodes = vec![
        node("StatefulSet", "db", HealthStatusCode::Progressing),
        node("Job", "verify", HealthStatusCode::Degraded),
    ];
    assert_eq!(summarize_resources("x", &nodes).tier, StatusTier::Error);
}

#[test]
fn kinds_ordered_by_priority_then_arrival() {
    let nodes = vec![
        ResourceNode::new("Widget", "w"),
        ResourceNode::new("Secret", "s"),
        ResourceNode::new("Gadget", "g"),
        ResourceNode::new("Service", "svc"),
        ResourceNode::new("Deployment", "d"),
        ResourceNode::new("Widget", "w2"),
    ];
    let summary = summarize_resources("x", &nodes);
    let kinds: Vec<&str> = summary.kinds.iter().map(|k| k.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Deployment", "Service", "Secret", "Widget", "Gadget"]);
    assert_eq!(summary.kind("Widget").unwrap().total, 2);
}

#[test]
fn priority_table_groups() {
    assert!(kind_priority("Deployment") < kind_priority("Service"));
    assert!(kind_priority("Ingress") < kind_priority("ConfigMap"));
    assert_eq!(kind_priority("Widget"), None);
}

#[test]
fn rollup_over_empty_groups_is_pending() {
    assert_eq!(classify_resource_rollup(&[]), StatusTier::Pending);
}

#[test]
fn summary_is_deterministic() {
    let nodes = vec![
        node("Pod", "a", HealthStatusCode::Healthy),
        node("Job", "b", HealthStatusCode::Degraded),
        ResourceNode::new("Foo", "c"),
    ];
    assert_eq!(summarize_resources("x", &nodes), summarize_resources("x", &nodes));
}
