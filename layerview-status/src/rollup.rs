//! Resource aggregation: per-kind counts and a rollup tier for one
//! application's sub-resources.

use crate::tier::StatusTier;
use layerview_types::{HealthStatusCode, ResourceNode};
use serde::Serialize;
use std::collections::HashMap;

/// Display priority: workloads, then networking, then config and secrets.
const KIND_PRIORITY: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Pod",
    "Job",
    "CronJob",
    "Service",
    "Ingress",
    "HTTPRoute",
    "NetworkPolicy",
    "Endpoints",
    "ConfigMap",
    "Secret",
    "ExternalSecret",
    "PersistentVolumeClaim",
    "ServiceAccount",
];

/// Position of `kind` in the display priority table, if ranked.
pub fn kind_priority(kind: &str) -> Option<usize> {
    KIND_PRIORITY.iter().position(|k| *k == kind)
}

/// Counts for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub kind: String,
    pub total: usize,
    pub healthy: usize,
    pub progressing: usize,
    /// Degraded or missing.
    pub degraded: usize,
    pub tier: StatusTier,
}

impl KindSummary {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            total: 0,
            healthy: 0,
            progressing: 0,
            degraded: 0,
            tier: StatusTier::Pending,
        }
    }

    fn count(&mut self, health: HealthStatusCode) {
        self.total += 1;
        match health {
            HealthStatusCode::Healthy => self.healthy += 1,
            HealthStatusCode::Progressing => self.progressing += 1,
            HealthStatusCode::Degraded | HealthStatusCode::Missing => self.degraded += 1,
            _ => {}
        }
    }
}

/// Aggregated view of one application's resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub app: String,
    pub kinds: Vec<KindSummary>,
    pub tier: StatusTier,
}

impl ResourceSummary {
    /// Total number of resources across all kinds.
    pub fn total(&self) -> usize {
        self.kinds.iter().map(|k| k.total).sum()
    }

    pub fn kind(&self, kind: &str) -> Option<&KindSummary> {
        self.kinds.iter().find(|k| k.kind == kind)
    }
}

fn rollup(total: usize, healthy: usize, progressing: usize, degraded: usize) -> StatusTier {
    if degraded > 0 {
        StatusTier::Error
    } else if progressing > 0 {
        StatusTier::Running
    } else if total > 0 && healthy == total {
        StatusTier::Ok
    } else {
        StatusTier::Pending
    }
}

/// Rollup tier across kind groups.
pub fn classify_resource_rollup(groups: &[KindSummary]) -> StatusTier {
    let (total, healthy, progressing, degraded) = groups.iter().fold((0, 0, 0, 0), |acc, g| {
        (
            acc.0 + g.total,
            acc.1 + g.healthy,
            acc.2 + g.progressing,
            acc.3 + g.degraded,
        )
    });
    rollup(total, healthy, progressing, degraded)
}

/// Groups `nodes` by kind and orders the groups for display.
///
/// Ranked kinds come first in table order; unranked kinds follow in the
/// order they first appear in `nodes`.
pub fn summarize_resources(app: &str, nodes: &[ResourceNode]) -> ResourceSummary {
    let mut kinds: Vec<KindSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for node in nodes {
        let slot = *index.entry(node.kind.as_str()).or_insert_with(|| {
            kinds.push(KindSummary::new(&node.kind));
            kinds.len() - 1
        });
        kinds[slot].count(node.health_status());
    }

    for group in &mut kinds {
        group.tier = rollup(group.total, group.healthy, group.progressing, group.degraded);
    }
    // Stable sort keeps arrival order among unranked kinds.
    kinds.sort_by_key(|g| kind_priority(&g.kind).unwrap_or(usize::MAX));

    let tier = classify_resource_rollup(&kinds);
    ResourceSummary {
        app: app.to_string(),
        kinds,
        tier,
    }
}
