use crate::activity::is_layer_active;
use layerview_status::{layer_status, LayerHealth};
use layerview_store::GroupedSnapshot;
use layerview_types::{Application, LayerConfig, LayerTable};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One layer with the applications currently in it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerView {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    pub apps: Vec<Arc<Application>>,
    pub active: bool,
    pub health: LayerHealth,
    /// False for layers synthesized from unconfigured categories.
    pub configured: bool,
}

impl LayerView {
    fn new(
        key: &str,
        label: String,
        description: Option<String>,
        apps: &[Arc<Application>],
        configured: bool,
    ) -> Self {
        Self {
            key: key.to_string(),
            label,
            description,
            apps: apps.to_vec(),
            active: is_layer_active(apps),
            health: layer_status(apps.iter().map(|a| a.as_ref())),
            configured,
        }
    }

    fn configured(config: &LayerConfig, snapshot: &GroupedSnapshot) -> Self {
        Self::new(
            &config.key,
            config.label.clone(),
            config.description.clone(),
            snapshot.apps(&config.key),
            true,
        )
    }
}

/// Layers sharing one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub rank: i32,
    pub layers: Vec<LayerView>,
    pub active: bool,
}

impl Stage {
    fn new(rank: i32, layers: Vec<LayerView>) -> Self {
        let active = layers.iter().any(|l| l.active);
        Self {
            rank,
            layers,
            active,
        }
    }

    pub fn layer(&self, key: &str) -> Option<&LayerView> {
        self.layers.iter().find(|l| l.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.key.as_str()).collect()
    }
}

/// Indicator between two consecutive stages.
///
/// Lit when either side is active, so a handoff stays visible for one
/// extra recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from_stage: usize,
    pub to_stage: usize,
    pub lit: bool,
}

/// A configured `dependsOn` edge, prerequisite first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    pub stages: Vec<Stage>,
    pub transitions: Vec<Transition>,
    pub edges: Vec<DependencyEdge>,
}

impl Topology {
    /// Stage index and layer for `key`.
    pub fn find_layer(&self, key: &str) -> Option<(usize, &LayerView)> {
        self.stages
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.layer(key).map(|l| (i, l)))
    }

    /// Whether any stage is active.
    pub fn any_active(&self) -> bool {
        self.stages.iter().any(|s| s.active)
    }
}

/// Uppercases the first character of a category key.
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn build_topology(layers: &LayerTable, snapshot: &GroupedSnapshot) -> Topology {
    let mut buckets: BTreeMap<i32, Vec<LayerView>> = BTreeMap::new();
    for config in layers.layers() {
        buckets
            .entry(config.order)
            .or_default()
            .push(LayerView::configured(config, snapshot));
    }

    let extra: Vec<LayerView> = snapshot
        .iter()
        .filter(|(category, _)| !layers.contains(category))
        .map(|(category, apps)| LayerView::new(category, capitalize(category), None, apps, false))
        .collect();

    let mut stages: Vec<Stage> = buckets
        .into_iter()
        .map(|(rank, layers)| Stage::new(rank, layers))
        .collect();
    // Always last, even when the top rank is i32::MAX.
    if !extra.is_empty() {
        let rank = layers.max_order().map_or(0, |max| max.saturating_add(1));
        stages.push(Stage::new(rank, extra));
    }

    let transitions = stages
        .windows(2)
        .enumerate()
        .map(|(i, pair)| Transition {
            from_stage: i,
            to_stage: i + 1,
            lit: pair[0].active || pair[1].active,
        })
        .collect();

    let edges = layers
        .layers()
        .iter()
        .flat_map(|config| {
            config.depends_on.iter().map(|dep| DependencyEdge {
                from: dep.clone(),
                to: config.key.clone(),
            })
        })
        .collect();

    Topology {
        stages,
        transitions,
        edges,
    }
}
