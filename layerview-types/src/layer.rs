//! Static description of the delivery pipeline.
//!
//! A [`LayerTable`] is supplied once at startup and never mutated afterwards.
//! Declaration order is significant: layers sharing an `order` are rendered
//! in the order they were declared.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One layer of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Category key matched against the application category label.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Declared rank. Layers sharing a rank form one stage.
    pub order: i32,
    /// Keys of the layers this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LayerConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>, order: i32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            order,
            depends_on: Vec::new(),
            description: None,
        }
    }

    /// Adds prerequisite layers.
    pub fn depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validated, ordered set of layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerTable {
    layers: Vec<LayerConfig>,
}

impl LayerTable {
    /// Builds a table, rejecting duplicate keys, dangling dependencies and
    /// dependency cycles.
    pub fn new(layers: Vec<LayerConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        for layer in &layers {
            if !seen.insert(layer.key.as_str()) {
                return Err(Error::DuplicateLayer(layer.key.clone()));
            }
        }
        for layer in &layers {
            if let Some(missing) = layer.depends_on.iter().find(|d| !seen.contains(d.as_str())) {
                return Err(Error::UnknownDependency {
                    layer: layer.key.clone(),
                    missing: missing.clone(),
                });
            }
        }
        check_acyclic(&layers)?;
        Ok(Self { layers })
    }

    /// Parses a JSON array of layer configs.
    pub fn from_json(json: &str) -> Result<Self> {
        let layers: Vec<LayerConfig> = serde_json::from_str(json)?;
        Self::new(layers)
    }

    /// Reads a JSON array of layer configs from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Layers in declaration order.
    pub fn layers(&self) -> &[LayerConfig] {
        &self.layers
    }

    pub fn get(&self, key: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Highest declared rank, if any layer is configured.
    pub fn max_order(&self) -> Option<i32> {
        self.layers.iter().map(|l| l.order).max()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerTable {
    /// The built-in platform pipeline.
    fn default() -> Self {
        let layers = vec![
            LayerConfig::new("pipeline", "Pipeline", -1),
            LayerConfig::new("foundation", "Foundation", 0).depends_on(["pipeline"]),
            LayerConfig::new("operators", "Operators", 1).depends_on(["foundation"]),
            LayerConfig::new("monitoring", "Monitoring", 1).depends_on(["foundation"]),
            LayerConfig::new("secrets", "Secrets", 2).depends_on(["operators"]),
            LayerConfig::new("database", "Database", 3).depends_on(["secrets"]),
            LayerConfig::new("auth", "Auth", 4).depends_on(["database"]),
            LayerConfig::new("workflows", "Workflows", 5).depends_on(["database"]),
            LayerConfig::new("content", "Content", 6).depends_on(["auth", "workflows"]),
        ];
        Self { layers }
    }
}

impl<'de> Deserialize<'de> for LayerTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let layers = Vec::<LayerConfig>::deserialize(deserializer)?;
        Self::new(layers).map_err(serde::de::Error::custom)
    }
}

/// Depth-first search with the usual white/grey/black colouring.
fn check_acyclic(layers: &[LayerConfig]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        key: &'a str,
        deps: &HashMap<&'a str, &'a [String]>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<()> {
        match marks.get(key) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(Error::DependencyCycle(key.to_string())),
            None => {}
        }
        marks.insert(key, Mark::Visiting);
        for dep in deps.get(key).copied().unwrap_or(&[]) {
            visit(dep.as_str(), deps, marks)?;
        }
        marks.insert(key, Mark::Done);
        Ok(())
    }

    let deps: HashMap<&str, &[String]> = layers
        .iter()
        .map(|l| (l.key.as_str(), l.depends_on.as_slice()))
        .collect();
    let mut marks = HashMap::new();
    for layer in layers {
        visit(layer.key.as_str(), &deps, &mut marks)?;
    }
    Ok(())
}
