// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backends::array::ARRAY;
use crate::errors::ConfigError;
use crate::schema::{FeatureSchema, IndexSchema, Schema};

/// A pipeline file: leaves, operator instances, requested outputs and how to
/// evaluate them.
///
/// # Example
/// ```yaml
/// strategy: level
/// backend: frame
/// fallback_backends: [array]
/// executor_options:
///   max_concurrency: 4
/// leaves:
///   - id: sales
///     features:
///       - { name: price, dtype: float64 }
///       - { name: qty, dtype: float64 }
///     indexes:
///       - { name: store, dtype: string }
///     data: sales.json
/// operators:
///   - id: revenue
///     operator: MULTIPLICATION
///     inputs: { input_1: sales, input_2: sales }
///   - id: weekly
///     operator: MOVING_SUM
///     inputs: { input: revenue }
///     attributes: { window_length: 604800.0 }
/// outputs: [weekly]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub fallback_backends: Vec<String>,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub leaves: Vec<LeafConfig>,
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
    pub outputs: Vec<String>,
    /// Directory relative leaf data paths are resolved against. Set by
    /// [`load_config`] to the directory holding the pipeline file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_backend() -> String {
    ARRAY.to_string()
}

impl Config {
    /// Every backend this pipeline may run on, preferred first, without repeats.
    pub fn backend_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::with_capacity(1 + self.fallback_backends.len());
        for name in std::iter::once(&self.backend).chain(&self.fallback_backends) {
            if !order.contains(&name.as_str()) {
                order.push(name);
            }
        }
        order
    }

    /// Path of a leaf's data file, resolved against [`Config::base_dir`].
    pub fn data_path(&self, leaf: &LeafConfig) -> Option<PathBuf> {
        let data = leaf.data.as_ref()?;
        match &self.base_dir {
            Some(base) if data.is_relative() => Some(base.join(data)),
            _ => Some(data.clone()),
        }
    }
}

/// Scheduling strategy used to evaluate the pipeline.
///
/// * `Sequential` - runs the schedule one step at a time in topological order
/// * `Level` - runs every step of a dependency level concurrently, level by level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Sequential,
    Level,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Level => "level",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executor tuning. `max_concurrency` caps how many steps of one level run at
/// once; it defaults to the available parallelism of the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// A leaf declaration: its schema and, optionally, a JSON data file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LeafConfig {
    pub id: String,
    #[serde(default)]
    pub features: Vec<FeatureSchema>,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
    #[serde(default)]
    pub is_unix_timestamp: bool,
    #[serde(default)]
    pub data: Option<PathBuf>,
}

impl LeafConfig {
    /// Schema of the leaf. Index columns are re-checked because serde builds
    /// `IndexSchema` without going through its constructor.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        let indexes = self
            .indexes
            .iter()
            .map(|index| IndexSchema::new(index.name.clone(), index.dtype))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| ConfigError::InvalidLeaf {
                leaf: self.id.clone(),
                reason,
            })?;
        Ok(Schema::new(self.features.clone(), indexes).with_unix_timestamp(self.is_unix_timestamp))
    }
}

/// One operator instance: an operator key, its named inputs and attributes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperatorConfig {
    pub id: String,
    pub operator: String,
    /// Input slot name to node reference.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_yaml::Value>,
}

/// Splits a node reference into the declaring id and an optional output slot.
///
/// `"ratio"` refers to the single (or first) output of `ratio`;
/// `"split.output_2"` to the `output_2` slot of `split`.
pub fn parse_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.rsplit_once('.') {
        Some((id, slot)) if !id.is_empty() && !slot.is_empty() => (id, Some(slot)),
        _ => (reference, None),
    }
}

/// Load a pipeline file from YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.base_dir = path.parent().map(Path::to_path_buf);
    Ok(cfg)
}

/// Load a pipeline file and check that its ids are unique, every reference
/// resolves and no operator depends on itself.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_pipeline(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
