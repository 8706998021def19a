// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::config::loader::parse_reference;
use crate::config::Config;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    CyclicDependencyDetected, DuplicateId, InvalidId, UnresolvedReference,
};
use crate::observability::messages::StructuredLog;

/// Key under which unresolved entries of the top-level `outputs` list are reported.
pub const OUTPUTS: &str = "outputs";

/// Validates the node references of a pipeline file.
///
/// Checks run in order and stop at the first stage that reports anything:
///
/// 1. **Unique ids**: leaves and operators share one namespace, and no id
///    may be empty or contain `.`, which separates an id from an output slot.
/// 2. **Resolvable references**: every operator input and every entry of
///    `outputs` names a declared id (the optional `.slot` suffix is checked
///    later, when the operator definition is known).
/// 3. **No cycles**: operators must not reach themselves through their inputs.
///
/// Errors from one stage are accumulated so a user sees every duplicate or
/// every dangling reference at once, not just the first.
///
/// # Returns
/// * `Ok(())` - the file can be turned into a graph
/// * `Err(Vec<ValidationError>)` - everything wrong in the first failing stage
///
/// # Example
/// ```
/// use the_tempograph::config::{validate_pipeline, Config};
///
/// let yaml = r#"
/// leaves:
///   - id: a
///     features: [{ name: x, dtype: float64 }]
/// operators:
///   - id: b
///     operator: ADDITION
///     inputs: { input_1: a, input_2: c }
/// outputs: [b]
/// "#;
/// let config: Config = serde_yaml::from_str(yaml).unwrap();
/// let errors = validate_pipeline(&config).unwrap_err();
/// assert_eq!(errors.len(), 1);
/// ```
pub fn validate_pipeline(config: &Config) -> Result<(), Vec<ValidationError>> {
    let ids = check_unique_ids(config)?;
    check_references(config, &ids)?;
    check_cycles(config)
}

fn check_unique_ids(config: &Config) -> Result<HashSet<&str>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    let declared = config
        .leaves
        .iter()
        .map(|leaf| leaf.id.as_str())
        .chain(config.operators.iter().map(|op| op.id.as_str()));

    for id in declared {
        if id.is_empty() || id.contains('.') {
            InvalidId { id }.log();
            errors.push(ValidationError::InvalidId { id: id.to_string() });
            continue;
        }
        if !ids.insert(id) {
            DuplicateId { id }.log();
            errors.push(ValidationError::DuplicateId { id: id.to_string() });
        }
    }

    if errors.is_empty() {
        Ok(ids)
    } else {
        Err(errors)
    }
}

fn check_references(config: &Config, ids: &HashSet<&str>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let references = config
        .operators
        .iter()
        .flat_map(|op| op.inputs.values().map(move |r| (op.id.as_str(), r.as_str())))
        .chain(config.outputs.iter().map(|r| (OUTPUTS, r.as_str())));

    for (node_id, reference) in references {
        let (target, _) = parse_reference(reference);
        if !ids.contains(target) {
            UnresolvedReference { node_id, reference }.log();
            errors.push(ValidationError::UnresolvedReference {
                node_id: node_id.to_string(),
                reference: reference.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Only operator-to-operator edges can form a cycle; leaves have no inputs.
fn check_cycles(config: &Config) -> Result<(), Vec<ValidationError>> {
    let operator_ids: HashSet<&str> = config.operators.iter().map(|op| op.id.as_str()).collect();

    let graph: HashMap<&str, Vec<&str>> = config
        .operators
        .iter()
        .map(|op| {
            let dependencies = op
                .inputs
                .values()
                .map(|r| parse_reference(r).0)
                .filter(|target| operator_ids.contains(target))
                .collect();
            (op.id.as_str(), dependencies)
        })
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for op in &config.operators {
        if visited.contains(op.id.as_str()) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(&op.id, &graph, &mut visited, &mut rec_stack, &mut path) {
            CyclicDependencyDetected { cycle: &cycle }.log();
            return Err(vec![ValidationError::CyclicDependency {
                cycle: cycle.iter().map(|id| id.to_string()).collect(),
            }]);
        }
    }

    Ok(())
}

/// Three-colour DFS: `visited` holds explored nodes, `rec_stack` the nodes on
/// the current path. Reaching a node still on the path closes a cycle, which
/// is returned with its first id repeated at the end.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let start = path.iter().position(|id| *id == neighbor).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LeafConfig, OperatorConfig};
    use crate::schema::{FeatureSchema, FeatureType};
    use std::collections::BTreeMap;

    fn leaf(id: &str) -> LeafConfig {
        LeafConfig {
            id: id.to_string(),
            features: vec![FeatureSchema::new("x", FeatureType::Float64)],
            indexes: vec![],
            is_unix_timestamp: false,
            data: None,
        }
    }

    fn op(id: &str, inputs: &[&str]) -> OperatorConfig {
        OperatorConfig {
            id: id.to_string(),
            operator: "ADDITION".to_string(),
            inputs: inputs
                .iter()
                .enumerate()
                .map(|(i, r)| (format!("input_{}", i + 1), r.to_string()))
                .collect(),
            attributes: BTreeMap::new(),
        }
    }

    fn config(leaves: Vec<LeafConfig>, operators: Vec<OperatorConfig>, outputs: &[&str]) -> Config {
        Config {
            strategy: Default::default(),
            backend: "array".into(),
            fallback_backends: vec![],
            executor_options: Default::default(),
            leaves,
            operators,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            base_dir: None,
        }
    }

    #[test]
    fn test_valid_empty_config() {
        assert!(validate_pipeline(&config(vec![], vec![], &[])).is_ok());
    }

    #[test]
    fn test_valid_diamond() {
        let cfg = config(
            vec![leaf("a")],
            vec![op("b", &["a", "a"]), op("c", &["a", "a"]), op("d", &["b", "c"])],
            &["d", "b.output"],
        );
        assert!(validate_pipeline(&cfg).is_ok());
    }

    #[test]
    fn test_duplicate_ids_across_leaves_and_operators() {
        let cfg = config(vec![leaf("a"), leaf("b")], vec![op("a", &["b", "b"])], &["a"]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateId { id: "a".into() }]);
    }

    #[test]
    fn test_ids_cannot_hold_slot_separator() {
        let cfg = config(
            vec![leaf("raw.prices"), leaf("")],
            vec![op("b", &["raw.prices", "raw.prices"])],
            &["b"],
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidId { id: "raw.prices".into() },
                ValidationError::InvalidId { id: "".into() },
            ]
        );
    }

    #[test]
    fn test_every_unresolved_reference_is_reported() {
        let cfg = config(vec![leaf("a")], vec![op("b", &["a", "ghost"])], &["b", "phantom.output"]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnresolvedReference {
                    node_id: "b".into(),
                    reference: "ghost".into(),
                },
                ValidationError::UnresolvedReference {
                    node_id: OUTPUTS.into(),
                    reference: "phantom.output".into(),
                },
            ]
        );
    }

    #[test]
    fn test_cycle_is_reported_with_path() {
        let cfg = config(
            vec![leaf("a")],
            vec![op("b", &["a", "d"]), op("c", &["b", "a"]), op("d", &["c", "a"])],
            &["d"],
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CyclicDependency {
                cycle: vec!["b".into(), "d".into(), "c".into(), "b".into()],
            }]
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let cfg = config(vec![leaf("a")], vec![op("b", &["a", "b.output"])], &["b"]);
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert!(matches!(errors[0], ValidationError::CyclicDependency { .. }));
    }
}
