// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    Attributes, FeatureConstraint, OperatorContext, OperatorDefinition, OperatorRegistry,
};
use crate::schema::Schema;

pub const FILTER: &str = "FILTER";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(
        OperatorDefinition::new(FILTER, infer)
            .input("input", FeatureConstraint::Any)
            .input("condition", FeatureConstraint::SingleBoolean)
            .output("output"),
    )
}

fn infer(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    let (input, condition) = (ctx.input(0), ctx.input(1));
    if !input.same_index(condition) {
        return Err(ctx.type_error("input and condition must have the same index"));
    }
    Ok(vec![input.clone()])
}

/// Keeps the events of `input` where `condition` is true. Both must share sampling.
pub fn filter(graph: &mut Graph, input: NodeId, condition: NodeId) -> Result<NodeId, GraphError> {
    graph.apply_single(FILTER, &[input, condition], Attributes::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FeatureSchema, FeatureType, IndexSchema};

    #[test]
    fn test_filter_contract() {
        let mut g = Graph::new(OperatorRegistry::with_builtins().unwrap().freeze());
        let store = vec![IndexSchema::new("store", FeatureType::String).unwrap()];
        let input = g.leaf(
            "sales",
            Schema::new(vec![FeatureSchema::new("price", FeatureType::Float64)], store.clone()),
        );
        let flag = g.leaf(
            "flag",
            Schema::new(vec![FeatureSchema::new("keep", FeatureType::Boolean)], store),
        );
        let unindexed = g.leaf(
            "unindexed",
            Schema::new(vec![FeatureSchema::new("keep", FeatureType::Boolean)], vec![]),
        );

        let out = filter(&mut g, input, flag).unwrap();
        assert_eq!(g.schema(out).unwrap(), g.schema(input).unwrap());

        assert!(matches!(
            filter(&mut g, input, input),
            Err(GraphError::TypeContract { .. })
        ));
        assert!(matches!(
            filter(&mut g, input, unindexed),
            Err(GraphError::TypeContract { .. })
        ));
    }
}
