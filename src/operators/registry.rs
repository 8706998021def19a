// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::observability::messages::{registry::OperatorRegistered, StructuredLog};
use crate::operators::OperatorDefinition;

/// Catalog mapping operator keys to their definitions.
///
/// The registry is populated while it is exclusively owned, then moved behind
/// an `Arc` with [`OperatorRegistry::freeze`]. Graphs and the implementation
/// registry only ever hold the frozen `Arc`, so no definition can be added or
/// changed once graph construction has started. Tests build their own
/// isolated registries.
///
/// # Examples
///
/// ```rust
/// use the_tempograph::operators::OperatorRegistry;
///
/// let registry = OperatorRegistry::with_builtins().unwrap().freeze();
/// assert!(registry.lookup("DIVISION_SCALAR").is_ok());
/// assert!(registry.lookup("NOT_AN_OPERATOR").is_err());
/// ```
#[derive(Debug, Default)]
pub struct OperatorRegistry {
    definitions: HashMap<&'static str, Arc<OperatorDefinition>>,
    order: Vec<&'static str>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every operator shipped with the crate.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        crate::operators::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Adds a definition. Registering a key twice is a programming error.
    pub fn register(&mut self, definition: OperatorDefinition) -> Result<(), RegistryError> {
        if self.definitions.contains_key(definition.key) {
            return Err(RegistryError::DuplicateKey {
                key: definition.key.to_string(),
            });
        }

        OperatorRegistered {
            key: definition.key,
            input_count: definition.inputs.len(),
            output_count: definition.outputs.len(),
            attribute_count: definition.attributes.len(),
        }
        .log();

        self.order.push(definition.key);
        self.definitions
            .insert(definition.key, Arc::new(definition));
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Result<Arc<OperatorDefinition>, RegistryError> {
        self.definitions
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownOperator {
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Marks the end of registration.
    pub fn freeze(self) -> Arc<OperatorRegistry> {
        Arc::new(self)
    }
}
