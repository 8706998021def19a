// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::observability::messages::registry::{
    BackendReserved, ImplementationRegistered, RegistriesFrozen,
};
use crate::observability::messages::StructuredLog;
use crate::operators::OperatorRegistry;
use crate::traits::OperatorExecutor;

type Implementations = HashMap<&'static str, Arc<dyn OperatorExecutor>>;

/// Binds operator keys to backend executors.
///
/// A backend name must be reserved with [`register_backend`] before
/// executors can be registered under it. A reserved backend with no
/// executors is valid: resolving anything on it fails with
/// [`RegistryError::BackendNotImplemented`].
///
/// [`register_backend`]: ImplementationRegistry::register_backend
pub struct ImplementationRegistry {
    operators: Arc<OperatorRegistry>,
    backends: BTreeMap<String, Implementations>,
}

impl std::fmt::Debug for ImplementationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementationRegistry")
            .field("operator_count", &self.operators.len())
            .field(
                "backends",
                &self
                    .backends
                    .iter()
                    .map(|(name, implementations)| (name, implementations.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ImplementationRegistry {
    pub fn new(operators: Arc<OperatorRegistry>) -> Self {
        Self {
            operators,
            backends: BTreeMap::new(),
        }
    }

    /// Registry with every built-in backend installed.
    pub fn with_builtins(operators: Arc<OperatorRegistry>) -> Result<Self, RegistryError> {
        let mut registry = Self::new(operators);
        crate::backends::install_builtins(&mut registry)?;
        Ok(registry)
    }

    pub fn operators(&self) -> &Arc<OperatorRegistry> {
        &self.operators
    }

    /// Reserves a backend name. Reserving an existing name is a no-op.
    pub fn register_backend(&mut self, name: &str) {
        if !self.backends.contains_key(name) {
            BackendReserved { backend: name }.log();
            self.backends.insert(name.to_string(), HashMap::new());
        }
    }

    pub fn register(
        &mut self,
        key: &str,
        backend: &str,
        executor: Arc<dyn OperatorExecutor>,
    ) -> Result<(), RegistryError> {
        let definition = self.operators.lookup(key)?;
        let implementations =
            self.backends
                .get_mut(backend)
                .ok_or_else(|| RegistryError::UnknownBackend {
                    backend: backend.to_string(),
                })?;

        if implementations.contains_key(definition.key) {
            return Err(RegistryError::DuplicateImplementation {
                key: key.to_string(),
                backend: backend.to_string(),
            });
        }

        ImplementationRegistered {
            key,
            backend,
            executor: executor.name(),
        }
        .log();
        implementations.insert(definition.key, executor);
        Ok(())
    }

    /// Executor for `key` on `backend`.
    ///
    /// Errors are checked in order: unknown operator, unknown backend, then
    /// missing implementation. Only the last one is recoverable.
    pub fn resolve(
        &self,
        key: &str,
        backend: &str,
    ) -> Result<Arc<dyn OperatorExecutor>, RegistryError> {
        if !self.operators.contains(key) {
            return Err(RegistryError::UnknownOperator {
                key: key.to_string(),
            });
        }
        let implementations =
            self.backends
                .get(backend)
                .ok_or_else(|| RegistryError::UnknownBackend {
                    backend: backend.to_string(),
                })?;
        implementations
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::BackendNotImplemented {
                key: key.to_string(),
                backend: backend.to_string(),
            })
    }

    pub fn has_backend(&self, backend: &str) -> bool {
        self.backends.contains_key(backend)
    }

    /// Reserved backend names, sorted.
    pub fn backends(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Operator keys implemented by `backend`, sorted.
    pub fn implemented(&self, backend: &str) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .backends
            .get(backend)
            .map(|implementations| implementations.keys().copied().collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    pub fn implementation_count(&self) -> usize {
        self.backends.values().map(HashMap::len).sum()
    }

    /// Ends startup: no executor can be added afterwards.
    pub fn freeze(self) -> Arc<ImplementationRegistry> {
        RegistriesFrozen {
            operator_count: self.operators.len(),
            backend_count: self.backends.len(),
            implementation_count: self.implementation_count(),
        }
        .log();
        Arc::new(self)
    }
}
