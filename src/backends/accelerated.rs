// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::ImplementationRegistry;
use crate::errors::RegistryError;
use crate::traits::Backend;

pub const ACCELERATED: &str = "accelerated";

/// Reserved backend without executors. Evaluating anything on it fails with
/// [`RegistryError::BackendNotImplemented`], which lets callers fall back.
pub struct AcceleratedBackend;

impl Backend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        ACCELERATED
    }

    fn install(&self, registry: &mut ImplementationRegistry) -> Result<(), RegistryError> {
        registry.register_backend(ACCELERATED);
        Ok(())
    }
}
