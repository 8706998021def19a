// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::ImplementationRegistry;
use crate::errors::RegistryError;

/// A named family of executors.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Reserves the backend name and registers every executor it provides.
    fn install(&self, registry: &mut ImplementationRegistry) -> Result<(), RegistryError>;
}
