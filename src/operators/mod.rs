// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operator definitions and the catalog they are registered in.
//!
//! An operator is described once by an [`OperatorDefinition`]: its input
//! slots, output slots, attribute schema and a contract function computing
//! output schemas. Each built-in module exposes a `register` function plus
//! constructors that add an instance to a [`crate::graph::Graph`].

pub mod arithmetic;
pub mod arithmetic_scalar;
pub mod calendar;
pub mod cast;
pub mod definition;
pub mod filter;
pub mod registry;
pub mod rename;
pub mod select;
pub mod window;

pub use definition::{
    AttributeDef, AttributeType, AttributeValue, Attributes, FeatureConstraint, InferFn, InputDef,
    OperatorContext, OperatorDefinition,
};
pub use registry::OperatorRegistry;

use crate::errors::RegistryError;

/// Registers every built-in operator. Calling it twice on the same registry
/// fails with [`RegistryError::DuplicateKey`].
pub fn register_builtins(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    arithmetic::register(registry)?;
    arithmetic_scalar::register(registry)?;
    calendar::register(registry)?;
    cast::register(registry)?;
    filter::register(registry)?;
    rename::register(registry)?;
    select::register(registry)?;
    window::register(registry)?;
    Ok(())
}
