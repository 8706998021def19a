// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Column-wise backend. Every kernel works on whole typed vectors of one
//! index key at a time.

pub mod arithmetic;
pub mod calendar;
pub mod transform;
pub mod window;

use std::sync::Arc;

use crate::backends::arithmetic::ArithmeticOp;
use crate::backends::ImplementationRegistry;
use crate::errors::RegistryError;
use crate::operators::calendar::CalendarUnit;
use crate::operators::window::{MOVING_STANDARD_DEVIATION, MOVING_SUM};
use crate::operators::{cast, filter, rename, select};
use crate::traits::Backend;

pub const ARRAY: &str = "array";

pub struct ArrayBackend;

impl Backend for ArrayBackend {
    fn name(&self) -> &'static str {
        ARRAY
    }

    fn install(&self, registry: &mut ImplementationRegistry) -> Result<(), RegistryError> {
        registry.register_backend(ARRAY);

        for op in ArithmeticOp::ALL {
            registry.register(op.key(), ARRAY, Arc::new(arithmetic::BinaryArithmetic(op)))?;
            registry.register(op.scalar_key(), ARRAY, Arc::new(arithmetic::ScalarArithmetic(op)))?;
        }
        for unit in CalendarUnit::ALL {
            registry.register(unit.key(), ARRAY, Arc::new(calendar::CalendarExtract(unit)))?;
        }
        registry.register(select::SELECT, ARRAY, Arc::new(transform::Select))?;
        registry.register(rename::RENAME, ARRAY, Arc::new(transform::Rename))?;
        registry.register(filter::FILTER, ARRAY, Arc::new(transform::Filter))?;
        registry.register(cast::CAST, ARRAY, Arc::new(transform::Cast))?;
        registry.register(
            MOVING_SUM,
            ARRAY,
            Arc::new(window::MovingWindow(window::WindowKind::Sum)),
        )?;
        registry.register(
            MOVING_STANDARD_DEVIATION,
            ARRAY,
            Arc::new(window::MovingWindow(window::WindowKind::StandardDeviation)),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::OperatorRegistry;

    #[test]
    fn test_implements_every_builtin() {
        let operators = OperatorRegistry::with_builtins().unwrap().freeze();
        let mut registry = ImplementationRegistry::new(operators.clone());
        ArrayBackend.install(&mut registry).unwrap();

        for key in operators.keys() {
            assert!(registry.resolve(key, ARRAY).is_ok(), "missing {}", key);
        }
    }
}
