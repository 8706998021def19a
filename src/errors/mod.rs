// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod data;
mod execution;
mod graph;
mod registry;
mod schedule;

pub use config::{ConfigError, ValidationError};
pub use data::EventSetError;
pub use execution::{ExecutionError, ExecutorError};
pub use graph::GraphError;
pub use registry::RegistryError;
pub use schedule::ScheduleError;
