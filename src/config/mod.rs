// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! YAML pipeline files: loading, validation, graph construction, leaf data
//! and the runtime that evaluates them.

mod data;
mod loader;
mod pipeline;
mod runtime;
pub(crate) mod validation;

#[cfg(test)]
mod integration_tests;

pub use data::{event_set_to_json, load_event_set, load_leaf_bindings, parse_event_set};
pub use loader::{
    load_and_validate_config, load_config, parse_reference, Config, ExecutorOptions, LeafConfig,
    OperatorConfig, Strategy,
};
pub use pipeline::{convert_attributes, Pipeline, PipelineBuilder};
pub use runtime::{Runtime, RuntimeBuilder};
pub use validation::validate_pipeline;
