// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // operator implementations, one registry entry per backend
pub mod config;     // pipeline files + runtime
pub mod data;       // event sets and columns
pub mod engine;     // scheduling and evaluation strategies
pub mod errors;     // error handling
pub mod graph;      // graph arena
pub mod observability;
pub mod operators;  // operator definitions + registry
pub mod schema;     // feature types and schemas
pub mod traits;     // unified abstractions
