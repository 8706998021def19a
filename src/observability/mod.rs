// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for registries, graph construction and evaluation.
//!
//! Log lines are produced by message structs that implement `Display` and
//! [`messages::StructuredLog`], so the wording lives in one place and every
//! event carries the same structured fields wherever it is emitted.
//!
//! Messages are organized by subsystem:
//! * `messages::registry` - operator and backend registration
//! * `messages::graph` - operator instantiation
//! * `messages::engine` - scheduling and evaluation lifecycle
//! * `messages::validation` - pipeline file validation
//!
//! # Usage
//!
//! ```rust
//! use the_tempograph::observability::messages::{engine::EvaluationStarted, StructuredLog};
//!
//! let msg = EvaluationStarted {
//!     strategy: "sequential",
//!     backend: "array",
//!     step_count: 3,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
