// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feature and index types used to check operator contracts.

mod dtype;
mod schema;

pub use dtype::FeatureType;
pub use schema::{FeatureSchema, IndexSchema, Schema};
