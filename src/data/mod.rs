// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Indexed event collections threaded through an evaluation.
//!
//! An [`EventSet`] maps each index key (the tuple identifying one entity) to
//! that entity's timestamps and feature columns. Columns are aligned 1:1 with
//! the timestamps of their key.

mod column;
mod event_set;
mod value;

pub use column::Column;
pub use event_set::{EventSet, IndexData};
pub use value::{IndexKey, IndexValue, Value};
