// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backend;
pub mod executor;
pub mod operator;

pub use backend::Backend;
pub use executor::ScheduleExecutor;
pub use operator::OperatorExecutor;
