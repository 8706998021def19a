// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Config, Strategy};
use crate::engine::level_by_level::LevelByLevelExecutor;
use crate::engine::sequential::SequentialExecutor;
use crate::traits::ScheduleExecutor;

/// Factory for creating schedule executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create an executor based on the configuration strategy
    pub fn from_config(cfg: &Config) -> Box<dyn ScheduleExecutor> {
        Self::create(cfg.strategy, cfg.executor_options.max_concurrency)
    }

    /// `max_concurrency` only affects the level strategy and defaults to the
    /// host's available parallelism.
    pub fn create(strategy: Strategy, max_concurrency: Option<usize>) -> Box<dyn ScheduleExecutor> {
        match strategy {
            Strategy::Sequential => Box::new(SequentialExecutor::new()),
            Strategy::Level => Box::new(match max_concurrency {
                Some(limit) => LevelByLevelExecutor::new(limit),
                None => LevelByLevelExecutor::with_available_parallelism(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_matches_strategy() {
        assert_eq!(ExecutorFactory::create(Strategy::Sequential, Some(8)).name(), "sequential");
        assert_eq!(ExecutorFactory::create(Strategy::Level, Some(2)).name(), "level");
        assert_eq!(ExecutorFactory::create(Strategy::Level, None).name(), "level");
    }
}
