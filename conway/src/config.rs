// config.rs - Run configuration for the engine

use crate::error::{LifeError, Result};
use crate::grid::MIN_SIDE;
use crate::strategy::Strategy;

pub const DEFAULT_WIDTH: usize = 1000;            // Full grid including the border
pub const DEFAULT_HEIGHT: usize = 1000;
pub const DEFAULT_SEED_PROBABILITY: f64 = 0.5;    // Chance an interior cell starts alive
pub const DEFAULT_POOL_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct LifeConfig {
    pub width: usize,
    pub height: usize,
    pub seed_probability: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Strategy used by `Life::step`.
    pub strategy: Strategy,
    /// Workers started the first time a worker-pool generation runs when
    /// the strategy does not name a size itself.
    pub pool_size: usize,
    /// Defaults to one generation's worth of columns.
    pub work_queue_capacity: Option<usize>,
    /// Defaults to one generation's worth of columns.
    pub results_queue_capacity: Option<usize>,
    /// Runtime worker threads; defaults to the available parallelism.
    pub runtime_threads: Option<usize>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed_probability: DEFAULT_SEED_PROBABILITY,
            seed: None,
            strategy: Strategy::WorkerPool(DEFAULT_POOL_SIZE),
            pool_size: DEFAULT_POOL_SIZE,
            work_queue_capacity: None,
            results_queue_capacity: None,
            runtime_threads: None,
        }
    }
}

impl LifeConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn with_seed_probability(mut self, probability: f64) -> Self {
        self.seed_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Also sets `pool_size` when the strategy carries one.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        if let Strategy::WorkerPool(size) = strategy {
            self.pool_size = size;
        }
        self.strategy = strategy;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        if let Strategy::WorkerPool(_) = self.strategy {
            self.strategy = Strategy::WorkerPool(size);
        }
        self
    }

    pub fn with_queue_capacities(mut self, work: usize, results: usize) -> Self {
        self.work_queue_capacity = Some(work);
        self.results_queue_capacity = Some(results);
        self
    }

    pub fn with_runtime_threads(mut self, threads: usize) -> Self {
        self.runtime_threads = Some(threads);
        self
    }

    fn interior_columns(&self) -> usize {
        self.width.saturating_sub(2)
    }

    pub fn work_queue_capacity(&self) -> usize {
        self.work_queue_capacity.unwrap_or_else(|| self.interior_columns())
    }

    pub fn results_queue_capacity(&self) -> usize {
        self.results_queue_capacity.unwrap_or_else(|| self.interior_columns())
    }

    /// Everything that would make the run meaningless is rejected here,
    /// before any buffer is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(LifeError::InvalidDimensions { width: self.width, height: self.height });
        }
        validate_probability(self.seed_probability)?;
        if self.pool_size == 0 {
            return Err(LifeError::InvalidPoolSize(0));
        }
        if let Strategy::WorkerPool(0) = self.strategy {
            return Err(LifeError::InvalidPoolSize(0));
        }
        for (queue, capacity) in [
            ("work", self.work_queue_capacity()),
            ("results", self.results_queue_capacity()),
        ] {
            if capacity == 0 {
                return Err(LifeError::InvalidQueueCapacity { queue, capacity });
            }
        }
        if self.runtime_threads == Some(0) {
            return Err(LifeError::InvalidThreadCount);
        }
        Ok(())
    }
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(LifeError::InvalidProbability(probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LifeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.work_queue_capacity(), 998);
        assert_eq!(config.results_queue_capacity(), 998);
        assert_eq!(config.strategy, Strategy::WorkerPool(8));
    }

    #[test]
    fn rejects_grids_without_interior() {
        for (w, h) in [(2, 10), (10, 2), (0, 0), (1, 3)] {
            assert!(matches!(
                LifeConfig::new(w, h).validate(),
                Err(LifeError::InvalidDimensions { .. })
            ));
        }
        LifeConfig::new(3, 3).validate().unwrap();
    }

    #[test]
    fn rejects_bad_knobs() {
        let base = LifeConfig::new(10, 10);
        assert!(matches!(
            base.clone().with_pool_size(0).validate(),
            Err(LifeError::InvalidPoolSize(0))
        ));
        assert!(matches!(
            base.clone().with_seed_probability(1.5).validate(),
            Err(LifeError::InvalidProbability(_))
        ));
        assert!(matches!(
            base.clone().with_seed_probability(f64::NAN).validate(),
            Err(LifeError::InvalidProbability(_))
        ));
        assert!(matches!(
            base.clone().with_queue_capacities(0, 4).validate(),
            Err(LifeError::InvalidQueueCapacity { queue: "work", .. })
        ));
        assert!(matches!(
            base.clone().with_runtime_threads(0).validate(),
            Err(LifeError::InvalidThreadCount)
        ));
    }

    #[test]
    fn strategy_carries_pool_size() {
        let config = LifeConfig::new(10, 10).with_strategy(Strategy::WorkerPool(3));
        assert_eq!(config.pool_size, 3);
        let config = config.with_pool_size(5);
        assert_eq!(config.strategy, Strategy::WorkerPool(5));
    }
}
