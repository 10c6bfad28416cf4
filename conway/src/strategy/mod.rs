// strategy/mod.rs - The three interchangeable ways of advancing a generation
//
// All three read `current`, fill every interior cell of `next` and commit
// only once the whole interior is done.

pub mod per_cell;
pub mod sequential;
pub mod worker_pool;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DEFAULT_POOL_SIZE;
use crate::error::LifeError;

pub use worker_pool::WorkerPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single-threaded row-major scan.
    Sequential,
    /// One task per interior cell, joined on a barrier. The task count grows
    /// with the grid area and is deliberately unbounded.
    ParallelPerCell,
    /// Long-lived pool of this many workers fed one column at a time.
    WorkerPool(usize),
}

impl Strategy {
    pub const NAMES: [&'static str; 3] = ["sequential", "per-cell", "worker-pool"];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => Self::NAMES[0],
            Strategy::ParallelPerCell => Self::NAMES[1],
            Strategy::WorkerPool(_) => Self::NAMES[2],
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::WorkerPool(DEFAULT_POOL_SIZE)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::WorkerPool(size) => write!(f, "{}:{}", self.name(), size),
            _ => f.write_str(self.name()),
        }
    }
}

/// Accepts `sequential`, `per-cell`, `worker-pool` and `worker-pool:N`.
impl FromStr for Strategy {
    type Err = LifeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || LifeError::UnknownStrategy(s.to_string());
        let (name, size) = match s.split_once(':') {
            Some((name, size)) => (name, Some(size.parse::<usize>().map_err(|_| unknown())?)),
            None => (s, None),
        };
        match (name.to_ascii_lowercase().as_str(), size) {
            ("sequential", None) => Ok(Strategy::Sequential),
            ("per-cell" | "parallel", None) => Ok(Strategy::ParallelPerCell),
            ("worker-pool" | "pool", size) => Ok(Strategy::WorkerPool(size.unwrap_or(DEFAULT_POOL_SIZE))),
            _ => Err(unknown()),
        }
    }
}

/// Outcome of one committed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Generation number now visible as `current`.
    pub generation: u64,
    pub strategy: Strategy,
    /// Sum of completion reports, always `(W-2) * (H-2)` on success.
    pub cells_computed: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("sequential".parse::<Strategy>().unwrap(), Strategy::Sequential);
        assert_eq!("per-cell".parse::<Strategy>().unwrap(), Strategy::ParallelPerCell);
        assert_eq!(
            "worker-pool".parse::<Strategy>().unwrap(),
            Strategy::WorkerPool(DEFAULT_POOL_SIZE)
        );
        assert_eq!("worker-pool:3".parse::<Strategy>().unwrap(), Strategy::WorkerPool(3));
        assert!(matches!(
            "torus".parse::<Strategy>(),
            Err(LifeError::UnknownStrategy(_))
        ));
        assert!("sequential:2".parse::<Strategy>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for strategy in [Strategy::Sequential, Strategy::ParallelPerCell, Strategy::WorkerPool(5)] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }
}
