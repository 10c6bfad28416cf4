// life.rs - The engine facade driven by the runner and the viewer

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error, info};

use crate::config::{LifeConfig, validate_probability};
use crate::error::{LifeError, Result};
use crate::grid::{GridState, Snapshot};
use crate::history::CycleDetector;
use crate::patterns::{self, Pattern};
use crate::strategy::{GenerationReport, Strategy, WorkerPool, per_cell, sequential};

/// Owns the grid and everything needed to advance it.
///
/// Advancing takes `&mut self` and blocks until the generation is committed,
/// while `snapshot` takes `&self`, so a partially computed generation can
/// never be observed.
///
/// `Life` drives its own runtime with `block_on`, so its methods are meant for
/// synchronous callers. Calling them from inside another tokio runtime panics;
/// use `spawn_blocking` or a plain thread there. Dropping it anywhere is fine.
pub struct Life {
    config: LifeConfig,
    grid: Arc<GridState>,
    pool: Option<WorkerPool>,
    generation: u64,
    history: CycleDetector,
    rng: StdRng,
    // Only `None` once `drop` has taken it.
    runtime: Option<Runtime>,
}

impl Life {
    /// Validates `config`, allocates both buffers and seeds the interior.
    pub fn initialize(config: LifeConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Builder::new_multi_thread();
        if let Some(threads) = config.runtime_threads {
            builder.worker_threads(threads);
        }
        let runtime = builder.thread_name("conway-worker").enable_all().build()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = Arc::new(GridState::new(config.width, config.height));
        grid.seed(config.seed_probability, &mut rng);

        info!(
            width = config.width,
            height = config.height,
            probability = config.seed_probability,
            strategy = %config.strategy,
            "grid initialized"
        );

        Ok(Self {
            config,
            grid,
            pool: None,
            generation: 0,
            history: CycleDetector::default(),
            rng,
            runtime: Some(runtime),
        })
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Size of the running worker pool, if one has been started.
    pub fn pool_size(&self) -> Option<usize> {
        self.pool.as_ref().map(WorkerPool::size)
    }

    /// The last committed generation.
    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot(self.generation)
    }

    /// Advances with the configured strategy.
    pub fn step(&mut self) -> Result<GenerationReport> {
        self.advance_generation(self.config.strategy)
    }

    /// Runs exactly one generation with `strategy` and returns once it has
    /// been committed.
    ///
    /// The worker pool is started by the first worker-pool generation and
    /// kept for the rest of the run; asking for a different size later is
    /// refused. A pool that fails a generation is torn down and the next
    /// worker-pool generation starts a fresh one.
    pub fn advance_generation(&mut self, strategy: Strategy) -> Result<GenerationReport> {
        let started = Instant::now();
        let cells_computed = match strategy {
            Strategy::Sequential => sequential::advance(&self.grid),
            Strategy::ParallelPerCell => self.runtime().block_on(per_cell::advance(&self.grid))?,
            Strategy::WorkerPool(size) => self.advance_pool(size)?,
        };
        self.generation += 1;

        let report = GenerationReport {
            generation: self.generation,
            strategy,
            cells_computed,
            elapsed: started.elapsed(),
        };
        debug!(
            generation = report.generation,
            strategy = %strategy,
            cells = cells_computed,
            elapsed_us = report.elapsed.as_micros() as u64,
            "generation committed"
        );
        Ok(report)
    }

    /// Runs `generations` generations and returns the last report, or `None`
    /// when asked for zero.
    pub fn advance(&mut self, generations: usize, strategy: Strategy) -> Result<Option<GenerationReport>> {
        let mut last = None;
        for _ in 0..generations {
            last = Some(self.advance_generation(strategy)?);
        }
        Ok(last)
    }

    fn advance_pool(&mut self, size: usize) -> Result<usize> {
        let mut pool = match self.pool.take() {
            Some(pool) if pool.size() != size => {
                let running = pool.size();
                self.pool = Some(pool);
                return Err(LifeError::PoolResize { running, requested: size });
            }
            Some(pool) => pool,
            None => self.start_pool(size)?,
        };

        match self.runtime().block_on(pool.advance()) {
            Ok(cells) => {
                self.pool = Some(pool);
                Ok(cells)
            }
            Err(err) => {
                error!(%err, "worker pool generation failed, discarding pool");
                Err(err)
            }
        }
    }

    fn runtime(&self) -> &Runtime {
        self.runtime.as_ref().expect("runtime is present until drop")
    }

    fn start_pool(&self, size: usize) -> Result<WorkerPool> {
        let _guard = self.runtime().enter();
        WorkerPool::start(
            Arc::clone(&self.grid),
            size,
            self.config.work_queue_capacity(),
            self.config.results_queue_capacity(),
        )
    }

    /// Stops the worker pool, if any, waiting for its tasks to exit.
    pub fn stop_pool(&mut self) -> Result<()> {
        match self.pool.take() {
            Some(pool) => self.runtime().block_on(pool.shutdown()),
            None => Ok(()),
        }
    }

    // Edits below happen between generations only, which `&mut self` ensures.

    /// Re-seeds the interior with `probability` and restarts the count.
    pub fn reseed(&mut self, probability: f64) -> Result<()> {
        validate_probability(probability)?;
        self.grid.seed(probability, &mut self.rng);
        self.restart();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.restart();
    }

    /// Flips one interior cell of the current generation.
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<()> {
        if !self.grid.is_interior(x, y) {
            return Err(LifeError::CellOutOfBounds { x, y });
        }
        let alive = self.grid.cell_at(x, y);
        self.grid.set_current(x, y, !alive);
        Ok(())
    }

    /// Replaces the grid with `pattern` placed at `origin`.
    pub fn apply_pattern(&mut self, pattern: &Pattern, origin: (usize, usize)) -> Result<()> {
        patterns::apply_pattern(&self.grid, pattern, origin)?;
        self.restart();
        Ok(())
    }

    /// True once the current grid repeats one of the recently checked ones.
    pub fn check_for_cycle(&mut self) -> bool {
        let hash = self.snapshot().hash();
        self.history.observe(hash)
    }

    fn restart(&mut self) {
        self.generation = 0;
        self.history.reset();
    }
}

impl Drop for Life {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        if Handle::try_current().is_ok() {
            // Inside another runtime neither `block_on` nor a blocking
            // runtime drop is allowed. Closing the queues and shutting down
            // in the background still stops every pool task.
            if self.pool.take().is_some() {
                debug!("dropped inside a runtime, pool stopped in the background");
            }
            runtime.shutdown_background();
            return;
        }

        // Let the pool's tasks see their queues close before the runtime
        // goes away.
        if let Some(pool) = self.pool.take() {
            if let Err(err) = runtime.block_on(pool.shutdown()) {
                error!(%err, "worker pool did not shut down cleanly");
            }
        }
    }
}

impl std::fmt::Debug for Life {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Life")
            .field("config", &self.config)
            .field("generation", &self.generation)
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(width: usize, height: usize) -> LifeConfig {
        LifeConfig::new(width, height)
            .with_seed(42)
            .with_runtime_threads(2)
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        assert!(matches!(
            Life::initialize(LifeConfig::new(2, 9)),
            Err(LifeError::InvalidDimensions { width: 2, height: 9 })
        ));
        assert!(matches!(
            Life::initialize(LifeConfig::new(9, 9).with_pool_size(0)),
            Err(LifeError::InvalidPoolSize(0))
        ));
    }

    #[test]
    fn same_seed_same_grid() {
        let a = Life::initialize(small(20, 20)).unwrap();
        let b = Life::initialize(small(20, 20)).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
        assert!(a.snapshot().border_is_dead());
        assert!(a.snapshot().population() > 0);
    }

    #[test]
    fn pool_cannot_be_resized() {
        let mut life = Life::initialize(small(12, 12)).unwrap();
        life.advance_generation(Strategy::WorkerPool(2)).unwrap();
        assert_eq!(life.pool_size(), Some(2));

        let err = life.advance_generation(Strategy::WorkerPool(4)).unwrap_err();
        assert!(matches!(err, LifeError::PoolResize { running: 2, requested: 4 }));
        assert_eq!(life.generation(), 1);

        // The running pool is unaffected
        life.advance_generation(Strategy::WorkerPool(2)).unwrap();
        assert_eq!(life.generation(), 2);

        life.stop_pool().unwrap();
        life.advance_generation(Strategy::WorkerPool(4)).unwrap();
        assert_eq!(life.pool_size(), Some(4));
    }

    #[test]
    fn edits_reset_generation() {
        let mut life = Life::initialize(small(10, 10)).unwrap();
        life.advance(3, Strategy::Sequential).unwrap();
        assert_eq!(life.generation(), 3);

        life.clear();
        assert_eq!(life.generation(), 0);
        assert_eq!(life.snapshot().population(), 0);

        life.toggle_cell(4, 4).unwrap();
        assert!(life.snapshot().get(4, 4));
        life.toggle_cell(4, 4).unwrap();
        assert!(!life.snapshot().get(4, 4));
        assert!(matches!(
            life.toggle_cell(0, 4),
            Err(LifeError::CellOutOfBounds { x: 0, y: 4 })
        ));

        life.reseed(1.0).unwrap();
        assert_eq!(life.snapshot().population(), 64);
        assert!(matches!(life.reseed(-0.1), Err(LifeError::InvalidProbability(_))));
    }

    #[test]
    fn still_life_is_reported_as_cycle() {
        let mut life = Life::initialize(small(8, 8)).unwrap();
        let block = Pattern::find("Block").unwrap();
        life.apply_pattern(block, (3, 3)).unwrap();

        assert!(!life.check_for_cycle());
        life.step().unwrap();
        assert!(life.check_for_cycle());
    }

    #[test]
    fn advance_zero_generations() {
        let mut life = Life::initialize(small(6, 6)).unwrap();
        assert!(life.advance(0, Strategy::Sequential).unwrap().is_none());
        assert_eq!(life.generation(), 0);
    }

    #[tokio::test]
    async fn dropping_inside_a_runtime_does_not_block() {
        // Built and advanced off the runtime, dropped on it
        let life = std::thread::spawn(|| {
            let mut life = Life::initialize(small(12, 12)).unwrap();
            life.advance(3, Strategy::WorkerPool(2)).unwrap();
            life
        })
        .join()
        .unwrap();
        assert_eq!(life.pool_size(), Some(2));
        assert_eq!(life.generation(), 3);

        drop(life);
        tokio::task::yield_now().await;
    }

    #[test]
    fn dropping_with_a_running_pool_outside_a_runtime() {
        let mut life = Life::initialize(small(12, 12)).unwrap();
        life.step().unwrap();
        assert!(life.pool_size().is_some());
        drop(life);
    }
}
