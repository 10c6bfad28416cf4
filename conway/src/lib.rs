//! Conway's Game of Life on a fixed, dead-bordered grid.
//!
//! The grid is double-buffered: every update strategy reads the `current`
//! buffer, writes each interior cell of `next` exactly once and commits by
//! swapping the two. Three strategies are provided:
//!
//! - [`Strategy::Sequential`]: one thread, row-major scan.
//! - [`Strategy::ParallelPerCell`]: a task per interior cell joined on a
//!   barrier, unbounded by design.
//! - [`Strategy::WorkerPool`]: a fixed pool of long-lived workers fed
//!   columns through a bounded queue, with an accumulator that commits once
//!   the completion reports add up to the interior cell count.
//!
//! All three produce bit-identical generations.
//!
//! ```no_run
//! use conway::{Life, LifeConfig, Strategy};
//!
//! let mut life = Life::initialize(LifeConfig::new(200, 200).with_seed(1))?;
//! life.advance_generation(Strategy::WorkerPool(8))?;
//! let snapshot = life.snapshot();
//! println!("{} alive", snapshot.population());
//! # Ok::<(), conway::LifeError>(())
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod life;
pub mod patterns;
pub mod rule;
pub mod strategy;

pub use config::LifeConfig;
pub use error::{LifeError, Result};
pub use grid::{GridState, Snapshot};
pub use history::CycleDetector;
pub use life::Life;
pub use patterns::{PATTERNS, Pattern};
pub use strategy::{GenerationReport, Strategy, WorkerPool};
