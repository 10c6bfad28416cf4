// error.rs - Error type for the Conway engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifeError {
    #[error("Invalid grid dimensions {width}x{height}: both axes must be at least 3 to leave an interior")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid worker pool size: {0} (must be at least 1)")]
    InvalidPoolSize(usize),

    #[error("Invalid seed probability: {0} (must be within 0.0..=1.0)")]
    InvalidProbability(f64),

    #[error("Invalid {queue} queue capacity: {capacity} (must be at least 1)")]
    InvalidQueueCapacity { queue: &'static str, capacity: usize },

    #[error("Invalid runtime thread count: 0")]
    InvalidThreadCount,

    #[error("Unknown update strategy: {0}")]
    UnknownStrategy(String),

    #[error("Worker pool already running with {running} workers, cannot switch to {requested}")]
    PoolResize { running: usize, requested: usize },

    #[error("Completion accounting mismatch: expected {expected} cells, workers reported {reported}")]
    AccountingMismatch { expected: usize, reported: usize },

    #[error("Workers exited mid-generation: expected {expected} cells, only {reported} reported")]
    WorkersExited { expected: usize, reported: usize },

    #[error("Worker pool is closed")]
    PoolClosed,

    #[error("Update task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("Cell ({x}, {y}) is not an interior cell")]
    CellOutOfBounds { x: usize, y: usize },

    #[error("Pattern '{name}' does not fit: cell ({x}, {y}) lands outside the interior")]
    PatternOutOfBounds { name: &'static str, x: usize, y: usize },

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LifeError>;
