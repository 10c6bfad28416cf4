// worker_pool.rs - Fixed pool of long-lived workers fed column indices
//
//   producer ──columns──▶ [work queue] ──▶ worker × P ──rows──▶ [results queue]
//                                                                     │
//   driver ◀──────── commit notice ◀──── accumulator (commits at total) ◀┘
//
// Both queues are bounded. A full work queue blocks the producer and a full
// results queue blocks the workers; neither is an error. The accumulator is
// the only place that commits, and only when the reported rows add up to
// exactly (W-2) * (H-2).

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use crate::error::{LifeError, Result};
use crate::grid::GridState;
use crate::rule;

type ColumnQueue = Arc<Mutex<mpsc::Receiver<usize>>>;

/// Worker pool started once and reused for every generation.
///
/// Must be started from within a tokio runtime. Dropping the pool closes
/// the work queue, after which workers and the accumulator wind down.
pub struct WorkerPool {
    grid: Arc<GridState>,
    size: usize,
    columns: Option<mpsc::Sender<usize>>,
    commits: mpsc::Receiver<Result<usize>>,
    workers: Vec<JoinHandle<()>>,
    accumulator: JoinHandle<()>,
}

impl WorkerPool {
    pub fn start(
        grid: Arc<GridState>,
        size: usize,
        work_capacity: usize,
        results_capacity: usize,
    ) -> Result<Self> {
        if size == 0 {
            return Err(LifeError::InvalidPoolSize(size));
        }
        if work_capacity == 0 {
            return Err(LifeError::InvalidQueueCapacity { queue: "work", capacity: 0 });
        }
        if results_capacity == 0 {
            return Err(LifeError::InvalidQueueCapacity { queue: "results", capacity: 0 });
        }

        let (column_tx, column_rx) = mpsc::channel(work_capacity);
        let (report_tx, report_rx) = mpsc::channel(results_capacity);
        let (commit_tx, commit_rx) = mpsc::channel(1);

        let queue: ColumnQueue = Arc::new(Mutex::new(column_rx));
        let workers = (0..size)
            .map(|id| {
                tokio::spawn(work(id, Arc::clone(&grid), Arc::clone(&queue), report_tx.clone()))
            })
            .collect();
        // Only workers hold report senders, so the results queue closes when
        // the last worker is gone.
        drop(report_tx);

        let accumulator = tokio::spawn(accumulate(Arc::clone(&grid), report_rx, commit_tx));

        info!(workers = size, work_capacity, results_capacity, "worker pool started");
        Ok(Self {
            grid,
            size,
            columns: Some(column_tx),
            commits: commit_rx,
            workers,
            accumulator,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs one generation: feeds every interior column to the pool and
    /// waits until the accumulator has committed. Returns the summed
    /// completion reports.
    pub async fn advance(&mut self) -> Result<usize> {
        let columns = self.columns.clone().ok_or(LifeError::PoolClosed)?;
        let range = self.grid.interior_columns();

        let producer = tokio::spawn(async move {
            for x in range {
                if columns.send(x).await.is_err() {
                    break;
                }
            }
        });

        let committed = self.commits.recv().await.ok_or(LifeError::PoolClosed)?;
        producer.await?;
        committed
    }

    /// Closes the work queue and waits for every task of the pool to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.columns.take();
        for worker in self.workers.drain(..) {
            worker.await?;
        }
        (&mut self.accumulator).await?;
        info!(workers = self.size, "worker pool stopped");
        Ok(())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("open", &self.columns.is_some())
            .finish()
    }
}

/// Takes columns until the work queue closes. Each finished column is
/// reported as the number of rows it computed.
async fn work(id: usize, grid: Arc<GridState>, columns: ColumnQueue, reports: mpsc::Sender<usize>) {
    loop {
        let next = columns.lock().await.recv().await;
        let Some(x) = next else { break };

        let rows = rule::compute_column(&grid, x);
        if reports.send(rows).await.is_err() {
            break;
        }
    }
    trace!(worker = id, "worker exiting");
}

/// Sums completion reports and commits the generation once the total hits
/// the interior cell count. Overshooting means a column was computed twice;
/// the generation is then refused instead of committed.
async fn accumulate(
    grid: Arc<GridState>,
    mut reports: mpsc::Receiver<usize>,
    commits: mpsc::Sender<Result<usize>>,
) {
    let expected = grid.interior_cells();
    let mut total = 0;

    while let Some(rows) = reports.recv().await {
        total += rows;
        if total < expected {
            continue;
        }

        let outcome = if total == expected {
            grid.commit();
            debug!(cells = total, "pool generation committed");
            Ok(total)
        } else {
            error!(expected, reported = total, "completion reports overshot the interior");
            Err(LifeError::AccountingMismatch { expected, reported: total })
        };
        total = 0;

        if commits.send(outcome).await.is_err() {
            return;
        }
    }

    if total > 0 {
        error!(expected, reported = total, "workers exited mid-generation");
        let _ = commits
            .send(Err(LifeError::WorkersExited { expected, reported: total }))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::sequential;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn matches_sequential_scan_across_generations() {
        let reference = GridState::new(40, 23);
        let grid = Arc::new(GridState::new(40, 23));
        reference.seed(0.5, &mut StdRng::seed_from_u64(5));
        grid.seed(0.5, &mut StdRng::seed_from_u64(5));

        let mut pool = WorkerPool::start(Arc::clone(&grid), 3, 38, 38).unwrap();
        for generation in 1..=6 {
            sequential::advance(&reference);
            assert_eq!(pool.advance().await.unwrap(), 38 * 21);
            assert_eq!(grid.snapshot(generation), reference.snapshot(generation));
        }
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn tiny_queues_apply_backpressure_without_failing() {
        let grid = Arc::new(GridState::new(30, 10));
        grid.seed(0.5, &mut StdRng::seed_from_u64(2));
        let mut pool = WorkerPool::start(Arc::clone(&grid), 2, 1, 1).unwrap();

        for _ in 0..4 {
            assert_eq!(pool.advance().await.unwrap(), 28 * 8);
        }
        assert!(grid.snapshot(4).border_is_dead());
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn rejects_zero_sizes() {
        let grid = Arc::new(GridState::new(5, 5));
        assert!(matches!(
            WorkerPool::start(Arc::clone(&grid), 0, 4, 4),
            Err(LifeError::InvalidPoolSize(0))
        ));
        assert!(matches!(
            WorkerPool::start(Arc::clone(&grid), 2, 0, 4),
            Err(LifeError::InvalidQueueCapacity { queue: "work", .. })
        ));
        assert!(matches!(
            WorkerPool::start(grid, 2, 4, 0),
            Err(LifeError::InvalidQueueCapacity { queue: "results", .. })
        ));
    }

    #[tokio::test]
    async fn overshooting_reports_refuse_the_commit() {
        let grid = Arc::new(GridState::new(4, 4));
        let (report_tx, report_rx) = mpsc::channel(4);
        let (commit_tx, mut commit_rx) = mpsc::channel(1);
        let accumulator = tokio::spawn(accumulate(Arc::clone(&grid), report_rx, commit_tx));

        // Interior is 2x2; a duplicated column pushes the total to 6
        report_tx.send(2).await.unwrap();
        report_tx.send(4).await.unwrap();
        let outcome = commit_rx.recv().await.unwrap();
        assert!(matches!(
            outcome,
            Err(LifeError::AccountingMismatch { expected: 4, reported: 6 })
        ));

        drop(report_tx);
        accumulator.await.unwrap();
    }

    #[tokio::test]
    async fn vanished_workers_are_reported_not_awaited_forever() {
        let grid = Arc::new(GridState::new(5, 5));
        let (report_tx, report_rx) = mpsc::channel(4);
        let (commit_tx, mut commit_rx) = mpsc::channel(1);
        let accumulator = tokio::spawn(accumulate(grid, report_rx, commit_tx));

        report_tx.send(3).await.unwrap();
        drop(report_tx);

        let outcome = commit_rx.recv().await.unwrap();
        assert!(matches!(
            outcome,
            Err(LifeError::WorkersExited { expected: 9, reported: 3 })
        ));
        accumulator.await.unwrap();
    }
}
