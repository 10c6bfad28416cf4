// per_cell.rs - One task per interior cell, joined on a completion barrier
//
// Spawns (W-2) * (H-2) tasks every generation with no upper bound. That is
// the point of this strategy: maximal fan-out, no queueing. Scheduling and
// memory overhead grow with the grid area; large grids are a known
// scalability limit here and the bounded alternative is `WorkerPool`.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::error;

use crate::error::{LifeError, Result};
use crate::grid::GridState;
use crate::rule;

/// Computes one generation with a task per cell and commits once every task
/// has finished. Tasks write disjoint coordinates of `next` and only read
/// `current`, so the barrier is the only synchronization needed.
pub async fn advance(grid: &Arc<GridState>) -> Result<usize> {
    let expected = grid.interior_cells();
    let mut tasks = JoinSet::new();

    for x in grid.interior_columns() {
        for y in grid.interior_rows() {
            let grid = Arc::clone(grid);
            tasks.spawn(async move { rule::compute_cell(&grid, x, y) });
        }
    }

    let completed = barrier(tasks, expected).await?;
    grid.commit();
    Ok(completed)
}

/// Waits for every task in `tasks`, refusing to wait at all when the set does
/// not hold exactly `expected` of them. Dropping the set aborts its tasks.
async fn barrier(mut tasks: JoinSet<()>, expected: usize) -> Result<usize> {
    let spawned = tasks.len();
    if spawned != expected {
        error!(expected, spawned, "per-cell fan-out does not cover the interior");
        return Err(LifeError::AccountingMismatch { expected, reported: spawned });
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        joined?;
        completed += 1;
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::sequential;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn matches_sequential_scan() {
        let reference = GridState::new(24, 17);
        let parallel = Arc::new(GridState::new(24, 17));
        reference.seed(0.4, &mut StdRng::seed_from_u64(11));
        parallel.seed(0.4, &mut StdRng::seed_from_u64(11));

        for generation in 1..=5 {
            sequential::advance(&reference);
            let computed = advance(&parallel).await.unwrap();
            assert_eq!(computed, 22 * 15);
            assert_eq!(parallel.snapshot(generation), reference.snapshot(generation));
        }
    }

    #[tokio::test]
    async fn smallest_grid_has_one_task() {
        let grid = Arc::new(GridState::new(3, 3));
        grid.set_current(1, 1, true);
        assert_eq!(advance(&grid).await.unwrap(), 1);
        assert!(!grid.cell_at(1, 1), "lonely cell starves");
    }

    #[tokio::test]
    async fn short_fan_out_is_refused() {
        let grid = Arc::new(GridState::new(4, 4));
        let mut tasks = JoinSet::new();
        for y in grid.interior_rows() {
            let grid = Arc::clone(&grid);
            tasks.spawn(async move { rule::compute_cell(&grid, 1, y) });
        }

        let err = barrier(tasks, grid.interior_cells()).await.unwrap_err();
        assert!(matches!(err, LifeError::AccountingMismatch { expected: 4, reported: 2 }));
    }

    #[tokio::test]
    async fn failed_task_fails_the_barrier() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async {});
        tasks.spawn(async { panic!("cell task died") });

        let err = barrier(tasks, 2).await.unwrap_err();
        assert!(matches!(err, LifeError::TaskFailed(_)));
    }

    #[tokio::test]
    async fn thin_grids_spawn_one_task_per_cell() {
        for (w, h) in [(3, 9), (9, 3), (5, 4)] {
            let grid = Arc::new(GridState::new(w, h));
            assert_eq!(advance(&grid).await.unwrap(), (w - 2) * (h - 2));
        }
    }
}
