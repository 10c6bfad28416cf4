// sequential.rs - Single-threaded full-grid scan

use crate::grid::GridState;
use crate::rule;

/// Visits every interior cell once in row-major order, then commits.
/// Returns the number of cells computed.
pub fn advance(grid: &GridState) -> usize {
    let mut computed = 0;
    for y in grid.interior_rows() {
        for x in grid.interior_columns() {
            rule::compute_cell(grid, x, y);
            computed += 1;
        }
    }
    grid.commit();
    computed
}
