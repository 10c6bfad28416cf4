// rule.rs - The B3/S23 transition shared by every update strategy

use crate::grid::GridState;

/// Moore neighborhood as (dx, dy) offsets.
#[rustfmt::skip]
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Next state of a cell given its state and live-neighbor count.
#[inline]
pub fn transition(alive: bool, neighbors: u8) -> bool {
    if !alive && neighbors == 3 {
        true // Birth
    } else if neighbors > 3 || neighbors < 2 {
        false // Overpopulation or starvation
    } else {
        alive // Survival, or stays dead
    }
}

/// Live cells around interior cell `(x, y)` in `current`.
#[inline]
pub fn live_neighbors(grid: &GridState, x: usize, y: usize) -> u8 {
    NEIGHBORS
        .iter()
        .filter(|&&(dx, dy)| grid.cell_at(x.wrapping_add_signed(dx), y.wrapping_add_signed(dy)))
        .count() as u8
}

/// Pure: reads only `current`.
#[inline]
pub fn next_value(grid: &GridState, x: usize, y: usize) -> bool {
    transition(grid.cell_at(x, y), live_neighbors(grid, x, y))
}

/// Computes one interior cell into `next`.
#[inline]
pub fn compute_cell(grid: &GridState, x: usize, y: usize) {
    grid.set_next(x, y, next_value(grid, x, y));
}

/// Computes every interior row of column `x` into `next` and returns how
/// many cells that was.
pub fn compute_column(grid: &GridState, x: usize) -> usize {
    let rows = grid.interior_rows();
    let count = rows.len();
    for y in rows {
        compute_cell(grid, x, y);
    }
    count
}
