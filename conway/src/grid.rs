// grid.rs - Double-buffered grid state for Conway's Game of Life
//
// Cells are stored column-major (index = x * height + y) so one column of
// the interior is a contiguous run, which is the unit of work of the pool.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::Rng;

pub const BORDER: usize = 1;          // Dead halo on every side
pub const MIN_SIDE: usize = 2 * BORDER + 1; // Smallest side leaving an interior

/// One full W x H buffer. Atomic cells let many tasks write disjoint
/// coordinates of the same buffer without a lock.
struct Buffer {
    cells: Box<[AtomicBool]>,
}

impl Buffer {
    fn dead(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        self.cells[index].load(Ordering::Relaxed)
    }

    #[inline]
    fn set(&self, index: usize, alive: bool) {
        self.cells[index].store(alive, Ordering::Relaxed)
    }
}

/// The `current` and `next` buffers plus the swap between them.
///
/// `current` is only read while a generation is computed and `next` is only
/// written, each interior coordinate by exactly one task. Generations are
/// ordered by whatever ends them (a join, a channel) together with the
/// release/acquire on `front`.
pub struct GridState {
    width: usize,
    height: usize,
    buffers: [Buffer; 2],
    front: AtomicUsize, // Which of `buffers` is `current`
}

impl GridState {
    /// Both buffers start fully dead. Dimensions are validated by `LifeConfig`.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width >= MIN_SIDE && height >= MIN_SIDE,
            "grid {width}x{height} has no interior"
        );
        let len = width * height;
        Self {
            width,
            height,
            buffers: [Buffer::dead(len), Buffer::dead(len)],
            front: AtomicUsize::new(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Interior column indices, `1..W-1`.
    pub fn interior_columns(&self) -> Range<usize> {
        BORDER..self.width - BORDER
    }

    /// Interior row indices, `1..H-1`.
    pub fn interior_rows(&self) -> Range<usize> {
        BORDER..self.height - BORDER
    }

    /// `(W-2) * (H-2)`: the number of cells every generation must compute.
    pub fn interior_cells(&self) -> usize {
        self.interior_columns().len() * self.interior_rows().len()
    }

    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        self.interior_columns().contains(&x) && self.interior_rows().contains(&y)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        x * self.height + y
    }

    #[inline]
    fn current(&self) -> &Buffer {
        &self.buffers[self.front.load(Ordering::Acquire)]
    }

    #[inline]
    fn next(&self) -> &Buffer {
        &self.buffers[self.front.load(Ordering::Acquire) ^ 1]
    }

    /// Reads one cell of `current`. Panics outside `[0, W) x [0, H)`.
    #[inline]
    pub fn cell_at(&self, x: usize, y: usize) -> bool {
        self.current().get(self.index(x, y))
    }

    /// Writes one cell of `next`. Only interior coordinates are legal; a
    /// border or out-of-range write is a bug in the caller and panics.
    #[inline]
    pub fn set_next(&self, x: usize, y: usize, alive: bool) {
        assert!(
            self.is_interior(x, y),
            "set_next on non-interior cell ({x}, {y}) of {}x{} grid",
            self.width,
            self.height
        );
        self.next().set(x * self.height + y, alive);
    }

    /// Makes `next` the new `current`. The old `current` becomes the buffer
    /// the following generation writes into. Callers must have written every
    /// interior cell of `next` first.
    pub fn commit(&self) {
        self.front.fetch_xor(1, Ordering::AcqRel);
    }

    // Edits of `current` below are only legal between generations.

    /// Overwrites one interior cell of `current`.
    pub fn set_current(&self, x: usize, y: usize, alive: bool) {
        assert!(
            self.is_interior(x, y),
            "set_current on non-interior cell ({x}, {y})"
        );
        self.current().set(x * self.height + y, alive);
    }

    /// Kills every interior cell of `current`.
    pub fn clear(&self) {
        for x in self.interior_columns() {
            for y in self.interior_rows() {
                self.set_current(x, y, false);
            }
        }
    }

    /// Each interior cell of `current` independently alive with `probability`.
    pub fn seed<R: Rng>(&self, probability: f64, rng: &mut R) {
        for x in self.interior_columns() {
            for y in self.interior_rows() {
                self.set_current(x, y, rng.gen_bool(probability));
            }
        }
    }

    /// Owned copy of `current`, tagged with the generation it represents.
    pub fn snapshot(&self, generation: u64) -> Snapshot {
        let current = self.current();
        let cells = (0..self.width * self.height).map(|i| current.get(i)).collect();
        Snapshot {
            width: self.width,
            height: self.height,
            generation,
            cells,
        }
    }
}

impl std::fmt::Debug for GridState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridState")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("front", &self.front.load(Ordering::Relaxed))
            .finish()
    }
}

/// Read-only view of one committed generation, handed to renderers.
#[derive(Debug, Clone)]
pub struct Snapshot {
    width: usize,
    height: usize,
    generation: u64,
    cells: Vec<bool>,
}

impl Snapshot {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) outside snapshot");
        self.cells[x * self.height + y]
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Live cells as `(x, y)`, ordered by column then row.
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(|(i, _)| (i / self.height, i % self.height))
            .collect()
    }

    pub fn border_is_dead(&self) -> bool {
        let (w, h) = (self.width, self.height);
        (0..w).all(|x| !self.get(x, 0) && !self.get(x, h - 1))
            && (0..h).all(|y| !self.get(0, y) && !self.get(w - 1, y))
    }

    pub fn hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.cells.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl Eq for Snapshot {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn starts_dead_with_expected_interior() {
        let grid = GridState::new(6, 4);
        assert_eq!(grid.interior_columns(), 1..5);
        assert_eq!(grid.interior_rows(), 1..3);
        assert_eq!(grid.interior_cells(), 8);
        assert_eq!(grid.snapshot(0).population(), 0);
    }

    #[test]
    fn commit_swaps_and_reuses_buffers() {
        let grid = GridState::new(3, 3);
        grid.set_next(1, 1, true);
        assert!(!grid.cell_at(1, 1));

        grid.commit();
        assert!(grid.cell_at(1, 1));

        // The old `current` is now the write target
        grid.set_next(1, 1, false);
        assert!(grid.cell_at(1, 1));
        grid.commit();
        assert!(!grid.cell_at(1, 1));
    }

    #[test]
    #[should_panic(expected = "non-interior")]
    fn set_next_rejects_border() {
        GridState::new(5, 5).set_next(0, 2, true);
    }

    #[test]
    #[should_panic(expected = "non-interior")]
    fn set_next_rejects_out_of_range() {
        GridState::new(5, 5).set_next(7, 2, true);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn cell_at_rejects_out_of_range() {
        GridState::new(5, 5).cell_at(5, 0);
    }

    #[test]
    fn seeding_never_touches_border() {
        let grid = GridState::new(16, 9);
        grid.seed(1.0, &mut StdRng::seed_from_u64(7));
        let snapshot = grid.snapshot(0);
        assert!(snapshot.border_is_dead());
        assert_eq!(snapshot.population(), grid.interior_cells());

        grid.clear();
        assert_eq!(grid.snapshot(0).population(), 0);
    }

    #[test]
    fn snapshot_equality_ignores_generation() {
        let grid = GridState::new(4, 4);
        grid.set_current(2, 1, true);
        let a = grid.snapshot(3);
        let b = grid.snapshot(9);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.alive_cells(), vec![(2, 1)]);
    }
}
