//! Per-search memo: visited flags, found moves and cached collision
//! boundaries for every (x, y, rotation) the piece can occupy.

use blocks_core::{Placement, MAX_GRID_SIZE};

/// Cells of margin around the field so piece grids can hang past the walls.
pub const GRID_MARGIN: i32 = MAX_GRID_SIZE as i32;

/// Rotations tracked per cell.
pub const MAX_ROTATIONS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchDataForOneRotation {
    generation: u32,
    pub visited: bool,
    /// Index into the `ValidMoves` of the current search.
    pub found_move: Option<usize>,
    /// Leftmost column reachable by sliding left.
    pub left: Option<i32>,
    /// Rightmost column reachable by sliding right.
    pub right: Option<i32>,
    /// Row the piece comes to rest on when dropped.
    pub down: Option<i32>,
}

/// Allocated once, cleared by bumping the generation.
#[derive(Clone, Debug, Default)]
pub struct SearchGrid {
    columns: i32,
    rows: i32,
    width: usize,
    records: Vec<[SearchDataForOneRotation; MAX_ROTATIONS]>,
    generation: u32,
}

impl SearchGrid {
    pub fn new(columns: i32, rows: i32) -> Self {
        let mut grid = Self::default();
        grid.resize(columns, rows);
        grid
    }

    fn resize(&mut self, columns: i32, rows: i32) {
        self.columns = columns;
        self.rows = rows;
        self.width = (columns + 2 * GRID_MARGIN).max(0) as usize;
        let height = (rows + 2 * GRID_MARGIN).max(0) as usize;
        self.records = vec![[SearchDataForOneRotation::default(); MAX_ROTATIONS]; self.width * height];
        self.generation = 0;
    }

    /// Invalidates every record; resizes when the field size changed.
    pub fn begin_search(&mut self, columns: i32, rows: i32) {
        if columns != self.columns || rows != self.rows {
            self.resize(columns, rows);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale stamps could now look current.
            for cell in &mut self.records {
                *cell = [SearchDataForOneRotation::default(); MAX_ROTATIONS];
            }
            self.generation = 1;
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let gx = x + GRID_MARGIN;
        let gy = y + GRID_MARGIN;
        if gx < 0 || gy < 0 || gx as usize >= self.width || gy >= self.rows + 2 * GRID_MARGIN {
            return None;
        }
        Some(gy as usize * self.width + gx as usize)
    }

    /// Current-generation record, if the placement lies on the grid.
    pub fn get(&self, x: i32, y: i32, rotation: usize) -> Option<&SearchDataForOneRotation> {
        let idx = self.index(x, y)?;
        let record = self.records[idx].get(rotation)?;
        (record.generation == self.generation).then_some(record)
    }

    /// Record for writing, reset first if it belongs to an older search.
    pub fn get_mut(&mut self, x: i32, y: i32, rotation: usize) -> Option<&mut SearchDataForOneRotation> {
        let idx = self.index(x, y)?;
        let generation = self.generation;
        let record = self.records[idx].get_mut(rotation)?;
        if record.generation != generation {
            *record = SearchDataForOneRotation {
                generation,
                ..SearchDataForOneRotation::default()
            };
        }
        Some(record)
    }

    pub fn at(&self, placement: Placement) -> Option<&SearchDataForOneRotation> {
        self.get(
            placement.position.x,
            placement.position.y,
            placement.rotation.index(),
        )
    }

    pub fn at_mut(&mut self, placement: Placement) -> Option<&mut SearchDataForOneRotation> {
        self.get_mut(
            placement.position.x,
            placement.position.y,
            placement.rotation.index(),
        )
    }

    pub fn is_visited(&self, placement: Placement) -> bool {
        self.at(placement).is_some_and(|record| record.visited)
    }

    pub fn found_move(&self, placement: Placement) -> Option<usize> {
        self.at(placement).and_then(|record| record.found_move)
    }
}
