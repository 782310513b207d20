//! Playing field: the query/mutate contract the engine consumes
//! (`FieldSurface`) and the grid implementation used by the game.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::heights::ColumnHeights;
use crate::piece::MAX_GRID_SIZE;
use crate::Position;

/// Identifies which landed piece filled a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl PieceId {
    /// Reserved for hypothetical landings made while scoring.
    pub const PROBE: PieceId = PieceId(u32::MAX);
}

/// Row indices marked as filled by one landing (a piece spans at most
/// `MAX_GRID_SIZE` rows).
pub type FilledRows = SmallVec<[i32; MAX_GRID_SIZE]>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilledRowsMark {
    pub rows: FilledRows,
    /// Cells of the landed piece lying in those rows.
    pub piece_cells: i32,
}

/// What the search, scoring and state machine need from a field.
/// Cell offsets are `(col, row)` relative to `position`.
pub trait FieldSurface {
    fn num_columns(&self) -> i32;
    fn num_rows(&self) -> i32;
    fn lowest_visible_row(&self) -> i32;
    fn num_visible_rows(&self) -> i32;

    /// Walls, floor, ceiling or a filled cell.
    fn check_collision(&self, cells: &[(i32, i32)], position: Position) -> bool;

    /// Lowest row reachable by moving straight down from a free `position`.
    fn detect_collision_down(&self, cells: &[(i32, i32)], position: Position) -> i32 {
        let mut y = position.y;
        while !self.check_collision(cells, Position::new(position.x, y - 1)) {
            y -= 1;
        }
        y
    }

    /// Leftmost column reachable by sliding left from a free `position`.
    fn detect_collision_left(&self, cells: &[(i32, i32)], position: Position) -> i32 {
        let mut x = position.x;
        while !self.check_collision(cells, Position::new(x - 1, position.y)) {
            x -= 1;
        }
        x
    }

    /// Rightmost column reachable by sliding right from a free `position`.
    fn detect_collision_right(&self, cells: &[(i32, i32)], position: Position) -> i32 {
        let mut x = position.x;
        while !self.check_collision(cells, Position::new(x + 1, position.y)) {
            x += 1;
        }
        x
    }

    /// Highest row reachable by moving straight up from a free `position`.
    fn detect_collision_up(&self, cells: &[(i32, i32)], position: Position) -> i32 {
        let mut y = position.y;
        while !self.check_collision(cells, Position::new(position.x, y + 1)) {
            y += 1;
        }
        y
    }

    fn land_piece_blocks(&mut self, cells: &[(i32, i32)], id: PieceId, position: Position);

    /// Empties exactly the cells `land_piece_blocks` filled with `id`.
    fn remove_piece(&mut self, cells: &[(i32, i32)], id: PieceId, position: Position);

    fn mark_filled_rows_and_count_piece_cells_in_filled_rows(
        &mut self,
        cells: &[(i32, i32)],
        position: Position,
    ) -> FilledRowsMark;

    fn unmark_filled_rows(&mut self, rows: &[i32]);

    // Metrics below cover visible rows only. Marked rows are left out and
    // the rows above them count as already dropped onto what lies below.

    fn buried_holes_area(&self) -> i32;
    fn wells_area(&self) -> i32;
    fn column_height_transitions(&self) -> i32;
    fn piece_cells_matching_blueprint(&self, cells: &[(i32, i32)], position: Position) -> i32;
    fn build_holes_area(&self) -> i32;
    fn build_wells_area(&self) -> i32;
}

/// Pattern of cells a build level asks the player to fill.
/// Row 0 is the lowest visible row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blueprint {
    columns: usize,
    rows: usize,
    slots: Vec<bool>,
}

impl Blueprint {
    /// Rows listed top row first; `.` is open, anything else a slot.
    /// `None` when the rows are not all the same width.
    pub fn parse(rows: &[String]) -> Option<Self> {
        let columns = rows.first().map_or(0, |row| row.chars().count());
        let height = rows.len();
        let mut slots = vec![false; columns * height];
        for (line, text) in rows.iter().enumerate() {
            if text.chars().count() != columns {
                return None;
            }
            let y = height - 1 - line;
            for (x, ch) in text.chars().enumerate() {
                slots[y * columns + x] = ch != '.' && ch != ' ';
            }
        }
        Some(Self {
            columns,
            rows: height,
            slots,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn is_slot(&self, x: i32, row: i32) -> bool {
        x >= 0
            && row >= 0
            && (x as usize) < self.columns
            && (row as usize) < self.rows
            && self.slots[row as usize * self.columns + x as usize]
    }
}

/// Reused buffers for grouping cells when loose pieces fall.
#[derive(Clone, Debug, Default)]
struct GroupScratch {
    labels: Vec<u32>,
    cells: Vec<usize>,
    ranges: Vec<(usize, usize)>,
    stack: Vec<usize>,
}

const NO_GROUP: u32 = u32::MAX;

/// `columns × rows` grid, row 0 at the bottom. Rows above the visible window
/// are the spawn area.
#[derive(Clone, Debug)]
pub struct Field {
    columns: usize,
    rows: usize,
    lowest_visible_row: usize,
    visible_rows: usize,
    cells: Vec<Option<PieceId>>,
    marked_rows: Vec<bool>,
    blueprint: Option<Blueprint>,
    scratch: GroupScratch,
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
            && self.rows == other.rows
            && self.lowest_visible_row == other.lowest_visible_row
            && self.visible_rows == other.visible_rows
            && self.cells == other.cells
            && self.marked_rows == other.marked_rows
            && self.blueprint == other.blueprint
    }
}

impl Eq for Field {}

impl Field {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            lowest_visible_row: 0,
            visible_rows: rows,
            cells: vec![None; columns * rows],
            marked_rows: vec![false; rows],
            blueprint: None,
            scratch: GroupScratch::default(),
        }
    }

    /// Test fixture: rows top row first, `.` empty, each other character a
    /// piece id (equal characters belong to the same piece).
    pub fn from_rows(rows: &[&str]) -> Self {
        let columns = rows.first().map_or(0, |row| row.chars().count());
        let mut field = Self::new(columns, rows.len());
        let height = rows.len();
        for (line, text) in rows.iter().enumerate() {
            let y = height - 1 - line;
            for (x, ch) in text.chars().enumerate().take(columns) {
                if ch != '.' {
                    field.set(x, y, Some(PieceId(ch as u32)));
                }
            }
        }
        field
    }

    pub fn set_visible_rows(&mut self, lowest: usize, count: usize) {
        self.lowest_visible_row = lowest.min(self.rows);
        self.visible_rows = count.min(self.rows - self.lowest_visible_row);
    }

    pub fn set_blueprint(&mut self, blueprint: Option<Blueprint>) {
        self.blueprint = blueprint;
    }

    pub fn blueprint(&self) -> Option<&Blueprint> {
        self.blueprint.as_ref()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.columns + x
    }

    #[inline(always)]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.columns && (y as usize) < self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<PieceId> {
        self.cells[self.index(x, y)]
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)].is_some()
    }

    pub fn set(&mut self, x: usize, y: usize, value: Option<PieceId>) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        (0..self.columns).all(|x| self.is_filled(x, y))
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        (0..self.columns).all(|x| !self.is_filled(x, y))
    }

    pub fn filled_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_row_marked(&self, y: usize) -> bool {
        self.marked_rows[y]
    }

    /// Filled and not in a row already marked for clearing.
    #[inline(always)]
    fn is_solid(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y)
            && !self.marked_rows[y as usize]
            && self.cells[self.index(x as usize, y as usize)].is_some()
    }

    fn visible_range(&self) -> (i32, i32) {
        let lowest = self.lowest_visible_row as i32;
        (lowest, lowest + self.visible_rows as i32)
    }

    /// Visible rows not marked as filled, bottom first.
    fn counted_rows(&self) -> SmallVec<[i32; 32]> {
        let (lowest, top) = self.visible_range();
        (lowest..top).filter(|&y| !self.marked_rows[y as usize]).collect()
    }

    fn column_heights(&self, rows: &[i32]) -> ColumnHeights {
        ColumnHeights::measure(self.columns, rows, |x, y| self.is_solid(x, y))
    }

    /// Removes every full row without shifting anything; loose pieces are
    /// pulled down separately. Returns the number of rows removed.
    pub fn clear_filled_rows(&mut self) -> usize {
        let mut cleared = 0;
        for y in 0..self.rows {
            if self.is_row_full(y) {
                self.clear_row(y);
                cleared += 1;
            }
        }
        self.marked_rows.iter_mut().for_each(|marked| *marked = false);
        cleared
    }

    pub fn clear_row(&mut self, y: usize) {
        let start = self.index(0, y);
        self.cells[start..start + self.columns]
            .iter_mut()
            .for_each(|cell| *cell = None);
    }

    /// Empties the square of the given radius around `(x, y)`.
    /// Returns how many filled cells were removed.
    pub fn explode_area(&mut self, x: i32, y: i32, radius: i32) -> usize {
        let mut removed = 0;
        for cy in y - radius..=y + radius {
            for cx in x - radius..=x + radius {
                if self.in_bounds(cx, cy) {
                    let idx = self.index(cx as usize, cy as usize);
                    if self.cells[idx].take().is_some() {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }

    /// Lets every unsupported piece fragment fall as a rigid body until it
    /// rests on the floor or on a supported fragment. Fragments are
    /// 4-connected cells of the same piece. Returns whether anything moved.
    pub fn pull_down_loose_pieces(&mut self) -> bool {
        self.label_groups();
        let mut moved_any = false;
        loop {
            let mut moved = false;
            for group in 0..self.scratch.ranges.len() {
                if self.group_can_drop(group) {
                    self.drop_group(group);
                    moved = true;
                }
            }
            if !moved {
                break;
            }
            moved_any = true;
        }
        moved_any
    }

    fn label_groups(&mut self) {
        let total = self.cells.len();
        let scratch = &mut self.scratch;
        scratch.labels.clear();
        scratch.labels.resize(total, NO_GROUP);
        scratch.cells.clear();
        scratch.ranges.clear();

        for start in 0..total {
            let Some(id) = self.cells[start] else {
                continue;
            };
            if scratch.labels[start] != NO_GROUP {
                continue;
            }
            let label = scratch.ranges.len() as u32;
            let first = scratch.cells.len();
            scratch.labels[start] = label;
            scratch.stack.clear();
            scratch.stack.push(start);
            while let Some(idx) = scratch.stack.pop() {
                scratch.cells.push(idx);
                let x = idx % self.columns;
                let y = idx / self.columns;
                let mut visit = |n: usize| {
                    if scratch.labels[n] == NO_GROUP && self.cells[n] == Some(id) {
                        scratch.labels[n] = label;
                        scratch.stack.push(n);
                    }
                };
                if x > 0 {
                    visit(idx - 1);
                }
                if x + 1 < self.columns {
                    visit(idx + 1);
                }
                if y > 0 {
                    visit(idx - self.columns);
                }
                if y + 1 < self.rows {
                    visit(idx + self.columns);
                }
            }
            scratch.ranges.push((first, scratch.cells.len()));
        }
    }

    fn group_can_drop(&self, group: usize) -> bool {
        let (start, end) = self.scratch.ranges[group];
        self.scratch.cells[start..end].iter().all(|&idx| {
            if idx < self.columns {
                return false;
            }
            let below = idx - self.columns;
            self.cells[below].is_none() || self.scratch.labels[below] == group as u32
        })
    }

    fn drop_group(&mut self, group: usize) {
        let (start, end) = self.scratch.ranges[group];
        let Some(id) = self.cells[self.scratch.cells[start]] else {
            return;
        };
        for i in start..end {
            let idx = self.scratch.cells[i];
            self.cells[idx] = None;
            self.scratch.labels[idx] = NO_GROUP;
        }
        for i in start..end {
            let idx = self.scratch.cells[i] - self.columns;
            self.cells[idx] = Some(id);
            self.scratch.labels[idx] = group as u32;
            self.scratch.cells[i] = idx;
        }
    }

    /// Hash of the occupancy and of how cells join into fragments.
    /// Two fields with equal hashes behave the same under gravity.
    pub fn layout_hash(&self) -> u64 {
        let mut hash = 0u64;
        for y in 0..self.rows {
            for x in 0..self.columns {
                let Some(id) = self.get(x, y) else {
                    continue;
                };
                let base = (self.index(x, y) as u64) * 3;
                hash ^= zobrist_key(base);
                if x + 1 < self.columns && self.get(x + 1, y) == Some(id) {
                    hash ^= zobrist_key(base + 1);
                }
                if y + 1 < self.rows && self.get(x, y + 1) == Some(id) {
                    hash ^= zobrist_key(base + 2);
                }
            }
        }
        hash
    }
}

/// splitmix64 of a cell feature index, fixed seed so hashes are stable.
#[inline]
fn zobrist_key(feature: u64) -> u64 {
    let mut z = feature.wrapping_add(0xdeadbeefcafe1234).wrapping_mul(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

impl FieldSurface for Field {
    fn num_columns(&self) -> i32 {
        self.columns as i32
    }

    fn num_rows(&self) -> i32 {
        self.rows as i32
    }

    fn lowest_visible_row(&self) -> i32 {
        self.lowest_visible_row as i32
    }

    fn num_visible_rows(&self) -> i32 {
        self.visible_rows as i32
    }

    #[inline]
    fn check_collision(&self, cells: &[(i32, i32)], position: Position) -> bool {
        cells.iter().any(|&(dx, dy)| {
            let x = position.x + dx;
            let y = position.y + dy;
            !self.in_bounds(x, y) || self.cells[self.index(x as usize, y as usize)].is_some()
        })
    }

    fn land_piece_blocks(&mut self, cells: &[(i32, i32)], id: PieceId, position: Position) {
        for &(dx, dy) in cells {
            let (x, y) = (position.x + dx, position.y + dy);
            if self.in_bounds(x, y) {
                let idx = self.index(x as usize, y as usize);
                self.cells[idx] = Some(id);
            }
        }
    }

    fn remove_piece(&mut self, cells: &[(i32, i32)], id: PieceId, position: Position) {
        for &(dx, dy) in cells {
            let (x, y) = (position.x + dx, position.y + dy);
            if self.in_bounds(x, y) {
                let idx = self.index(x as usize, y as usize);
                if self.cells[idx] == Some(id) {
                    self.cells[idx] = None;
                }
            }
        }
    }

    fn mark_filled_rows_and_count_piece_cells_in_filled_rows(
        &mut self,
        cells: &[(i32, i32)],
        position: Position,
    ) -> FilledRowsMark {
        let mut mark = FilledRowsMark::default();
        for &(_, dy) in cells {
            let y = position.y + dy;
            if y < 0 || y as usize >= self.rows || mark.rows.contains(&y) {
                continue;
            }
            if self.is_row_full(y as usize) {
                self.marked_rows[y as usize] = true;
                mark.rows.push(y);
            }
        }
        mark.piece_cells = cells
            .iter()
            .filter(|&&(_, dy)| mark.rows.contains(&(position.y + dy)))
            .count() as i32;
        mark
    }

    fn unmark_filled_rows(&mut self, rows: &[i32]) {
        for &y in rows {
            if y >= 0 && (y as usize) < self.rows {
                self.marked_rows[y as usize] = false;
            }
        }
    }

    fn buried_holes_area(&self) -> i32 {
        let (lowest, top) = self.visible_range();
        let mut holes = 0;
        for x in 0..self.columns as i32 {
            let mut covered = false;
            for y in (lowest..top).rev() {
                if self.marked_rows[y as usize] {
                    continue;
                }
                if self.is_solid(x, y) {
                    covered = true;
                } else if covered {
                    holes += 1;
                }
            }
        }
        holes
    }

    fn wells_area(&self) -> i32 {
        let heights = self.column_heights(&self.counted_rows());
        (0..heights.len()).map(|x| heights.well_depth(x)).sum()
    }

    fn column_height_transitions(&self) -> i32 {
        let (lowest, top) = self.visible_range();
        let mut transitions = 0;
        for x in 0..self.columns as i32 {
            let mut previous = true;
            for y in lowest..top {
                if self.marked_rows[y as usize] {
                    continue;
                }
                let current = self.is_solid(x, y);
                if current != previous {
                    transitions += 1;
                }
                previous = current;
            }
        }
        transitions
    }

    fn piece_cells_matching_blueprint(&self, cells: &[(i32, i32)], position: Position) -> i32 {
        let Some(blueprint) = &self.blueprint else {
            return 0;
        };
        let (lowest, top) = self.visible_range();
        cells
            .iter()
            .map(|&(dx, dy)| (position.x + dx, position.y + dy))
            .filter(|&(x, y)| y >= lowest && y < top && blueprint.is_slot(x, y - lowest))
            .count() as i32
    }

    fn build_holes_area(&self) -> i32 {
        let Some(blueprint) = &self.blueprint else {
            return 0;
        };
        let (lowest, top) = self.visible_range();
        let mut holes = 0;
        for x in 0..self.columns as i32 {
            let mut covered = false;
            for y in (lowest..top).rev() {
                if self.marked_rows[y as usize] {
                    continue;
                }
                if self.is_solid(x, y) {
                    covered = true;
                } else if covered && blueprint.is_slot(x, y - lowest) {
                    holes += 1;
                }
            }
        }
        holes
    }

    fn build_wells_area(&self) -> i32 {
        let Some(blueprint) = &self.blueprint else {
            return 0;
        };
        let lowest = self.lowest_visible_row as i32;
        let rows = self.counted_rows();
        let heights = self.column_heights(&rows);
        let mut area = 0;
        for x in 0..heights.len() {
            let base = heights.height(x) as usize;
            let depth = heights.well_depth(x) as usize;
            area += rows[base..base + depth]
                .iter()
                .filter(|&&y| blueprint.is_slot(x as i32, y - lowest))
                .count() as i32;
        }
        area
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.rows).rev() {
            for x in 0..self.columns {
                write!(f, "{}", if self.is_filled(x, y) { "[]" } else { " ." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
