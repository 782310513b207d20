//! Reachable-placement search.
//!
//! Every state first drops straight down (the spine), marking each state on
//! the way; sideways and rotational branches are then explored from every
//! spine state, top to bottom, depth first. Slides and drops are answered
//! from boundaries cached in the `SearchGrid`, so a row or column is asked
//! of the field once per search.

use blocks_core::{FieldSurface, PieceType, Placement, Step};

use crate::collision::{collides, MovingPiece};
use crate::movement::MovementHandle;
use crate::search_grid::{SearchGrid, MAX_ROTATIONS};
use crate::valid_moves::{Move, ValidMoves};

#[derive(Clone, Copy, Debug)]
struct SpineEntry {
    placement: Placement,
    node: MovementHandle,
}

/// A spine under exploration: `spine[start..end]`, branching from `cursor`.
#[derive(Clone, Copy, Debug)]
struct Frame {
    start: usize,
    end: usize,
    cursor: usize,
    next_branch: usize,
}

/// Search state reused across calls; nothing is allocated per search once
/// the buffers have grown to the field size.
#[derive(Clone, Debug, Default)]
pub struct ValidMovesSearch {
    grid: SearchGrid,
    spine: Vec<SpineEntry>,
    frames: Vec<Frame>,
    result: ValidMoves,
}

impl ValidMovesSearch {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            grid: SearchGrid::new(columns as i32, rows as i32),
            spine: Vec::with_capacity(columns * rows),
            frames: Vec::with_capacity(columns * rows),
            result: ValidMoves::for_field(columns, rows),
        }
    }

    pub fn for_field(field: &impl FieldSurface) -> Self {
        Self::new(field.num_columns() as usize, field.num_rows() as usize)
    }

    /// Every landing placement reachable from `piece`, each with one path.
    /// A `predetermined` placement is always part of the result.
    /// Empty when the piece already overlaps the field.
    pub fn find_valid_moves(
        &mut self,
        field: &impl FieldSurface,
        piece: MovingPiece<'_>,
        predetermined: Option<Placement>,
    ) -> &ValidMoves {
        let columns = field.num_columns().max(0) as usize;
        let rows = field.num_rows().max(0) as usize;
        if self.result.capacity() < columns * rows * MAX_ROTATIONS {
            self.result = ValidMoves::for_field(columns, rows);
        }
        self.grid.begin_search(columns as i32, rows as i32);
        self.result.clear();
        self.frames.clear();
        self.spine.clear();

        if collides(field, piece.piece, piece.placement) {
            return &self.result;
        }

        self.push_spine(field, piece.piece, piece.placement, None);
        self.explore(field, piece.piece);
        self.add_predetermined(predetermined);
        &self.result
    }

    pub fn result(&self) -> &ValidMoves {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut ValidMoves {
        &mut self.result
    }

    /// Index of the move covering `placement` in the last search, including
    /// placements merged into a duplicate.
    pub fn found_move(&self, placement: Placement) -> Option<usize> {
        self.grid.found_move(placement)
    }

    pub fn is_visited(&self, placement: Placement) -> bool {
        self.grid.is_visited(placement)
    }

    fn explore(&mut self, field: &impl FieldSurface, piece: &PieceType) {
        while let Some(frame) = self.frames.last_mut() {
            if frame.cursor == frame.end {
                let start = frame.start;
                self.frames.pop();
                self.spine.truncate(start);
                continue;
            }
            if frame.next_branch == Step::BRANCHES.len() {
                frame.cursor += 1;
                frame.next_branch = 0;
                continue;
            }
            let step = Step::BRANCHES[frame.next_branch];
            frame.next_branch += 1;
            let origin = self.spine[frame.cursor];

            if let Some(target) = self.try_branch(field, piece, origin.placement, step) {
                if !self.grid.is_visited(target) {
                    self.push_spine(field, piece, target, Some(origin.node));
                }
            }
        }
    }

    /// Drops from `top` until the floor or an already visited state and
    /// pushes the spine as a new frame. `top` must be free and unvisited.
    fn push_spine(
        &mut self,
        field: &impl FieldSurface,
        piece: &PieceType,
        top: Placement,
        parent: Option<MovementHandle>,
    ) {
        let rotations = piece.num_rotations();
        let floor = self.down_boundary(field, piece, top);
        let start = self.spine.len();
        let mut parent = parent;
        let mut placement = top;
        loop {
            if let Some(record) = self.grid.at_mut(placement) {
                record.visited = true;
            }
            let node = self
                .result
                .arena_mut()
                .add_movement_and_remove_detour(placement, parent, rotations);
            self.spine.push(SpineEntry { placement, node });

            if placement.position.y == floor {
                self.save_move(piece, placement, node);
                break;
            }
            let next = Step::Down.apply(placement, rotations);
            if self.grid.is_visited(next) {
                break;
            }
            parent = Some(node);
            placement = next;
        }
        self.frames.push(Frame {
            start,
            end: self.spine.len(),
            cursor: start,
            next_branch: 0,
        });
    }

    fn try_branch(
        &mut self,
        field: &impl FieldSurface,
        piece: &PieceType,
        from: Placement,
        step: Step,
    ) -> Option<Placement> {
        let rotations = piece.num_rotations();
        let target = step.apply(from, rotations);
        let open = match step {
            Step::Left => self.left_boundary(field, piece, from) < from.position.x,
            Step::Right => self.right_boundary(field, piece, from) > from.position.x,
            Step::Down => self.down_boundary(field, piece, from) < from.position.y,
            Step::RotateClockwise | Step::RotateAntiClockwise => {
                // With two rotations both directions lead to the same state.
                let redundant = step == Step::RotateAntiClockwise && rotations == 2;
                piece.has_rotation_moves() && !redundant && !collides(field, piece, target)
            }
        };
        open.then_some(target)
    }

    fn left_boundary(&mut self, field: &impl FieldSurface, piece: &PieceType, at: Placement) -> i32 {
        if let Some(cached) = self.grid.at(at).and_then(|record| record.left) {
            return cached;
        }
        let (x, y, rotation) = (at.position.x, at.position.y, at.rotation.index());
        let boundary = field.detect_collision_left(piece.cells(at.rotation), at.position);
        for cx in boundary..=x {
            if let Some(record) = self.grid.get_mut(cx, y, rotation) {
                record.left = Some(boundary);
            }
        }
        boundary
    }

    fn right_boundary(&mut self, field: &impl FieldSurface, piece: &PieceType, at: Placement) -> i32 {
        if let Some(cached) = self.grid.at(at).and_then(|record| record.right) {
            return cached;
        }
        let (x, y, rotation) = (at.position.x, at.position.y, at.rotation.index());
        let boundary = field.detect_collision_right(piece.cells(at.rotation), at.position);
        for cx in x..=boundary {
            if let Some(record) = self.grid.get_mut(cx, y, rotation) {
                record.right = Some(boundary);
            }
        }
        boundary
    }

    fn down_boundary(&mut self, field: &impl FieldSurface, piece: &PieceType, at: Placement) -> i32 {
        if let Some(cached) = self.grid.at(at).and_then(|record| record.down) {
            return cached;
        }
        let (x, y, rotation) = (at.position.x, at.position.y, at.rotation.index());
        let boundary = field.detect_collision_down(piece.cells(at.rotation), at.position);
        for cy in boundary..=y {
            if let Some(record) = self.grid.get_mut(x, cy, rotation) {
                record.down = Some(boundary);
            }
        }
        boundary
    }

    /// Stores a landing once per placement and once per set of covered cells.
    fn save_move(&mut self, piece: &PieceType, placement: Placement, node: MovementHandle) {
        if self.grid.found_move(placement).is_some() {
            return;
        }
        let canonical = match piece.duplicate_move(placement.rotation) {
            Some(dup) => Placement::new(placement.position.offset(dup.dx, dup.dy), dup.rotation),
            None => placement,
        };
        if canonical != placement {
            if let Some(existing) = self.grid.found_move(canonical) {
                if let Some(record) = self.grid.at_mut(placement) {
                    record.found_move = Some(existing);
                }
                return;
            }
        }

        let order = self.result.len() as u32;
        let index = self.result.push(Move::new(placement, node, order));
        for stamped in [placement, canonical] {
            if let Some(record) = self.grid.at_mut(stamped) {
                record.found_move = Some(index);
            }
        }
    }

    fn add_predetermined(&mut self, predetermined: Option<Placement>) {
        let Some(placement) = predetermined else {
            return;
        };
        let index = match self.result.find(placement) {
            Some(index) => index,
            None => {
                let node = self.result.arena_mut().push(placement, None);
                let order = self.result.len() as u32;
                self.result.push(Move::new(placement, node, order))
            }
        };
        self.result.set_predetermined(Some(index));
    }
}
