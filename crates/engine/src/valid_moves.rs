//! Result container of one search: landing moves plus their path arena.

use std::cmp::Ordering;

use blocks_core::{Placement, Step};

use crate::movement::{MovementArena, MovementHandle};
use crate::search_grid::MAX_ROTATIONS;

/// A discovered landing placement.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    pub placement: Placement,
    /// Last node of the path that reaches `placement`.
    pub path: MovementHandle,
    pub score: f32,
    pub is_shown: bool,
    pub is_reachable: bool,
    /// Slot in the visible set while shown.
    pub button: Option<u8>,
    /// Position in the order the search found the moves.
    pub discovery_order: u32,
}

impl Move {
    pub fn new(placement: Placement, path: MovementHandle, discovery_order: u32) -> Self {
        Self {
            placement,
            path,
            score: 0.0,
            is_shown: false,
            is_reachable: true,
            button: None,
            discovery_order,
        }
    }
}

/// Same placement, regardless of path or score.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.placement == other.placement
    }
}

impl Eq for Move {}

/// Fixed-capacity move list with the arena holding every path.
#[derive(Clone, Debug, Default)]
pub struct ValidMoves {
    moves: Vec<Move>,
    capacity: usize,
    arena: MovementArena,
    predetermined: Option<usize>,
}

impl ValidMoves {
    /// Sized for every (x, y, rotation) of a `columns × rows` field.
    pub fn for_field(columns: usize, rows: usize) -> Self {
        let capacity = columns * rows * MAX_ROTATIONS;
        Self {
            moves: Vec::with_capacity(capacity),
            capacity,
            arena: MovementArena::with_capacity(capacity * 2),
            predetermined: None,
        }
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.arena.clear();
        self.predetermined = None;
    }

    /// Push a move (panics in debug if overflow). Returns its index.
    #[inline]
    pub fn push(&mut self, mv: Move) -> usize {
        debug_assert!(self.moves.len() < self.capacity, "ValidMoves overflow");
        self.moves.push(mv);
        self.moves.len() - 1
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Move> {
        self.moves.get_mut(index)
    }

    pub fn arena(&self) -> &MovementArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut MovementArena {
        &mut self.arena
    }

    /// Exchanges path storage with `other`; handles stay valid for the
    /// moves whose paths were produced in the arena they now own.
    pub fn swap_arena(&mut self, other: &mut ValidMoves) {
        std::mem::swap(&mut self.arena, &mut other.arena);
    }

    /// Index of the forced placement, when one was requested.
    pub fn predetermined(&self) -> Option<usize> {
        self.predetermined
    }

    pub fn set_predetermined(&mut self, index: Option<usize>) {
        self.predetermined = index;
    }

    pub fn find(&self, placement: Placement) -> Option<usize> {
        self.moves.iter().position(|mv| mv.placement == placement)
    }

    pub fn path(&self, index: usize, out: &mut Vec<Placement>) {
        match self.moves.get(index) {
            Some(mv) => self.arena.path(mv.path, out),
            None => out.clear(),
        }
    }

    pub fn steps(&self, index: usize, rotation_count: usize, out: &mut Vec<Step>) {
        match self.moves.get(index) {
            Some(mv) => self.arena.steps(mv.path, rotation_count, out),
            None => out.clear(),
        }
    }

    /// Highest score first; equal scores keep discovery order.
    pub fn sort_by_score(&mut self) {
        let forced = self
            .predetermined
            .and_then(|index| self.moves.get(index))
            .map(|mv| mv.placement);
        self.moves.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.discovery_order.cmp(&b.discovery_order))
        });
        self.predetermined = forced.and_then(|placement| self.find(placement));
    }
}

impl std::ops::Index<usize> for ValidMoves {
    type Output = Move;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl std::ops::IndexMut<usize> for ValidMoves {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.moves[index]
    }
}

impl<'a> IntoIterator for &'a ValidMoves {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
