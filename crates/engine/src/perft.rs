//! perft - counts placement sequences to verify the search end to end.
//! Every level spawns the next piece, lands it and settles the cascade.

use blocks_core::{Field, PieceId, PieceType, Placement};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::collision::MovingPiece;
use crate::lock::lock_and_settle;
use crate::search::ValidMovesSearch;

/// Ids for pieces landed by perft, above anything a level hands out.
const PERFT_ID_BASE: u32 = 0x8000_0000;

/// Leaf counts keyed by (layout hash, depth). Only valid for one queue.
#[derive(Default)]
pub struct PerftCache {
    entries: FxHashMap<(u64, u32), u64>,
}

impl PerftCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[inline]
fn piece_id(level: usize) -> PieceId {
    PieceId(PERFT_ID_BASE + level as u32)
}

/// Placements of `piece` from its spawn, without paths.
fn placements(field: &Field, piece: &PieceType, search: &mut ValidMovesSearch) -> Vec<Placement> {
    search
        .find_valid_moves(field, MovingPiece::spawn(piece, field), None)
        .iter()
        .map(|mv| mv.placement)
        .collect()
}

fn perft_inner(
    field: &Field,
    queue: &[&PieceType],
    depth: u32,
    level: usize,
    search: &mut ValidMovesSearch,
) -> u64 {
    if depth == 0 || queue.is_empty() {
        return 1;
    }
    if depth == 1 {
        return search
            .find_valid_moves(field, MovingPiece::spawn(queue[0], field), None)
            .len() as u64;
    }

    let mut nodes = 0u64;
    for placement in placements(field, queue[0], search) {
        let mut next = field.clone();
        lock_and_settle(&mut next, queue[0], placement, piece_id(level));
        nodes += perft_inner(&next, &queue[1..], depth - 1, level + 1, search);
    }
    nodes
}

/// perft - counts leaf placement sequences at `depth`
pub fn perft(field: &Field, queue: &[&PieceType], depth: u32) -> u64 {
    let mut search = ValidMovesSearch::for_field(field);
    perft_inner(field, queue, depth, 0, &mut search)
}

/// Parallel perft - splits root placements across threads, each with its
/// own field copy and search buffers
pub fn perft_parallel(field: &Field, queue: &[&PieceType], depth: u32) -> u64 {
    if depth <= 1 || queue.is_empty() {
        return perft(field, queue, depth);
    }

    let mut search = ValidMovesSearch::for_field(field);
    let roots = placements(field, queue[0], &mut search);

    roots
        .par_iter()
        .map(|&placement| {
            let mut next = field.clone();
            lock_and_settle(&mut next, queue[0], placement, piece_id(0));
            let mut local_search = ValidMovesSearch::for_field(&next);
            perft_inner(&next, &queue[1..], depth - 1, 1, &mut local_search)
        })
        .sum()
}

fn perft_cached_inner(
    field: &Field,
    queue: &[&PieceType],
    depth: u32,
    level: usize,
    search: &mut ValidMovesSearch,
    cache: &mut PerftCache,
) -> u64 {
    if depth == 0 || queue.is_empty() {
        return 1;
    }
    let key = (field.layout_hash(), depth);
    if let Some(&nodes) = cache.entries.get(&key) {
        return nodes;
    }

    let nodes = if depth == 1 {
        search
            .find_valid_moves(field, MovingPiece::spawn(queue[0], field), None)
            .len() as u64
    } else {
        let mut nodes = 0u64;
        for placement in placements(field, queue[0], search) {
            let mut next = field.clone();
            lock_and_settle(&mut next, queue[0], placement, piece_id(level));
            nodes += perft_cached_inner(&next, &queue[1..], depth - 1, level + 1, search, cache);
        }
        nodes
    };
    cache.entries.insert(key, nodes);
    nodes
}

/// Perft with a transposition cache
pub fn perft_cached(field: &Field, queue: &[&PieceType], depth: u32, cache: &mut PerftCache) -> u64 {
    let mut search = ValidMovesSearch::for_field(field);
    perft_cached_inner(field, queue, depth, 0, &mut search, cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::PieceCatalog;

    fn queue<'a>(catalog: &'a PieceCatalog, names: &[&str]) -> Vec<&'a PieceType> {
        names.iter().map(|name| catalog.get(name).unwrap()).collect()
    }

    #[test]
    fn test_perft_depth_0() {
        let catalog = PieceCatalog::standard();
        let field = Field::new(10, 20);
        assert_eq!(perft(&field, &queue(&catalog, &["T"]), 0), 1);
    }

    #[test]
    fn test_perft_depth_1_matches_move_count() {
        let catalog = PieceCatalog::standard();
        let field = Field::new(10, 20);
        assert_eq!(perft(&field, &queue(&catalog, &["O"]), 1), 9);
        assert_eq!(perft(&field, &queue(&catalog, &["I"]), 1), 17);
        assert_eq!(perft(&field, &queue(&catalog, &["T"]), 1), 34);
    }

    #[test]
    fn test_perft_variants_agree() {
        let catalog = PieceCatalog::standard();
        let field = Field::new(8, 10);
        let pieces = queue(&catalog, &["O", "I", "T"]);
        let serial = perft(&field, &pieces, 3);
        assert_eq!(perft_parallel(&field, &pieces, 3), serial);
        let mut cache = PerftCache::new();
        assert_eq!(perft_cached(&field, &pieces, 3, &mut cache), serial);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_perft_two_o_pieces() {
        let catalog = PieceCatalog::standard();
        let field = Field::new(10, 20);
        // Second O has 9 placements after every first placement
        assert_eq!(perft(&field, &queue(&catalog, &["O", "O"]), 2), 81);
    }
}
