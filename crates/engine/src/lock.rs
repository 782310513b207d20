//! Permanent landing: write the piece, apply its effect, clear rows and let
//! the remaining fragments fall.

use blocks_core::{Field, FieldSurface, PieceEffect, PieceId, PieceType, Placement};
use serde::{Deserialize, Serialize};

/// Radius of the block an area bomb clears around each of its cells.
pub const AREA_EFFECT_RADIUS: i32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockResult {
    pub rows_cleared: usize,
    /// Cells removed by the piece's effect.
    pub cells_exploded: usize,
}

impl LockResult {
    /// Whether anything left the field, so a cascade has to run.
    pub fn removed_anything(&self) -> bool {
        self.rows_cleared > 0 || self.cells_exploded > 0
    }
}

/// Outcome of one cascade pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePass {
    pub moved: bool,
    pub rows_cleared: usize,
}

/// Lands the piece for good and clears what it completes.
pub fn lock_piece(field: &mut Field, piece: &PieceType, placement: Placement, id: PieceId) -> LockResult {
    field.land_piece_blocks(piece.cells(placement.rotation), id, placement.position);

    let mut cells_exploded = 0;
    let mut rows_cleared = 0;
    match piece.effect() {
        PieceEffect::None => {}
        PieceEffect::Area => {
            for (x, y) in piece.occupied_cells(placement) {
                cells_exploded += field.explode_area(x, y, AREA_EFFECT_RADIUS);
            }
        }
        PieceEffect::Row => {
            let mut rows: Vec<i32> = piece.occupied_cells(placement).map(|(_, y)| y).collect();
            rows.sort_unstable();
            rows.dedup();
            for y in rows {
                if y >= 0 && y < field.num_rows() {
                    field.clear_row(y as usize);
                    rows_cleared += 1;
                }
            }
        }
    }
    rows_cleared += field.clear_filled_rows();
    LockResult {
        rows_cleared,
        cells_exploded,
    }
}

/// One gravity pass followed by a row check.
pub fn cascade_step(field: &mut Field) -> CascadePass {
    let moved = field.pull_down_loose_pieces();
    let rows_cleared = field.clear_filled_rows();
    CascadePass {
        moved,
        rows_cleared,
    }
}

/// Most cascade passes a field can need: one clearing pass per row plus the
/// pass that finds nothing. Cascades stop here even if rows keep clearing.
pub fn max_cascade_passes(field: &Field) -> usize {
    field.num_rows().max(0) as usize + 1
}

/// Runs cascade passes until one clears nothing. Returns the passes run.
pub fn resolve_cascade(field: &mut Field) -> usize {
    let limit = max_cascade_passes(field);
    let mut passes = 0;
    while passes < limit {
        passes += 1;
        if cascade_step(field).rows_cleared == 0 {
            break;
        }
    }
    passes
}

/// Locks and, if anything was removed, settles the field completely.
pub fn lock_and_settle(field: &mut Field, piece: &PieceType, placement: Placement, id: PieceId) -> LockResult {
    let mut result = lock_piece(field, piece, placement, id);
    if result.removed_anything() {
        for _ in 0..max_cascade_passes(field) {
            let pass = cascade_step(field);
            if pass.rows_cleared == 0 {
                break;
            }
            result.rows_cleared += pass.rows_cleared;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{PieceCatalog, Position, Rotation};

    #[test]
    fn test_lock_clears_completed_row_without_shifting() {
        let catalog = PieceCatalog::standard();
        let i = catalog.get("I").unwrap();
        let mut field = Field::from_rows(&[
            "b.....",
            "aa....",
        ]);
        let placement = Placement::new(Position::new(2, -2), Rotation::ZERO);
        let result = lock_piece(&mut field, i, placement, PieceId(7));
        assert_eq!(result.rows_cleared, 1);
        assert!(field.is_row_empty(0));
        assert!(field.is_filled(0, 1));

        assert_eq!(resolve_cascade(&mut field), 1);
        assert!(field.is_filled(0, 0));
        assert!(field.is_row_empty(1));
    }

    #[test]
    fn test_cascade_chain_clears_second_row() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        // The O completes row 0; its upper half and the aa pair then fall
        // onto the floor and complete row 0 again.
        let mut field = Field::from_rows(&[
            "....",
            "aa..",
            "....",
            "bb..",
        ]);
        let placement = Placement::new(Position::new(2, 0), Rotation::ZERO);
        let result = lock_and_settle(&mut field, o, placement, PieceId(9));
        assert_eq!(result.rows_cleared, 2);
        assert_eq!(field.filled_cell_count(), 0);
    }

    #[test]
    fn test_area_bomb_clears_block() {
        let catalog = PieceCatalog::standard();
        let bomb = catalog.get("Bomb").unwrap();
        let mut field = Field::from_rows(&[
            "......",
            "aaaa..",
            "aaaa..",
        ]);
        let placement = Placement::new(Position::new(1, 2), Rotation::ZERO);
        let result = lock_piece(&mut field, bomb, placement, PieceId(3));
        // The bomb cell itself plus cells (0..=2, 1)
        assert_eq!(result.cells_exploded, 4);
        assert!(!field.is_filled(1, 2));
        assert!(field.is_filled(3, 1));
        assert!(field.is_filled(1, 0));
    }

    #[test]
    fn test_row_bomb_clears_its_row() {
        let catalog = PieceCatalog::standard();
        let bomb = catalog.get("RowBomb").unwrap();
        let mut field = Field::from_rows(&[
            "a.....",
            "bbb...",
        ]);
        let placement = Placement::new(Position::new(5, 0), Rotation::ZERO);
        let result = lock_piece(&mut field, bomb, placement, PieceId(3));
        assert_eq!(result.rows_cleared, 1);
        assert!(field.is_row_empty(0));
        assert!(field.is_filled(0, 1));
    }

    #[test]
    fn test_cascade_terminates_within_row_count() {
        let mut field = Field::from_rows(&[
            "aaaa",
            "b...",
            ".ccc",
            "d...",
            ".eee",
        ]);
        assert_eq!(max_cascade_passes(&field), 6);
        let passes = resolve_cascade(&mut field);
        assert!(passes >= 2 && passes <= max_cascade_passes(&field));
        assert!(!field.pull_down_loose_pieces());
        assert_eq!(resolve_cascade(&mut field), 1);
    }
}
