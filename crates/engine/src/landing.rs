//! Hypothetical landings: land, query, take back.

use blocks_core::{FieldSurface, FilledRowsMark, PieceId, PieceType, Placement};

/// Lands `piece` at `placement` under the probe id, marks the rows it fills,
/// runs `query` and then restores the field exactly.
pub fn with_landed_piece<F, R>(
    field: &mut F,
    piece: &PieceType,
    placement: Placement,
    query: impl FnOnce(&F, &FilledRowsMark) -> R,
) -> R
where
    F: FieldSurface + ?Sized,
{
    let cells = piece.cells(placement.rotation);
    let position = placement.position;
    field.land_piece_blocks(cells, PieceId::PROBE, position);
    let mark = field.mark_filled_rows_and_count_piece_cells_in_filled_rows(cells, position);
    let result = query(field, &mark);
    field.unmark_filled_rows(&mark.rows);
    field.remove_piece(cells, PieceId::PROBE, position);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{Field, PieceCatalog, Position, Rotation};

    #[test]
    fn test_bracket_restores_field() {
        let catalog = PieceCatalog::standard();
        let i = catalog.get("I").unwrap();
        let mut field = Field::from_rows(&[
            "......",
            "a.....",
            ".b....",
        ]);
        let before = field.clone();
        let hash = field.layout_hash();

        // Flat I on the bottom row, columns 2..5; column 0 stays open
        let placement = Placement::new(Position::new(2, -2), Rotation::ZERO);
        let (rows, cells, holes) = with_landed_piece(&mut field, i, placement, |f, mark| {
            (mark.rows.len(), mark.piece_cells, f.buried_holes_area())
        });
        assert_eq!(rows, 0);
        assert_eq!(cells, 0);
        assert_eq!(holes, 1);
        assert_eq!(field, before);
        assert_eq!(field.layout_hash(), hash);
    }

    #[test]
    fn test_bracket_reports_filled_rows() {
        let catalog = PieceCatalog::standard();
        let i = catalog.get("I").unwrap();
        let mut field = Field::from_rows(&["......", "aa...."]);
        let before = field.clone();
        let placement = Placement::new(Position::new(2, -2), Rotation::ZERO);
        let mark = with_landed_piece(&mut field, i, placement, |f, mark| {
            assert!(f.is_row_marked(0));
            mark.clone()
        });
        assert_eq!(mark.rows.as_slice(), &[0]);
        assert_eq!(mark.piece_cells, 4);
        assert_eq!(field, before);
        assert!(!field.is_row_marked(0));
    }
}
