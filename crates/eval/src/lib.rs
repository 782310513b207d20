//! Blocks eval crate - move scoring heuristics.

use blocks_core::{FieldSurface, Objective, PieceType, Placement};
use blocks_engine::{with_landed_piece, ValidMoves};
use serde::{Deserialize, Serialize};

/// Weight of each feature; a feature contributes `weight * value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub landing_height: f32,
    pub filled_rows: f32,
    pub piece_cells_in_filled_rows: f32,
    pub buried_holes: f32,
    pub wells: f32,
    pub column_transitions: f32,
    pub blueprint_cells: f32,
    pub build_holes: f32,
    pub build_wells: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            landing_height: -1.0,
            filled_rows: 2.0,
            piece_cells_in_filled_rows: 1.0,
            buried_holes: -4.1,
            wells: -1.0,
            column_transitions: -1.0,
            blueprint_cells: 2.0,
            build_holes: -4.0,
            build_wells: -0.25,
        }
    }
}

/// Raw feature values of one hypothetical landing. Features the objective
/// does not use stay zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveFeatures {
    /// Vertical centre of the piece above the lowest visible row.
    pub landing_height: f32,
    pub filled_rows: i32,
    pub piece_cells_in_filled_rows: i32,
    pub buried_holes: i32,
    pub wells: i32,
    pub column_transitions: i32,
    pub blueprint_cells: i32,
    pub build_holes: i32,
    pub build_wells: i32,
}

impl MoveFeatures {
    pub fn score(&self, objective: Objective, weights: &ScoringWeights) -> f32 {
        let mut score = self.landing_height * weights.landing_height;
        match objective {
            Objective::Clear => {
                score += self.filled_rows as f32 * weights.filled_rows;
                score += self.piece_cells_in_filled_rows as f32 * weights.piece_cells_in_filled_rows;
                score += self.buried_holes as f32 * weights.buried_holes;
                score += self.wells as f32 * weights.wells;
                score += self.column_transitions as f32 * weights.column_transitions;
            }
            Objective::Build => {
                score += self.blueprint_cells as f32 * weights.blueprint_cells;
                score += self.build_holes as f32 * weights.build_holes;
                score += self.build_wells as f32 * weights.build_wells;
            }
        }
        score
    }
}

/// Measures the field as if `piece` had landed at `placement`. The field is
/// back to its exact prior state on return.
pub fn move_features<F>(field: &mut F, piece: &PieceType, placement: Placement, objective: Objective) -> MoveFeatures
where
    F: FieldSurface + ?Sized,
{
    let bounds = piece.bounds(placement.rotation);
    let landing_height =
        placement.position.y as f32 + bounds.center_row() - field.lowest_visible_row() as f32;
    let cells = piece.cells(placement.rotation);

    with_landed_piece(field, piece, placement, |field, mark| {
        let mut features = MoveFeatures {
            landing_height,
            ..MoveFeatures::default()
        };
        match objective {
            Objective::Clear => {
                features.filled_rows = mark.rows.len() as i32;
                features.piece_cells_in_filled_rows = mark.piece_cells;
                features.buried_holes = field.buried_holes_area();
                features.wells = field.wells_area();
                features.column_transitions = field.column_height_transitions();
            }
            Objective::Build => {
                features.blueprint_cells =
                    field.piece_cells_matching_blueprint(cells, placement.position);
                features.build_holes = field.build_holes_area();
                features.build_wells = field.build_wells_area();
            }
        }
        features
    })
}

/// Desirability of landing `piece` at `placement`; higher is better.
pub fn score_move<F>(
    field: &mut F,
    piece: &PieceType,
    placement: Placement,
    objective: Objective,
    weights: &ScoringWeights,
) -> f32
where
    F: FieldSurface + ?Sized,
{
    move_features(field, piece, placement, objective).score(objective, weights)
}

/// Scores every move and sorts best first; equal scores keep the order the
/// search found them in.
pub fn rank_moves<F>(
    field: &mut F,
    piece: &PieceType,
    moves: &mut ValidMoves,
    objective: Objective,
    weights: &ScoringWeights,
) where
    F: FieldSurface + ?Sized,
{
    for mv in moves.as_mut_slice() {
        mv.score = score_move(field, piece, mv.placement, objective, weights);
    }
    moves.sort_by_score();
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{Blueprint, Field, PieceCatalog, Position, Rotation};
    use blocks_engine::{MovingPiece, ValidMovesSearch};

    fn at(x: i32, y: i32) -> Placement {
        Placement::new(Position::new(x, y), Rotation::ZERO)
    }

    #[test]
    fn test_default_weights_clear_objective() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let mut field = Field::from_rows(&["....", "....", "....", "aa.."]);
        let weights = ScoringWeights::default();

        // Completes row 0: -0.5 + 2*1 + 2 - 4 transitions
        let features = move_features(&mut field, o, at(2, 0), Objective::Clear);
        assert_eq!(features.filled_rows, 1);
        assert_eq!(features.piece_cells_in_filled_rows, 2);
        assert_eq!(features.buried_holes, 0);
        assert_eq!(features.wells, 0);
        assert_eq!(features.column_transitions, 4);
        assert_eq!(score_move(&mut field, o, at(2, 0), Objective::Clear, &weights), -0.5);

        // Stacked on the pair: -1.5 - 4 transitions
        assert_eq!(score_move(&mut field, o, at(0, 1), Objective::Clear, &weights), -5.5);
    }

    #[test]
    fn test_default_weights_build_objective() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let mut field = Field::new(4, 4);
        field.set_blueprint(Blueprint::parse(&["XX..".to_string(), "XXXX".to_string()]));
        let weights = ScoringWeights::default();

        assert_eq!(score_move(&mut field, o, at(0, 0), Objective::Build, &weights), 7.5);
        assert_eq!(score_move(&mut field, o, at(2, 0), Objective::Build, &weights), 3.5);

        let features = move_features(&mut field, o, at(1, 0), Objective::Build);
        assert_eq!(features.blueprint_cells, 3);
        assert_eq!(features.build_wells, 3);
        assert_eq!(features.score(Objective::Build, &weights), 4.75);
    }

    #[test]
    fn test_build_objective_completing_a_row() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let mut field = Field::from_rows(&["....", "....", "a...", "bb.."]);
        field.set_blueprint(Blueprint::parse(&["XXXX".to_string(), "XXXX".to_string()]));

        let features = move_features(&mut field, o, at(2, 0), Objective::Build);
        assert_eq!(features.blueprint_cells, 4);
        assert_eq!(features.build_holes, 0);
        // Row 0 drops out: column 1 sits one below its neighbours
        assert_eq!(features.build_wells, 1);
        assert_eq!(features.score(Objective::Build, &ScoringWeights::default()), 7.25);
    }

    #[test]
    fn test_landing_height_relative_to_visible_rows() {
        let catalog = PieceCatalog::standard();
        let i = catalog.get("I").unwrap();
        let mut field = Field::new(10, 20);
        field.set_visible_rows(2, 18);
        // Flat I at grid row 2, so its cells sit on field row 2
        let features = move_features(&mut field, i, at(0, 0), Objective::Clear);
        assert_eq!(features.landing_height, 0.0);
    }

    #[test]
    fn test_scoring_is_pure() {
        let catalog = PieceCatalog::standard();
        let field = Field::from_rows(&[
            "..........",
            "..........",
            ".a........",
            "aaa...b...",
            "cc.ccbbb.d",
        ]);
        let weights = ScoringWeights::default();
        let mut search = ValidMovesSearch::for_field(&field);
        let mut probe = field.clone();
        for piece in catalog.iter() {
            let moves = search.find_valid_moves(&field, MovingPiece::spawn(piece, &field), None);
            for mv in moves {
                let first = score_move(&mut probe, piece, mv.placement, Objective::Clear, &weights);
                let second = score_move(&mut probe, piece, mv.placement, Objective::Clear, &weights);
                assert_eq!(first.to_bits(), second.to_bits());
                assert_eq!(probe, field);
                assert_eq!(probe.layout_hash(), field.layout_hash());
            }
        }
    }

    #[test]
    fn test_rank_moves_non_increasing() {
        let catalog = PieceCatalog::standard();
        let t = catalog.get("T").unwrap();
        let mut field = Field::from_rows(&[
            "..........",
            "..........",
            "..........",
            "a.....bb..",
            "aa.cccbb.d",
        ]);
        let mut search = ValidMovesSearch::for_field(&field);
        search.find_valid_moves(&field, MovingPiece::spawn(t, &field), None);
        let moves = search.result_mut();
        let count = moves.len();
        rank_moves(&mut field, t, moves, Objective::Clear, &ScoringWeights::default());
        assert_eq!(moves.len(), count);
        for pair in moves.as_slice().windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].discovery_order < pair[1].discovery_order);
            }
        }
    }

    #[test]
    fn test_weights_from_json() {
        let weights: ScoringWeights = serde_json::from_str(r#"{"buried_holes": -8.0}"#).unwrap();
        assert_eq!(weights.buried_holes, -8.0);
        assert_eq!(weights.filled_rows, ScoringWeights::default().filled_rows);
    }
}
