//! Path replay: checks a stored path step by step against the field.

use blocks_core::{FieldSurface, Placement, Step};
use thiserror::Error;

use crate::collision::{collides, MovingPiece};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("path is empty")]
    Empty,

    #[error("path starts at {found:?}, piece is at {expected:?}")]
    WrongStart { expected: Placement, found: Placement },

    #[error("node {index}: {from:?} -> {to:?} is not an elementary move")]
    NotAStep {
        index: usize,
        from: Placement,
        to: Placement,
    },

    #[error("node {index}: {step} collides at {at:?}")]
    Collision { index: usize, step: Step, at: Placement },
}

/// Replays `path` from `piece` and returns the steps taken.
pub fn replay_path(
    field: &impl FieldSurface,
    piece: MovingPiece<'_>,
    path: &[Placement],
) -> Result<Vec<Step>, ReplayError> {
    let first = *path.first().ok_or(ReplayError::Empty)?;
    if first != piece.placement {
        return Err(ReplayError::WrongStart {
            expected: piece.placement,
            found: first,
        });
    }
    let rotations = piece.piece.num_rotations();
    let mut steps = Vec::with_capacity(path.len().saturating_sub(1));
    for (index, pair) in path.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let step = Step::between(from, to, rotations).ok_or(ReplayError::NotAStep {
            index: index + 1,
            from,
            to,
        })?;
        if step.is_rotation() && !piece.piece.has_rotation_moves() {
            return Err(ReplayError::NotAStep {
                index: index + 1,
                from,
                to,
            });
        }
        if collides(field, piece.piece, to) {
            return Err(ReplayError::Collision {
                index: index + 1,
                step,
                at: to,
            });
        }
        steps.push(step);
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{Field, PieceCatalog, PieceId, Position, Rotation};

    fn at(x: i32, y: i32) -> Placement {
        Placement::new(Position::new(x, y), Rotation::ZERO)
    }

    #[test]
    fn test_replay_valid_path() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let field = Field::new(10, 20);
        let piece = MovingPiece::new(o, at(4, 5));
        let steps = replay_path(&field, piece, &[at(4, 5), at(4, 4), at(3, 4)]).unwrap();
        assert_eq!(steps, vec![Step::Down, Step::Left]);
    }

    #[test]
    fn test_replay_rejects_bad_paths() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let mut field = Field::new(10, 20);
        field.set(3, 4, Some(PieceId(1)));
        let piece = MovingPiece::new(o, at(4, 5));

        assert_eq!(replay_path(&field, piece, &[]), Err(ReplayError::Empty));
        assert!(matches!(
            replay_path(&field, piece, &[at(1, 1)]),
            Err(ReplayError::WrongStart { .. })
        ));
        assert!(matches!(
            replay_path(&field, piece, &[at(4, 5), at(6, 5)]),
            Err(ReplayError::NotAStep { index: 1, .. })
        ));
        assert!(matches!(
            replay_path(&field, piece, &[at(4, 5), at(4, 4), at(3, 4)]),
            Err(ReplayError::Collision { index: 2, step: Step::Left, .. })
        ));
    }
}
