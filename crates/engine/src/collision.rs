//! collision detection - walls, floor, filled cells

use blocks_core::{FieldSurface, PieceType, Placement, Position, Rotation, Step};

/// A piece type at a placement.
#[derive(Clone, Copy, Debug)]
pub struct MovingPiece<'a> {
    pub placement: Placement,
    pub piece: &'a PieceType,
}

impl<'a> MovingPiece<'a> {
    pub fn new(piece: &'a PieceType, placement: Placement) -> Self {
        Self { placement, piece }
    }

    /// Spawn state for a field of the given size.
    pub fn spawn(piece: &'a PieceType, field: &impl FieldSurface) -> Self {
        let placement = piece.spawn_placement(field.num_columns() as usize, field.num_rows() as usize);
        Self { placement, piece }
    }

    #[inline(always)]
    pub fn position(&self) -> Position {
        self.placement.position
    }

    #[inline(always)]
    pub fn rotation(&self) -> Rotation {
        self.placement.rotation
    }

    #[inline(always)]
    pub fn cells(&self) -> &'a [(i32, i32)] {
        self.piece.cells(self.placement.rotation)
    }

    pub fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }

    /// The piece after `step`, whether or not it fits.
    pub fn stepped(self, step: Step) -> Self {
        self.with_placement(step.apply(self.placement, self.piece.num_rotations()))
    }
}

/// does the piece collide with anything?
#[inline(always)]
pub fn collides(field: &impl FieldSurface, piece: &PieceType, placement: Placement) -> bool {
    field.check_collision(piece.cells(placement.rotation), placement.position)
}

/// can we place here? (just !collides)
pub fn can_place(field: &impl FieldSurface, piece: &PieceType, placement: Placement) -> bool {
    !collides(field, piece, placement)
}

/// Row the piece comes to rest on when dropped from `placement`.
#[inline]
pub fn drop_y(field: &impl FieldSurface, piece: &PieceType, placement: Placement) -> i32 {
    field.detect_collision_down(piece.cells(placement.rotation), placement.position)
}

/// Applies one elementary move if the destination is free.
pub fn try_step(field: &impl FieldSurface, piece: MovingPiece<'_>, step: Step) -> Option<Placement> {
    if step.is_rotation() && !piece.piece.has_rotation_moves() {
        return None;
    }
    let next = piece.stepped(step);
    can_place(field, next.piece, next.placement).then_some(next.placement)
}
