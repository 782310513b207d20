//! Placement coordinates, rotations and elementary moves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field cell of a piece grid's bottom-left corner. x grows right, y grows up.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Rotation index into a piece type's rotation table.
/// Wrapping depends on how many rotations the piece has (1, 2 or 4).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Self = Self(0);

    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn clockwise(self, count: usize) -> Self {
        Self(((self.index() + 1) % count.max(1)) as u8)
    }

    pub fn anticlockwise(self, count: usize) -> Self {
        let count = count.max(1);
        Self(((self.index() + count - 1) % count) as u8)
    }
}

/// A (position, rotation) pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    pub rotation: Rotation,
}

impl Placement {
    pub const fn new(position: Position, rotation: Rotation) -> Self {
        Self { position, rotation }
    }
}

/// Elementary moves. There is no Up.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Step {
    Down,
    Left,
    Right,
    RotateClockwise,
    RotateAntiClockwise,
}

impl Step {
    /// Sideways and rotational branches, in the order the search explores them.
    pub const BRANCHES: [Step; 4] = [
        Step::Left,
        Step::Right,
        Step::RotateClockwise,
        Step::RotateAntiClockwise,
    ];

    pub fn apply(self, placement: Placement, rotation_count: usize) -> Placement {
        let Placement { position, rotation } = placement;
        match self {
            Step::Down => Placement::new(position.offset(0, -1), rotation),
            Step::Left => Placement::new(position.offset(-1, 0), rotation),
            Step::Right => Placement::new(position.offset(1, 0), rotation),
            Step::RotateClockwise => Placement::new(position, rotation.clockwise(rotation_count)),
            Step::RotateAntiClockwise => {
                Placement::new(position, rotation.anticlockwise(rotation_count))
            }
        }
    }

    /// The single step leading from `from` to `to`, if there is one.
    /// With two rotations both directions reach the same state; clockwise wins.
    pub fn between(from: Placement, to: Placement, rotation_count: usize) -> Option<Step> {
        if from == to {
            return None;
        }
        [
            Step::Down,
            Step::Left,
            Step::Right,
            Step::RotateClockwise,
            Step::RotateAntiClockwise,
        ]
        .into_iter()
        .find(|step| step.apply(from, rotation_count) == to)
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Step::RotateClockwise | Step::RotateAntiClockwise)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Down => "D",
            Step::Left => "L",
            Step::Right => "R",
            Step::RotateClockwise => "CW",
            Step::RotateAntiClockwise => "CCW",
        };
        f.write_str(s)
    }
}
