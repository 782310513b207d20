//! Blocks core crate - field, piece shapes and level configuration.

mod error;
mod field;
mod heights;
mod level;
mod moves;
mod piece;

pub use error::ConfigError;
pub use field::{Blueprint, Field, FieldSurface, FilledRows, FilledRowsMark, PieceId};
pub use heights::ColumnHeights;
pub use level::{ControlScheme, FallConfig, LevelConfig, Objective, MAX_FIELD_SIZE, MIN_FIELD_SIZE};
pub use moves::{Placement, Position, Rotation, Step};
pub use piece::{
    standard_definitions, BoundingBox, CellList, ClickCellList, DuplicateMove, PieceCatalog,
    PieceDefinition, PieceEffect, PieceType, RotationShape, CLICK_CELLS_PER_CELL, MAX_GRID_SIZE,
};
