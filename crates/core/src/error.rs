//! Configuration errors for piece definitions and level configs.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("piece `{piece}`: expected 1, 2 or 4 rotations, got {count}")]
    RotationCount { piece: String, count: usize },

    #[error("piece `{piece}`: grid of size {size} exceeds the {max}x{max} maximum")]
    GridTooLarge {
        piece: String,
        size: usize,
        max: usize,
    },

    #[error("piece `{piece}` rotation {rotation}: grid rows must all be {size} wide")]
    RaggedGrid {
        piece: String,
        rotation: usize,
        size: usize,
    },

    #[error("piece `{piece}` rotation {rotation}: no occupied cells")]
    EmptyRotation { piece: String, rotation: usize },

    #[error("piece `{piece}` rotation {rotation}: duplicate-move mapping does not reproduce the same cells")]
    InconsistentDuplicateMove { piece: String, rotation: usize },

    #[error("piece `{piece}`: {expected} click grids expected, got {got}")]
    ClickGridCount {
        piece: String,
        expected: usize,
        got: usize,
    },

    #[error("field size {columns}x{rows} out of range")]
    FieldSize { columns: usize, rows: usize },

    #[error("visible rows {lowest}..{top} exceed field height {rows}")]
    VisibleRows { lowest: usize, top: usize, rows: usize },

    #[error("blueprint is {got_columns}x{got_rows}, field is {columns}x{rows}")]
    BlueprintSize {
        columns: usize,
        rows: usize,
        got_columns: usize,
        got_rows: usize,
    },

    #[error("build objective requires a blueprint")]
    MissingBlueprint,

    #[error("unknown piece `{0}`")]
    UnknownPiece(String),

    #[error("level has no pieces")]
    NoPieces,
}
