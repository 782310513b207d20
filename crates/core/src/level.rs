//! Level configuration: field size, objective, piece sequence and timing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::{Blueprint, Field};
use crate::piece::PieceCatalog;
use crate::Placement;

/// Field side limits accepted from a config.
pub const MIN_FIELD_SIZE: usize = 4;
pub const MAX_FIELD_SIZE: usize = 64;

/// Which scoring heuristic ranks the moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Clear rows while keeping the stack low and flat.
    #[default]
    Clear,
    /// Fill the slots of a blueprint.
    Build,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    /// Tap one of the suggested placements.
    #[default]
    Click,
    /// Steer the piece and drag it down.
    Drag,
}

/// Timing of the falling piece, in seconds and rows per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    pub fall_speed: f32,
    /// Lock after this long on the ground without a move.
    pub landing_inactivity_limit: f32,
    /// Lock after this long on the ground no matter what.
    pub max_landing_time: f32,
    /// Time per step when animating a selected path.
    pub move_step_duration: f32,
    pub cascade_step_duration: f32,
    /// Rows per second while dragged down.
    pub drag_speed: f32,
}

impl FallConfig {
    /// Pieces hang in place until moved; useful for tests and tools.
    pub fn no_fall() -> Self {
        Self {
            fall_speed: 0.0,
            ..Self::default()
        }
    }
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            fall_speed: 1.0,
            landing_inactivity_limit: 0.5,
            max_landing_time: 2.0,
            move_step_duration: 0.04,
            cascade_step_duration: 0.15,
            drag_speed: 20.0,
        }
    }
}

/// A level as loaded from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub columns: usize,
    pub rows: usize,
    /// Rows below this one are out of play for scoring and display.
    #[serde(default)]
    pub lowest_visible_row: usize,
    /// Defaults to every row from `lowest_visible_row` up.
    #[serde(default)]
    pub visible_rows: Option<usize>,
    #[serde(default)]
    pub objective: Objective,
    /// Rows top first, as wide as the field; bottom row sits on
    /// `lowest_visible_row`.
    #[serde(default)]
    pub blueprint: Option<Vec<String>>,
    /// Piece names, spawned in order and repeated.
    pub pieces: Vec<String>,
    /// Forced placement for the n-th spawned piece.
    #[serde(default)]
    pub predetermined_moves: Vec<Option<Placement>>,
    #[serde(default)]
    pub control_scheme: ControlScheme,
    #[serde(default)]
    pub fall: FallConfig,
}

impl LevelConfig {
    /// 10x20 clear level with the seven tetrominoes.
    pub fn standard() -> Self {
        Self {
            columns: 10,
            rows: 20,
            lowest_visible_row: 0,
            visible_rows: None,
            objective: Objective::Clear,
            blueprint: None,
            pieces: ["I", "O", "T", "S", "Z", "J", "L"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            predetermined_moves: Vec::new(),
            control_scheme: ControlScheme::Click,
            fall: FallConfig::default(),
        }
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
            .unwrap_or_else(|| self.rows.saturating_sub(self.lowest_visible_row))
    }

    pub fn validate(&self, catalog: &PieceCatalog) -> Result<(), ConfigError> {
        if self.columns < MIN_FIELD_SIZE
            || self.columns > MAX_FIELD_SIZE
            || self.rows < MIN_FIELD_SIZE
            || self.rows > MAX_FIELD_SIZE
        {
            return Err(ConfigError::FieldSize {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let top = self.lowest_visible_row + self.visible_rows();
        if top > self.rows || self.visible_rows() == 0 {
            return Err(ConfigError::VisibleRows {
                lowest: self.lowest_visible_row,
                top,
                rows: self.rows,
            });
        }
        if self.pieces.is_empty() {
            return Err(ConfigError::NoPieces);
        }
        if let Some(name) = self.pieces.iter().find(|name| catalog.get(name).is_none()) {
            return Err(ConfigError::UnknownPiece(name.clone()));
        }
        match (&self.blueprint, self.objective) {
            (None, Objective::Build) => return Err(ConfigError::MissingBlueprint),
            (Some(rows), _) => {
                self.parse_blueprint(rows)?;
            }
            (None, Objective::Clear) => {}
        }
        Ok(())
    }

    fn parse_blueprint(&self, rows: &[String]) -> Result<Blueprint, ConfigError> {
        let size_error = |got_columns, got_rows| ConfigError::BlueprintSize {
            columns: self.columns,
            rows: self.visible_rows(),
            got_columns,
            got_rows,
        };
        let blueprint = Blueprint::parse(rows).ok_or_else(|| size_error(0, rows.len()))?;
        if blueprint.columns() != self.columns || blueprint.rows() > self.visible_rows() {
            return Err(size_error(blueprint.columns(), blueprint.rows()));
        }
        Ok(blueprint)
    }

    /// Empty field with the configured visible window and blueprint.
    pub fn build_field(&self, catalog: &PieceCatalog) -> Result<Field, ConfigError> {
        self.validate(catalog)?;
        let mut field = Field::new(self.columns, self.rows);
        field.set_visible_rows(self.lowest_visible_row, self.visible_rows());
        if let Some(rows) = &self.blueprint {
            field.set_blueprint(Some(self.parse_blueprint(rows)?));
        }
        Ok(field)
    }

    /// Name of the n-th spawned piece.
    pub fn piece_name(&self, spawn_index: usize) -> Option<&str> {
        if self.pieces.is_empty() {
            return None;
        }
        Some(self.pieces[spawn_index % self.pieces.len()].as_str())
    }

    pub fn predetermined_move(&self, spawn_index: usize) -> Option<Placement> {
        self.predetermined_moves.get(spawn_index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSurface, Position, Rotation};

    #[test]
    fn test_standard_level_is_valid() {
        let catalog = PieceCatalog::standard();
        let level = LevelConfig::standard();
        assert_eq!(level.validate(&catalog), Ok(()));
        let field = level.build_field(&catalog).unwrap();
        assert_eq!(field.num_columns(), 10);
        assert_eq!(field.num_visible_rows(), 20);
        assert_eq!(level.piece_name(8), Some("O"));
    }

    #[test]
    fn test_unknown_piece_rejected() {
        let mut level = LevelConfig::standard();
        level.pieces.push("Q".to_string());
        assert_eq!(
            level.validate(&PieceCatalog::standard()),
            Err(ConfigError::UnknownPiece("Q".to_string()))
        );
    }

    #[test]
    fn test_build_needs_blueprint_of_field_width() {
        let catalog = PieceCatalog::standard();
        let mut level = LevelConfig::standard();
        level.objective = Objective::Build;
        assert_eq!(level.validate(&catalog), Err(ConfigError::MissingBlueprint));

        level.blueprint = Some(vec!["XX..".to_string()]);
        assert!(matches!(
            level.validate(&catalog),
            Err(ConfigError::BlueprintSize { got_columns: 4, .. })
        ));

        level.blueprint = Some(vec!["XXXXX.....".to_string()]);
        let field = level.build_field(&catalog).unwrap();
        assert!(field.blueprint().is_some());
    }

    #[test]
    fn test_visible_rows_out_of_range() {
        let mut level = LevelConfig::standard();
        level.lowest_visible_row = 2;
        level.visible_rows = Some(19);
        assert!(matches!(
            level.validate(&PieceCatalog::standard()),
            Err(ConfigError::VisibleRows { top: 21, .. })
        ));
    }

    #[test]
    fn test_level_from_json() {
        let json = r#"{
            "columns": 8,
            "rows": 12,
            "lowest_visible_row": 1,
            "visible_rows": 9,
            "pieces": ["T", "Bomb"],
            "predetermined_moves": [{"position": {"x": 2, "y": 1}, "rotation": 2}],
            "control_scheme": "drag",
            "fall": {"fall_speed": 2.5}
        }"#;
        let level: LevelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(level.objective, Objective::Clear);
        assert_eq!(level.control_scheme, ControlScheme::Drag);
        assert_eq!(level.fall.fall_speed, 2.5);
        assert_eq!(level.fall.cascade_step_duration, FallConfig::default().cascade_step_duration);
        assert_eq!(
            level.predetermined_move(0),
            Some(Placement::new(Position::new(2, 1), Rotation::new(2)))
        );
        assert_eq!(level.predetermined_move(1), None);
        let field = level.build_field(&PieceCatalog::standard()).unwrap();
        assert_eq!(field.lowest_visible_row(), 1);
        assert_eq!(field.num_visible_rows(), 9);
    }
}
