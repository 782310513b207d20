//! Piece shape table: per-rotation cell grids, bounding boxes, click footprints
//! and duplicate-placement offsets. Built once at load, shared read-only.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::{Placement, Position, Rotation};

/// Largest supported piece grid (cells per side).
pub const MAX_GRID_SIZE: usize = 5;

/// Click grid cells per field cell along each axis.
pub const CLICK_CELLS_PER_CELL: i32 = 2;

pub type CellList = SmallVec<[(i32, i32); 8]>;
pub type ClickCellList = SmallVec<[(i32, i32); 32]>;

/// What happens to the field around the piece when it locks.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceEffect {
    #[default]
    None,
    /// Bomb: clears the 3x3 block around each of its cells.
    Area,
    /// Row bomb: clears every row it occupies.
    Row,
}

/// Placing a piece at `position + (dx, dy)` with `rotation` covers exactly the
/// same cells as the rotation this mapping belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DuplicateMove {
    pub dx: i32,
    pub dy: i32,
    pub rotation: Rotation,
}

/// Min/max occupied row and column inside the piece grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoundingBox {
    pub min_col: i32,
    pub max_col: i32,
    pub min_row: i32,
    pub max_row: i32,
}

impl BoundingBox {
    fn of(cells: &[(i32, i32)]) -> Self {
        let mut bounds = BoundingBox {
            min_col: i32::MAX,
            max_col: i32::MIN,
            min_row: i32::MAX,
            max_row: i32::MIN,
        };
        for &(col, row) in cells {
            bounds.min_col = bounds.min_col.min(col);
            bounds.max_col = bounds.max_col.max(col);
            bounds.min_row = bounds.min_row.min(row);
            bounds.max_row = bounds.max_row.max(row);
        }
        bounds
    }

    pub fn width(&self) -> i32 {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> i32 {
        self.max_row - self.min_row + 1
    }

    /// Vertical centre of the occupied rows, relative to the grid origin.
    pub fn center_row(&self) -> f32 {
        (self.min_row + self.max_row) as f32 / 2.0
    }
}

#[derive(Clone, Debug)]
pub struct RotationShape {
    cells: CellList,
    click_cells: ClickCellList,
    bounds: BoundingBox,
    duplicate: Option<DuplicateMove>,
}

impl RotationShape {
    /// Occupied (col, row) offsets, row 0 at the bottom of the grid.
    #[inline(always)]
    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    /// Click footprint in click-grid units relative to `position * 2`.
    pub fn click_cells(&self) -> &[(i32, i32)] {
        &self.click_cells
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn duplicate_move(&self) -> Option<DuplicateMove> {
        self.duplicate
    }
}

/// Serialisable piece description. Grid rows are listed top row first;
/// any character other than `.` or a space marks an occupied cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub name: String,
    pub rotations: Vec<Vec<String>>,
    /// Optional footprints at click-grid resolution (twice the grid size).
    #[serde(default)]
    pub click_grids: Option<Vec<Vec<String>>>,
    /// Optional explicit duplicate mapping per rotation; derived when absent.
    #[serde(default)]
    pub duplicate_moves: Option<Vec<Option<DuplicateMove>>>,
    #[serde(default = "default_can_rotate")]
    pub can_rotate: bool,
    #[serde(default)]
    pub effect: PieceEffect,
}

fn default_can_rotate() -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct PieceType {
    name: String,
    grid_size: usize,
    rotations: SmallVec<[RotationShape; 4]>,
    can_rotate: bool,
    effect: PieceEffect,
}

impl PieceType {
    pub fn from_definition(def: &PieceDefinition) -> Result<Self, ConfigError> {
        let count = def.rotations.len();
        if !matches!(count, 1 | 2 | 4) {
            return Err(ConfigError::RotationCount {
                piece: def.name.clone(),
                count,
            });
        }

        let grid_size = def.rotations[0].len();
        if grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                piece: def.name.clone(),
                size: grid_size,
                max: MAX_GRID_SIZE,
            });
        }

        let mut rotations: SmallVec<[RotationShape; 4]> = SmallVec::new();
        for (index, rows) in def.rotations.iter().enumerate() {
            let cells = parse_grid(rows, grid_size).ok_or_else(|| ConfigError::RaggedGrid {
                piece: def.name.clone(),
                rotation: index,
                size: grid_size,
            })?;
            if cells.is_empty() {
                return Err(ConfigError::EmptyRotation {
                    piece: def.name.clone(),
                    rotation: index,
                });
            }
            let bounds = BoundingBox::of(&cells);
            rotations.push(RotationShape {
                click_cells: default_click_cells(&cells),
                cells,
                bounds,
                duplicate: None,
            });
        }

        if let Some(click_grids) = &def.click_grids {
            if click_grids.len() != count {
                return Err(ConfigError::ClickGridCount {
                    piece: def.name.clone(),
                    expected: count,
                    got: click_grids.len(),
                });
            }
            let click_size = grid_size * CLICK_CELLS_PER_CELL as usize;
            for (index, rows) in click_grids.iter().enumerate() {
                let click_cells =
                    parse_grid(rows, click_size).ok_or_else(|| ConfigError::RaggedGrid {
                        piece: def.name.clone(),
                        rotation: index,
                        size: click_size,
                    })?;
                rotations[index].click_cells = click_cells.into_iter().collect();
            }
        }

        match &def.duplicate_moves {
            Some(mapping) => {
                for (index, duplicate) in mapping.iter().enumerate().take(count) {
                    if let Some(dup) = duplicate {
                        let consistent = dup.rotation.index() < count
                            && same_cells(
                                &rotations[index].cells,
                                (0, 0),
                                &rotations[dup.rotation.index()].cells,
                                (dup.dx, dup.dy),
                            );
                        if !consistent {
                            return Err(ConfigError::InconsistentDuplicateMove {
                                piece: def.name.clone(),
                                rotation: index,
                            });
                        }
                    }
                    rotations[index].duplicate = *duplicate;
                }
            }
            None => derive_duplicate_moves(&mut rotations),
        }

        Ok(Self {
            name: def.name.clone(),
            grid_size,
            rotations,
            can_rotate: def.can_rotate,
            effect: def.effect,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    #[inline(always)]
    pub fn num_rotations(&self) -> usize {
        self.rotations.len()
    }

    pub fn can_rotate(&self) -> bool {
        self.can_rotate
    }

    /// Rotational moves only exist for rotatable pieces with several rotations.
    #[inline(always)]
    pub fn has_rotation_moves(&self) -> bool {
        self.can_rotate && self.rotations.len() > 1
    }

    pub fn effect(&self) -> PieceEffect {
        self.effect
    }

    pub fn is_area_effect(&self) -> bool {
        self.effect == PieceEffect::Area
    }

    pub fn is_row_effect(&self) -> bool {
        self.effect == PieceEffect::Row
    }

    #[inline(always)]
    pub fn shape(&self, rotation: Rotation) -> &RotationShape {
        &self.rotations[rotation.index()]
    }

    #[inline(always)]
    pub fn cells(&self, rotation: Rotation) -> &[(i32, i32)] {
        &self.rotations[rotation.index()].cells
    }

    pub fn bounds(&self, rotation: Rotation) -> BoundingBox {
        self.rotations[rotation.index()].bounds
    }

    pub fn duplicate_move(&self, rotation: Rotation) -> Option<DuplicateMove> {
        self.rotations[rotation.index()].duplicate
    }

    /// Horizontally centred, top cell on the top row, rotation 0.
    pub fn spawn_placement(&self, columns: usize, rows: usize) -> Placement {
        let x = (columns as i32 - self.grid_size as i32) / 2;
        let y = rows as i32 - 1 - self.rotations[0].bounds.max_row;
        Placement::new(Position::new(x, y), Rotation::ZERO)
    }

    /// Absolute field cells covered by the piece at `placement`.
    pub fn occupied_cells(&self, placement: Placement) -> impl Iterator<Item = (i32, i32)> + '_ {
        let Position { x, y } = placement.position;
        self.cells(placement.rotation)
            .iter()
            .map(move |&(dx, dy)| (x + dx, y + dy))
    }
}

fn parse_grid(rows: &[String], width: usize) -> Option<CellList> {
    let height = rows.len();
    if height != width {
        return None;
    }
    let mut cells = CellList::new();
    for (line, text) in rows.iter().enumerate() {
        if text.chars().count() != width {
            return None;
        }
        let row = (height - 1 - line) as i32;
        for (col, ch) in text.chars().enumerate() {
            if ch != '.' && ch != ' ' {
                cells.push((col as i32, row));
            }
        }
    }
    Some(cells)
}

fn default_click_cells(cells: &[(i32, i32)]) -> ClickCellList {
    let mut click = ClickCellList::new();
    for &(col, row) in cells {
        for sy in 0..CLICK_CELLS_PER_CELL {
            for sx in 0..CLICK_CELLS_PER_CELL {
                click.push((
                    col * CLICK_CELLS_PER_CELL + sx,
                    row * CLICK_CELLS_PER_CELL + sy,
                ));
            }
        }
    }
    click
}

fn same_cells(a: &[(i32, i32)], a_at: (i32, i32), b: &[(i32, i32)], b_at: (i32, i32)) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut lhs: CellList = a.iter().map(|&(c, r)| (c + a_at.0, r + a_at.1)).collect();
    let mut rhs: CellList = b.iter().map(|&(c, r)| (c + b_at.0, r + b_at.1)).collect();
    lhs.sort_unstable();
    rhs.sort_unstable();
    lhs == rhs
}

/// Maps every rotation to the lowest-index rotation with identical occupancy.
/// The lowest rotation of each class maps to nothing.
fn derive_duplicate_moves(rotations: &mut [RotationShape]) {
    for index in 1..rotations.len() {
        let bounds = rotations[index].bounds;
        let found = (0..index).find(|&other| {
            let other_bounds = rotations[other].bounds;
            rotations[other].duplicate.is_none()
                && same_cells(
                    &rotations[index].cells,
                    (-bounds.min_col, -bounds.min_row),
                    &rotations[other].cells,
                    (-other_bounds.min_col, -other_bounds.min_row),
                )
        });
        if let Some(other) = found {
            let other_bounds = rotations[other].bounds;
            rotations[index].duplicate = Some(DuplicateMove {
                dx: bounds.min_col - other_bounds.min_col,
                dy: bounds.min_row - other_bounds.min_row,
                rotation: Rotation::new(other as u8),
            });
        }
    }
}

/// Named set of piece types available to levels.
#[derive(Clone, Debug, Default)]
pub struct PieceCatalog {
    pieces: Vec<PieceType>,
}

impl PieceCatalog {
    pub fn from_definitions(defs: &[PieceDefinition]) -> Result<Self, ConfigError> {
        let pieces = defs
            .iter()
            .map(PieceType::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pieces })
    }

    /// I, O, T, S, Z, J, L plus the bomb and row bomb.
    pub fn standard() -> Self {
        match Self::from_definitions(&standard_definitions()) {
            Ok(catalog) => catalog,
            Err(err) => panic!("built-in piece table is invalid: {err}"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PieceType> {
        self.pieces.iter().find(|piece| piece.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceType> {
        self.pieces.iter()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

fn grid(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|row| row.to_string()).collect()
}

fn definition(name: &str, rotations: &[&[&str]]) -> PieceDefinition {
    PieceDefinition {
        name: name.to_string(),
        rotations: rotations.iter().map(|rows| grid(rows)).collect(),
        click_grids: None,
        duplicate_moves: None,
        can_rotate: true,
        effect: PieceEffect::None,
    }
}

pub fn standard_definitions() -> Vec<PieceDefinition> {
    let mut defs = vec![
        definition(
            "I",
            &[
                &["....", "XXXX", "....", "...."],
                &["..X.", "..X.", "..X.", "..X."],
                &["....", "....", "XXXX", "...."],
                &[".X..", ".X..", ".X..", ".X.."],
            ],
        ),
        definition("O", &[&["XX", "XX"]]),
        definition(
            "T",
            &[
                &[".X.", "XXX", "..."],
                &[".X.", ".XX", ".X."],
                &["...", "XXX", ".X."],
                &[".X.", "XX.", ".X."],
            ],
        ),
        definition(
            "S",
            &[
                &[".XX", "XX.", "..."],
                &[".X.", ".XX", "..X"],
                &["...", ".XX", "XX."],
                &["X..", "XX.", ".X."],
            ],
        ),
        definition(
            "Z",
            &[
                &["XX.", ".XX", "..."],
                &["..X", ".XX", ".X."],
                &["...", "XX.", ".XX"],
                &[".X.", "XX.", "X.."],
            ],
        ),
        definition(
            "J",
            &[
                &["X..", "XXX", "..."],
                &[".XX", ".X.", ".X."],
                &["...", "XXX", "..X"],
                &[".X.", ".X.", "XX."],
            ],
        ),
        definition(
            "L",
            &[
                &["..X", "XXX", "..."],
                &[".X.", ".X.", ".XX"],
                &["...", "XXX", "X.."],
                &["XX.", ".X.", ".X."],
            ],
        ),
    ];

    let mut bomb = definition("Bomb", &[&["X"]]);
    bomb.can_rotate = false;
    bomb.effect = PieceEffect::Area;
    defs.push(bomb);

    let mut row_bomb = definition("RowBomb", &[&["X"]]);
    row_bomb.can_rotate = false;
    row_bomb.effect = PieceEffect::Row;
    defs.push(row_bomb);

    defs[1].can_rotate = false;
    defs
}
