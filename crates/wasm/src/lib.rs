//! blocks-wasm - WebAssembly entry points and bindings for browser execution.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use blocks_core::{Field, FieldSurface, LevelConfig, Objective, PieceCatalog, PieceType, Placement, Position, Rotation, Step};
use blocks_engine::{perft as count_sequences, MovingPiece, ValidMovesSearch};
use blocks_eval::{rank_moves, ScoringWeights};
use blocks_play::{GamePhase, GameSession};
use blocks_suggest::{TouchEvent, TouchPhase};

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct JsField {
    inner: Field,
}

#[wasm_bindgen]
impl JsField {
    #[wasm_bindgen(constructor)]
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            inner: Field::new(columns, rows),
        }
    }

    /// Rows top first, `.` for an empty cell.
    pub fn from_rows(rows: JsValue) -> Result<JsField, JsError> {
        let rows: Vec<String> = serde_wasm_bindgen::from_value(rows)?;
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        Ok(Self {
            inner: Field::from_rows(&refs),
        })
    }

    pub fn columns(&self) -> i32 {
        self.inner.num_columns()
    }

    pub fn rows(&self) -> i32 {
        self.inner.num_rows()
    }

    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        in_bounds(&self.inner, x, y) && self.inner.is_filled(x as usize, y as usize)
    }

    pub fn to_rows(&self) -> JsValue {
        to_js(&field_rows(&self.inner))
    }
}

#[derive(Serialize, Deserialize)]
pub struct JsPlacement {
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
}

impl From<Placement> for JsPlacement {
    fn from(placement: Placement) -> Self {
        Self {
            x: placement.position.x,
            y: placement.position.y,
            rotation: placement.rotation.index() as u8,
        }
    }
}

impl From<&JsPlacement> for Placement {
    fn from(js: &JsPlacement) -> Self {
        Placement::new(Position::new(js.x, js.y), Rotation::new(js.rotation))
    }
}

#[derive(Serialize, Deserialize)]
pub struct JsMoveResult {
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
    pub score: f32,
    pub reachable: bool,
    pub path: Vec<JsPlacement>,
}

/// Every landing of `piece` from its spawn, best first.
#[wasm_bindgen]
pub fn ranked_moves(field: &JsField, piece: &str, objective: u8) -> JsValue {
    let catalog = PieceCatalog::standard();
    let Some(piece) = catalog.get(piece) else {
        return JsValue::NULL;
    };
    let mut probe = field.inner.clone();
    let mut search = ValidMovesSearch::for_field(&field.inner);
    search.find_valid_moves(&field.inner, MovingPiece::spawn(piece, &field.inner), None);
    let moves = search.result_mut();
    rank_moves(&mut probe, piece, moves, objective_from_u8(objective), &ScoringWeights::default());

    let mut path = Vec::new();
    let results: Vec<JsMoveResult> = (0..moves.len())
        .map(|index| {
            moves.path(index, &mut path);
            let mv = &moves[index];
            JsMoveResult {
                x: mv.placement.position.x,
                y: mv.placement.position.y,
                rotation: mv.placement.rotation.index() as u8,
                score: mv.score,
                reachable: mv.is_reachable,
                path: path.iter().copied().map(JsPlacement::from).collect(),
            }
        })
        .collect();
    to_js(&results)
}

/// Number of placement sequences for `pieces` (names) up to `depth`.
#[wasm_bindgen]
pub fn perft(field: &JsField, pieces: JsValue, depth: u32) -> f64 {
    let catalog = PieceCatalog::standard();
    let names: Vec<String> = match serde_wasm_bindgen::from_value(pieces) {
        Ok(names) => names,
        Err(_) => return 0.0,
    };
    let queue: Option<Vec<&PieceType>> = names.iter().map(|name| catalog.get(name)).collect();
    match queue {
        Some(queue) => count_sequences(&field.inner, &queue, depth) as f64,
        None => 0.0,
    }
}

#[wasm_bindgen]
pub struct JsGameSession {
    inner: GameSession,
}

#[wasm_bindgen]
impl JsGameSession {
    /// `level` is a level config object; `weights` may be undefined.
    #[wasm_bindgen(constructor)]
    pub fn new(level: JsValue, weights: JsValue) -> Result<JsGameSession, JsError> {
        let level: LevelConfig = serde_wasm_bindgen::from_value(level)?;
        let weights: ScoringWeights = if weights.is_undefined() || weights.is_null() {
            ScoringWeights::default()
        } else {
            serde_wasm_bindgen::from_value(weights)?
        };
        let inner = GameSession::new(level, PieceCatalog::standard(), weights)?;
        Ok(Self { inner })
    }

    pub fn tick(&mut self, dt: f32) {
        self.inner.tick(dt);
    }

    pub fn phase(&self) -> String {
        phase_name(self.inner.phase()).to_string()
    }

    pub fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }

    /// 0 down, 1 left, 2 right, 3 clockwise, 4 anticlockwise.
    pub fn move_piece(&mut self, step: u8) -> bool {
        step_from_u8(step).map_or(false, |step| self.inner.move_piece(step))
    }

    pub fn select_move(&mut self, x: i32, y: i32, rotation: u8) -> bool {
        self.inner
            .select_move(Placement::new(Position::new(x, y), Rotation::new(rotation)))
    }

    pub fn play_best_move(&mut self) -> JsValue {
        match self.inner.play_best_move() {
            Some(placement) => to_js(&JsPlacement::from(placement)),
            None => JsValue::NULL,
        }
    }

    pub fn show_next_moves(&mut self) -> usize {
        self.inner.show_next_moves()
    }

    /// 0 begin, 1 moved, 2 ended, anything else cancels.
    pub fn handle_touch(&mut self, phase: u8, x: f32, y: f32) -> JsValue {
        let event = TouchEvent::new(touch_phase_from_u8(phase), (x, y));
        match self.inner.handle_touch(event) {
            Some(placement) => to_js(&JsPlacement::from(placement)),
            None => JsValue::NULL,
        }
    }

    pub fn active_placement(&self) -> JsValue {
        match self.inner.active_placement() {
            Some(placement) => to_js(&JsPlacement::from(placement)),
            None => JsValue::NULL,
        }
    }

    pub fn visible_moves(&self) -> JsValue {
        let suggester = self.inner.suggester();
        let visible: Vec<JsPlacement> = suggester
            .visible()
            .iter()
            .map(|&index| JsPlacement::from(suggester.moves()[index].placement))
            .collect();
        to_js(&visible)
    }

    pub fn field_rows(&self) -> JsValue {
        to_js(&field_rows(self.inner.field()))
    }

    pub fn drain_events(&mut self) -> JsValue {
        let events: Vec<_> = self.inner.drain_events().collect();
        to_js(&events)
    }

    pub fn stats(&self) -> JsValue {
        to_js(&self.inner.stats())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|_| JsValue::NULL)
}

fn in_bounds(field: &Field, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && x < field.num_columns() && y < field.num_rows()
}

/// Top row first, `#` filled.
fn field_rows(field: &Field) -> Vec<String> {
    (0..field.num_rows() as usize)
        .rev()
        .map(|y| {
            (0..field.num_columns() as usize)
                .map(|x| if field.is_filled(x, y) { '#' } else { '.' })
                .collect()
        })
        .collect()
}

fn objective_from_u8(value: u8) -> Objective {
    match value {
        1 => Objective::Build,
        _ => Objective::Clear,
    }
}

fn step_from_u8(value: u8) -> Option<Step> {
    match value {
        0 => Some(Step::Down),
        1 => Some(Step::Left),
        2 => Some(Step::Right),
        3 => Some(Step::RotateClockwise),
        4 => Some(Step::RotateAntiClockwise),
        _ => None,
    }
}

fn touch_phase_from_u8(value: u8) -> TouchPhase {
    match value {
        0 => TouchPhase::Begin,
        1 => TouchPhase::Moved,
        2 => TouchPhase::Ended,
        _ => TouchPhase::Other,
    }
}

fn phase_name(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Spawning => "spawning",
        GamePhase::Falling => "falling",
        GamePhase::Landing => "landing",
        GamePhase::BeingDraggedDown => "being_dragged_down",
        GamePhase::PlayingMove => "playing_move",
        GamePhase::Locked => "locked",
        GamePhase::Cascading => "cascading",
        GamePhase::GameOver => "game_over",
    }
}
