//! Frame-stepped game loop around one field.
//!
//! The driver calls `tick` once per frame with the elapsed seconds, forwards
//! player input through the `move_piece`/`select_move`/`handle_touch`
//! methods and drains the resulting events.

use blocks_core::{
    ConfigError, ControlScheme, Field, FieldSurface, LevelConfig, PieceCatalog, PieceId, PieceType, Placement,
    Step,
};
use blocks_engine::{cascade_step, collides, lock_piece, max_cascade_passes, try_step, LockResult, MovingPiece};
use blocks_eval::ScoringWeights;
use blocks_suggest::{MoveSuggester, TouchEvent, TouchPhase, VisibleMoves};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::event::{GameEvent, GameOverReason, SessionStats};

/// Ids of locked pieces start above the range used by hand-written fields.
const FIRST_PIECE_ID: u32 = 0x4000_0000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// The next piece appears on the following tick.
    Spawning,
    Falling,
    /// Resting on something; locks when a landing timer runs out.
    Landing,
    /// Steered by a drag gesture.
    BeingDraggedDown,
    /// Following the path of a selected move.
    PlayingMove,
    /// Cells written; the next tick starts the cascade or the next piece.
    Locked,
    Cascading,
    GameOver,
}

#[derive(Clone, Debug)]
struct FallingPiece {
    piece: PieceType,
    placement: Placement,
}

#[derive(Clone, Copy, Debug, Default)]
struct LandingTimers {
    /// Since the last move while landed.
    inactivity: f32,
    /// Since first touchdown of this piece.
    total: f32,
}

#[derive(Clone, Debug)]
pub struct GameSession {
    level: LevelConfig,
    catalog: PieceCatalog,
    field: Field,
    suggester: MoveSuggester,
    phase: GamePhase,
    active: Option<FallingPiece>,
    spawn_index: usize,
    next_piece_id: u32,
    fall_progress: f32,
    landing: LandingTimers,
    drag_column: i32,
    drag_progress: f32,
    path: Vec<Placement>,
    path_cursor: usize,
    move_timer: f32,
    last_lock: LockResult,
    cascade_timer: f32,
    cascade_passes: usize,
    stats: SessionStats,
    events: SmallVec<[GameEvent; 8]>,
}

impl GameSession {
    pub fn new(level: LevelConfig, catalog: PieceCatalog, weights: ScoringWeights) -> Result<Self, ConfigError> {
        let field = level.build_field(&catalog)?;
        Ok(Self::assemble(level, catalog, weights, field))
    }

    /// Starts from a prepared field instead of an empty one.
    pub fn with_field(
        level: LevelConfig,
        catalog: PieceCatalog,
        weights: ScoringWeights,
        field: Field,
    ) -> Result<Self, ConfigError> {
        level.validate(&catalog)?;
        if field.num_columns() as usize != level.columns || field.num_rows() as usize != level.rows {
            return Err(ConfigError::FieldSize {
                columns: field.num_columns() as usize,
                rows: field.num_rows() as usize,
            });
        }
        Ok(Self::assemble(level, catalog, weights, field))
    }

    fn assemble(level: LevelConfig, catalog: PieceCatalog, weights: ScoringWeights, field: Field) -> Self {
        let suggester = MoveSuggester::for_field(&field, level.objective, weights);
        Self {
            level,
            catalog,
            field,
            suggester,
            phase: GamePhase::Spawning,
            active: None,
            spawn_index: 0,
            next_piece_id: FIRST_PIECE_ID,
            fall_progress: 0.0,
            landing: LandingTimers::default(),
            drag_column: 0,
            drag_progress: 0.0,
            path: Vec::new(),
            path_cursor: 0,
            move_timer: 0.0,
            last_lock: LockResult::default(),
            cascade_timer: 0.0,
            cascade_passes: 0,
            stats: SessionStats::default(),
            events: SmallVec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn suggester(&self) -> &MoveSuggester {
        &self.suggester
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Pieces spawned so far.
    pub fn spawn_index(&self) -> usize {
        self.spawn_index
    }

    pub fn active_piece(&self) -> Option<&PieceType> {
        self.active.as_ref().map(|active| &active.piece)
    }

    pub fn active_placement(&self) -> Option<Placement> {
        self.active.as_ref().map(|active| active.placement)
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Advances the session by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !(dt >= 0.0) {
            return;
        }
        match self.phase {
            GamePhase::Spawning => self.spawn(),
            GamePhase::Falling => self.fall(dt),
            GamePhase::Landing => self.land(dt),
            GamePhase::BeingDraggedDown => self.drag(dt),
            GamePhase::PlayingMove => self.play_move(dt),
            GamePhase::Locked => {
                if self.last_lock.removed_anything() {
                    self.cascade_timer = 0.0;
                    self.cascade_passes = 0;
                    self.phase = GamePhase::Cascading;
                } else {
                    self.spawn();
                }
            }
            GamePhase::Cascading => self.cascade(dt),
            GamePhase::GameOver => {}
        }
    }

    /// Player nudge: one elementary move of the falling or landed piece.
    pub fn move_piece(&mut self, step: Step) -> bool {
        if !matches!(self.phase, GamePhase::Falling | GamePhase::Landing) {
            return false;
        }
        if !self.apply_step(step) {
            return false;
        }
        let grounded = self.is_grounded();
        match self.phase {
            GamePhase::Landing if grounded => self.landing.inactivity = 0.0,
            GamePhase::Landing => {
                self.fall_progress = 0.0;
                self.phase = GamePhase::Falling;
            }
            GamePhase::Falling if grounded => self.enter_landing(),
            _ => {}
        }
        true
    }

    /// Plays the path to `placement` if it is a reachable move.
    pub fn select_move(&mut self, placement: Placement) -> bool {
        if !matches!(
            self.phase,
            GamePhase::Falling | GamePhase::Landing | GamePhase::BeingDraggedDown
        ) {
            return false;
        }
        let Some(active) = &self.active else {
            return false;
        };
        let moves = self.suggester.moves();
        let Some(index) = moves.find(placement) else {
            return false;
        };
        if !moves[index].is_reachable {
            return false;
        }
        moves.path(index, &mut self.path);
        self.path_cursor = usize::from(self.path.first() == Some(&active.placement));
        self.move_timer = 0.0;
        self.phase = GamePhase::PlayingMove;
        self.events.push(GameEvent::MoveSelected { placement });
        true
    }

    /// Lets the suggester choose.
    pub fn play_best_move(&mut self) -> Option<Placement> {
        let placement = self.suggester.best_move()?.placement;
        self.select_move(placement).then_some(placement)
    }

    /// Replaces the buttons on screen with the next set.
    pub fn show_next_moves(&mut self) -> usize {
        let Some(active) = &self.active else {
            return 0;
        };
        let count = self.suggester.create_new_set_of_visible_moves(&active.piece).len();
        self.events.push(GameEvent::VisibleMovesChanged { count });
        count
    }

    /// Pointer input, read according to the level's control scheme.
    /// Returns the placement a click selected.
    pub fn handle_touch(&mut self, event: TouchEvent) -> Option<Placement> {
        match self.level.control_scheme {
            ControlScheme::Click => self.handle_click(event),
            ControlScheme::Drag => {
                self.handle_drag(event);
                None
            }
        }
    }

    fn handle_click(&mut self, event: TouchEvent) -> Option<Placement> {
        if !matches!(self.phase, GamePhase::Falling | GamePhase::Landing) {
            return None;
        }
        let active = self.active.as_ref()?;
        let before = VisibleMoves::from_slice(self.suggester.visible());
        let selected = self.suggester.handle_touch(&active.piece, event);
        if self.suggester.visible() != before.as_slice() {
            let count = self.suggester.visible().len();
            self.events.push(GameEvent::VisibleMovesChanged { count });
        }
        let placement = selected?;
        self.select_move(placement).then_some(placement)
    }

    fn handle_drag(&mut self, event: TouchEvent) {
        let column = event.location.0.floor() as i32;
        match (event.phase, self.phase) {
            (TouchPhase::Begin, GamePhase::Falling | GamePhase::Landing) => {
                self.drag_column = column;
                self.drag_progress = 0.0;
                self.phase = GamePhase::BeingDraggedDown;
            }
            (TouchPhase::Moved, GamePhase::BeingDraggedDown) => self.drag_column = column,
            (TouchPhase::Ended | TouchPhase::Other, GamePhase::BeingDraggedDown) => {
                if self.is_grounded() {
                    self.enter_landing();
                } else {
                    self.fall_progress = 0.0;
                    self.phase = GamePhase::Falling;
                }
            }
            _ => {}
        }
    }

    fn spawn(&mut self) {
        let spawn_index = self.spawn_index;
        let Some(piece) = self
            .level
            .piece_name(spawn_index)
            .and_then(|name| self.catalog.get(name))
            .cloned()
        else {
            return self.game_over(GameOverReason::NoPieces);
        };
        self.spawn_index += 1;

        let placement = piece.spawn_placement(self.field.num_columns() as usize, self.field.num_rows() as usize);
        if collides(&self.field, &piece, placement) {
            return self.game_over(GameOverReason::SpawnBlocked);
        }
        let predetermined = self.level.predetermined_move(spawn_index);
        let moves = self
            .suggester
            .calculate_moves(&mut self.field, MovingPiece::new(&piece, placement), predetermined)
            .len();
        if moves == 0 {
            return self.game_over(GameOverReason::NoValidMoves);
        }
        let visible = self.suggester.create_new_set_of_visible_moves(&piece).len();

        self.events.push(GameEvent::PieceSpawned {
            spawn_index,
            piece: piece.name().to_string(),
            placement,
            moves,
        });
        self.events.push(GameEvent::VisibleMovesChanged { count: visible });
        self.active = Some(FallingPiece { piece, placement });
        self.fall_progress = 0.0;
        self.landing = LandingTimers::default();
        self.phase = GamePhase::Falling;
        if self.is_grounded() {
            self.enter_landing();
        }
    }

    fn fall(&mut self, dt: f32) {
        self.fall_progress += self.level.fall.fall_speed * dt;
        while self.fall_progress >= 1.0 {
            self.fall_progress -= 1.0;
            if !self.apply_step(Step::Down) {
                break;
            }
        }
        if self.is_grounded() {
            self.enter_landing();
        }
    }

    fn land(&mut self, dt: f32) {
        if !self.is_grounded() {
            self.fall_progress = 0.0;
            self.phase = GamePhase::Falling;
            return;
        }
        self.landing.inactivity += dt;
        self.landing.total += dt;
        let fall = &self.level.fall;
        if self.landing.inactivity >= fall.landing_inactivity_limit || self.landing.total >= fall.max_landing_time {
            self.lock_active();
        }
    }

    fn drag(&mut self, dt: f32) {
        self.drag_progress += self.level.fall.drag_speed * dt;
        while self.drag_progress >= 1.0 {
            self.drag_progress -= 1.0;
            let Some(active) = &self.active else {
                return;
            };
            let column = active.placement.position.x + active.piece.bounds(active.placement.rotation).min_col;
            let sideways = match self.drag_column.cmp(&column) {
                std::cmp::Ordering::Greater => Some(Step::Right),
                std::cmp::Ordering::Less => Some(Step::Left),
                std::cmp::Ordering::Equal => None,
            };
            if sideways.map_or(false, |step| self.apply_step(step)) {
                continue;
            }
            if !self.apply_step(Step::Down) {
                self.enter_landing();
                return;
            }
        }
    }

    fn play_move(&mut self, dt: f32) {
        let duration = self.level.fall.move_step_duration;
        self.move_timer += dt;
        while self.path_cursor < self.path.len() && self.move_timer >= duration {
            self.move_timer -= duration.max(0.0);
            let next = self.path[self.path_cursor];
            self.path_cursor += 1;
            let Some(active) = self.active.as_mut() else {
                return;
            };
            let step = Step::between(active.placement, next, active.piece.num_rotations());
            active.placement = next;
            if let Some(step) = step {
                self.events.push(GameEvent::PieceMoved { step, placement: next });
            }
        }
        if self.path_cursor >= self.path.len() {
            self.lock_active();
        }
    }

    fn cascade(&mut self, dt: f32) {
        let duration = self.level.fall.cascade_step_duration;
        self.cascade_timer += dt;
        while self.cascade_timer >= duration {
            self.cascade_timer -= duration.max(0.0);
            let pass = cascade_step(&mut self.field);
            self.cascade_passes += 1;
            self.stats.record_cascade(&pass);
            self.events.push(GameEvent::CascadeStep { pass });
            if pass.rows_cleared == 0 || self.cascade_passes >= max_cascade_passes(&self.field) {
                self.events.push(GameEvent::CascadeFinished {
                    passes: self.cascade_passes,
                });
                self.phase = GamePhase::Spawning;
                return;
            }
        }
    }

    fn lock_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let id = PieceId(self.next_piece_id);
        self.next_piece_id = self.next_piece_id.wrapping_add(1);
        let result = lock_piece(&mut self.field, &active.piece, active.placement, id);
        self.stats.record_lock(&result);
        self.events.push(GameEvent::PieceLocked {
            placement: active.placement,
            result,
        });
        self.last_lock = result;
        self.phase = GamePhase::Locked;
    }

    fn enter_landing(&mut self) {
        self.fall_progress = 0.0;
        self.landing.inactivity = 0.0;
        self.phase = GamePhase::Landing;
        if let Some(active) = &self.active {
            self.events.push(GameEvent::Landed {
                placement: active.placement,
            });
        }
    }

    fn game_over(&mut self, reason: GameOverReason) {
        self.active = None;
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver { reason });
    }

    fn is_grounded(&self) -> bool {
        self.active.as_ref().map_or(false, |active| {
            try_step(&self.field, MovingPiece::new(&active.piece, active.placement), Step::Down).is_none()
        })
    }

    /// Moves the active piece and refreshes which moves are still reachable.
    fn apply_step(&mut self, step: Step) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let Some(next) = try_step(&self.field, MovingPiece::new(&active.piece, active.placement), step) else {
            return false;
        };
        active.placement = next;
        self.events.push(GameEvent::PieceMoved { step, placement: next });

        let moving = MovingPiece::new(&active.piece, next);
        let diff = self.suggester.update_moves(&self.field, moving);
        if diff.visible_lost {
            let count = self.suggester.create_new_set_of_visible_moves(&active.piece).len();
            self.events.push(GameEvent::VisibleMovesChanged { count });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{FallConfig, Position, Rotation};

    fn level(columns: usize, rows: usize, pieces: &[&str], fall: FallConfig) -> LevelConfig {
        LevelConfig {
            columns,
            rows,
            pieces: pieces.iter().map(|name| name.to_string()).collect(),
            fall,
            ..LevelConfig::standard()
        }
    }

    fn session(level: LevelConfig) -> GameSession {
        GameSession::new(level, PieceCatalog::standard(), ScoringWeights::default()).unwrap()
    }

    fn at(x: i32, y: i32) -> Placement {
        Placement::new(Position::new(x, y), Rotation::ZERO)
    }

    #[test]
    fn test_first_tick_spawns() {
        let mut game = session(LevelConfig::standard());
        assert_eq!(game.phase(), GamePhase::Spawning);
        game.tick(0.0);
        assert_eq!(game.phase(), GamePhase::Falling);
        assert_eq!(game.active_piece().map(|piece| piece.name()), Some("I"));
        assert_eq!(game.spawn_index(), 1);

        let events: Vec<_> = game.drain_events().collect();
        assert!(matches!(
            &events[0],
            GameEvent::PieceSpawned { spawn_index: 0, piece, moves: 17, .. } if piece == "I"
        ));
        assert!(matches!(events[1], GameEvent::VisibleMovesChanged { count } if count > 0));
        assert_eq!(game.drain_events().count(), 0);
    }

    #[test]
    fn test_fall_one_row_per_second() {
        let mut game = session(level(10, 20, &["O"], FallConfig::default()));
        game.tick(0.0);
        let start = game.active_placement().unwrap();
        game.tick(0.5);
        assert_eq!(game.active_placement(), Some(start));
        game.tick(0.5);
        assert_eq!(game.active_placement().unwrap().position.y, start.position.y - 1);
        game.tick(3.0);
        assert_eq!(game.active_placement().unwrap().position.y, start.position.y - 4);
    }

    #[test]
    fn test_landing_inactivity_locks() {
        let fall = FallConfig {
            fall_speed: 100.0,
            ..FallConfig::default()
        };
        let mut game = session(level(4, 6, &["O"], fall));
        game.tick(0.0);
        game.tick(1.0);
        assert_eq!(game.phase(), GamePhase::Landing);
        assert_eq!(game.active_placement().unwrap().position.y, 0);

        game.tick(0.3);
        assert_eq!(game.phase(), GamePhase::Landing);
        game.tick(0.3);
        assert_eq!(game.phase(), GamePhase::Locked);
        assert_eq!(game.field().filled_cell_count(), 4);

        game.tick(0.0);
        assert_eq!(game.phase(), GamePhase::Falling);
        assert_eq!(game.stats().pieces_locked, 1);
    }

    #[test]
    fn test_max_landing_time_is_not_reset_by_moves() {
        let fall = FallConfig {
            fall_speed: 100.0,
            ..FallConfig::default()
        };
        let mut game = session(level(6, 6, &["O"], fall));
        game.tick(0.0);
        game.tick(1.0);
        assert_eq!(game.phase(), GamePhase::Landing);

        let mut elapsed = 0.0;
        let mut right = true;
        while game.phase() == GamePhase::Landing {
            let step = if right { Step::Right } else { Step::Left };
            assert!(game.move_piece(step));
            right = !right;
            game.tick(0.4);
            elapsed += 0.4;
            assert!(elapsed < 2.5, "never locked");
        }
        assert_eq!(game.phase(), GamePhase::Locked);
        assert!(elapsed >= 2.0);
    }

    #[test]
    fn test_moving_off_a_ledge_falls_again() {
        let field = Field::from_rows(&["......", "......", "......", "......", "aa....", "aa...."]);
        let fall = FallConfig {
            fall_speed: 100.0,
            ..FallConfig::default()
        };
        let level = level(6, 6, &["O"], fall);
        let mut game = GameSession::with_field(level, PieceCatalog::standard(), ScoringWeights::default(), field).unwrap();
        game.tick(0.0);
        assert!(game.move_piece(Step::Left));
        assert!(game.move_piece(Step::Left));
        game.tick(1.0);
        assert_eq!(game.phase(), GamePhase::Landing);
        assert_eq!(game.active_placement(), Some(at(0, 2)));

        assert!(game.move_piece(Step::Right));
        assert_eq!(game.phase(), GamePhase::Landing);
        assert!(game.move_piece(Step::Right));
        assert_eq!(game.phase(), GamePhase::Falling);
        game.tick(1.0);
        assert_eq!(game.active_placement(), Some(at(2, 0)));
    }

    #[test]
    fn test_selected_move_plays_path_then_locks() {
        let mut game = session(level(10, 20, &["O"], FallConfig::no_fall()));
        game.tick(0.0);
        game.drain_events().for_each(drop);
        assert!(game.select_move(at(0, 0)));
        assert_eq!(game.phase(), GamePhase::PlayingMove);
        assert!(!game.move_piece(Step::Left));

        for _ in 0..100 {
            if game.phase() != GamePhase::PlayingMove {
                break;
            }
            game.tick(0.04);
        }
        assert_eq!(game.phase(), GamePhase::Locked);
        assert_eq!(game.field().get(0, 0), game.field().get(1, 1));
        assert!(game.field().is_filled(0, 0));

        let events: Vec<_> = game.drain_events().collect();
        assert_eq!(events[0], GameEvent::MoveSelected { placement: at(0, 0) });
        assert!(matches!(events.last(), Some(GameEvent::PieceLocked { placement, .. }) if *placement == at(0, 0)));
        let steps = events
            .iter()
            .filter(|event| matches!(event, GameEvent::PieceMoved { .. }))
            .count();
        assert_eq!(steps, 4 + 18);
    }

    #[test]
    fn test_unknown_or_unreachable_selection_is_refused() {
        let mut game = session(level(10, 20, &["O"], FallConfig::no_fall()));
        game.tick(0.0);
        assert!(!game.select_move(at(0, 5)));
        assert_eq!(game.phase(), GamePhase::Falling);
    }

    #[test]
    fn test_lock_clears_rows_and_cascades() {
        let field = Field::from_rows(&["....", "....", "....", "aa..", "....", "bb.."]);
        let fall = FallConfig {
            move_step_duration: 0.0,
            cascade_step_duration: 0.1,
            ..FallConfig::no_fall()
        };
        let level = level(4, 6, &["O"], fall);
        let mut game = GameSession::with_field(level, PieceCatalog::standard(), ScoringWeights::default(), field).unwrap();
        game.tick(0.0);
        assert!(game.select_move(at(2, 0)));
        game.tick(0.0);
        assert_eq!(game.phase(), GamePhase::Locked);
        game.tick(0.0);
        assert_eq!(game.phase(), GamePhase::Cascading);

        game.tick(0.05);
        assert_eq!(game.phase(), GamePhase::Cascading);
        game.tick(0.05);
        game.tick(0.1);
        assert_eq!(game.phase(), GamePhase::Spawning);
        assert_eq!(game.field().filled_cell_count(), 0);
        assert_eq!(game.stats().rows_cleared, 2);

        let passes: Vec<_> = game
            .drain_events()
            .filter_map(|event| match event {
                GameEvent::CascadeStep { pass } => Some(pass.rows_cleared),
                _ => None,
            })
            .collect();
        assert_eq!(passes, vec![1, 0]);
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let field = Field::from_rows(&["..aa..", "......", "......", "......"]);
        let level = level(6, 4, &["O"], FallConfig::default());
        let mut game = GameSession::with_field(level, PieceCatalog::standard(), ScoringWeights::default(), field).unwrap();
        game.tick(0.0);
        assert!(game.is_game_over());
        assert!(game
            .drain_events()
            .any(|event| event == GameEvent::GameOver { reason: GameOverReason::SpawnBlocked }));
        game.tick(1.0);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_turned_piece_locks_where_selected() {
        let mut game = session(level(10, 20, &["I"], FallConfig::no_fall()));
        game.tick(0.0);
        for _ in 0..3 {
            assert!(game.move_piece(Step::Down));
        }
        game.move_piece(Step::RotateClockwise);
        game.move_piece(Step::RotateClockwise);
        game.drain_events().for_each(drop);

        let selected = game.play_best_move().unwrap();
        for _ in 0..200 {
            if game.phase() != GamePhase::PlayingMove {
                break;
            }
            game.tick(0.04);
        }
        assert_eq!(game.phase(), GamePhase::Locked);
        let events: Vec<_> = game.drain_events().collect();
        assert_eq!(events[0], GameEvent::MoveSelected { placement: selected });
        assert!(matches!(
            events.last(),
            Some(GameEvent::PieceLocked { placement, .. }) if *placement == selected
        ));
    }

    #[test]
    fn test_predetermined_move_is_the_best_move() {
        let mut config = level(10, 20, &["O", "T"], FallConfig::no_fall());
        config.predetermined_moves = vec![Some(at(8, 0))];
        let mut game = session(config);
        game.tick(0.0);
        assert_eq!(game.suggester().visible().len(), 1);
        assert_eq!(game.play_best_move(), Some(at(8, 0)));
    }

    #[test]
    fn test_config_errors_surface() {
        let bad = level(10, 20, &["Q"], FallConfig::default());
        assert!(matches!(
            GameSession::new(bad, PieceCatalog::standard(), ScoringWeights::default()),
            Err(ConfigError::UnknownPiece(name)) if name == "Q"
        ));
        let mismatch = GameSession::with_field(
            level(10, 20, &["O"], FallConfig::default()),
            PieceCatalog::standard(),
            ScoringWeights::default(),
            Field::new(6, 6),
        );
        assert!(mismatch.is_err());
    }
}
