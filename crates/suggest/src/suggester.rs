use blocks_core::{FieldSurface, Objective, PieceType, Placement, Step};
use blocks_engine::{Move, MovingPiece, ValidMoves, ValidMovesSearch};
use blocks_eval::{rank_moves, ScoringWeights};
use smallvec::SmallVec;

use crate::click_grid::ClickGrid;
use crate::touch::{TouchEvent, TouchPhase};

/// Most buttons shown at once.
pub const MAX_VISIBLE_MOVES: usize = 20;

pub type VisibleMoves = SmallVec<[usize; MAX_VISIBLE_MOVES]>;

/// Outcome of re-checking reachability as the piece falls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachabilityDiff {
    /// Moves (by index) that were reachable before and are not anymore.
    pub lost: SmallVec<[usize; 8]>,
    /// Moves that became reachable again.
    pub regained: SmallVec<[usize; 8]>,
    /// A currently visible move is among `lost`.
    pub visible_lost: bool,
}

impl ReachabilityDiff {
    pub fn is_empty(&self) -> bool {
        self.lost.is_empty() && self.regained.is_empty()
    }
}

/// Ranked moves for the current piece plus the subset shown as buttons.
///
/// The move list keeps its order for the lifetime of a piece; later
/// searches only refresh paths and reachability.
#[derive(Clone, Debug)]
pub struct MoveSuggester {
    search: ValidMovesSearch,
    moves: ValidMoves,
    visible: VisibleMoves,
    click_grid: ClickGrid,
    objective: Objective,
    weights: ScoringWeights,
    armed: Option<u8>,
}

impl MoveSuggester {
    pub fn new(columns: usize, rows: usize, objective: Objective, weights: ScoringWeights) -> Self {
        Self {
            search: ValidMovesSearch::new(columns, rows),
            moves: ValidMoves::for_field(columns, rows),
            visible: VisibleMoves::new(),
            click_grid: ClickGrid::new(columns, rows),
            objective,
            weights,
            armed: None,
        }
    }

    pub fn for_field(field: &impl FieldSurface, objective: Objective, weights: ScoringWeights) -> Self {
        Self::new(
            field.num_columns().max(0) as usize,
            field.num_rows().max(0) as usize,
            objective,
            weights,
        )
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn moves(&self) -> &ValidMoves {
        &self.moves
    }

    /// Indices into `moves()` of the buttons on screen, by button number.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn click_grid(&self) -> &ClickGrid {
        &self.click_grid
    }

    pub fn armed_button(&self) -> Option<u8> {
        self.armed
    }

    /// Searches and ranks the moves for a freshly spawned piece. Clears the
    /// visible set.
    pub fn calculate_moves<F>(
        &mut self,
        field: &mut F,
        piece: MovingPiece<'_>,
        predetermined: Option<Placement>,
    ) -> &ValidMoves
    where
        F: FieldSurface,
    {
        self.search.find_valid_moves(&*field, piece, predetermined);
        std::mem::swap(&mut self.moves, self.search.result_mut());
        rank_moves(field, piece.piece, &mut self.moves, self.objective, &self.weights);
        self.visible.clear();
        self.click_grid.clear();
        self.armed = None;
        &self.moves
    }

    /// Re-searches from where the piece is now and refreshes each move's
    /// reachability and path. Order and scores stay as ranked; a move may
    /// switch to a twin placement covering the same cells.
    pub fn update_moves(&mut self, field: &impl FieldSurface, piece: MovingPiece<'_>) -> ReachabilityDiff {
        self.search.find_valid_moves(field, piece, None);
        self.moves.swap_arena(self.search.result_mut());
        let forced = self.moves.predetermined();

        let mut diff = ReachabilityDiff::default();
        for index in 0..self.moves.len() {
            let placement = self.moves[index].placement;
            // The new search may reach a twin with the same cells first; the
            // move then takes over the twin's placement so the path ends on it.
            let found = self.search.found_move(placement).map(|i| {
                let twin = &self.search.result()[i];
                (twin.placement, twin.path)
            });
            let was_reachable = self.moves[index].is_reachable;
            let (placement, path) = match found {
                Some(found) => found,
                // Unreachable paths degrade to the bare landing; the forced
                // move stays selectable.
                None => (placement, self.moves.arena_mut().push(placement, None)),
            };
            let reachable = found.is_some() || forced == Some(index);

            let mv = &mut self.moves[index];
            mv.placement = placement;
            mv.path = path;
            mv.is_reachable = reachable;
            match (was_reachable, reachable) {
                (true, false) => {
                    diff.visible_lost |= mv.button.is_some();
                    diff.lost.push(index);
                }
                (false, true) => diff.regained.push(index),
                _ => {}
            }
        }
        diff
    }

    /// Picks the next set of non-overlapping buttons, best first, skipping
    /// moves already shown. Once everything reachable has been shown the
    /// rotation starts over.
    pub fn create_new_set_of_visible_moves(&mut self, piece: &PieceType) -> &[usize] {
        for &index in &self.visible {
            self.moves[index].button = None;
        }
        self.visible.clear();
        self.click_grid.clear();
        self.armed = None;

        if let Some(index) = self.moves.predetermined() {
            self.show(piece, index);
            return &self.visible;
        }

        if !self.select_pass(piece) && self.moves.iter().any(|mv| mv.is_reachable) {
            for mv in self.moves.as_mut_slice() {
                mv.is_shown = false;
            }
            self.select_pass(piece);
        }
        &self.visible
    }

    fn select_pass(&mut self, piece: &PieceType) -> bool {
        for index in 0..self.moves.len() {
            if self.visible.len() == MAX_VISIBLE_MOVES {
                break;
            }
            let mv = &self.moves[index];
            if mv.is_shown || !mv.is_reachable {
                continue;
            }
            if self.click_grid.fits(piece, mv.placement) {
                self.show(piece, index);
            }
        }
        !self.visible.is_empty()
    }

    fn show(&mut self, piece: &PieceType, index: usize) {
        let button = self.visible.len() as u8;
        self.click_grid.occupy(piece, self.moves[index].placement, button);
        let mv = &mut self.moves[index];
        mv.is_shown = true;
        mv.button = Some(button);
        self.visible.push(index);
    }

    /// Move behind a visible button.
    pub fn button_move(&self, button: u8) -> Option<&Move> {
        self.visible
            .get(button as usize)
            .and_then(|&index| self.moves.get(index))
    }

    /// Highest-ranked reachable move; the forced move when there is one.
    pub fn best_move(&self) -> Option<&Move> {
        if let Some(index) = self.moves.predetermined() {
            return self.moves.get(index);
        }
        self.moves.iter().find(|mv| mv.is_reachable)
    }

    pub fn path_to(&self, placement: Placement, out: &mut Vec<Placement>) -> bool {
        match self.moves.find(placement) {
            Some(index) => {
                self.moves.path(index, out);
                true
            }
            None => {
                out.clear();
                false
            }
        }
    }

    pub fn steps_to(&self, placement: Placement, rotation_count: usize, out: &mut Vec<Step>) -> bool {
        match self.moves.find(placement) {
            Some(index) => {
                self.moves.steps(index, rotation_count, out);
                true
            }
            None => {
                out.clear();
                false
            }
        }
    }

    /// Press, drag and release over the buttons. A release on the button
    /// that was pressed selects its move; a tap on empty space shows the
    /// next set of buttons.
    pub fn handle_touch(&mut self, piece: &PieceType, event: TouchEvent) -> Option<Placement> {
        let (x, y) = event.location;
        let hit = self.click_grid.button_at(x, y);
        match event.phase {
            TouchPhase::Begin => self.armed = hit,
            TouchPhase::Moved => {
                if self.armed != hit {
                    self.armed = None;
                }
            }
            TouchPhase::Ended => match (self.armed.take(), hit) {
                (Some(armed), Some(released)) if armed == released => {
                    return self
                        .button_move(armed)
                        .filter(|mv| mv.is_reachable)
                        .map(|mv| mv.placement);
                }
                (None, None) => {
                    self.create_new_set_of_visible_moves(piece);
                }
                _ => {}
            },
            TouchPhase::Other => self.armed = None,
        }
        None
    }
}
