use blocks_core::{Placement, Step};
use blocks_engine::{CascadePass, LockResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// The new piece overlaps the field where it appears.
    SpawnBlocked,
    /// The new piece has nowhere to land.
    NoValidMoves,
    /// The level names no piece to spawn.
    NoPieces,
}

/// Everything the session reports to whoever drives it, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PieceSpawned {
        spawn_index: usize,
        piece: String,
        placement: Placement,
        moves: usize,
    },
    PieceMoved {
        step: Step,
        placement: Placement,
    },
    /// The buttons on screen were replaced.
    VisibleMovesChanged {
        count: usize,
    },
    Landed {
        placement: Placement,
    },
    MoveSelected {
        placement: Placement,
    },
    PieceLocked {
        placement: Placement,
        result: LockResult,
    },
    CascadeStep {
        pass: CascadePass,
    },
    CascadeFinished {
        passes: usize,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub pieces_locked: u32,
    pub rows_cleared: u32,
    pub cells_exploded: u32,
    pub cascade_passes: u32,
}

impl SessionStats {
    pub fn record_lock(&mut self, result: &LockResult) {
        self.pieces_locked += 1;
        self.rows_cleared += result.rows_cleared as u32;
        self.cells_exploded += result.cells_exploded as u32;
    }

    pub fn record_cascade(&mut self, pass: &CascadePass) {
        self.cascade_passes += 1;
        self.rows_cleared += pass.rows_cleared as u32;
    }
}
