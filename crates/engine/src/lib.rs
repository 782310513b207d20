//! blocks-engine - reachable-placement search and field simulation.
//!
//! Finds every landing a piece can reach with a replayable path, brackets
//! hypothetical landings for scoring and settles real ones.

pub mod collision;
pub mod landing;
pub mod lock;
pub mod movement;
pub mod perft;
pub mod replay;
pub mod search;
pub mod search_grid;
pub mod valid_moves;

pub use collision::{can_place, collides, drop_y, try_step, MovingPiece};
pub use landing::with_landed_piece;
pub use lock::{
    cascade_step, lock_and_settle, lock_piece, max_cascade_passes, resolve_cascade, CascadePass, LockResult,
};
pub use movement::{Movement, MovementArena, MovementHandle};
pub use perft::{perft, perft_cached, perft_parallel, PerftCache};
pub use replay::{replay_path, ReplayError};
pub use search::ValidMovesSearch;
pub use search_grid::{SearchDataForOneRotation, SearchGrid};
pub use valid_moves::{Move, ValidMoves};
