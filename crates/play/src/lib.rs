//! Blocks play crate - the falling piece, landing, locking and cascades.

mod event;
mod session;

pub use event::{GameEvent, GameOverReason, SessionStats};
pub use session::{GamePhase, GameSession};
