//! Blocks suggest crate - ranked move lists and the buttons shown for them.

mod click_grid;
mod suggester;
mod touch;

pub use click_grid::ClickGrid;
pub use suggester::{MoveSuggester, ReachabilityDiff, VisibleMoves, MAX_VISIBLE_MOVES};
pub use touch::{TouchEvent, TouchPhase};
