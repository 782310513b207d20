use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Begin,
    Moved,
    Ended,
    /// Cancelled or otherwise interrupted.
    Other,
}

/// A pointer event; `location` is in field cell units, origin at the
/// bottom-left of the field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub location: (f32, f32),
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, location: (f32, f32)) -> Self {
        Self { phase, location }
    }
}
