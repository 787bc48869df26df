//! Pause state queried by the simulation every tick.

use crate::types::GameAction;

/// Anything that can tell the simulation to hold still
pub trait PauseSource {
    fn is_paused(&self) -> bool;
}

impl PauseSource for bool {
    fn is_paused(&self) -> bool {
        *self
    }
}

/// What a pause-related action asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseRequest {
    None,
    Paused,
    Resumed,
    /// Leave the game for the title screen
    ReturnToStart,
}

/// Pause toggled by the pause key; "return to start" only works while paused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseToggle {
    paused: bool,
}

impl PauseToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, action: GameAction) -> PauseRequest {
        match action {
            GameAction::Pause => {
                self.paused = !self.paused;
                if self.paused {
                    PauseRequest::Paused
                } else {
                    PauseRequest::Resumed
                }
            }
            GameAction::ReturnToStart if self.paused => {
                self.paused = false;
                PauseRequest::ReturnToStart
            }
            _ => PauseRequest::None,
        }
    }
}

impl PauseSource for PauseToggle {
    fn is_paused(&self) -> bool {
        self.paused
    }
}
