//! Play timer - elapsed game time and its `HH:MM:SS` readout.

use std::fmt;

/// Accumulates time only while the game is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayTimer {
    elapsed_ms: u64,
}

impl PlayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's worth of time unless paused
    pub fn advance(&mut self, elapsed_ms: u32, paused: bool) {
        if !paused {
            self.elapsed_ms += elapsed_ms as u64;
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whole seconds, minutes and hours
    pub fn hms(&self) -> (u64, u64, u64) {
        let total = self.elapsed_ms / 1000;
        (total / 3600, (total / 60) % 60, total % 60)
    }

    /// Final time for the result screen
    pub fn result_string(&self) -> String {
        self.to_string()
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }
}

impl fmt::Display for PlayTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{:02}:{:02}:{:02}", h, m, s)
    }
}
