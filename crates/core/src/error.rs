//! Fatal simulation errors.
//!
//! Illegal piece positions never show up here: they are rolled back inside the
//! tick. These are the conditions that stop the tick loop and end the game,
//! plus the configuration errors that keep it from starting.

use thiserror::Error;

use crate::types::{PieceId, PieceKind, Vec3i};

/// A stage or spawn point the simulation cannot run on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Stage dimensions whose lattice or world coordinates overflow `i32`.
    #[error("stage {width}x{depth}x{height} at scale {scale} is too large")]
    StageTooLarge {
        width: i32,
        depth: i32,
        height: i32,
        scale: i32,
    },

    /// A catalog shape sticks out of the stage at the spawn point.
    #[error("piece {kind:?} does not fit inside the stage when spawned at {spawn:?}")]
    SpawnOutsideStage { kind: PieceKind, spawn: Vec3i },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The spawn cells of the next piece are already occupied.
    #[error("spawn point {at:?} is already occupied")]
    SpawnBlocked { at: Vec3i },

    /// Two settled cells claim the same lattice coordinate.
    #[error("settled cell {cell:?} already belongs to piece {existing}, cannot add it for piece {incoming}")]
    StackIntegrity {
        cell: Vec3i,
        existing: PieceId,
        incoming: PieceId,
    },

    /// The game was started with an unusable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The simulation stopped after an earlier fatal error.
    #[error("simulation halted after a fatal error")]
    Halted,
}

impl SimError {
    /// Spawn failures are the normal way a game ends.
    pub fn is_game_over(&self) -> bool {
        matches!(self, SimError::SpawnBlocked { .. })
    }
}
