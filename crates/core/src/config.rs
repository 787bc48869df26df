//! Simulation configuration.

use serde::Serialize;

use crate::error::ConfigError;
use crate::pieces::cells_at;
use crate::playfield::Playfield;
use crate::types::{Orientation, PieceKind, Vec3i, FALL_SPAN_MS, SPAWN_POSITION};

/// Farthest a cube gets from its pivot in any orientation
const PIECE_REACH: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimConfig {
    pub playfield: Playfield,
    /// Lattice coordinate of each new piece's pivot
    pub spawn: Vec3i,
    /// Milliseconds between gravity steps
    pub fall_span_ms: u32,
    /// Seed of the random piece generator
    pub seed: u32,
}

impl SimConfig {
    /// Config for a custom stage; the spawn point is centred on it one cell
    /// below the top. Stages too narrow for the catalog fail [`Self::validate`].
    pub fn with_playfield(playfield: Playfield) -> Self {
        let spawn = Vec3i::new(
            (playfield.width() - 1) / 2,
            (playfield.height() - 2).max(0),
            0,
        );
        Self {
            playfield,
            spawn,
            ..Self::default()
        }
    }

    /// Check that the stage is in range and every catalog shape spawns inside it
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.playfield;
        let scale = field.scale();
        let in_range = field.width().checked_mul(field.depth()).is_some()
            && [
                field.width(),
                field.depth(),
                field.height(),
                self.spawn.x,
                self.spawn.y,
                self.spawn.z,
            ]
            .into_iter()
            .all(|v| fits_world(v, scale));
        if !in_range {
            return Err(ConfigError::StageTooLarge {
                width: field.width(),
                depth: field.depth(),
                height: field.height(),
                scale,
            });
        }

        for kind in PieceKind::ALL {
            let cells = cells_at(kind, self.spawn, Orientation::IDENTITY);
            if !cells.iter().all(|&c| field.contains(c)) {
                return Err(ConfigError::SpawnOutsideStage {
                    kind,
                    spawn: self.spawn,
                });
            }
        }
        Ok(())
    }
}

/// A lattice coordinate plus piece reach still converts to world units
fn fits_world(v: i32, scale: i32) -> bool {
    v.checked_abs()
        .and_then(|v| v.checked_add(PIECE_REACH))
        .and_then(|v| v.checked_mul(scale))
        .is_some()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            spawn: SPAWN_POSITION,
            fall_span_ms: FALL_SPAN_MS,
            seed: 1,
        }
    }
}
