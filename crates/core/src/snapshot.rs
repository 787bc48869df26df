//! Serializable view of the simulation for hosts and observers.

use std::fmt::Write as _;

use serde::Serialize;

use crate::piece::PiecePhase;
use crate::types::{Orientation, PieceId, PieceKind, Vec3i};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSnapshot {
    pub id: PieceId,
    pub kind: PieceKind,
    pub pivot: Vec3i,
    /// Pivot in world units
    pub world_position: Vec3i,
    pub orientation: Orientation,
    pub phase: PiecePhase,
    pub cells: Vec<Vec3i>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettledCellSnapshot {
    pub cell: Vec3i,
    pub parent: PieceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerSnapshot {
    pub y: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub width: i32,
    pub depth: i32,
    pub height: i32,
    pub footprint: usize,
    pub active: Option<ActiveSnapshot>,
    /// Settled cells ordered by (y, z, x)
    pub settled: Vec<SettledCellSnapshot>,
    /// Occupied layers, lowest first
    pub layers: Vec<LayerSnapshot>,
    pub pieces_locked: u32,
    pub layers_cleared: u32,
    pub elapsed: String,
    pub started: bool,
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.started && !self.game_over && !self.paused
    }

    /// One-line status for the terminal runner
    pub fn status_line(&self) -> String {
        let mut line = String::with_capacity(96);
        let _ = write!(line, "time {}", self.elapsed);
        match &self.active {
            Some(active) => {
                let _ = write!(
                    line,
                    " | {} at ({}, {}, {})",
                    active.kind.as_str(),
                    active.pivot.x,
                    active.pivot.y,
                    active.pivot.z
                );
            }
            None => line.push_str(" | no piece"),
        }
        let _ = write!(
            line,
            " | locked {} | cleared {} | cells {}",
            self.pieces_locked,
            self.layers_cleared,
            self.settled.len()
        );
        if self.paused {
            line.push_str(" | PAUSED");
        }
        if self.game_over {
            line.push_str(" | GAME OVER");
        }
        line
    }

    /// Layer fill as `y:count/footprint`, highest first
    pub fn layer_summary(&self) -> String {
        let mut out = String::new();
        for layer in self.layers.iter().rev() {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}:{}/{}", layer.y, layer.count, self.footprint);
        }
        out
    }
}
