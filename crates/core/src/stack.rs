//! Settled stack - the permanent record of locked cells
//!
//! Cells are kept twice: grouped by their parent piece (so the origin of every
//! cube is known) and in an occupancy map keyed by lattice coordinate (so
//! collision queries are O(1)). Per-layer counts are maintained alongside for
//! the clear pass.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::error::SimError;
use crate::types::{PieceId, PieceKind, Vec3i};

/// A locked piece and the cells it still owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledPiece {
    id: PieceId,
    kind: PieceKind,
    cells: Vec<Vec3i>,
}

impl SettledPiece {
    pub fn new(id: PieceId, kind: PieceKind, cells: Vec<Vec3i>) -> Self {
        Self { id, kind, cells }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn cells(&self) -> &[Vec3i] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettledStack {
    pieces: BTreeMap<PieceId, SettledPiece>,
    occupancy: HashMap<Vec3i, PieceId>,
    layers: BTreeMap<i32, usize>,
}

impl SettledStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Total number of settled cells
    pub fn cell_count(&self) -> usize {
        self.occupancy.len()
    }

    /// Number of parent pieces that still own at least one cell
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_occupied(&self, cell: Vec3i) -> bool {
        self.occupancy.contains_key(&cell)
    }

    /// Parent piece owning the cell at `cell`
    pub fn owner(&self, cell: Vec3i) -> Option<PieceId> {
        self.occupancy.get(&cell).copied()
    }

    pub fn piece(&self, id: PieceId) -> Option<&SettledPiece> {
        self.pieces.get(&id)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &SettledPiece> {
        self.pieces.values()
    }

    /// Every settled cell with its parent piece
    pub fn cells(&self) -> impl Iterator<Item = (Vec3i, PieceId)> + '_ {
        self.pieces
            .values()
            .flat_map(|p| p.cells.iter().map(move |&c| (c, p.id)))
    }

    /// Number of settled cells at height `y`
    pub fn layer_count(&self, y: i32) -> usize {
        self.layers.get(&y).copied().unwrap_or(0)
    }

    /// Distinct layers touched by settled pieces, highest first
    pub fn touched_layers(&self) -> Vec<i32> {
        self.layers.keys().rev().copied().collect()
    }

    /// Height of the tallest column plus one (0 when empty)
    pub fn top(&self) -> i32 {
        self.layers.keys().next_back().map_or(0, |y| y + 1)
    }

    /// Add a locked piece
    ///
    /// Fails without modifying the stack if any cell is already occupied or the
    /// piece id is already present.
    pub fn insert(&mut self, piece: SettledPiece) -> Result<(), SimError> {
        let mut seen = HashSet::with_capacity(piece.cells.len());
        for &cell in &piece.cells {
            if let Some(existing) = self.owner(cell) {
                return Err(SimError::StackIntegrity {
                    cell,
                    existing,
                    incoming: piece.id,
                });
            }
            if !seen.insert(cell) {
                return Err(SimError::StackIntegrity {
                    cell,
                    existing: piece.id,
                    incoming: piece.id,
                });
            }
        }
        if let Some(existing) = self.pieces.get(&piece.id) {
            let cell = existing.cells.first().copied().unwrap_or_default();
            return Err(SimError::StackIntegrity {
                cell,
                existing: piece.id,
                incoming: piece.id,
            });
        }

        for &cell in &piece.cells {
            self.occupy(cell, piece.id);
        }
        trace!(piece = piece.id, cells = piece.cells.len(), "settled piece");
        self.pieces.insert(piece.id, piece);
        Ok(())
    }

    fn occupy(&mut self, cell: Vec3i, owner: PieceId) {
        self.occupancy.insert(cell, owner);
        *self.layers.entry(cell.y).or_insert(0) += 1;
    }

    fn vacate(&mut self, cell: Vec3i) -> Option<PieceId> {
        let owner = self.occupancy.remove(&cell)?;
        if let Some(count) = self.layers.get_mut(&cell.y) {
            *count -= 1;
            if *count == 0 {
                self.layers.remove(&cell.y);
            }
        }
        Some(owner)
    }

    /// Delete cells, dropping any parent piece left without cells
    ///
    /// Returns the ids of the parent pieces that were dropped. Coordinates that
    /// are not occupied are ignored.
    pub fn remove_cells(&mut self, cells: &HashSet<Vec3i>) -> Vec<PieceId> {
        let mut touched = Vec::new();
        for &cell in cells {
            if let Some(owner) = self.vacate(cell) {
                if let Some(piece) = self.pieces.get_mut(&owner) {
                    piece.cells.retain(|c| *c != cell);
                }
                if !touched.contains(&owner) {
                    touched.push(owner);
                }
            }
        }

        let mut emptied = Vec::new();
        for id in touched {
            if self.pieces.get(&id).is_some_and(SettledPiece::is_empty) {
                self.pieces.remove(&id);
                emptied.push(id);
            }
        }
        emptied.sort_unstable();
        emptied
    }

    /// Move cells down by the given number of layers
    ///
    /// Every destination is checked before anything moves: landing on a
    /// stationary cell, or two cells landing on the same coordinate, is an
    /// integrity violation and leaves the stack untouched. Cells sliding into
    /// each other's old coordinates never conflict.
    pub fn shift_cells_down(&mut self, drops: &HashMap<Vec3i, i32>) -> Result<usize, SimError> {
        let mut moves = Vec::with_capacity(drops.len());
        for (&from, &dy) in drops {
            if dy == 0 {
                continue;
            }
            if let Some(owner) = self.owner(from) {
                moves.push((owner, from, Vec3i::new(from.x, from.y - dy, from.z)));
            }
        }

        let mut landing: HashMap<Vec3i, PieceId> = HashMap::with_capacity(moves.len());
        for &(owner, _, to) in &moves {
            let stationary = self
                .owner(to)
                .filter(|_| drops.get(&to).map_or(true, |&dy| dy == 0));
            if let Some(existing) = stationary.or_else(|| landing.insert(to, owner)) {
                return Err(SimError::StackIntegrity {
                    cell: to,
                    existing,
                    incoming: owner,
                });
            }
        }

        for &(_, from, _) in &moves {
            self.vacate(from);
        }
        for &(owner, from, to) in &moves {
            self.occupy(to, owner);
            if let Some(piece) = self.pieces.get_mut(&owner) {
                if let Some(slot) = piece.cells.iter_mut().find(|c| **c == from) {
                    *slot = to;
                }
            }
        }
        Ok(moves.len())
    }

    /// Check that both views of the stack agree
    pub fn verify_integrity(&self) -> Result<(), SimError> {
        let mut total = 0usize;
        for piece in self.pieces.values() {
            for &cell in &piece.cells {
                total += 1;
                match self.owner(cell) {
                    Some(owner) if owner == piece.id => {}
                    Some(existing) => {
                        return Err(SimError::StackIntegrity {
                            cell,
                            existing,
                            incoming: piece.id,
                        })
                    }
                    None => {
                        return Err(SimError::StackIntegrity {
                            cell,
                            existing: piece.id,
                            incoming: piece.id,
                        })
                    }
                }
            }
        }
        let layered: usize = self.layers.values().sum();
        if total != self.occupancy.len() || layered != total {
            let cell = self.occupancy.keys().next().copied().unwrap_or_default();
            let existing = self.owner(cell).unwrap_or_default();
            return Err(SimError::StackIntegrity {
                cell,
                existing,
                incoming: existing,
            });
        }
        Ok(())
    }

    /// Remove every settled cell
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.occupancy.clear();
        self.layers.clear();
    }
}
