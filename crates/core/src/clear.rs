//! Layer clear & collapse.
//!
//! Runs once after every lock-in. Full layers are found against a snapshot of
//! the stack taken before anything moves, processed from the highest layer to
//! the lowest:
//!
//! - every cell of a full layer is marked for deletion
//! - every cell strictly above it that is not marked for deletion gets one
//!   more layer of downward shift
//!
//! Deletions are applied first, then all shifts at once. A cell above k
//! cleared layers therefore ends up exactly k layers lower, and nothing below
//! the lowest cleared layer moves.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::SimError;
use crate::playfield::Playfield;
use crate::stack::SettledStack;
use crate::types::{PieceId, Vec3i};

/// What one clear pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Pre-clear Y of every cleared layer, highest first
    pub cleared_layers: Vec<i32>,
    pub cells_removed: usize,
    pub cells_shifted: usize,
    /// Parent pieces dropped because all their cells were cleared
    pub emptied_pieces: Vec<PieceId>,
}

impl ClearReport {
    pub fn is_empty(&self) -> bool {
        self.cleared_layers.is_empty()
    }
}

/// Layers whose occupied count equals the footprint, highest first
pub fn full_layers(stack: &SettledStack, field: &Playfield) -> Vec<i32> {
    let footprint = field.footprint();
    stack
        .touched_layers()
        .into_iter()
        .filter(|&y| stack.layer_count(y) == footprint)
        .collect()
}

/// Clear every full layer and collapse the cells above
pub fn clear_and_collapse(
    stack: &mut SettledStack,
    field: &Playfield,
) -> Result<ClearReport, SimError> {
    let cleared_layers = full_layers(stack, field);
    if cleared_layers.is_empty() {
        return Ok(ClearReport::default());
    }

    let snapshot: Vec<Vec3i> = stack.cells().map(|(cell, _)| cell).collect();
    let mut doomed: HashSet<Vec3i> = HashSet::new();
    let mut drops: HashMap<Vec3i, i32> = HashMap::new();

    for &layer in &cleared_layers {
        for &cell in &snapshot {
            if cell.y == layer {
                doomed.insert(cell);
                drops.remove(&cell);
            } else if cell.y > layer && !doomed.contains(&cell) {
                *drops.entry(cell).or_insert(0) += 1;
            }
        }
    }

    let emptied_pieces = stack.remove_cells(&doomed);
    let cells_shifted = stack.shift_cells_down(&drops)?;

    let report = ClearReport {
        cleared_layers,
        cells_removed: doomed.len(),
        cells_shifted,
        emptied_pieces,
    };
    debug!(
        layers = ?report.cleared_layers,
        removed = report.cells_removed,
        shifted = report.cells_shifted,
        "layers cleared"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::SettledPiece;
    use crate::types::PieceKind;

    fn fill_layer(stack: &mut SettledStack, field: &Playfield, y: i32, id: PieceId) {
        let cells = field.layer_cells(y).collect();
        stack
            .insert(SettledPiece::new(id, PieceKind::O, cells))
            .unwrap();
    }

    #[test]
    fn test_no_full_layers_is_a_no_op() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        stack
            .insert(SettledPiece::new(1, PieceKind::I, vec![Vec3i::new(0, 0, 0)]))
            .unwrap();
        let before = stack.clone();

        let report = clear_and_collapse(&mut stack, &field).unwrap();
        assert!(report.is_empty());
        assert_eq!(stack, before);
    }

    #[test]
    fn test_single_layer_clear_drops_cells_above() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        fill_layer(&mut stack, &field, 0, 1);
        stack
            .insert(SettledPiece::new(
                2,
                PieceKind::I,
                vec![Vec3i::new(1, 1, 1), Vec3i::new(1, 2, 1)],
            ))
            .unwrap();

        let report = clear_and_collapse(&mut stack, &field).unwrap();
        assert_eq!(report.cleared_layers, vec![0]);
        assert_eq!(report.cells_removed, 16);
        assert_eq!(report.cells_shifted, 2);
        assert_eq!(report.emptied_pieces, vec![1]);
        assert_eq!(stack.piece_count(), 1);
        assert!(stack.is_occupied(Vec3i::new(1, 0, 1)));
        assert!(stack.is_occupied(Vec3i::new(1, 1, 1)));
        assert!(!stack.is_occupied(Vec3i::new(1, 2, 1)));
        assert!(stack.verify_integrity().is_ok());
    }

    #[test]
    fn test_two_separated_layers_shift_by_count_below() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        fill_layer(&mut stack, &field, 1, 1);
        fill_layer(&mut stack, &field, 3, 2);
        stack
            .insert(SettledPiece::new(
                3,
                PieceKind::J,
                vec![
                    Vec3i::new(0, 0, 0),
                    Vec3i::new(0, 2, 0),
                    Vec3i::new(0, 4, 0),
                    Vec3i::new(0, 5, 0),
                ],
            ))
            .unwrap();

        let report = clear_and_collapse(&mut stack, &field).unwrap();
        assert_eq!(report.cleared_layers, vec![3, 1]);
        assert_eq!(report.cells_removed, 32);
        assert_eq!(report.cells_shifted, 3);

        let mut ys: Vec<_> = stack.piece(3).unwrap().cells().iter().map(|c| c.y).collect();
        ys.sort_unstable();
        // y0 stays, y2 -> 1, y4 -> 2, y5 -> 3
        assert_eq!(ys, vec![0, 1, 2, 3]);
        assert!(stack.verify_integrity().is_ok());
    }

    #[test]
    fn test_adjacent_full_layers_clear_together() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        fill_layer(&mut stack, &field, 0, 1);
        fill_layer(&mut stack, &field, 1, 2);
        stack
            .insert(SettledPiece::new(3, PieceKind::O, vec![Vec3i::new(2, 2, 3)]))
            .unwrap();

        let report = clear_and_collapse(&mut stack, &field).unwrap();
        assert_eq!(report.cleared_layers, vec![1, 0]);
        assert_eq!(report.emptied_pieces, vec![1, 2]);
        assert_eq!(stack.cell_count(), 1);
        assert!(stack.is_occupied(Vec3i::new(2, 0, 3)));
    }

    #[test]
    fn test_layer_missing_one_cell_is_kept() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        let cells: Vec<_> = field
            .layer_cells(0)
            .filter(|c| *c != Vec3i::new(3, 0, 3))
            .collect();
        stack
            .insert(SettledPiece::new(1, PieceKind::O, cells))
            .unwrap();

        assert!(full_layers(&stack, &field).is_empty());
        let report = clear_and_collapse(&mut stack, &field).unwrap();
        assert!(report.is_empty());
        assert_eq!(stack.layer_count(0), 15);
    }
}
