//! Pieces module - catalog of piece shapes
//!
//! Every shape is four unit cubes given as lattice offsets from the pivot cell.
//! The pivot is always one of the cubes (offset `(0, 0, 0)`), so rotating about
//! it keeps the piece anchored where the player expects.

use crate::types::{Orientation, PieceKind, Vec3i, PIECE_CELLS};

/// Offset of a single cube relative to the piece pivot
pub type CellOffset = Vec3i;

/// Shape of a piece - four cube offsets from the pivot
pub type PieceShape = [CellOffset; PIECE_CELLS];

const fn v(x: i32, y: i32) -> Vec3i {
    Vec3i::new(x, y, 0)
}

/// Get the spawn shape (unrotated offsets) for a piece kind
pub fn get_shape(kind: PieceKind) -> PieceShape {
    match kind {
        // Horizontal bar
        PieceKind::I => [v(-1, 0), v(0, 0), v(1, 0), v(2, 0)],
        // 2x2 square
        PieceKind::O => [v(0, 0), v(1, 0), v(0, 1), v(1, 1)],
        PieceKind::T => [v(-1, 0), v(0, 0), v(1, 0), v(0, 1)],
        PieceKind::S => [v(-1, 0), v(0, 0), v(0, 1), v(1, 1)],
        PieceKind::Z => [v(0, 0), v(1, 0), v(-1, 1), v(0, 1)],
        PieceKind::J => [v(-1, 1), v(-1, 0), v(0, 0), v(1, 0)],
        PieceKind::L => [v(-1, 0), v(0, 0), v(1, 0), v(1, 1)],
    }
}

/// Offsets of a piece kind after applying an orientation
pub fn rotated_shape(kind: PieceKind, orientation: Orientation) -> PieceShape {
    get_shape(kind).map(|offset| orientation.apply(offset))
}

/// Lattice cells a piece occupies at `pivot` with `orientation`
pub fn cells_at(kind: PieceKind, pivot: Vec3i, orientation: Orientation) -> PieceShape {
    rotated_shape(kind, orientation).map(|offset| pivot + offset)
}
