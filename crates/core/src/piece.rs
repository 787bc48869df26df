//! Active falling piece.
//!
//! A [`Piece`] is a rigid group of four cubes around a pivot. Every accepted
//! mutation changes the transform immediately and records what caused it; the
//! last confirmed legal transform is kept for rollback until the resolver
//! confirms or reverts the move.

use serde::Serialize;

use crate::pieces::{cells_at, PieceShape};
use crate::stack::SettledPiece;
use crate::types::{
    Axis, InputDirection, Orientation, PieceId, PieceKind, RotationStep, Vec3i,
};

/// Lifecycle of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PiecePhase {
    /// Accepting gravity and player input
    Falling,
    /// Contacts are being resolved; all requests are rejected
    Colliding,
    /// Locked in; waiting to be committed to the settled stack
    Locked,
}

/// Pivot position plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Transform {
    pub pivot: Vec3i,
    pub orientation: Orientation,
}

/// What produced the current, not yet confirmed, transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionCause {
    /// Direction key in effect (`None` for gravity and pure rotation)
    pub direction: InputDirection,
    /// Set when the move was a rotation
    pub rotated: bool,
    /// Set when the move was a gravity step
    pub gravity: bool,
}

impl MotionCause {
    pub fn is_idle(&self) -> bool {
        *self == MotionCause::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    transform: Transform,
    safe: Transform,
    scale: i32,
    phase: PiecePhase,
    cause: MotionCause,
}

impl Piece {
    /// Create a piece at `pivot` in its spawn orientation
    pub fn new(id: PieceId, kind: PieceKind, pivot: Vec3i, scale: i32) -> Self {
        let transform = Transform {
            pivot,
            orientation: Orientation::IDENTITY,
        };
        Self {
            id,
            kind,
            transform,
            safe: transform,
            scale,
            phase: PiecePhase::Falling,
            cause: MotionCause::default(),
        }
    }

    /// Start the piece already turned to `orientation`
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.transform.orientation = orientation;
        self.safe = self.transform;
        self
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn pivot(&self) -> Vec3i {
        self.transform.pivot
    }

    pub fn orientation(&self) -> Orientation {
        self.transform.orientation
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Last transform confirmed legal by the resolver
    pub fn safe_transform(&self) -> Transform {
        self.safe
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn phase(&self) -> PiecePhase {
        self.phase
    }

    pub fn cause(&self) -> MotionCause {
        self.cause
    }

    /// A mutation was accepted and has not been confirmed yet
    pub fn has_pending_motion(&self) -> bool {
        !self.cause.is_idle()
    }

    fn accepts_requests(&self) -> bool {
        self.phase == PiecePhase::Falling && !self.has_pending_motion()
    }

    /// Rotation eligibility: falling with no unresolved move
    pub fn can_rotate(&self) -> bool {
        self.accepts_requests()
    }

    /// Move one cell in `direction`
    ///
    /// Returns false (no-op) for `InputDirection::None` or when the piece is not
    /// accepting requests.
    pub fn translate_by(&mut self, direction: InputDirection) -> bool {
        if !self.accepts_requests() || direction == InputDirection::None {
            return false;
        }
        self.transform.pivot = self.transform.pivot + direction.offset();
        self.cause = MotionCause {
            direction,
            ..MotionCause::default()
        };
        true
    }

    /// Turn 90° about one world axis
    pub fn rotate_by(&mut self, step: RotationStep) -> bool {
        if !self.can_rotate() || step.quarter_turns == 0 {
            return false;
        }
        self.transform.orientation = self.transform.orientation.rotated(step);
        self.cause = MotionCause {
            rotated: true,
            ..MotionCause::default()
        };
        true
    }

    /// Gravity step: drop one cell
    pub fn fall(&mut self) -> bool {
        if !self.accepts_requests() {
            return false;
        }
        self.transform.pivot.y -= 1;
        self.cause = MotionCause {
            gravity: true,
            ..MotionCause::default()
        };
        true
    }

    /// Lattice cells at the current transform
    pub fn current_cells(&self) -> PieceShape {
        cells_at(self.kind, self.transform.pivot, self.transform.orientation)
    }

    /// Pivot in world units
    pub fn world_position(&self) -> Vec3i {
        self.transform.pivot.scaled(self.scale)
    }

    /// Y of the lowest cube
    pub fn lowest_y(&self) -> i32 {
        self.current_cells()
            .iter()
            .map(|c| c.y)
            .min()
            .unwrap_or(self.transform.pivot.y)
    }

    pub(crate) fn begin_contact(&mut self) {
        self.phase = PiecePhase::Colliding;
    }

    /// Put one pivot axis back to its confirmed value
    pub(crate) fn restore_axis(&mut self, axis: Axis) {
        let safe = self.safe.pivot.get(axis);
        self.transform.pivot = self.transform.pivot.with(axis, safe);
    }

    pub(crate) fn restore_orientation(&mut self) {
        self.transform.orientation = self.safe.orientation;
    }

    pub(crate) fn nudge(&mut self, offset: Vec3i) {
        self.transform.pivot = self.transform.pivot + offset;
    }

    /// Revert every axis and the orientation to the confirmed transform
    pub(crate) fn rollback(&mut self) {
        self.transform = self.safe;
    }

    /// Accept the current transform as legal and resume falling
    pub(crate) fn confirm(&mut self) {
        self.safe = self.transform;
        self.cause = MotionCause::default();
        self.phase = PiecePhase::Falling;
    }

    pub(crate) fn mark_locked(&mut self) {
        self.confirm();
        self.phase = PiecePhase::Locked;
    }

    /// Freeze the piece into a settled record at its current cells
    pub fn commit(self) -> SettledPiece {
        SettledPiece::new(self.id, self.kind, self.current_cells().to_vec())
    }
}
