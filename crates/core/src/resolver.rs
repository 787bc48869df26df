//! Position/orientation resolver.
//!
//! Drains a [`ContactSet`] in priority order and rewrites the piece transform
//! to a legal one:
//!
//! - rotation-caused block contacts restore the pre-rotation orientation
//! - walls push the piece back inside along one horizontal axis
//! - translation-caused block contacts restore the moved axis
//! - floor and gravity block contacts restore Y and make the piece lock
//!
//! Whatever the events did, the result is validated once more and falls back
//! to the last confirmed transform if it is still illegal.

use serde::Serialize;
use tracing::trace;

use crate::collision::ContactSet;
use crate::piece::Piece;
use crate::playfield::Playfield;
use crate::stack::SettledStack;
use crate::types::{Axis, ContactTarget, InputDirection, Vec3i};

/// Outcome of one resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// No contacts were pending; the move (if any) was confirmed
    Clear,
    /// Contacts were undone and the piece keeps falling
    RolledBack,
    /// The piece came to rest and must be committed
    Locked,
}

/// Check that no cube is outside the stage or inside the stack
pub fn placement_is_legal(piece: &Piece, stack: &SettledStack, field: &Playfield) -> bool {
    piece
        .current_cells()
        .iter()
        .all(|&c| field.contains(c) && !stack.is_occupied(c))
}

/// Resolve every pending contact of `piece`
///
/// `contacts` is empty afterwards. With no contacts the transform is left
/// untouched.
pub fn resolve(
    piece: &mut Piece,
    contacts: &mut ContactSet,
    stack: &SettledStack,
    field: &Playfield,
) -> Resolution {
    if contacts.is_empty() {
        if piece.has_pending_motion() {
            piece.confirm();
        }
        return Resolution::Clear;
    }

    piece.begin_contact();
    let events = contacts.drain_by_priority();
    let mut settle = false;

    for event in &events {
        match event.target {
            ContactTarget::SettledBlock if event.rotated => piece.restore_orientation(),
            ContactTarget::SettledBlock => match event.direction.axis() {
                Some(axis) => piece.restore_axis(axis),
                None => {
                    piece.restore_axis(Axis::Y);
                    settle = true;
                }
            },
            ContactTarget::Floor if event.rotated => piece.restore_orientation(),
            ContactTarget::Floor => {
                piece.restore_axis(Axis::Y);
                settle |= event.direction == InputDirection::None;
            }
            wall => clamp_to_wall(piece, wall, field),
        }
    }

    let rolled_back = !placement_is_legal(piece, stack, field);
    if rolled_back {
        piece.rollback();
    }

    trace!(
        piece = piece.id(),
        events = events.len(),
        rolled_back,
        settle,
        "contacts resolved"
    );

    if settle {
        piece.mark_locked();
        Resolution::Locked
    } else {
        piece.confirm();
        Resolution::RolledBack
    }
}

/// Push the piece inside `wall` by its deepest overshoot
fn clamp_to_wall(piece: &mut Piece, wall: ContactTarget, field: &Playfield) {
    let depth = piece
        .current_cells()
        .iter()
        .map(|&c| field.overshoot(c, wall))
        .max()
        .unwrap_or(0);
    if depth == 0 {
        return;
    }
    let push = match wall {
        ContactTarget::WallLeft => Vec3i::new(depth, 0, 0),
        ContactTarget::WallRight => Vec3i::new(-depth, 0, 0),
        ContactTarget::WallFront => Vec3i::new(0, 0, depth),
        ContactTarget::WallBack => Vec3i::new(0, 0, -depth),
        ContactTarget::Floor | ContactTarget::SettledBlock => Vec3i::ZERO,
    };
    piece.nudge(push);
}
