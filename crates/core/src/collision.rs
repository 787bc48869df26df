//! Collision detector - contact discovery for the active piece
//!
//! After every mutation the piece's cells are checked against the walls, the
//! floor and the settled stack. Each distinct contact becomes a
//! [`ContactEvent`] in a bounded, insertion-ordered [`ContactSet`]:
//!
//! - at most one event per (target, direction, parent piece)
//! - at most one event per wall or floor kind
//!
//! # Priorities
//!
//! | Contact | Priority |
//! |---------|----------|
//! | settled block hit by a rotation | 2 (undone first) |
//! | wall or floor | 1 |
//! | settled block hit by a translation | 1 |
//! | settled block hit with no input (gravity) | 0 (settle) |

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::trace;

use crate::piece::Piece;
use crate::playfield::Playfield;
use crate::stack::SettledStack;
use crate::types::{ContactTarget, InputDirection, PieceId};

/// Capacity of a contact set (five boundaries plus one block per cube fit easily)
pub const MAX_CONTACTS: usize = 16;

/// Gravity settle against a block
pub const PRIORITY_SETTLE: u8 = 0;
/// Walls, floor and translation-caused block contacts
pub const PRIORITY_BOUNDARY: u8 = 1;
/// Rotation-caused block contacts
pub const PRIORITY_ROTATION: u8 = 2;

/// Boundaries checked for every cube, in detection order
const BOUNDARIES: [ContactTarget; 5] = [
    ContactTarget::Floor,
    ContactTarget::WallLeft,
    ContactTarget::WallRight,
    ContactTarget::WallFront,
    ContactTarget::WallBack,
];

/// A prioritized contact waiting to be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactEvent {
    pub target: ContactTarget,
    pub direction: InputDirection,
    pub rotated: bool,
    pub priority: u8,
    /// Settled piece that was hit (block contacts only)
    pub parent: Option<PieceId>,
}

impl ContactEvent {
    pub fn new(
        target: ContactTarget,
        direction: InputDirection,
        rotated: bool,
        parent: Option<PieceId>,
    ) -> Self {
        Self {
            target,
            direction,
            rotated,
            priority: priority_for(target, direction, rotated),
            parent,
        }
    }

    fn same_slot(&self, other: &ContactEvent) -> bool {
        if self.target != other.target {
            return false;
        }
        match self.target {
            ContactTarget::SettledBlock => {
                self.direction == other.direction && self.parent == other.parent
            }
            _ => true,
        }
    }
}

/// Priority of a contact given what caused it
pub fn priority_for(target: ContactTarget, direction: InputDirection, rotated: bool) -> u8 {
    match target {
        ContactTarget::SettledBlock if rotated => PRIORITY_ROTATION,
        ContactTarget::SettledBlock if direction == InputDirection::None => PRIORITY_SETTLE,
        _ => PRIORITY_BOUNDARY,
    }
}

/// Deduplicated, insertion-ordered contact events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactSet {
    events: ArrayVec<ContactEvent, MAX_CONTACTS>,
}

impl ContactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactEvent> {
        self.events.iter()
    }

    /// Add an event unless one already occupies its slot
    ///
    /// Returns true if the event was stored.
    pub fn record(&mut self, event: ContactEvent) -> bool {
        if self.events.iter().any(|e| e.same_slot(&event)) {
            return false;
        }
        self.events.try_push(event).is_ok()
    }

    /// Take every event, highest priority first
    ///
    /// Equal priorities keep detection order. The set is empty afterwards.
    pub fn drain_by_priority(&mut self) -> ArrayVec<ContactEvent, MAX_CONTACTS> {
        let mut snapshot = std::mem::take(&mut self.events);
        // Stable sort keeps first-detected-first-applied among equals.
        snapshot.sort_by(|a, b| b.priority.cmp(&a.priority));
        snapshot
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Record every contact the piece's cells currently make
///
/// Returns the number of new events stored in `out`.
pub fn detect(piece: &Piece, stack: &SettledStack, field: &Playfield, out: &mut ContactSet) -> usize {
    let cause = piece.cause();
    let mut recorded = 0;

    for cell in piece.current_cells() {
        for target in BOUNDARIES {
            if field.overshoot(cell, target) > 0
                && out.record(ContactEvent::new(target, cause.direction, cause.rotated, None))
            {
                recorded += 1;
            }
        }
        if let Some(parent) = stack.owner(cell) {
            let event = ContactEvent::new(
                ContactTarget::SettledBlock,
                cause.direction,
                cause.rotated,
                Some(parent),
            );
            if out.record(event) {
                recorded += 1;
            }
        }
    }

    if recorded > 0 {
        trace!(
            piece = piece.id(),
            contacts = recorded,
            direction = cause.direction.as_str(),
            rotated = cause.rotated,
            "contacts detected"
        );
    }
    recorded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::SettledPiece;
    use crate::types::{Axis, PieceKind, RotationStep, Vec3i};

    fn block(target: ContactTarget, direction: InputDirection, parent: u32) -> ContactEvent {
        ContactEvent::new(target, direction, false, Some(parent))
    }

    #[test]
    fn test_priorities() {
        assert_eq!(
            priority_for(ContactTarget::SettledBlock, InputDirection::None, true),
            PRIORITY_ROTATION
        );
        assert_eq!(
            priority_for(ContactTarget::SettledBlock, InputDirection::None, false),
            PRIORITY_SETTLE
        );
        assert_eq!(
            priority_for(ContactTarget::SettledBlock, InputDirection::Left, false),
            PRIORITY_BOUNDARY
        );
        assert_eq!(
            priority_for(ContactTarget::WallLeft, InputDirection::Left, false),
            PRIORITY_BOUNDARY
        );
        assert_eq!(
            priority_for(ContactTarget::Floor, InputDirection::None, false),
            PRIORITY_BOUNDARY
        );
    }

    #[test]
    fn test_record_dedupes_per_slot() {
        let mut set = ContactSet::new();
        assert!(set.record(block(ContactTarget::SettledBlock, InputDirection::Left, 1)));
        assert!(!set.record(block(ContactTarget::SettledBlock, InputDirection::Left, 1)));
        assert!(set.record(block(ContactTarget::SettledBlock, InputDirection::Left, 2)));

        let wall = ContactEvent::new(ContactTarget::WallLeft, InputDirection::Left, false, None);
        assert!(set.record(wall));
        assert!(!set.record(ContactEvent::new(
            ContactTarget::WallLeft,
            InputDirection::None,
            true,
            None
        )));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_drain_orders_by_priority_then_insertion() {
        let mut set = ContactSet::new();
        set.record(ContactEvent::new(ContactTarget::SettledBlock, InputDirection::None, false, Some(1)));
        set.record(ContactEvent::new(ContactTarget::WallRight, InputDirection::None, true, None));
        set.record(ContactEvent::new(ContactTarget::SettledBlock, InputDirection::None, true, Some(2)));
        set.record(ContactEvent::new(ContactTarget::Floor, InputDirection::None, true, None));

        let drained = set.drain_by_priority();
        let order: Vec<_> = drained.iter().map(|e| e.target).collect();
        assert_eq!(
            order,
            vec![
                ContactTarget::SettledBlock,
                ContactTarget::WallRight,
                ContactTarget::Floor,
                ContactTarget::SettledBlock,
            ]
        );
        assert_eq!(drained[0].parent, Some(2));
        assert!(set.is_empty());
    }

    #[test]
    fn test_detect_wall_after_translation() {
        let field = Playfield::default();
        let stack = SettledStack::new();
        // I piece spans x = 0..=3 at pivot x = 1; one step left leaves the stage.
        let mut piece = Piece::new(1, PieceKind::I, Vec3i::new(1, 5, 0), 10);
        assert!(piece.translate_by(InputDirection::Left));

        let mut set = ContactSet::new();
        assert_eq!(detect(&piece, &stack, &field, &mut set), 1);
        let event = set.iter().next().copied().unwrap();
        assert_eq!(event.target, ContactTarget::WallLeft);
        assert_eq!(event.direction, InputDirection::Left);
    }

    #[test]
    fn test_detect_block_contacts_one_per_parent() {
        let field = Playfield::default();
        let mut stack = SettledStack::new();
        stack
            .insert(SettledPiece::new(
                7,
                PieceKind::I,
                (0..4).map(|x| Vec3i::new(x, 0, 0)).collect(),
            ))
            .unwrap();

        let mut piece = Piece::new(1, PieceKind::I, Vec3i::new(1, 1, 0), 10);
        assert!(piece.fall());

        let mut set = ContactSet::new();
        assert_eq!(detect(&piece, &stack, &field, &mut set), 1);
        let event = set.iter().next().copied().unwrap();
        assert_eq!(event.target, ContactTarget::SettledBlock);
        assert_eq!(event.parent, Some(7));
        assert_eq!(event.priority, PRIORITY_SETTLE);
    }

    #[test]
    fn test_detect_rotation_into_floor_and_wall() {
        let field = Playfield::default();
        let stack = SettledStack::new();
        // Flat I on the floor: rotating about Z stands it up through y = -1.
        let mut piece = Piece::new(1, PieceKind::I, Vec3i::new(0, 0, 0), 10);
        assert!(piece.rotate_by(RotationStep::new(Axis::Z, 1)));

        let mut set = ContactSet::new();
        detect(&piece, &stack, &field, &mut set);
        assert!(set.iter().any(|e| e.target == ContactTarget::Floor && e.rotated));
    }

    #[test]
    fn test_detect_nothing_when_clear() {
        let field = Playfield::default();
        let stack = SettledStack::new();
        let piece = Piece::new(1, PieceKind::T, Vec3i::new(1, 5, 1), 10);
        let mut set = ContactSet::new();
        assert_eq!(detect(&piece, &stack, &field, &mut set), 0);
        assert!(set.is_empty());
    }
}
