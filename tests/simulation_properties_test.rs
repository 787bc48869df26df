//! Scenario and property tests for the falling-piece simulation.

use cube_tetris::core::{
    detect, placement_is_legal, resolve, ContactSet, GameState, Piece, Playfield, Resolution,
    ScriptedGenerator, SettledPiece, SettledStack, SimConfig, SimpleRng,
};
use cube_tetris::types::{
    Axis, ContactTarget, FrameInput, InputDirection, Orientation, PieceKind, RotationStep, Vec3i,
};

const SECOND: u32 = 1000;

fn scripted(kinds: &[PieceKind]) -> GameState<ScriptedGenerator> {
    GameState::with_generator(SimConfig::default(), ScriptedGenerator::new(kinds))
}

fn random_input(rng: &mut SimpleRng) -> FrameInput {
    let direction = match rng.next_range(6) {
        0 => InputDirection::Left,
        1 => InputDirection::Right,
        2 => InputDirection::Back,
        3 => InputDirection::Front,
        _ => InputDirection::None,
    };
    let rotation = match rng.next_range(5) {
        0 => Some(Axis::X),
        1 => Some(Axis::Y),
        2 => Some(Axis::Z),
        _ => None,
    };
    FrameInput {
        direction,
        rotation,
        ..FrameInput::IDLE
    }
}

fn assert_active_is_legal<G: cube_tetris::core::PieceGenerator>(state: &GameState<G>) {
    if let Some(piece) = state.active() {
        for cell in piece.current_cells() {
            assert!(state.playfield().contains(cell), "{cell:?} outside the stage");
            assert!(!state.stack().is_occupied(cell), "{cell:?} overlaps the stack");
        }
    }
}

// ============== Bounds invariant ==============

#[test]
fn test_active_piece_never_leaves_stage_or_overlaps_stack() {
    for seed in [1u32, 7, 42, 1234, 99_999] {
        let mut state = GameState::new(seed);
        state.start().unwrap();
        let mut rng = SimpleRng::new(seed.wrapping_mul(31));

        for _ in 0..3000 {
            let input = random_input(&mut rng);
            let elapsed = rng.next_range(400);
            match state.tick(elapsed, &input, &false) {
                Ok(_) => {}
                Err(err) => {
                    assert!(err.is_game_over(), "unexpected fatal error: {err}");
                    state.reset();
                    state.start().unwrap();
                }
            }
            assert_active_is_legal(&state);
            assert!(state.stack().verify_integrity().is_ok());
        }
    }
}

// ============== Resolver laws ==============

#[test]
fn test_resolving_empty_contact_set_is_idempotent() {
    let field = Playfield::default();
    let stack = SettledStack::new();
    for kind in PieceKind::ALL {
        let mut piece = Piece::new(1, kind, Vec3i::new(1, 6, 1), 10);
        let before = piece.transform();
        let mut contacts = ContactSet::new();
        for _ in 0..3 {
            assert_eq!(
                resolve(&mut piece, &mut contacts, &stack, &field),
                Resolution::Clear
            );
        }
        assert_eq!(piece.transform(), before);
    }
}

#[test]
fn test_walls_never_regress_under_block_contacts() {
    let field = Playfield::default();
    let mut checked = 0;
    for kind in PieceKind::ALL {
        for orientation in Orientation::all() {
            // Put the leftmost cube against the left wall.
            let sample = Piece::new(0, kind, Vec3i::new(0, 5, 1), 10).with_orientation(orientation);
            let min_x = sample.current_cells().iter().map(|c| c.x).min().unwrap();
            let piece = Piece::new(1, kind, Vec3i::new(-min_x, 5, 1), 10).with_orientation(orientation);
            let cells = piece.current_cells();
            if !cells.iter().all(|c| field.contains(*c)) {
                continue;
            }

            // Block the cell left of some cube that is not at the wall.
            let blocker = cells
                .iter()
                .map(|c| Vec3i::new(c.x - 1, c.y, c.z))
                .find(|c| field.contains(*c) && !cells.contains(c));
            let Some(blocker) = blocker else {
                continue;
            };
            let mut stack = SettledStack::new();
            stack
                .insert(SettledPiece::new(50, PieceKind::O, vec![blocker]))
                .unwrap();

            let mut piece = piece;
            assert!(piece.translate_by(InputDirection::Left));
            let mut contacts = ContactSet::new();
            detect(&piece, &stack, &field, &mut contacts);
            assert!(contacts.iter().any(|e| e.target == ContactTarget::WallLeft));
            assert!(contacts.iter().any(|e| e.target == ContactTarget::SettledBlock));
            resolve(&mut piece, &mut contacts, &stack, &field);

            assert!(piece.current_cells().iter().all(|c| c.x >= 0));
            assert!(placement_is_legal(&piece, &stack, &field));
            checked += 1;
        }
    }
    assert!(checked > 0);
}

// ============== Layer clear ==============

fn seed_layer_except_front_row(state: &mut GameState<ScriptedGenerator>, y: i32, id: u32, skip: Option<Vec3i>) {
    let cells: Vec<Vec3i> = state
        .playfield()
        .layer_cells(y)
        .filter(|c| c.z != 0 && Some(*c) != skip)
        .collect();
    state
        .seed_stack(SettledPiece::new(id, PieceKind::O, cells))
        .unwrap();
}

fn tick_until_lock(state: &mut GameState<ScriptedGenerator>) -> cube_tetris::types::LockEvent {
    for _ in 0..80 {
        let outcome = state.tick(SECOND, &FrameInput::IDLE, &false).unwrap();
        if let Some(event) = outcome.locked {
            return event;
        }
    }
    panic!("piece did not lock within 80 ticks");
}

#[test]
fn test_full_layer_clears_in_the_tick_it_completes() {
    let mut state = scripted(&[PieceKind::I]);
    seed_layer_except_front_row(&mut state, 0, 100, None);
    state.start().unwrap();

    let event = tick_until_lock(&mut state);
    assert_eq!(event.lowest_y, 0);
    assert_eq!(event.layers_cleared, 1);
    assert_eq!(event.cells_removed, 16);
    assert!(state.stack().is_empty());
    assert!(state.stack().piece(100).is_none());
}

#[test]
fn test_layer_missing_one_cell_is_not_cleared() {
    let mut state = scripted(&[PieceKind::I]);
    seed_layer_except_front_row(&mut state, 0, 100, Some(Vec3i::new(3, 0, 3)));
    state.start().unwrap();

    let event = tick_until_lock(&mut state);
    assert_eq!(event.layers_cleared, 0);
    assert_eq!(state.stack().layer_count(0), 15);
}

#[test]
fn test_full_layer_at_five_collapses_cells_above() {
    let mut state = scripted(&[PieceKind::I]);
    // Ledge at y = 4 along the front row so the I comes to rest at y = 5.
    state
        .seed_stack(SettledPiece::new(
            100,
            PieceKind::I,
            (0..4).map(|x| Vec3i::new(x, 4, 0)).collect(),
        ))
        .unwrap();
    seed_layer_except_front_row(&mut state, 5, 101, None);
    state
        .seed_stack(SettledPiece::new(
            102,
            PieceKind::I,
            vec![Vec3i::new(2, 6, 2), Vec3i::new(2, 7, 2)],
        ))
        .unwrap();
    state.start().unwrap();

    let event = tick_until_lock(&mut state);
    assert_eq!(event.lowest_y, 5);
    assert_eq!(event.layers_cleared, 1);
    assert_eq!(event.cells_shifted, 2);

    let stack = state.stack();
    assert!(stack.piece(101).is_none());
    assert_eq!(stack.owner(Vec3i::new(2, 5, 2)), Some(102));
    assert_eq!(stack.owner(Vec3i::new(2, 6, 2)), Some(102));
    assert!(!stack.is_occupied(Vec3i::new(2, 7, 2)));
    assert_eq!(stack.layer_count(5), 1);
    // Nothing below the cleared layer moves.
    assert_eq!(stack.layer_count(4), 4);
    assert_eq!(stack.owner(Vec3i::new(0, 4, 0)), Some(100));
}

// ============== Scenarios ==============

#[test]
fn test_unobstructed_fall_locks_on_floor() {
    for kind in PieceKind::ALL {
        let mut state = scripted(&[kind]);
        state.start().unwrap();
        assert_eq!(
            state.active().unwrap().world_position(),
            Vec3i::new(10, 100, 0)
        );

        let event = tick_until_lock(&mut state);
        assert_eq!(event.lowest_y, 0, "{kind:?}");
        assert_eq!(event.kind, kind);
        let lowest = state
            .stack()
            .piece(event.parent)
            .unwrap()
            .cells()
            .iter()
            .map(|c| c.y)
            .min();
        assert_eq!(lowest, Some(0));
    }
}

#[test]
fn test_rotation_into_settled_block_is_rejected() {
    let mut state = scripted(&[PieceKind::T]);
    state
        .seed_stack(SettledPiece::new(100, PieceKind::O, vec![Vec3i::new(1, 10, 1)]))
        .unwrap();
    state.start().unwrap();
    let before = state.active().unwrap().transform();

    let outcome = state.tick(0, &FrameInput::rotating(Axis::X), &false).unwrap();
    assert!(!outcome.rotated);

    let piece = state.active().unwrap();
    assert_eq!(piece.transform(), before);
    assert!(piece.can_rotate());
    assert!(!piece.has_pending_motion());
}

#[test]
fn test_rotation_blocked_while_motion_pending() {
    let mut piece = Piece::new(1, PieceKind::L, Vec3i::new(1, 6, 1), 10);
    assert!(piece.translate_by(InputDirection::Back));
    assert!(!piece.can_rotate());
    assert!(!piece.rotate_by(RotationStep::for_key(Axis::Y)));

    let mut contacts = ContactSet::new();
    detect(&piece, &SettledStack::new(), &Playfield::default(), &mut contacts);
    resolve(&mut piece, &mut contacts, &SettledStack::new(), &Playfield::default());
    assert!(piece.can_rotate());
}
