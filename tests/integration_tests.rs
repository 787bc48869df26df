//! Integration tests for the main game loop

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use cube_tetris::core::{GameState, PauseRequest, PauseSource, PauseToggle, ScriptedGenerator, SimConfig};
use cube_tetris::input::{should_quit, InputHandler};
use cube_tetris::types::{Axis, FrameInput, GameAction, InputDirection, PieceKind, Vec3i, TICK_MS};

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::new(12345);
    assert!(!state.started());

    state.start().unwrap();
    assert!(state.started());
    assert!(state.active().is_some());
    assert!(!state.game_over());
    assert!(!state.paused());
}

#[test]
fn test_same_seed_same_game() {
    let mut a = GameState::new(777);
    let mut b = GameState::new(777);
    a.start().unwrap();
    b.start().unwrap();

    for i in 0..500u32 {
        let input = if i % 7 == 0 {
            FrameInput::moving(InputDirection::Right)
        } else if i % 11 == 0 {
            FrameInput::rotating(Axis::Z)
        } else {
            FrameInput::IDLE
        };
        let ra = a.tick(250, &input, &false);
        let rb = b.tick(250, &input, &false);
        assert_eq!(ra, rb);
        if ra.is_err() {
            break;
        }
    }
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_input_handler_drives_simulation() {
    let mut state =
        GameState::with_generator(SimConfig::default(), ScriptedGenerator::new([PieceKind::O]));
    state.start().unwrap();
    let mut input = InputHandler::new().with_key_release_timeout_ms(10_000);

    // Up moves the piece away from the viewer.
    assert_eq!(
        input.handle_key_event(KeyEvent::from(KeyCode::Up)),
        Some(GameAction::MoveBack)
    );
    let frame = input.take_frame();
    let outcome = state.tick(TICK_MS, &frame, &false).unwrap();
    assert!(outcome.moved);
    assert_eq!(state.active().unwrap().pivot(), Vec3i::new(1, 10, 1));

    // Holding the key does not move again.
    input.handle_key_event(KeyEvent::from(KeyCode::Up));
    let outcome = state.tick(TICK_MS, &input.take_frame(), &false).unwrap();
    assert!(!outcome.moved);
    assert_eq!(state.active().unwrap().pivot(), Vec3i::new(1, 10, 1));

    // Shift+arrow goes to the camera.
    input.handle_key_event(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
    let frame = input.take_frame();
    assert!(frame.camera_held);
    let outcome = state.tick(TICK_MS, &frame, &false).unwrap();
    assert!(!outcome.moved);

    assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
}

#[test]
fn test_pause_toggle_stops_gravity_and_timer() {
    let mut state = GameState::new(5);
    state.start().unwrap();
    let mut pause = PauseToggle::new();
    let start_y = state.active().unwrap().pivot().y;

    assert_eq!(pause.handle(GameAction::Pause), PauseRequest::Paused);
    for _ in 0..10 {
        assert!(state.tick(1000, &FrameInput::IDLE, &pause).unwrap().skipped);
    }
    assert_eq!(state.active().unwrap().pivot().y, start_y);
    assert_eq!(state.timer().result_string(), "00:00:00");

    assert_eq!(pause.handle(GameAction::Pause), PauseRequest::Resumed);
    assert!(!pause.is_paused());
    state.tick(1000, &FrameInput::IDLE, &pause).unwrap();
    assert_eq!(state.active().unwrap().pivot().y, start_y - 1);
    assert_eq!(state.timer().result_string(), "00:00:01");
}

#[test]
fn test_return_to_start_resets_game() {
    let mut state = GameState::new(5);
    state.start().unwrap();
    for _ in 0..30 {
        state.tick(1000, &FrameInput::IDLE, &false).unwrap();
    }
    assert!(state.pieces_locked() > 0);

    let mut pause = PauseToggle::new();
    pause.handle(GameAction::Pause);
    if pause.handle(GameAction::ReturnToStart) == PauseRequest::ReturnToStart {
        state.reset();
    }
    assert!(!state.started());
    assert!(state.stack().is_empty());
    assert_eq!(state.timer().elapsed_ms(), 0);
}

#[test]
fn test_game_over_reports_result_time() {
    let mut state =
        GameState::with_generator(SimConfig::default(), ScriptedGenerator::new([PieceKind::O]));
    state.start().unwrap();

    let err = loop {
        if let Err(err) = state.tick(1000, &FrameInput::IDLE, &false) {
            break err;
        }
    };
    assert!(err.is_game_over());
    assert!(state.game_over());
    assert_ne!(state.timer().result_string(), "00:00:00");
    assert_eq!(state.snapshot().elapsed, state.timer().result_string());
}
