//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        // Movement on the floor plane
        KeyCode::Left => Some(GameAction::MoveLeft),
        KeyCode::Right => Some(GameAction::MoveRight),
        KeyCode::Up => Some(GameAction::MoveBack),
        KeyCode::Down => Some(GameAction::MoveFront),

        // Rotation
        KeyCode::Char('a') | KeyCode::Char('A') => Some(GameAction::RotateZ),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(GameAction::RotateY),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(GameAction::RotateX),

        // Flow
        KeyCode::Esc => Some(GameAction::Pause),
        KeyCode::Backspace => Some(GameAction::ReturnToStart),
        KeyCode::Enter => Some(GameAction::Confirm),

        _ => None,
    }
}

/// Shift hands the arrow keys to the camera while it is down.
pub fn is_camera_modifier(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
        || matches!(
            key.code,
            KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift)
        )
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
