//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::GameAction`] and collects them into one
//! [`crate::types::FrameInput`] per simulation frame, with edge-triggered
//! presses that work in terminals without key-release events.

pub mod handler;
pub mod map;

pub use cube_tetris_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, is_camera_modifier, should_quit};
