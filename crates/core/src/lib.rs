//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains the falling-piece rules of a 3D stacking game: the
//! playfield lattice, the piece catalog, collision detection, contact
//! resolution, lock-in and layer clearing. It has **no dependencies** on the
//! terminal, input devices or rendering:
//!
//! - **Deterministic**: the same seed and input produce the same game
//! - **Testable**: every rule is exercised by unit and scenario tests
//! - **Headless**: a host drives it with [`GameState::tick`] and reads snapshots
//!
//! # Module Structure
//!
//! - [`playfield`]: lattice bounds of the open-topped stage
//! - [`pieces`]: the seven four-cube shapes and their rotations
//! - [`piece`]: the active piece, its phases and rollback transform
//! - [`stack`]: settled cells grouped by parent piece and by layer
//! - [`collision`]: contact discovery and priorities
//! - [`resolver`]: priority-ordered rollback and lock-in decisions
//! - [`clear`]: full-layer clearing and collapse
//! - [`generator`]: next-piece selection
//! - [`game_state`]: the per-frame driver tying it all together
//!
//! # Example
//!
//! ```
//! use cube_tetris_core::GameState;
//! use cube_tetris_core::types::{FrameInput, GameAction};
//!
//! let mut game = GameState::new(12345);
//! game.start().unwrap();
//!
//! game.apply_action(GameAction::RotateY, &false).unwrap();
//! game.tick(1000, &FrameInput::IDLE, &false).unwrap();
//!
//! assert_eq!(game.active().unwrap().pivot().y, 9);
//! ```
//!
//! # Timing
//!
//! - **Tick**: one call per rendered frame, with the elapsed milliseconds
//! - **Gravity**: one cell per fall span (1000ms by default)
//! - **Pause**: a paused tick does nothing, including the play timer

pub mod clear;
pub mod collision;
pub mod config;
pub mod error;
pub mod game_state;
pub mod generator;
pub mod pause;
pub mod piece;
pub mod pieces;
pub mod playfield;
pub mod resolver;
pub mod snapshot;
pub mod stack;
pub mod timer;

pub use cube_tetris_types as types;

// Re-export commonly used types for convenience
pub use clear::{clear_and_collapse, full_layers, ClearReport};
pub use collision::{detect, ContactEvent, ContactSet};
pub use config::SimConfig;
pub use error::{ConfigError, SimError};
pub use game_state::{GameState, TickOutcome};
pub use generator::{PieceGenerator, RandomGenerator, ScriptedGenerator, SimpleRng};
pub use pause::{PauseRequest, PauseSource, PauseToggle};
pub use piece::{Piece, PiecePhase, Transform};
pub use pieces::{cells_at, get_shape};
pub use playfield::Playfield;
pub use resolver::{placement_is_legal, resolve, Resolution};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use stack::{SettledPiece, SettledStack};
pub use timer::PlayTimer;
