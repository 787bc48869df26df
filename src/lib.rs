//! Cube Tetris (workspace facade crate).
//!
//! Re-exports the member crates under `cube_tetris::{core,input,types}`; the
//! implementation lives in dedicated crates under `crates/`.

pub use cube_tetris_core as core;
pub use cube_tetris_input as input;
pub use cube_tetris_types as types;
