//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no game logic, so it can be shared by the
//! simulation core, the input layer and the terminal runner alike.
//!
//! # Playfield Dimensions
//!
//! The default stage is a 4 x 4 footprint of unit cubes:
//!
//! - **Width**: 4 cells along X (indexed 0-3)
//! - **Depth**: 4 cells along Z (indexed 0-3)
//! - **Height**: 12 cells along Y; the floor is the plane below y = 0
//! - **Scale**: one cell is 10 world units wide (the stage is 40 x 40 units)
//! - **Spawn position**: lattice (1, 10, 0), world (10, 100, 0)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frame interval of the runner (~60 FPS) |
//! | `FALL_SPAN_MS` | 1000 | Gravity step interval (one cell per second) |
//! | `KEY_RELEASE_TIMEOUT_MS` | 150 | Held-key timeout for terminals without release events |
//!
//! # Examples
//!
//! ```
//! use cube_tetris_types::{Axis, Orientation, RotationStep, Vec3i};
//!
//! // A quarter turn about Z maps +X onto +Y.
//! let turned = Orientation::IDENTITY.rotated(RotationStep::new(Axis::Z, 1));
//! assert_eq!(turned.apply(Vec3i::new(1, 0, 0)), Vec3i::new(0, 1, 0));
//!
//! // Four quarter turns about any axis return to the start.
//! let mut o = Orientation::IDENTITY;
//! for _ in 0..4 {
//!     o = o.rotated(RotationStep::new(Axis::X, 1));
//! }
//! assert_eq!(o, Orientation::IDENTITY);
//! ```

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Playfield width in cells (X axis)
pub const PLAYFIELD_WIDTH: i32 = 4;

/// Playfield depth in cells (Z axis)
pub const PLAYFIELD_DEPTH: i32 = 4;

/// Playfield height in cells (Y axis)
pub const PLAYFIELD_HEIGHT: i32 = 12;

/// World units per cell
pub const CELL_SCALE: i32 = 10;

/// Lattice coordinate of a freshly spawned piece's pivot
pub const SPAWN_POSITION: Vec3i = Vec3i::new(1, 10, 0);

/// Fixed frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Interval between gravity steps (one cell per second)
pub const FALL_SPAN_MS: u32 = 1000;

/// Number of unit cubes in every catalog piece
pub const PIECE_CELLS: usize = 4;

/// Release timeout for terminals that never report key-up events
pub const KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Identity of a piece, kept by its cells after lock-in
pub type PieceId = u32;

/// Integer lattice coordinate (or offset) in cell units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vec3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3i {
    pub const ZERO: Vec3i = Vec3i::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Multiply every component by `k` (lattice to world units)
    pub const fn scaled(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    /// Component along `axis`
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy with the component along `axis` replaced
    pub fn with(self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => Self { x: value, ..self },
            Axis::Y => Self { y: value, ..self },
            Axis::Z => Self { z: value, ..self },
        }
    }
}

impl Add for Vec3i {
    type Output = Vec3i;

    fn add(self, rhs: Vec3i) -> Self::Output {
        Vec3i::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3i {
    type Output = Vec3i;

    fn sub(self, rhs: Vec3i) -> Self::Output {
        Vec3i::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3i {
    type Output = Vec3i;

    fn neg(self) -> Self::Output {
        Vec3i::new(-self.x, -self.y, -self.z)
    }
}

/// World axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// A single 90° turn about one world axis
///
/// `quarter_turns` is +1 for a counter-clockwise turn (right-hand rule, looking
/// down the positive axis) and -1 for a clockwise one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationStep {
    pub axis: Axis,
    pub quarter_turns: i8,
}

impl RotationStep {
    pub const fn new(axis: Axis, quarter_turns: i8) -> Self {
        Self {
            axis,
            quarter_turns,
        }
    }

    /// The turn bound to each rotate key
    ///
    /// - **X** (`W`): tip the piece away from the viewer, +90°
    /// - **Y** (`D`): spin the piece to the right, -90°
    /// - **Z** (`A`): roll the piece to the left, +90°
    pub const fn for_key(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::new(Axis::X, 1),
            Axis::Y => Self::new(Axis::Y, -1),
            Axis::Z => Self::new(Axis::Z, 1),
        }
    }

    pub const fn inverse(self) -> Self {
        Self::new(self.axis, -self.quarter_turns)
    }
}

/// One of the 24 orientations of a cube, stored as an integer rotation matrix
///
/// Rows are applied to column vectors: `apply(v) = M * v`. Every matrix built
/// through [`Orientation::rotated`] stays a signed permutation with determinant +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation {
    rows: [[i8; 3]; 3],
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        rows: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
    };

    /// The matrix of a single quarter turn
    fn quarter_turn(step: RotationStep) -> Self {
        let positive = match step.axis {
            Axis::X => [[1, 0, 0], [0, 0, -1], [0, 1, 0]],
            Axis::Y => [[0, 0, 1], [0, 1, 0], [-1, 0, 0]],
            Axis::Z => [[0, -1, 0], [1, 0, 0], [0, 0, 1]],
        };
        let turn = Orientation { rows: positive };
        match step.quarter_turns.rem_euclid(4) {
            0 => Self::IDENTITY,
            1 => turn,
            2 => turn.then(turn),
            _ => turn.transpose(),
        }
    }

    /// Rotate about a world axis (the turn is applied after `self`)
    pub fn rotated(self, step: RotationStep) -> Self {
        let next = self.then(Self::quarter_turn(step));
        debug_assert_eq!(next.determinant(), 1);
        next
    }

    /// Compose: first `self`, then `next`
    fn then(self, next: Orientation) -> Self {
        let mut rows = [[0i8; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, out) in row.iter_mut().enumerate() {
                *out = (0..3).map(|k| next.rows[r][k] * self.rows[k][c]).sum();
            }
        }
        Orientation { rows }
    }

    fn transpose(self) -> Self {
        let mut rows = [[0i8; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, out) in row.iter_mut().enumerate() {
                *out = self.rows[c][r];
            }
        }
        Orientation { rows }
    }

    /// Rotate a lattice offset
    pub fn apply(&self, v: Vec3i) -> Vec3i {
        let dot = |row: [i8; 3]| row[0] as i32 * v.x + row[1] as i32 * v.y + row[2] as i32 * v.z;
        Vec3i::new(dot(self.rows[0]), dot(self.rows[1]), dot(self.rows[2]))
    }

    pub fn determinant(&self) -> i32 {
        let m = |r: usize, c: usize| self.rows[r][c] as i32;
        m(0, 0) * (m(1, 1) * m(2, 2) - m(1, 2) * m(2, 1))
            - m(0, 1) * (m(1, 0) * m(2, 2) - m(1, 2) * m(2, 0))
            + m(0, 2) * (m(1, 0) * m(2, 1) - m(1, 1) * m(2, 0))
    }

    /// Every orientation reachable by quarter turns about the world axes
    pub fn all() -> Vec<Orientation> {
        let mut found = vec![Self::IDENTITY];
        let mut next = 0;
        while next < found.len() {
            let current = found[next];
            for axis in Axis::ALL {
                let candidate = current.rotated(RotationStep::new(axis, 1));
                if !found.contains(&candidate) {
                    found.push(candidate);
                }
            }
            next += 1;
        }
        found
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The seven catalog piece kinds
///
/// Each is four unit cubes laid out flat in the X/Y plane at spawn:
/// - **I**: straight bar
/// - **O**: 2x2 square
/// - **T**: T-shaped
/// - **S**: S-shaped
/// - **Z**: Z-shaped (mirror of S)
/// - **J**: J-shaped
/// - **L**: L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Direction key pressed this frame
///
/// `Back` moves away from the viewer (+Z) and `Front` towards it (-Z).
/// `None` means the motion in effect is gravity or a pure rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputDirection {
    #[default]
    None,
    Left,
    Right,
    Back,
    Front,
}

impl InputDirection {
    /// Lattice offset of one step in this direction
    pub fn offset(&self) -> Vec3i {
        match self {
            InputDirection::None => Vec3i::ZERO,
            InputDirection::Left => Vec3i::new(-1, 0, 0),
            InputDirection::Right => Vec3i::new(1, 0, 0),
            InputDirection::Back => Vec3i::new(0, 0, 1),
            InputDirection::Front => Vec3i::new(0, 0, -1),
        }
    }

    /// Horizontal axis the direction moves along
    pub fn axis(&self) -> Option<Axis> {
        match self {
            InputDirection::None => None,
            InputDirection::Left | InputDirection::Right => Some(Axis::X),
            InputDirection::Back | InputDirection::Front => Some(Axis::Z),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputDirection::None => "none",
            InputDirection::Left => "left",
            InputDirection::Right => "right",
            InputDirection::Back => "back",
            InputDirection::Front => "front",
        }
    }
}

/// What a piece cell ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactTarget {
    /// x < 0
    WallLeft,
    /// x >= width
    WallRight,
    /// z < 0
    WallFront,
    /// z >= depth
    WallBack,
    /// y < 0
    Floor,
    /// A cell of the settled stack
    SettledBlock,
}

impl ContactTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactTarget::WallLeft => "wall_left",
            ContactTarget::WallRight => "wall_right",
            ContactTarget::WallFront => "wall_foreground",
            ContactTarget::WallBack => "wall_back",
            ContactTarget::Floor => "floor",
            ContactTarget::SettledBlock => "block",
        }
    }
}

/// Discrete actions produced by the key map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell along -X
    MoveLeft,
    /// Move piece one cell along +X
    MoveRight,
    /// Move piece one cell away from the viewer (+Z)
    MoveBack,
    /// Move piece one cell towards the viewer (-Z)
    MoveFront,
    /// Quarter turn about X
    RotateX,
    /// Quarter turn about Y
    RotateY,
    /// Quarter turn about Z
    RotateZ,
    /// Toggle pause
    Pause,
    /// Leave the paused game for the title screen
    ReturnToStart,
    /// Start a game from the title or game-over screen
    Confirm,
}

impl GameAction {
    /// Movement direction carried by the action, if any
    pub fn direction(&self) -> Option<InputDirection> {
        match self {
            GameAction::MoveLeft => Some(InputDirection::Left),
            GameAction::MoveRight => Some(InputDirection::Right),
            GameAction::MoveBack => Some(InputDirection::Back),
            GameAction::MoveFront => Some(InputDirection::Front),
            _ => None,
        }
    }

    /// Rotation axis carried by the action, if any
    pub fn rotation_axis(&self) -> Option<Axis> {
        match self {
            GameAction::RotateX => Some(Axis::X),
            GameAction::RotateY => Some(Axis::Y),
            GameAction::RotateZ => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Everything the simulation reads from the keyboard in one frame
///
/// `direction` and `rotation` are edge-triggered. `camera_held` is level-triggered:
/// while it is down the arrows steer the camera and `direction` stays `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub direction: InputDirection,
    pub rotation: Option<Axis>,
    pub camera_held: bool,
    pub camera_direction: InputDirection,
}

impl FrameInput {
    pub const IDLE: FrameInput = FrameInput {
        direction: InputDirection::None,
        rotation: None,
        camera_held: false,
        camera_direction: InputDirection::None,
    };

    pub fn moving(direction: InputDirection) -> Self {
        Self {
            direction,
            ..Self::IDLE
        }
    }

    pub fn rotating(axis: Axis) -> Self {
        Self {
            rotation: Some(axis),
            ..Self::IDLE
        }
    }
}

/// Core-side event emitted after a piece locks and the clear pass ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockEvent {
    pub parent: PieceId,
    pub kind: PieceKind,
    pub lowest_y: i32,
    pub layers_cleared: u32,
    pub cells_removed: u32,
    pub cells_shifted: u32,
}
