//! Piece generator - decides which catalog shape spawns next
//!
//! The simulation owns its generator and calls
//! [`PieceGenerator::request_next_piece`] exactly once per lock-in + clear
//! cycle (plus once at start). [`RandomGenerator`] draws uniformly from the
//! catalog with a small deterministic LCG, so a seed reproduces a whole game.

use crate::types::PieceKind;

/// Source of the next piece kind
pub trait PieceGenerator {
    fn request_next_piece(&mut self) -> PieceKind;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // A zero state would only ever produce the increment sequence.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in [0, max) using the high bits (the low bits of an LCG cycle quickly)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Uniform random draw from the seven catalog shapes
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    rng: SimpleRng,
}

impl RandomGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceGenerator for RandomGenerator {
    fn request_next_piece(&mut self) -> PieceKind {
        let index = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[index]
    }
}

/// Replays a fixed sequence of kinds, cycling when it runs out
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    sequence: Vec<PieceKind>,
    next: usize,
}

impl ScriptedGenerator {
    /// An empty script yields `PieceKind::O` forever
    pub fn new(sequence: impl Into<Vec<PieceKind>>) -> Self {
        Self {
            sequence: sequence.into(),
            next: 0,
        }
    }

    /// Number of pieces handed out so far
    pub fn requests(&self) -> usize {
        self.next
    }
}

impl PieceGenerator for ScriptedGenerator {
    fn request_next_piece(&mut self) -> PieceKind {
        let kind = if self.sequence.is_empty() {
            PieceKind::O
        } else {
            self.sequence[self.next % self.sequence.len()]
        };
        self.next += 1;
        kind
    }
}

impl<G: PieceGenerator + ?Sized> PieceGenerator for Box<G> {
    fn request_next_piece(&mut self) -> PieceKind {
        (**self).request_next_piece()
    }
}
