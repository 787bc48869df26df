//! Game state module - drives the falling-piece simulation
//!
//! This module ties together the playfield, the settled stack, the active
//! piece, the generator and the timers. Each call to [`GameState::tick`] runs
//! one frame in a fixed order:
//!
//! 1. resolve contacts still pending from the previous frame
//! 2. gravity, once per elapsed fall span
//! 3. player translation
//! 4. player rotation
//!
//! Every mutation is followed by its own detect/resolve pass. When a pass
//! locks the piece, it is committed to the stack, full layers are cleared and
//! the next piece is spawned, all before the tick returns.

use serde::Serialize;
use tracing::{debug, warn};

use crate::clear::clear_and_collapse;
use crate::collision::{detect, ContactSet};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::generator::{PieceGenerator, RandomGenerator};
use crate::pause::PauseSource;
use crate::piece::Piece;
use crate::playfield::Playfield;
use crate::resolver::{placement_is_legal, resolve, Resolution};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, LayerSnapshot, SettledCellSnapshot};
use crate::stack::{SettledPiece, SettledStack};
use crate::timer::PlayTimer;
use crate::types::{FrameInput, GameAction, InputDirection, LockEvent, PieceId, RotationStep};

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    /// Nothing ran (paused or not started)
    pub skipped: bool,
    /// Gravity steps taken
    pub falls: u32,
    /// A translation was accepted and survived resolution
    pub moved: bool,
    /// A rotation was accepted and survived resolution
    pub rotated: bool,
    pub locked: Option<LockEvent>,
}

/// A single mutation applied to the active piece
#[derive(Debug, Clone, Copy)]
enum Motion {
    Fall,
    Translate(InputDirection),
    Rotate(RotationStep),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState<G: PieceGenerator = RandomGenerator> {
    config: SimConfig,
    stack: SettledStack,
    active: Option<Piece>,
    generator: G,
    contacts: ContactSet,
    fall_timer_ms: u32,
    timer: PlayTimer,
    /// Id handed to the next spawned piece
    next_id: PieceId,
    pieces_locked: u32,
    layers_cleared: u32,
    last_event: Option<LockEvent>,
    /// Fatal error that stopped the simulation
    halted: Option<SimError>,
    paused: bool,
    started: bool,
}

impl GameState<RandomGenerator> {
    /// Create a new game on the default stage with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::with_config(SimConfig {
            seed,
            ..SimConfig::default()
        })
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self::with_generator(config, RandomGenerator::new(config.seed))
    }
}

impl<G: PieceGenerator> GameState<G> {
    pub fn with_generator(config: SimConfig, generator: G) -> Self {
        Self {
            config,
            stack: SettledStack::new(),
            active: None,
            generator,
            contacts: ContactSet::new(),
            fall_timer_ms: 0,
            timer: PlayTimer::new(),
            next_id: 1,
            pieces_locked: 0,
            layers_cleared: 0,
            last_event: None,
            halted: None,
            paused: false,
            started: false,
        }
    }

    /// Start the game and spawn the first piece
    ///
    /// A stage that cannot hold every catalog shape at the spawn point is
    /// rejected here and the game stays not started.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.started {
            return Ok(());
        }
        self.config.validate()?;
        self.started = true;
        debug!(
            width = self.config.playfield.width(),
            depth = self.config.playfield.depth(),
            seed = self.config.seed,
            "simulation started"
        );
        self.spawn_piece()
    }

    /// Drop everything and return to the not-started state
    ///
    /// The generator keeps its sequence position.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.active = None;
        self.contacts.clear();
        self.fall_timer_ms = 0;
        self.timer.reset();
        self.pieces_locked = 0;
        self.layers_cleared = 0;
        self.last_event = None;
        self.halted = None;
        self.paused = false;
        self.started = false;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn playfield(&self) -> &Playfield {
        &self.config.playfield
    }

    pub fn stack(&self) -> &SettledStack {
        &self.stack
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn timer(&self) -> &PlayTimer {
        &self.timer
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Pause state seen by the last tick or action
    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn layers_cleared(&self) -> u32 {
        self.layers_cleared
    }

    /// Fatal error that stopped the simulation, if any
    pub fn halted(&self) -> Option<&SimError> {
        self.halted.as_ref()
    }

    pub fn game_over(&self) -> bool {
        self.halted.as_ref().is_some_and(SimError::is_game_over)
    }

    /// Place an already settled piece, e.g. to set up a puzzle before starting
    ///
    /// Spawned pieces get ids above every seeded one.
    pub fn seed_stack(&mut self, piece: SettledPiece) -> Result<(), SimError> {
        let id = piece.id();
        self.stack.insert(piece)?;
        self.next_id = self.next_id.max(id.wrapping_add(1));
        Ok(())
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Main simulation tick
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
        input: &FrameInput,
        pause: &impl PauseSource,
    ) -> Result<TickOutcome, SimError> {
        if self.halted.is_some() {
            return Err(SimError::Halted);
        }
        self.paused = pause.is_paused();
        if self.paused || !self.started {
            return Ok(TickOutcome {
                skipped: true,
                ..TickOutcome::default()
            });
        }
        self.timer.advance(elapsed_ms, false);

        let mut outcome = TickOutcome::default();
        if self.active.is_none() {
            self.spawn_piece()?;
        }

        if let Some(event) = self.resolve_pending()? {
            outcome.locked = Some(event);
            return Ok(outcome);
        }

        self.fall_timer_ms = self.fall_timer_ms.saturating_add(elapsed_ms);
        let span = self.config.fall_span_ms.max(1);
        while self.fall_timer_ms >= span {
            self.fall_timer_ms -= span;
            let (accepted, event) = self.step(Motion::Fall)?;
            if accepted {
                outcome.falls += 1;
            }
            if event.is_some() {
                self.fall_timer_ms = 0;
                outcome.locked = event;
                return Ok(outcome);
            }
        }

        // Arrows steer the camera while the modifier is held.
        if !input.camera_held && input.direction != InputDirection::None {
            let (accepted, event) = self.step(Motion::Translate(input.direction))?;
            outcome.moved = accepted;
            if event.is_some() {
                outcome.locked = event;
                return Ok(outcome);
            }
        }

        if let Some(axis) = input.rotation {
            let (accepted, event) = self.step(Motion::Rotate(RotationStep::for_key(axis)))?;
            outcome.rotated = accepted;
            outcome.locked = event;
        }

        Ok(outcome)
    }

    /// Apply a single discrete action immediately
    ///
    /// Returns true if the piece moved. Pause, return-to-start and confirm are
    /// host concerns and always return false here.
    pub fn apply_action(
        &mut self,
        action: GameAction,
        pause: &impl PauseSource,
    ) -> Result<bool, SimError> {
        if self.halted.is_some() {
            return Err(SimError::Halted);
        }
        self.paused = pause.is_paused();
        if !self.started || self.paused {
            return Ok(false);
        }
        let motion = match (action.direction(), action.rotation_axis()) {
            (Some(direction), _) => Motion::Translate(direction),
            (None, Some(axis)) => Motion::Rotate(RotationStep::for_key(axis)),
            (None, None) => return Ok(false),
        };
        let (accepted, _) = self.step(motion)?;
        Ok(accepted)
    }

    /// Check the active piece against the current stack and settle any leftovers
    fn resolve_pending(&mut self) -> Result<Option<LockEvent>, SimError> {
        let Some(piece) = self.active.as_mut() else {
            return Ok(None);
        };
        detect(piece, &self.stack, &self.config.playfield, &mut self.contacts);
        match resolve(piece, &mut self.contacts, &self.stack, &self.config.playfield) {
            Resolution::Locked => self.lock_active().map(Some),
            Resolution::Clear | Resolution::RolledBack => Ok(None),
        }
    }

    /// Apply one motion and resolve its contacts
    ///
    /// Returns whether the motion was accepted and kept, plus the lock event
    /// if it made the piece lock.
    fn step(&mut self, motion: Motion) -> Result<(bool, Option<LockEvent>), SimError> {
        let Some(piece) = self.active.as_mut() else {
            return Ok((false, None));
        };
        let before = piece.transform();
        let accepted = match motion {
            Motion::Fall => piece.fall(),
            Motion::Translate(direction) => piece.translate_by(direction),
            Motion::Rotate(step) => piece.rotate_by(step),
        };
        if !accepted {
            return Ok((false, None));
        }

        detect(piece, &self.stack, &self.config.playfield, &mut self.contacts);
        let resolution = resolve(piece, &mut self.contacts, &self.stack, &self.config.playfield);
        let kept = piece.transform() != before;
        match resolution {
            Resolution::Locked => Ok((kept, Some(self.lock_active()?))),
            Resolution::Clear | Resolution::RolledBack => Ok((kept, None)),
        }
    }

    /// Commit the active piece, clear full layers and spawn the next piece
    fn lock_active(&mut self) -> Result<LockEvent, SimError> {
        let Some(piece) = self.active.take() else {
            return Err(self.fail(SimError::Halted));
        };
        let id = piece.id();
        let kind = piece.kind();
        let lowest_y = piece.lowest_y();

        if let Err(err) = self.stack.insert(piece.commit()) {
            return Err(self.fail(err));
        }
        let report = match clear_and_collapse(&mut self.stack, &self.config.playfield) {
            Ok(report) => report,
            Err(err) => return Err(self.fail(err)),
        };
        if let Err(err) = self.stack.verify_integrity() {
            return Err(self.fail(err));
        }

        let event = LockEvent {
            parent: id,
            kind,
            lowest_y,
            layers_cleared: report.cleared_layers.len() as u32,
            cells_removed: report.cells_removed as u32,
            cells_shifted: report.cells_shifted as u32,
        };
        self.pieces_locked += 1;
        self.layers_cleared += event.layers_cleared;
        self.last_event = Some(event);
        debug!(
            piece = id,
            kind = kind.as_str(),
            lowest_y,
            layers = event.layers_cleared,
            "piece locked"
        );

        self.spawn_piece()?;
        Ok(event)
    }

    /// Ask the generator for the next piece and place it at the spawn point
    fn spawn_piece(&mut self) -> Result<(), SimError> {
        let kind = self.generator.request_next_piece();
        let piece = Piece::new(
            self.next_id,
            kind,
            self.config.spawn,
            self.config.playfield.scale(),
        );
        if !placement_is_legal(&piece, &self.stack, &self.config.playfield) {
            return Err(self.fail(SimError::SpawnBlocked {
                at: self.config.spawn,
            }));
        }

        debug!(piece = self.next_id, kind = kind.as_str(), "piece spawned");
        self.next_id = self.next_id.wrapping_add(1);
        self.fall_timer_ms = 0;
        self.contacts.clear();
        self.active = Some(piece);
        Ok(())
    }

    /// Latch a fatal error
    fn fail(&mut self, err: SimError) -> SimError {
        warn!(error = %err, elapsed = %self.timer, "simulation halted");
        self.active = None;
        self.halted = Some(err.clone());
        err
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let field = &self.config.playfield;
        let active = self.active.as_ref().map(|piece| ActiveSnapshot {
            id: piece.id(),
            kind: piece.kind(),
            pivot: piece.pivot(),
            world_position: piece.world_position(),
            orientation: piece.orientation(),
            phase: piece.phase(),
            cells: piece.current_cells().to_vec(),
        });

        let mut settled: Vec<SettledCellSnapshot> = self
            .stack
            .cells()
            .map(|(cell, parent)| SettledCellSnapshot { cell, parent })
            .collect();
        settled.sort_unstable_by_key(|s| (s.cell.y, s.cell.z, s.cell.x));

        let layers = self
            .stack
            .touched_layers()
            .into_iter()
            .rev()
            .map(|y| LayerSnapshot {
                y,
                count: self.stack.layer_count(y),
            })
            .collect();

        GameSnapshot {
            width: field.width(),
            depth: field.depth(),
            height: field.height(),
            footprint: field.footprint(),
            active,
            settled,
            layers,
            pieces_locked: self.pieces_locked,
            layers_cleared: self.layers_cleared,
            elapsed: self.timer.result_string(),
            started: self.started,
            paused: self.paused,
            game_over: self.game_over(),
        }
    }
}

impl Default for GameState<RandomGenerator> {
    fn default() -> Self {
        Self::new(1)
    }
}
