//! Per-frame input collection for terminal environments.
//!
//! Movement and rotation keys are edge-triggered: a key fires once when it
//! goes down and stays silent until it is released. Terminals that never send
//! release events are handled with a timeout: a held key that produced no
//! event (press or auto-repeat) for `key_release_timeout_ms` counts as
//! released. The camera modifier (Shift) is level-triggered.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::map::{handle_key_event, is_camera_modifier};
use crate::types::{FrameInput, GameAction, InputDirection, KEY_RELEASE_TIMEOUT_MS};

/// Upper bound on simultaneously tracked keys
const MAX_HELD_KEYS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    code: KeyCode,
    last_seen: Instant,
}

/// Collects key events between two simulation frames.
#[derive(Debug, Clone)]
pub struct InputHandler {
    held: ArrayVec<HeldKey, MAX_HELD_KEYS>,
    frame: FrameInput,
    camera_last_seen: Option<Instant>,
    key_release_timeout_ms: u32,
}

/// Case-insensitive identity of a key
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            held: ArrayVec::new(),
            frame: FrameInput::IDLE,
            camera_last_seen: None,
            key_release_timeout_ms: KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.key_release_timeout_ms as u64)
    }

    /// Feed one terminal key event
    ///
    /// Returns the action it triggered, or `None` for unmapped keys, releases
    /// and repeats of a key that is still held.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<GameAction> {
        self.handle_key_event_at(key, Instant::now())
    }

    fn handle_key_event_at(&mut self, key: KeyEvent, now: Instant) -> Option<GameAction> {
        if key.kind == KeyEventKind::Release {
            self.handle_key_release(key.code);
            return None;
        }

        let camera = is_camera_modifier(key);
        if camera {
            self.camera_last_seen = Some(now);
        }

        let action = handle_key_event(key)?;
        if !self.press(key.code, now) {
            return None;
        }

        match (action.direction(), action.rotation_axis()) {
            (Some(direction), _) if camera => {
                if self.frame.camera_direction == InputDirection::None {
                    self.frame.camera_direction = direction;
                }
                None
            }
            (Some(direction), _) => {
                // One direction per frame; the first press wins.
                if self.frame.direction == InputDirection::None {
                    self.frame.direction = direction;
                }
                Some(action)
            }
            (None, Some(axis)) => {
                if self.frame.rotation.is_none() {
                    self.frame.rotation = Some(axis);
                }
                Some(action)
            }
            (None, None) => Some(action),
        }
    }

    /// Track a key going down; returns true on the leading edge
    fn press(&mut self, code: KeyCode, now: Instant) -> bool {
        let code = normalize(code);
        if let Some(held) = self.held.iter_mut().find(|h| h.code == code) {
            held.last_seen = now;
            return false;
        }
        if self.held.is_full() {
            self.held.remove(0);
        }
        self.held.push(HeldKey {
            code,
            last_seen: now,
        });
        true
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        let code = normalize(code);
        if matches!(code, KeyCode::Modifier(_)) {
            self.camera_last_seen = None;
        }
        self.held.retain(|h| h.code != code);
    }

    /// Check if a key is currently considered down
    pub fn is_held(&self, code: KeyCode) -> bool {
        let code = normalize(code);
        self.held.iter().any(|h| h.code == code)
    }

    /// Hand the collected input to the simulation and start a new frame
    pub fn take_frame(&mut self) -> FrameInput {
        self.take_frame_at(Instant::now())
    }

    fn take_frame_at(&mut self, now: Instant) -> FrameInput {
        self.expire(now);
        let mut frame = std::mem::replace(&mut self.frame, FrameInput::IDLE);
        frame.camera_held = self.camera_last_seen.is_some();
        frame
    }

    /// Auto-release keys when the terminal does not emit release events.
    fn expire(&mut self, now: Instant) {
        let timeout = self.timeout();
        self.held
            .retain(|h| now.saturating_duration_since(h.last_seen) <= timeout);
        if self
            .camera_last_seen
            .is_some_and(|seen| now.saturating_duration_since(seen) > timeout)
        {
            self.camera_last_seen = None;
        }
    }

    pub fn reset(&mut self) {
        self.held.clear();
        self.frame = FrameInput::IDLE;
        self.camera_last_seen = None;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
