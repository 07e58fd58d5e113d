/// Keyboard state tracker.
///
/// The simulation wants *held* state for all four buttons (it does its own
/// rising-edge detection for jump and dash). Menu keys (start, restart,
/// quit) are edge-triggered here, on the first press.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::entity::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Bindings ──
// Terminals don't report SHIFT on its own, so dash lives on letter keys.

pub const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const JUMP_KEYS: &[KeyCode] = &[
    KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'),
];
pub const DASH_KEYS: &[KeyCode] = &[
    KeyCode::Char('k'), KeyCode::Char('K'),
    KeyCode::Char('x'), KeyCode::Char('X'),
    KeyCode::Char('j'), KeyCode::Char('J'),
];
pub const START_KEYS: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const RESTART_KEYS: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const QUIT_KEYS: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                self.apply(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn apply(&mut self, key: KeyEvent, at: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unreliable without enhancement; the timeout handles it.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Drop keys that timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => t.elapsed() < HOLD_TIMEOUT,
            None => false,
        }
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// The simulation's view of the keyboard this frame.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            move_left: self.any_held(LEFT_KEYS),
            move_right: self.any_held(RIGHT_KEYS),
            jump_held: self.any_held(JUMP_KEYS),
            dash_held: self.any_held(DASH_KEYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        let mut k = KeyEvent::new(code, KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        k
    }

    #[test]
    fn press_is_fresh_once_then_held() {
        let mut s = InputState::new();
        let t = Instant::now();
        s.apply(press(KeyCode::Char(' ')), t);
        assert!(s.any_pressed(START_KEYS));
        assert!(s.frame_input().jump_held);

        s.fresh_presses.clear();
        s.apply(press(KeyCode::Char(' ')), t);
        assert!(!s.any_pressed(START_KEYS), "repeat is not a new press");
    }

    #[test]
    fn release_ignored_without_enhancement() {
        let mut s = InputState::new();
        s.apply(press(KeyCode::Char('k')), Instant::now());
        s.apply(release(KeyCode::Char('k')), Instant::now());
        assert!(s.frame_input().dash_held);
    }

    #[test]
    fn release_honored_with_enhancement() {
        let mut s = InputState::new();
        s.honor_release = true;
        s.apply(press(KeyCode::Left), Instant::now());
        assert!(s.frame_input().move_left);
        s.apply(release(KeyCode::Left), Instant::now());
        assert!(!s.frame_input().move_left);
    }

    #[test]
    fn timed_out_keys_expire() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.apply(press(KeyCode::Right), now);
        s.expire(now + HOLD_TIMEOUT);
        assert!(!s.frame_input().move_right);
    }

    #[test]
    fn ctrl_c_detected() {
        let mut s = InputState::new();
        s.raw_events.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(s.ctrl_c_pressed());
    }
}
