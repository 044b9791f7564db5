//! Keyboard and touch input
//!
//! Both sources fold into one `InputState` that the scheduler hands to the
//! game at the start of each frame.

use glam::Vec2;

use crate::consts::SWIPE_JUMP_THRESHOLD;

/// Held directions for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputState {
    /// Net horizontal direction: -1, 0 or 1
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn key_up(&mut self, key: Key) {
        self.set(key, false);
    }

    fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Jump => self.jump = held,
        }
    }
}

/// Logical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Jump,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" | " " => Some(Key::Jump),
            _ => None,
        }
    }
}

/// A classified touch movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Left,
    Right,
    Jump,
}

/// Classify a touch displacement (screen space, +y down)
///
/// Horizontal-dominant movement is a directional move. Vertical-dominant
/// movement is a jump only when it goes up by more than `jump_threshold`.
pub fn classify_swipe(delta: Vec2, jump_threshold: f32) -> Option<Gesture> {
    if delta.x.abs() > delta.y.abs() {
        if delta.x < 0.0 {
            Some(Gesture::Left)
        } else {
            Some(Gesture::Right)
        }
    } else if -delta.y > jump_threshold {
        Some(Gesture::Jump)
    } else {
        None
    }
}

/// Tracks one touch from start to end and drives an `InputState`
///
/// Keyboard and touch share the same `InputState`; the tracker only ever
/// releases flags it raised itself.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    start: Option<Vec2>,
    /// Flags this touch turned on
    held: InputState,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(&mut self, pos: Vec2) {
        self.start = Some(pos);
    }

    /// Re-classify against the touch origin and update held directions
    pub fn on_move(&mut self, pos: Vec2, input: &mut InputState) -> Option<Gesture> {
        let start = self.start?;
        let gesture = classify_swipe(pos - start, SWIPE_JUMP_THRESHOLD);
        match gesture {
            Some(Gesture::Left) => {
                release(&mut self.held.right, &mut input.right);
                press(&mut self.held.left, &mut input.left);
            }
            Some(Gesture::Right) => {
                release(&mut self.held.left, &mut input.left);
                press(&mut self.held.right, &mut input.right);
            }
            Some(Gesture::Jump) => press(&mut self.held.jump, &mut input.jump),
            None => {}
        }
        gesture
    }

    /// Lift the finger: release what the touch was holding
    pub fn on_end(&mut self, input: &mut InputState) {
        self.start = None;
        release(&mut self.held.left, &mut input.left);
        release(&mut self.held.right, &mut input.right);
        release(&mut self.held.jump, &mut input.jump);
    }
}

/// Raise `flag`, remembering it as ours only if it was down
fn press(held: &mut bool, flag: &mut bool) {
    if !*flag {
        *flag = true;
        *held = true;
    }
}

fn release(held: &mut bool, flag: &mut bool) {
    if std::mem::take(held) {
        *flag = false;
    }
}
