//! Keyboard and touch input, folded into per-frame `TickInput`s
//!
//! Listeners record raw key-down/key-up and touch events here; the frame
//! loop takes a `snapshot()` before ticking and calls `end_frame()` after.
//! Steering is level-triggered (held), confirm is edge-triggered.

use crate::sim::TickInput;

const LEFT_KEYS: [&str; 2] = ["ArrowLeft", "KeyA"];
const RIGHT_KEYS: [&str; 2] = ["ArrowRight", "KeyD"];

/// Which half of the screen a touch is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchSide {
    Left,
    Right,
}

impl TouchSide {
    /// Classify a touch by its x coordinate within a surface `width` wide
    pub fn from_position(x: f32, width: f32) -> Self {
        if x < width / 2.0 {
            TouchSide::Left
        } else {
            TouchSide::Right
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Held state per entry of `LEFT_KEYS`
    left_keys: [bool; 2],
    /// Held state per entry of `RIGHT_KEYS`
    right_keys: [bool; 2],
    touch: Option<TouchSide>,
    confirm: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keydown by `KeyboardEvent.code`. Returns true if the key is
    /// one the game uses (the caller may then `preventDefault`).
    pub fn key_down(&mut self, code: &str, repeat: bool) -> bool {
        if let Some(i) = LEFT_KEYS.iter().position(|k| *k == code) {
            self.left_keys[i] = true;
            return true;
        }
        if let Some(i) = RIGHT_KEYS.iter().position(|k| *k == code) {
            self.right_keys[i] = true;
            return true;
        }
        match code {
            "Enter" | "NumpadEnter" => {
                if !repeat {
                    self.confirm = true;
                }
                true
            }
            "Space" => {
                self.confirm = true;
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(i) = LEFT_KEYS.iter().position(|k| *k == code) {
            self.left_keys[i] = false;
        } else if let Some(i) = RIGHT_KEYS.iter().position(|k| *k == code) {
            self.right_keys[i] = false;
        }
    }

    /// A new touch: counts as a tap (confirm) and starts steering
    pub fn touch_start(&mut self, side: TouchSide) {
        self.confirm = true;
        self.touch = Some(side);
    }

    pub fn touch_move(&mut self, side: TouchSide) {
        if self.touch.is_some() {
            self.touch = Some(side);
        }
    }

    pub fn touch_end(&mut self) {
        self.touch = None;
    }

    /// Drop everything held, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        *self = Self {
            confirm: self.confirm,
            ..Self::default()
        };
    }

    pub fn is_left_held(&self) -> bool {
        self.left_keys.iter().any(|&k| k) || self.touch == Some(TouchSide::Left)
    }

    pub fn is_right_held(&self) -> bool {
        self.right_keys.iter().any(|&k| k) || self.touch == Some(TouchSide::Right)
    }

    pub fn was_confirm_pressed(&self) -> bool {
        self.confirm
    }

    /// Input for the next tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.is_left_held(),
            right: self.is_right_held(),
            confirm: self.confirm,
        }
    }

    /// Clear edge-triggered state after a tick consumed it
    pub fn end_frame(&mut self) {
        self.confirm = false;
    }
}
