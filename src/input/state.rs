//! Input state management
//!
//! Polls the keyboard through macroquad and reduces it to a `FrameInput`,
//! the plain per-tick snapshot the game loop consumes. The only stateful
//! part is the jump key's hold timer, which gives variable jump height: a
//! jump keeps boosting while the key has been down for less than the hold
//! window.

use macroquad::prelude::{get_last_key_pressed, is_key_down, is_key_pressed, KeyCode};
use super::Action;

/// Continuous key-down timer for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyHold {
    down: bool,
    /// Seconds since the key went down (0 on the press frame)
    held_for: f32,
}

impl KeyHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's key state.
    pub fn update(&mut self, down: bool, dt: f32) {
        if down {
            if self.down {
                self.held_for += dt;
            } else {
                self.held_for = 0.0;
            }
        } else {
            self.held_for = 0.0;
        }
        self.down = down;
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    pub fn held_ms(&self) -> f32 {
        if self.down { self.held_for * 1000.0 } else { 0.0 }
    }

    /// Down, and pressed less than `window_ms` ago.
    pub fn down_within(&self, window_ms: f32) -> bool {
        self.down && self.held_ms() < window_ms
    }

    /// Down continuously for at least `ms`.
    pub fn held_at_least(&self, ms: f32) -> bool {
        self.down && self.held_ms() >= ms
    }
}

/// Raw key states for one frame, before any interpretation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawKeys {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub interact_pressed: bool,
    pub skip_pressed: bool,
    pub any_pressed: bool,
}

/// What the game loop needs from input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    /// Jump key is down and still inside the hold window
    pub jump_hold_active: bool,
    /// Switch action pressed this frame
    pub action_pressed: bool,
    pub skip_level_pressed: bool,
    /// Any key at all pressed this frame (menus)
    pub any_key_pressed: bool,
}

/// Keyboard input with jump-hold tracking.
pub struct InputState {
    jump: KeyHold,
    /// Jump boost window in milliseconds
    pub jump_hold_ms: f32,
}

impl InputState {
    pub fn new(jump_hold_ms: f32) -> Self {
        Self { jump: KeyHold::new(), jump_hold_ms }
    }

    /// Poll macroquad's keyboard. Call once per frame.
    pub fn poll(&mut self, dt: f32) -> FrameInput {
        let raw = RawKeys {
            left: Self::keyboard_down(Action::MoveLeft),
            right: Self::keyboard_down(Action::MoveRight),
            jump: Self::keyboard_down(Action::Jump),
            interact_pressed: Self::keyboard_pressed(Action::Interact),
            skip_pressed: Self::keyboard_pressed(Action::SkipLevel),
            any_pressed: get_last_key_pressed().is_some(),
        };
        self.frame(raw, dt)
    }

    /// Interpret raw key states (used by `poll`, and by tests directly).
    pub fn frame(&mut self, raw: RawKeys, dt: f32) -> FrameInput {
        self.jump.update(raw.jump, dt);
        FrameInput {
            left: raw.left,
            right: raw.right,
            jump_hold_active: self.jump.down_within(self.jump_hold_ms),
            action_pressed: raw.interact_pressed,
            skip_level_pressed: raw.skip_pressed,
            any_key_pressed: raw.any_pressed,
        }
    }

    pub fn jump_key(&self) -> &KeyHold {
        &self.jump
    }

    fn keyboard_down(action: Action) -> bool {
        match action {
            Action::MoveLeft => is_key_down(KeyCode::Left),
            Action::MoveRight => is_key_down(KeyCode::Right),
            Action::Jump => is_key_down(KeyCode::Up),
            Action::Interact => is_key_down(KeyCode::Space),
            Action::SkipLevel => is_key_down(KeyCode::P),
        }
    }

    fn keyboard_pressed(action: Action) -> bool {
        match action {
            Action::MoveLeft => is_key_pressed(KeyCode::Left),
            Action::MoveRight => is_key_pressed(KeyCode::Right),
            Action::Jump => is_key_pressed(KeyCode::Up),
            Action::Interact => is_key_pressed(KeyCode::Space),
            Action::SkipLevel => is_key_pressed(KeyCode::P),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.03;

    fn jump_down() -> RawKeys {
        RawKeys { jump: true, ..RawKeys::default() }
    }

    #[test]
    fn test_hold_window_closes_after_200ms() {
        let mut input = InputState::new(200.0);

        // Press frame counts as inside the window
        assert!(input.frame(jump_down(), DT).jump_hold_active);

        let mut frames_active = 1;
        for _ in 0..30 {
            if input.frame(jump_down(), DT).jump_hold_active {
                frames_active += 1;
            }
        }
        // 30ms frames: the press frame plus 6 more (180ms < 200ms < 210ms)
        assert_eq!(frames_active, 7);
        assert!(input.jump_key().held_at_least(200.0));
    }

    #[test]
    fn test_release_resets_hold() {
        let mut input = InputState::new(200.0);
        for _ in 0..20 {
            input.frame(jump_down(), DT);
        }
        assert!(!input.frame(RawKeys::default(), DT).jump_hold_active);
        assert_eq!(input.jump_key().held_ms(), 0.0);

        // Fresh press opens a new window
        assert!(input.frame(jump_down(), DT).jump_hold_active);
    }

    #[test]
    fn test_passthrough_fields() {
        let mut input = InputState::new(200.0);
        let raw = RawKeys {
            left: true,
            interact_pressed: true,
            skip_pressed: true,
            any_pressed: true,
            ..RawKeys::default()
        };
        let frame = input.frame(raw, DT);
        assert!(frame.left && !frame.right);
        assert!(frame.action_pressed && frame.skip_level_pressed && frame.any_key_pressed);
        assert!(!frame.jump_hold_active);
    }
}
