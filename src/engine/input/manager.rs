// Input manager - turns keyboard and touch events into runner intents

use super::action::{Action, InputSource};
use super::config::KeyBindings;
use super::touch::{TouchGesture, TouchTracker};
use std::time::{Duration, Instant};
use winit::event::{ElementState, KeyEvent, Touch, TouchPhase};
use winit::keyboard::{KeyCode, PhysicalKey};

/// How long a swipe keeps its steer intent active
pub const STEER_RELEASE: Duration = Duration::from_millis(200);

/// Snapshot of what the player currently wants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub steer_left: bool,
    pub steer_right: bool,
    pub jump: bool,
}

/// Collects device events. Keyboard and touch write the same intent flags;
/// whichever event arrived last wins.
pub struct InputManager {
    bindings: KeyBindings,
    touch: TouchTracker,
    intents: Intents,
    /// When the swipe-set steer intents clear
    steer_release_at: Option<Instant>,
    /// One-shot actions pressed since the last `take_commands`
    commands: Vec<Action>,
}

impl InputManager {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            touch: TouchTracker::new(),
            intents: Intents::default(),
            steer_release_at: None,
            commands: Vec::new(),
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.apply_key(code, event.state, event.repeat);
        }
    }

    /// Apply a key press or release
    pub fn apply_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        let Some(action) = self.bindings.action_for(InputSource::key(code)) else {
            return;
        };
        let pressed = state == ElementState::Pressed;

        if action.is_intent() {
            self.set_intent(action, pressed);
        } else if pressed && !repeat {
            self.commands.push(action);
        }
    }

    /// Process a touch event from winit
    pub fn process_touch(&mut self, touch: &Touch) {
        self.apply_touch(touch.id, touch.phase, touch.location.x as f32, Instant::now());
    }

    /// Apply a touch event that happened at `now`
    pub fn apply_touch(&mut self, id: u64, phase: TouchPhase, x: f32, now: Instant) {
        let Some(gesture) = self.touch.handle(id, phase, x) else {
            return;
        };

        match gesture {
            TouchGesture::TwoFingerTap => self.intents.jump = true,
            TouchGesture::FingerDown { .. } | TouchGesture::Cancelled => {
                self.intents.jump = false
            }
            TouchGesture::FingerUp { .. } => {
                self.intents.jump = false;
                match gesture.swipe_direction() {
                    1 => self.intents.steer_right = true,
                    -1 => self.intents.steer_left = true,
                    _ => {}
                }
                self.steer_release_at = Some(now + STEER_RELEASE);
            }
        }
    }

    /// Expire the swipe debounce. Call once per frame before reading intents.
    pub fn update(&mut self, now: Instant) {
        if let Some(release_at) = self.steer_release_at {
            if now >= release_at {
                self.intents.steer_left = false;
                self.intents.steer_right = false;
                self.steer_release_at = None;
            }
        }
    }

    /// Current intent snapshot
    pub fn intents(&self) -> Intents {
        self.intents
    }

    /// Drain the one-shot actions pressed since the last call
    pub fn take_commands(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.commands)
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Drop every held intent and pending gesture
    pub fn reset(&mut self) {
        self.intents = Intents::default();
        self.steer_release_at = None;
        self.touch.reset();
        self.commands.clear();
    }

    fn set_intent(&mut self, action: Action, active: bool) {
        match action {
            Action::SteerLeft => self.intents.steer_left = active,
            Action::SteerRight => self.intents.steer_right = active,
            Action::Jump => self.intents.jump = active,
            _ => {}
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_hold_intents() {
        let mut input = InputManager::default();

        input.apply_key(KeyCode::ArrowLeft, ElementState::Pressed, false);
        input.apply_key(KeyCode::ArrowUp, ElementState::Pressed, false);
        assert_eq!(
            input.intents(),
            Intents {
                steer_left: true,
                steer_right: false,
                jump: true
            }
        );

        input.apply_key(KeyCode::ArrowLeft, ElementState::Released, false);
        assert!(!input.intents().steer_left);
        assert!(input.intents().jump);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut input = InputManager::default();
        input.apply_key(KeyCode::KeyQ, ElementState::Pressed, false);
        assert_eq!(input.intents(), Intents::default());
        assert!(input.take_commands().is_empty());
    }

    #[test]
    fn test_commands_fire_once_per_press() {
        let mut input = InputManager::default();
        input.apply_key(KeyCode::Enter, ElementState::Pressed, false);
        input.apply_key(KeyCode::Enter, ElementState::Pressed, true);
        input.apply_key(KeyCode::Enter, ElementState::Released, false);

        assert_eq!(input.take_commands(), vec![Action::Start]);
        assert!(input.take_commands().is_empty());
    }

    #[test]
    fn test_swipe_right_clears_after_debounce() {
        let mut input = InputManager::default();
        let t0 = Instant::now();

        input.apply_touch(1, TouchPhase::Started, 100.0, t0);
        input.apply_touch(1, TouchPhase::Ended, 200.0, t0);
        assert!(input.intents().steer_right);

        input.update(t0 + Duration::from_millis(199));
        assert!(input.intents().steer_right);

        input.update(t0 + STEER_RELEASE);
        assert!(!input.intents().steer_right);
    }

    #[test]
    fn test_swipe_left() {
        let mut input = InputManager::default();
        let t0 = Instant::now();

        input.apply_touch(4, TouchPhase::Started, 400.0, t0);
        input.apply_touch(4, TouchPhase::Ended, 320.0, t0);
        assert!(input.intents().steer_left);
        assert!(!input.intents().steer_right);
    }

    #[test]
    fn test_two_finger_jump_then_release() {
        let mut input = InputManager::default();
        let t0 = Instant::now();

        input.apply_touch(1, TouchPhase::Started, 100.0, t0);
        assert!(!input.intents().jump);
        input.apply_touch(2, TouchPhase::Started, 300.0, t0);
        assert!(input.intents().jump);

        input.apply_touch(2, TouchPhase::Ended, 300.0, t0);
        assert!(!input.intents().jump);
    }

    #[test]
    fn test_debounce_also_clears_key_steering() {
        // Swipes and keys share the same flags, so the timer wins over a held key
        let mut input = InputManager::default();
        let t0 = Instant::now();

        input.apply_touch(1, TouchPhase::Started, 100.0, t0);
        input.apply_touch(1, TouchPhase::Ended, 100.0, t0);
        input.apply_key(KeyCode::ArrowLeft, ElementState::Pressed, false);
        input.update(t0 + STEER_RELEASE);

        assert!(!input.intents().steer_left);
    }

    #[test]
    fn test_cancelled_touch_never_steers() {
        let mut input = InputManager::default();
        let t0 = Instant::now();

        input.apply_touch(1, TouchPhase::Started, 100.0, t0);
        input.apply_touch(2, TouchPhase::Started, 300.0, t0);
        assert!(input.intents().jump);

        input.apply_touch(2, TouchPhase::Cancelled, 300.0, t0);
        input.apply_touch(1, TouchPhase::Cancelled, 400.0, t0);
        assert_eq!(input.intents(), Intents::default());
    }

    #[test]
    fn test_reset() {
        let mut input = InputManager::default();
        input.apply_key(KeyCode::ArrowRight, ElementState::Pressed, false);
        input.apply_key(KeyCode::Escape, ElementState::Pressed, false);
        input.reset();

        assert_eq!(input.intents(), Intents::default());
        assert!(input.take_commands().is_empty());
    }
}
