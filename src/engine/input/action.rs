// Runner actions and their default keys

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Everything the player can ask the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Steering intents, held while the key is down
    SteerLeft,
    SteerRight,
    Jump,

    // Menu actions, fired once per press
    Start,
    Pause,
    ToggleDarkMode,
    Quit,
}

impl Action {
    /// Held actions feed the simulation; the rest are one-shot commands
    pub fn is_intent(&self) -> bool {
        matches!(self, Self::SteerLeft | Self::SteerRight | Self::Jump)
    }
}

/// Represents an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Default keyboard bindings: arrows to run, Enter/Space to start
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::ArrowLeft), Action::SteerLeft),
        (InputSource::key(KeyCode::ArrowRight), Action::SteerRight),
        (InputSource::key(KeyCode::ArrowUp), Action::Jump),
        (InputSource::key(KeyCode::Enter), Action::Start),
        (InputSource::key(KeyCode::Space), Action::Start),
        (InputSource::key(KeyCode::KeyP), Action::Pause),
        (InputSource::key(KeyCode::KeyD), Action::ToggleDarkMode),
        (InputSource::key(KeyCode::Escape), Action::Quit),
    ]
}
