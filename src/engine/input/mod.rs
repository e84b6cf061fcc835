// Input handling system
//
// Keyboard keys and touch gestures both collapse into three intents the
// simulation reads once per step: steer left, steer right, jump.
//
// - `action`: Actions and default key bindings
// - `config`: Remappable binding table
// - `touch`: Two-finger jump and swipe recognition
// - `manager`: Event intake, swipe debounce and the intent snapshot

pub mod action;
pub mod config;
pub mod manager;
pub mod touch;

pub use action::Action;
pub use config::{KeyBindings, KeyRemap};
pub use manager::{InputManager, Intents};
