// Remappable key bindings

use super::action::{default_bindings, Action, InputSource};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// A `[[bindings]]` entry from the settings file: the keys that trigger
/// `action`. An empty list leaves the action unbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRemap {
    pub action: Action,
    pub keys: Vec<KeyCode>,
}

/// Maps input sources to actions, with a reverse index for rebinding UIs
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<InputSource, Action>,
    action_to_sources: HashMap<Action, Vec<InputSource>>,
}

impl KeyBindings {
    /// Bindings with nothing mapped
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
            action_to_sources: HashMap::new(),
        }
    }

    /// Create bindings from a list of pairs; later pairs override earlier ones
    pub fn from_pairs(pairs: impl IntoIterator<Item = (InputSource, Action)>) -> Self {
        let mut bindings = Self::empty();
        for (source, action) in pairs {
            bindings.bind(source, action);
        }
        bindings
    }

    /// Bind a source to an action, replacing whatever it did before
    pub fn bind(&mut self, source: InputSource, action: Action) {
        self.unbind_source(source);
        self.bindings.insert(source, action);
        self.action_to_sources
            .entry(action)
            .or_default()
            .push(source);
    }

    /// Unbind an input source
    pub fn unbind_source(&mut self, source: InputSource) {
        let Some(action) = self.bindings.remove(&source) else {
            return;
        };
        if let Some(sources) = self.action_to_sources.get_mut(&action) {
            sources.retain(|s| *s != source);
            if sources.is_empty() {
                self.action_to_sources.remove(&action);
            }
        }
    }

    /// Unbind all sources for an action
    pub fn unbind_action(&mut self, action: Action) {
        for source in self.action_to_sources.remove(&action).unwrap_or_default() {
            self.bindings.remove(&source);
        }
    }

    /// Get the action bound to an input source
    pub fn action_for(&self, source: InputSource) -> Option<Action> {
        self.bindings.get(&source).copied()
    }

    /// Get all input sources bound to an action
    pub fn sources_for(&self, action: Action) -> &[InputSource] {
        self.action_to_sources
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_binding(&self, action: Action) -> bool {
        self.action_to_sources.contains_key(&action)
    }

    /// Replace every source of `action` with `keys`
    pub fn remap(&mut self, action: Action, keys: &[KeyCode]) {
        self.unbind_action(action);
        for &code in keys {
            self.bind(InputSource::key(code), action);
        }
        debug!("{:?} bound to {:?}", action, self.sources_for(action));
    }

    /// Default layout with `remaps` applied in order
    pub fn with_remaps(remaps: &[KeyRemap]) -> Self {
        let mut bindings = Self::default();
        for remap in remaps {
            bindings.remap(remap.action, &remap.keys);
        }
        bindings
    }

    /// Steering and jump actions left without any key
    pub fn missing_intents(&self) -> Vec<Action> {
        [Action::SteerLeft, Action::SteerRight, Action::Jump]
            .into_iter()
            .filter(|action| !self.has_binding(*action))
            .collect()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_pairs(default_bindings())
    }
}
