//! Game settings
//!
//! Read from a TOML file at startup. Every field has a default, so a partial
//! file (or no file at all) is valid. Command-line flags are applied on top
//! by `main`.
//!
//! Keys are remapped with `[[bindings]]` tables:
//!
//! ```toml
//! [[bindings]]
//! action = "jump"
//! keys = ["ArrowUp", "KeyW"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::input::KeyRemap;
use crate::game::tuning::{RunnerTuning, BASE_TUNING};

/// Playable characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Player1,
    Player2,
}

impl Character {
    /// Texture the character is drawn with
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Player1 => "player1.png",
            Self::Player2 => "player2.png",
        }
    }
}

/// Background themes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Jungle,
    City,
}

impl Theme {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Jungle => "jungle.jpg",
            Self::City => "city.jpg",
        }
    }
}

/// Everything the game reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Root holding `textures/` and `sounds/`
    pub asset_dir: PathBuf,
    pub character: Character,
    pub theme: Theme,
    /// Background track under `sounds/`
    pub music: String,
    pub dark_mode: bool,
    /// Fixed RNG seed for lane selection; random when absent
    pub seed: Option<u64>,
    /// Music volume in [0, 1]
    pub volume: f32,
    pub tuning: RunnerTuning,
    /// Applied over the default key layout, in order
    pub bindings: Vec<KeyRemap>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            character: Character::default(),
            theme: Theme::default(),
            music: "bg-music.mp3".to_string(),
            dark_mode: false,
            seed: None,
            volume: 0.5,
            tuning: BASE_TUNING,
            bindings: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tuning;
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be within [0, 1], got {}",
                self.volume
            )));
        }
        at_least_zero("lane_limit", t.lane_limit)?;
        if t.lanes.iter().any(|lane| !(lane.abs() <= t.lane_limit)) {
            return Err(ConfigError::Invalid(
                "every lane must lie within the lane limit".to_string(),
            ));
        }
        for (name, value) in [
            ("jump_tick_ms", t.jump_tick_ms),
            ("jump_velocity", t.jump_velocity),
            ("jump_apex", t.jump_apex),
            ("fall_velocity", t.fall_velocity),
            ("hit_radius", t.hit_radius),
        ] {
            positive(name, value)?;
        }
        for (name, value) in [
            ("forward_speed", t.forward_speed),
            ("steer_speed", t.steer_speed),
            ("jump_gravity", t.jump_gravity),
            ("entity_speed", t.entity_speed),
            ("despawn_distance", t.despawn_distance),
            ("spawn_distance", t.spawn_distance),
        ] {
            at_least_zero(name, value)?;
        }
        if !t.coin_spin.is_finite() {
            return Err(ConfigError::Invalid("coin_spin must be finite".to_string()));
        }
        if t.obstacle_interval_ms == 0 || t.coin_interval_ms == 0 {
            return Err(ConfigError::Invalid("spawn intervals must be non-zero".to_string()));
        }
        Ok(())
    }
}

// Written as negated comparisons so NaN fails them

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0) || value.is_infinite() {
        return Err(ConfigError::Invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn at_least_zero(name: &str, value: f32) -> Result<(), ConfigError> {
    if !(value >= 0.0) || value.is_infinite() {
        return Err(ConfigError::Invalid(format!(
            "{} must be zero or more, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::Action;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_empty_file_is_default() {
        let config = RunnerConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let config = RunnerConfig::from_toml_str(
            r#"
            character = "player2"
            theme = "city"
            seed = 1234

            [tuning]
            coin_value = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.character, Character::Player2);
        assert_eq!(config.theme, Theme::City);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.tuning.coin_value, 25);
        assert_eq!(config.tuning.forward_speed, BASE_TUNING.forward_speed);
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let err = RunnerConfig::from_toml_str(r#"character = "wizard""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_volume_is_rejected() {
        let err = RunnerConfig::from_toml_str("volume = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_lane_outside_limit_is_rejected() {
        let err = RunnerConfig::from_toml_str("[tuning]\nlanes = [-3.0, 0.0, 3.0]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_nan_jump_tick_is_rejected() {
        let err = RunnerConfig::from_toml_str("[tuning]\njump_tick_ms = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_distances_are_rejected() {
        for table in [
            "[tuning]\nhit_radius = nan",
            "[tuning]\nhit_radius = 0.0",
            "[tuning]\nforward_speed = -0.1",
            "[tuning]\ndespawn_distance = nan",
            "[tuning]\nfall_velocity = 0.0",
            "[tuning]\nlane_limit = nan",
            "[tuning]\nspawn_distance = inf",
        ] {
            let err = RunnerConfig::from_toml_str(table).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{} accepted", table);
        }
    }

    #[test]
    fn test_key_bindings_table() {
        let config = RunnerConfig::from_toml_str(
            r#"
            [[bindings]]
            action = "jump"
            keys = ["KeyW", "ArrowUp"]

            [[bindings]]
            action = "toggle_dark_mode"
            keys = []
            "#,
        )
        .unwrap();

        assert_eq!(
            config.bindings,
            vec![
                KeyRemap {
                    action: Action::Jump,
                    keys: vec![KeyCode::KeyW, KeyCode::ArrowUp],
                },
                KeyRemap {
                    action: Action::ToggleDarkMode,
                    keys: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = RunnerConfig::from_toml_str("[[bindings]]\naction = \"fly\"\nkeys = []")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("rusted-runner-no-such-config.toml");
        let config = RunnerConfig::load(&path).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_written_config_reads_back() {
        let mut config = RunnerConfig::default();
        config.dark_mode = true;
        config.theme = Theme::City;
        config.bindings.push(KeyRemap {
            action: Action::Pause,
            keys: vec![KeyCode::KeyP, KeyCode::Pause],
        });
        let text = config.to_toml_string().unwrap();
        assert_eq!(RunnerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(Character::Player2.file_name(), "player2.png");
        assert_eq!(Theme::Jungle.file_name(), "jungle.jpg");
    }
}
