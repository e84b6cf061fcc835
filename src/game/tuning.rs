// Gameplay tuning - every constant the simulation reads lives here
// Distances are world units, speeds are units per fixed step unless noted

use serde::{Deserialize, Serialize};

/// Gameplay constants for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    // Player movement
    /// Distance the player advances along -z each step
    pub forward_speed: f32,
    /// Lateral distance covered per step while steering
    pub steer_speed: f32,
    /// Player x is clamped to [-lane_limit, lane_limit]
    pub lane_limit: f32,
    /// Lane x-positions entities spawn on
    pub lanes: [f32; 3],

    // Jump arc (expressed per jump tick, converted to per-second in `JumpParams`)
    /// Upward velocity at take-off, units per tick
    pub jump_velocity: f32,
    /// Velocity lost per tick while ascending
    pub jump_gravity: f32,
    /// Height at which the ascent flips into descent
    pub jump_apex: f32,
    /// Constant descent speed, units per tick
    pub fall_velocity: f32,
    /// Length of one jump tick in milliseconds
    pub jump_tick_ms: f32,

    // Entities
    /// Distance obstacles and coins travel toward +z each step
    pub entity_speed: f32,
    /// Coin spin per step (radians)
    pub coin_spin: f32,
    /// Entities closer than this to the player collide
    pub hit_radius: f32,
    /// Entities further than this behind the player are removed
    pub despawn_distance: f32,
    /// How far ahead of the player entities appear
    pub spawn_distance: f32,
    /// Baseline height of obstacles
    pub obstacle_height: f32,
    /// Baseline height coins hover at
    pub coin_height: f32,
    /// Score awarded per coin
    pub coin_value: u32,

    // Spawn cadence
    pub obstacle_interval_ms: u64,
    pub coin_interval_ms: u64,
}

/// The tuning the game ships with
pub const BASE_TUNING: RunnerTuning = RunnerTuning {
    forward_speed: 0.1,
    steer_speed: 0.1,
    lane_limit: 1.5,
    lanes: [-1.5, 0.0, 1.5],

    jump_velocity: 0.2,
    jump_gravity: 0.01,
    jump_apex: 1.2,
    fall_velocity: 0.2,
    jump_tick_ms: 16.0,

    entity_speed: 0.1,
    coin_spin: 0.1,
    hit_radius: 0.5,
    despawn_distance: 10.0,
    spawn_distance: 20.0,
    obstacle_height: 0.0,
    coin_height: 0.5,
    coin_value: 10,

    obstacle_interval_ms: 2000,
    coin_interval_ms: 1500,
};

impl Default for RunnerTuning {
    fn default() -> Self {
        BASE_TUNING
    }
}
