// Obstacles and coins

use glam::Vec3;

use crate::engine::assets::AssetId;

/// Unique identifier for a spawned entity within a session
pub type EntityId = u64;

/// The two kinds of things that scroll toward the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Obstacle,
    Coin,
}

impl EntityKind {
    /// Texture the kind is drawn with
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::Obstacle => "obstacle.png",
            Self::Coin => "coin.png",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Obstacle => "obstacle",
            Self::Coin => "coin",
        }
    }
}

/// Ends the run on contact
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Vec3,
    pub visual: AssetId,
}

impl Obstacle {
    /// Distance from this obstacle to the player's feet
    pub fn distance_to(&self, player: Vec3) -> f32 {
        self.position.distance(player)
    }
}

/// Worth points on contact; spins while it waits
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: EntityId,
    /// Drawn position, `hover` above the track
    pub position: Vec3,
    /// Spin around the vertical axis (radians)
    pub rotation: f32,
    /// Height the coin floats above its lane
    pub hover: f32,
    pub visual: AssetId,
}

impl Coin {
    /// Point on the track under the coin
    pub fn anchor(&self) -> Vec3 {
        self.position - Vec3::Y * self.hover
    }

    /// Distance from the coin's anchor to the player's feet
    pub fn distance_to(&self, player: Vec3) -> f32 {
        self.anchor().distance(player)
    }
}
