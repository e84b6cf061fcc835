// The runner character

use glam::Vec3;

use super::animation::{AnimationClip, AnimationPlayer};
use super::jump::{JumpParams, JumpState};
use super::tuning::RunnerTuning;
use crate::engine::assets::{AssetId, SheetLayout};
use crate::engine::input::Intents;

/// The player-controlled runner
#[derive(Debug, Clone)]
pub struct Player {
    /// Feet position; y = 0 is the track surface
    pub position: Vec3,
    jump: JumpState,
    /// Sprite the player is drawn with
    pub visual: AssetId,
    /// Sheet layout when the visual is animated
    pub sheet: Option<SheetLayout>,
    pub animation: AnimationPlayer,
}

impl Player {
    /// Create a player at the origin
    pub fn new(visual: AssetId, sheet: Option<SheetLayout>) -> Self {
        let mut animation = AnimationPlayer::new();
        if let Some(layout) = &sheet {
            animation.play(AnimationClip::from_sheet("run", layout));
        }

        Self {
            position: Vec3::ZERO,
            jump: JumpState::Grounded,
            visual,
            sheet,
            animation,
        }
    }

    #[cfg(test)]
    pub fn is_jumping(&self) -> bool {
        self.jump.is_airborne()
    }

    /// Forward run, steering and the jump arc for one step
    pub fn advance(&mut self, intents: &Intents, tuning: &RunnerTuning, jump: &JumpParams, dt: f32) {
        self.position.z -= tuning.forward_speed;

        let limit = tuning.lane_limit;
        if intents.steer_left && self.position.x > -limit {
            self.position.x = (self.position.x - tuning.steer_speed).max(-limit);
        }
        if intents.steer_right && self.position.x < limit {
            self.position.x = (self.position.x + tuning.steer_speed).min(limit);
        }

        if intents.jump {
            self.jump.try_launch(jump);
        }
        self.jump.advance(&mut self.position.y, dt, jump);
    }
}
