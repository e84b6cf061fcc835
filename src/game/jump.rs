// Jump arc state machine
//
// The arc is tuned in "jump ticks" (16 ms) and integrated with the step's
// delta time, so the shape of the arc does not depend on the frame rate.

use super::tuning::RunnerTuning;

/// Vertical state of the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpState {
    /// Standing on the track
    Grounded,
    /// Rising, velocity in units per second (always positive)
    Ascending { velocity: f32 },
    /// Falling at a constant velocity in units per second (always negative)
    Descending { velocity: f32 },
}

impl Default for JumpState {
    fn default() -> Self {
        Self::Grounded
    }
}

/// Jump constants converted to per-second units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpParams {
    pub launch_velocity: f32,
    pub gravity: f32,
    pub apex: f32,
    pub fall_velocity: f32,
}

impl JumpParams {
    pub fn from_tuning(tuning: &RunnerTuning) -> Self {
        let tick = tuning.jump_tick_ms / 1000.0;
        Self {
            launch_velocity: tuning.jump_velocity / tick,
            gravity: tuning.jump_gravity / (tick * tick),
            apex: tuning.jump_apex,
            fall_velocity: tuning.fall_velocity / tick,
        }
    }
}

impl JumpState {
    pub fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded)
    }

    pub fn is_airborne(&self) -> bool {
        !self.is_grounded()
    }

    /// Start a jump. Returns false (and does nothing) when already airborne.
    pub fn try_launch(&mut self, params: &JumpParams) -> bool {
        if self.is_airborne() {
            return false;
        }
        *self = Self::Ascending {
            velocity: params.launch_velocity,
        };
        true
    }

    /// Integrate the arc by `dt` seconds, moving `height` along it.
    /// Returns true on the step the player lands.
    pub fn advance(&mut self, height: &mut f32, dt: f32, params: &JumpParams) -> bool {
        match *self {
            Self::Grounded => false,
            Self::Ascending { velocity } => {
                *height += velocity * dt;
                let velocity = velocity - params.gravity * dt;
                *self = if *height >= params.apex || velocity <= 0.0 {
                    Self::Descending {
                        velocity: -params.fall_velocity,
                    }
                } else {
                    Self::Ascending { velocity }
                };
                false
            }
            Self::Descending { velocity } => {
                *height += velocity * dt;
                if *height <= 0.0 {
                    *height = 0.0;
                    *self = Self::Grounded;
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tuning::BASE_TUNING;
    use approx::assert_relative_eq;

    const STEP: f32 = 1.0 / 60.0;

    fn params() -> JumpParams {
        JumpParams::from_tuning(&BASE_TUNING)
    }

    #[test]
    fn test_params_conversion() {
        let p = params();
        assert_relative_eq!(p.launch_velocity, 12.5, epsilon = 1e-4);
        assert_relative_eq!(p.fall_velocity, 12.5, epsilon = 1e-4);
        assert_relative_eq!(p.gravity, 39.0625, epsilon = 1e-3);
        assert_eq!(p.apex, 1.2);
    }

    #[test]
    fn test_initial_state() {
        let state = JumpState::default();
        assert!(state.is_grounded());
        assert_eq!(state, JumpState::Grounded);
    }

    #[test]
    fn test_launch_from_ground() {
        let mut state = JumpState::Grounded;
        assert!(state.try_launch(&params()));
        assert!(matches!(state, JumpState::Ascending { .. }));
    }

    #[test]
    fn test_cannot_launch_while_airborne() {
        let p = params();
        let mut state = JumpState::Grounded;
        let mut y = 0.0;
        state.try_launch(&p);
        state.advance(&mut y, STEP, &p);
        let before = state;

        assert!(!state.try_launch(&p));
        assert_eq!(state, before);
    }

    #[test]
    fn test_full_arc_lands_exactly_on_ground() {
        let p = params();
        let mut state = JumpState::Grounded;
        let mut y = 0.0_f32;
        let mut peak = 0.0_f32;
        let mut landed = false;

        state.try_launch(&p);
        for _ in 0..120 {
            landed = state.advance(&mut y, STEP, &p);
            peak = peak.max(y);
            assert!(y >= 0.0);
            if landed {
                break;
            }
        }

        assert!(landed);
        assert!(peak >= p.apex);
        assert_eq!(y, 0.0);
        assert!(state.is_grounded());
    }

    #[test]
    fn test_apex_flips_to_descent() {
        let p = params();
        let mut state = JumpState::Ascending { velocity: 1.0 };
        let mut y = p.apex - 0.001;
        state.advance(&mut y, STEP, &p);
        assert_eq!(
            state,
            JumpState::Descending {
                velocity: -p.fall_velocity
            }
        );
    }

    #[test]
    fn test_grounded_advance_is_noop() {
        let p = params();
        let mut state = JumpState::Grounded;
        let mut y = 0.0;
        assert!(!state.advance(&mut y, STEP, &p));
        assert_eq!(y, 0.0);
    }
}
