// Touch gesture recognition: two-finger jump and horizontal swipes

use std::collections::HashSet;
use winit::event::TouchPhase;

/// Minimum horizontal travel in pixels for a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// What a touch event means for the runner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchGesture {
    /// A second finger came down
    TwoFingerTap,
    /// A single finger came down at this x
    FingerDown { x: f32 },
    /// A finger lifted; `delta_x` is end x minus the recorded start x
    FingerUp { delta_x: f32 },
    /// The system took a finger away; never a swipe
    Cancelled,
}

impl TouchGesture {
    /// Swipe direction for a lift gesture: -1 left, 1 right, 0 none
    pub fn swipe_direction(&self) -> i8 {
        match *self {
            Self::FingerUp { delta_x } if delta_x > SWIPE_THRESHOLD => 1,
            Self::FingerUp { delta_x } if delta_x < -SWIPE_THRESHOLD => -1,
            _ => 0,
        }
    }
}

/// Tracks active fingers and the start position of the last single touch
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: HashSet<u64>,
    start_x: f32,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one touch event, returning the gesture it completes (if any)
    pub fn handle(&mut self, id: u64, phase: TouchPhase, x: f32) -> Option<TouchGesture> {
        match phase {
            TouchPhase::Started => {
                self.active.insert(id);
                if self.active.len() == 2 {
                    Some(TouchGesture::TwoFingerTap)
                } else {
                    self.start_x = x;
                    Some(TouchGesture::FingerDown { x })
                }
            }
            TouchPhase::Ended => {
                self.active.remove(&id);
                Some(TouchGesture::FingerUp {
                    delta_x: x - self.start_x,
                })
            }
            TouchPhase::Cancelled => {
                self.active.remove(&id);
                Some(TouchGesture::Cancelled)
            }
            TouchPhase::Moved => None,
        }
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.start_x = 0.0;
    }
}
