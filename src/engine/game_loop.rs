//! Fixed-step frame pacing
//!
//! The runner simulation advances in fixed 1/60 s steps: the player and
//! every entity move a constant distance per step, so gameplay speed is the
//! same on a 60 Hz and a 144 Hz display. Rendering happens once per frame
//! and may run zero, one or several steps first.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Simulation rate (60 steps per second)
pub const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667);

/// Steps allowed per frame before the loop drops time instead of catching up
const MAX_STEPS_PER_FRAME: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

pub struct GameLoop {
    /// Wall time not yet consumed by steps
    accumulator: Duration,
    last_frame_time: Instant,
    start_time: Instant,
    paused: bool,
    frame_times: VecDeque<Duration>,
    frame_count: u64,
    step_count: u64,
    current_fps: f32,
    /// Wall time since the previous frame, for animations
    render_delta_time: f32,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a loop whose clock starts at `now`
    pub fn starting_at(now: Instant) -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            paused: false,
            frame_times: VecDeque::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            step_count: 0,
            current_fps: 0.0,
            render_delta_time: 0.0,
        }
    }

    /// Begin a new frame, returns the number of fixed steps to run
    pub fn begin_frame(&mut self) -> u32 {
        self.begin_frame_at(Instant::now())
    }

    /// Begin a frame observed at `now`
    pub fn begin_frame_at(&mut self, now: Instant) -> u32 {
        let frame_time = now.saturating_duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.pop_front();
        }
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        self.render_delta_time = frame_time.as_secs_f32();

        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            steps += 1;
        }

        // Anything left over after a long stall is dropped, not replayed
        if steps == MAX_STEPS_PER_FRAME && self.accumulator >= FIXED_TIMESTEP_DURATION {
            log::debug!(
                "Frame took {:?}, dropping {:?} of simulation time",
                frame_time,
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        self.step_count += steps as u64;
        steps
    }

    /// Length of one step
    pub fn step_duration(&self) -> Duration {
        FIXED_TIMESTEP_DURATION
    }

    /// Wall time since the previous frame in seconds
    pub fn render_delta_time(&self) -> f32 {
        self.render_delta_time
    }

    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total number of simulation steps executed
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent a burst of steps
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
