// Spawn cadence for obstacles and coins
//
// Two independent timers run on simulated time. A tick only produces an
// order; the entity itself is added once its visual has loaded.

use log::debug;
use rand::Rng;
use std::time::Duration;

use super::entity::EntityKind;
use super::session::GameSession;
use super::tuning::RunnerTuning;

/// Fixed-interval trigger
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTimer {
    interval: Duration,
    elapsed: Duration,
    active: bool,
}

impl SpawnTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            active: !interval.is_zero(),
        }
    }

    /// Advance by `dt`; returns how many intervals elapsed
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.active {
            return 0;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }

    /// Stop for good
    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A request to put an entity on a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub kind: EntityKind,
    pub lane: f32,
}

/// Drives both timers and picks lanes
pub struct Spawner<R: Rng> {
    obstacles: SpawnTimer,
    coins: SpawnTimer,
    lanes: [f32; 3],
    rng: R,
}

impl<R: Rng> Spawner<R> {
    pub fn new(tuning: &RunnerTuning, rng: R) -> Self {
        Self {
            obstacles: SpawnTimer::new(Duration::from_millis(tuning.obstacle_interval_ms)),
            coins: SpawnTimer::new(Duration::from_millis(tuning.coin_interval_ms)),
            lanes: tuning.lanes,
            rng,
        }
    }

    /// Advance both timers by one step. Ticks that fire while the session
    /// is not running (or has no player) are dropped.
    pub fn advance(&mut self, dt: Duration, session: &GameSession) -> Vec<SpawnOrder> {
        let obstacle_ticks = self.obstacles.advance(dt);
        let coin_ticks = self.coins.advance(dt);

        if !session.is_running() || session.player().is_none() {
            return Vec::new();
        }

        let mut orders = Vec::with_capacity((obstacle_ticks + coin_ticks) as usize);
        for _ in 0..obstacle_ticks {
            orders.push(self.order(EntityKind::Obstacle));
        }
        for _ in 0..coin_ticks {
            orders.push(self.order(EntityKind::Coin));
        }
        orders
    }

    fn order(&mut self, kind: EntityKind) -> SpawnOrder {
        let lane = self.lanes[self.rng.gen_range(0..self.lanes.len())];
        debug!("Spawn tick: {} in lane {}", kind.label(), lane);
        SpawnOrder { kind, lane }
    }

    /// Cancel both timers
    pub fn cancel(&mut self) {
        self.obstacles.cancel();
        self.coins.cancel();
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.obstacles.is_active() || self.coins.is_active()
    }
}
