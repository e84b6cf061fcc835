// Runner - one session plus everything that feeds it
//
// Per update the order is fixed: finished loads are drained, then each fixed
// step ticks the spawner and advances the session.

use log::{debug, error, info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::session::{GameSession, SessionPhase, StepReport};
use super::spawner::{SpawnOrder, Spawner};
use crate::core::config::RunnerConfig;
use crate::engine::assets::{AssetId, LoadOutcome, Visual, VisualSource};
use crate::engine::audio::BackgroundMusic;
use crate::engine::input::Intents;

/// Road texture, shared by every character and theme
pub const ROAD_ASSET: &str = "road.png";

/// Why a visual was requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadPurpose {
    Player,
    Road,
    Theme,
    Spawn(SpawnOrder),
}

/// Orchestrates one play-through
pub struct Runner<S, M, R>
where
    S: VisualSource<LoadPurpose>,
    M: BackgroundMusic,
    R: Rng,
{
    session: GameSession,
    spawner: Spawner<R>,
    source: S,
    music: M,
    player_asset: String,
    theme_asset: String,
    volume: f32,
    start_requested: bool,
    paused: bool,
    visuals: HashMap<AssetId, Arc<Visual>>,
    new_visuals: Vec<Arc<Visual>>,
    road: Option<AssetId>,
    theme: Option<AssetId>,
}

impl<S, M, R> Runner<S, M, R>
where
    S: VisualSource<LoadPurpose>,
    M: BackgroundMusic,
    R: Rng,
{
    pub fn new(config: &RunnerConfig, source: S, music: M, rng: R) -> Self {
        Self {
            session: GameSession::new(config.tuning),
            spawner: Spawner::new(&config.tuning, rng),
            source,
            music,
            player_asset: config.character.file_name().to_string(),
            theme_asset: config.theme.file_name().to_string(),
            volume: config.volume,
            start_requested: false,
            paused: false,
            visuals: HashMap::new(),
            new_visuals: Vec::new(),
            road: None,
            theme: None,
        }
    }

    /// Leave the start screen: kick off the character and theme loads and
    /// start the music. The run itself begins when the character arrives.
    pub fn start(&mut self) -> bool {
        if self.start_requested || self.session.phase() != SessionPhase::Idle {
            return false;
        }
        self.start_requested = true;

        info!("Starting with {} on {}", self.player_asset, self.theme_asset);
        self.source.request(LoadPurpose::Theme, &self.theme_asset);
        self.source.request(LoadPurpose::Player, &self.player_asset);

        self.music.set_volume(self.volume);
        self.music.play();
        true
    }

    /// Drain loads, then run `steps` fixed steps of `step` each
    pub fn update(&mut self, intents: &Intents, steps: u32, step: Duration) -> StepReport {
        for outcome in self.source.poll() {
            self.apply_load(outcome);
        }

        let mut total = StepReport::default();
        let dt = step.as_secs_f32();
        for _ in 0..steps {
            if !self.session.is_running() {
                break;
            }
            for order in self.spawner.advance(step, &self.session) {
                self.source
                    .request(LoadPurpose::Spawn(order), order.kind.asset_name());
            }

            let report = self.session.step(intents, dt);
            total.coins_collected += report.coins_collected;
            total.despawned += report.despawned;
            if report.game_over {
                total.game_over = true;
                self.handle_game_over();
                break;
            }
        }
        total
    }

    fn apply_load(&mut self, outcome: LoadOutcome<LoadPurpose>) {
        let LoadOutcome { tag, name, result } = outcome;
        let visual = match result {
            Ok(visual) => visual,
            Err(e) => {
                error!("Failed to load {}: {}", name, e);
                if tag == LoadPurpose::Player {
                    // Stay on the start screen so another start can retry
                    self.start_requested = false;
                }
                return;
            }
        };

        match tag {
            LoadPurpose::Player => {
                if visual.sheet.is_none() {
                    warn!("No animations found for {}", name);
                }
                if self.session.place_player(visual.id, visual.sheet) {
                    self.remember(&visual);
                    self.session.start();
                    self.source.request(LoadPurpose::Road, ROAD_ASSET);
                }
            }
            LoadPurpose::Road => {
                self.road = Some(visual.id);
                self.remember(&visual);
            }
            LoadPurpose::Theme => {
                self.theme = Some(visual.id);
                self.remember(&visual);
            }
            LoadPurpose::Spawn(order) => {
                match self.session.spawn(order.kind, order.lane, visual.id) {
                    Some(id) => {
                        debug!("Spawned {} #{} in lane {}", order.kind.label(), id, order.lane);
                        self.remember(&visual);
                    }
                    None => debug!("Dropped late {} load", order.kind.label()),
                }
            }
        }
    }

    fn remember(&mut self, visual: &Arc<Visual>) {
        if !self.visuals.contains_key(&visual.id) {
            self.visuals.insert(visual.id, Arc::clone(visual));
            self.new_visuals.push(Arc::clone(visual));
        }
    }

    fn handle_game_over(&mut self) {
        self.spawner.cancel();
        self.source.cancel_all();
        self.music.pause();
        info!(
            "Final score: {} after {:.1}s ({} steps)",
            self.session.score(),
            self.session.elapsed().as_secs_f32(),
            self.session.steps()
        );
    }

    /// Hold or release a live run's music and animation. Returns false
    /// (and changes nothing) unless the run is live.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if !self.session.is_running() {
            return false;
        }
        if paused == self.paused {
            return true;
        }
        self.paused = paused;
        if let Some(player) = self.session.player_mut() {
            if paused {
                player.animation.pause();
            } else {
                player.animation.resume();
            }
        }
        if paused {
            self.music.pause();
        } else {
            self.music.play();
        }
        true
    }

    /// Advance the player's sprite animation by the render delta
    pub fn animate(&mut self, dt: f32) {
        if !self.session.is_running() {
            return;
        }
        if let Some(player) = self.session.player_mut() {
            player.animation.update(dt);
        }
    }

    /// Visuals that arrived since the last call, for GPU upload
    pub fn take_new_visuals(&mut self) -> Vec<Arc<Visual>> {
        std::mem::take(&mut self.new_visuals)
    }

    /// Text for the window title
    pub fn status_line(&self) -> String {
        match (self.session.phase(), self.session.final_score()) {
            (SessionPhase::GameOver, Some(score)) => format!("Game Over - Final Score: {}", score),
            (SessionPhase::Running, _) if self.paused => {
                format!("Paused - Score: {}", self.session.score())
            }
            (SessionPhase::Running, _) => format!("Score: {}", self.session.score()),
            _ if self.start_requested => "Loading...".to_string(),
            _ => "Press Enter to start".to_string(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn visual(&self, id: AssetId) -> Option<&Arc<Visual>> {
        self.visuals.get(&id)
    }

    pub fn road(&self) -> Option<AssetId> {
        self.road
    }

    pub fn theme(&self) -> Option<AssetId> {
        self.theme
    }
}
