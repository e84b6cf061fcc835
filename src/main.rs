use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use crate::core::config::{Character, RunnerConfig, Theme};
use engine::assets::{AssetLoader, AssetType, PendingLoads};
use engine::audio::{BackgroundMusic, SilentMusic};
use engine::game_loop::GameLoop;
use engine::input::{Action, InputManager, KeyBindings};
use engine::renderer::Renderer;
use game::runner::{LoadPurpose, Runner};
use game::scene::{self, Backdrop, CAMERA_OFFSET};

#[derive(Parser, Debug)]
#[command(name = "rusted-runner", about = "A lane-based 3D endless runner")]
struct Cli {
    /// Settings file
    #[arg(short, long, default_value = "runner.toml")]
    config: PathBuf,

    /// Character to run with
    #[arg(long, value_enum)]
    character: Option<Character>,

    /// Background theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Asset root holding textures/ and sounds/
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for lane selection
    #[arg(long)]
    seed: Option<u64>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Frames between FPS reports in the debug log
const FPS_LOG_INTERVAL: u64 = 600;

impl Cli {
    fn apply(&self, config: &mut RunnerConfig) {
        if let Some(character) = self.character {
            config.character = character;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(assets) = &self.assets {
            config.asset_dir = assets.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.dark {
            config.dark_mode = true;
        }
    }
}

#[cfg(feature = "audio")]
fn open_music(config: &RunnerConfig, loader: &AssetLoader) -> Box<dyn BackgroundMusic> {
    use engine::audio::RodioMusic;

    let path = loader.resolve_path(AssetType::Sound, &config.music);
    match RodioMusic::open(&path) {
        Ok(music) => Box::new(music),
        Err(e) => {
            warn!("{}; continuing without music", e);
            Box::new(SilentMusic::new(config.music.clone()))
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_music(config: &RunnerConfig, loader: &AssetLoader) -> Box<dyn BackgroundMusic> {
    if !loader.exists(AssetType::Sound, &config.music) {
        warn!("Music track {} not found", config.music);
    }
    Box::new(SilentMusic::new(config.music.clone()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let mut config = RunnerConfig::load(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config.display()))?;
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    info!("Starting Rusted Runner...");

    let loader = AssetLoader::new(&config.asset_dir);
    info!("Loading assets from {}", loader.base_path().display());
    let music = open_music(&config, &loader);
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let source: PendingLoads<LoadPurpose> = PendingLoads::new(&config.asset_dir);
    let mut runner = Runner::new(&config, source, music, rng);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Rusted Runner - Press Enter to start")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    info!("Window created successfully");

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut dark_mode = config.dark_mode;
    renderer.set_clear_color(scene::clear_color(dark_mode));

    let mut input = InputManager::new(KeyBindings::with_remaps(&config.bindings));
    for action in input.bindings().missing_intents() {
        warn!("No key bound to {:?}", action);
    }
    let mut game_loop = GameLoop::new();
    let mut title = String::new();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!(
                        "Close requested after {:.1}s, shutting down...",
                        game_loop.elapsed().as_secs_f32()
                    );
                    elwt.exit();
                }
                WindowEvent::Focused(false) => {
                    // Keys released while unfocused never arrive
                    input.reset();
                }
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input.process_keyboard_event(&event);
                }
                WindowEvent::Touch(touch) => {
                    input.process_touch(&touch);
                }
                WindowEvent::RedrawRequested => {
                    input.update(Instant::now());
                    for command in input.take_commands() {
                        match command {
                            Action::Start => {
                                runner.start();
                            }
                            Action::Pause => {
                                let pausing = !game_loop.is_paused();
                                if runner.set_paused(pausing) {
                                    if pausing {
                                        game_loop.pause();
                                        input.reset();
                                    } else {
                                        game_loop.resume();
                                    }
                                }
                            }
                            Action::ToggleDarkMode => {
                                dark_mode = !dark_mode;
                                renderer.set_clear_color(scene::clear_color(dark_mode));
                                info!("Dark mode {}", if dark_mode { "on" } else { "off" });
                            }
                            Action::Quit => elwt.exit(),
                            _ => {}
                        }
                    }

                    let steps = game_loop.begin_frame();
                    if game_loop.frame_count() % FPS_LOG_INTERVAL == 0 {
                        debug!(
                            "{:.1} fps, {} steps simulated",
                            game_loop.fps(),
                            game_loop.step_count()
                        );
                    }
                    runner.update(&input.intents(), steps, game_loop.step_duration());
                    runner.animate(game_loop.render_delta_time());

                    for visual in runner.take_new_visuals() {
                        renderer.upload(&visual);
                    }
                    if let Some(player) = runner.session().player() {
                        renderer
                            .camera_mut()
                            .follow(Vec3::new(0.0, 0.0, player.position.z), CAMERA_OFFSET);
                    }

                    let backdrop = Backdrop {
                        road: runner.road(),
                        theme: runner.theme(),
                    };
                    let sprites = scene::compose(runner.session(), backdrop, |id| {
                        runner.visual(id).map(|v| (v.width(), v.height()))
                    });

                    match renderer.render(&sprites) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.reconfigure();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("GPU out of memory, exiting");
                            elwt.exit();
                        }
                        Err(e) => warn!("Dropped frame: {:?}", e),
                    }

                    let status = format!("Rusted Runner - {}", runner.status_line());
                    if status != title {
                        window.set_title(&status);
                        title = status;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
