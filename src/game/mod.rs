// Gameplay: the runner, its track entities and the per-step simulation

pub mod animation;
pub mod entity;
pub mod jump;
pub mod player;
pub mod runner;
pub mod scene;
pub mod session;
pub mod spawner;
pub mod tuning;
