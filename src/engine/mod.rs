// Engine modules: renderer, input, assets, audio and the fixed-step loop

pub mod assets;
pub mod audio;
pub mod game_loop;
pub mod input;
pub mod renderer;
