// Sprite-sheet animation for the runner character

use crate::engine::assets::SheetLayout;
use log::debug;

/// A single animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Name of the animation (e.g. "run")
    pub name: String,
    pub frame_count: u32,
    /// Duration of each frame in seconds
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(name: &str, frame_count: u32, fps: f32, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            frame_count: frame_count.max(1),
            frame_duration: 1.0 / fps,
            looping,
        }
    }

    pub fn looping(name: &str, frame_count: u32, fps: f32) -> Self {
        Self::new(name, frame_count, fps, true)
    }

    /// Clip covering every frame of a sprite sheet
    pub fn from_sheet(name: &str, sheet: &SheetLayout) -> Self {
        Self::looping(name, sheet.frames, sheet.fps)
    }
}

/// Plays one clip, advanced with the render delta
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: Option<AnimationClip>,
    current_frame: u32,
    frame_timer: f32,
    playing: bool,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationPlayer {
    /// A player with no clip; always reports frame 0
    pub fn new() -> Self {
        Self {
            clip: None,
            current_frame: 0,
            frame_timer: 0.0,
            playing: false,
        }
    }

    /// Start playing `clip` from its first frame
    pub fn play(&mut self, clip: AnimationClip) {
        debug!("Playing {} ({} frames)", clip.name, clip.frame_count);
        self.clip = Some(clip);
        self.current_frame = 0;
        self.frame_timer = 0.0;
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        if self.clip.is_some() {
            self.playing = true;
        }
    }

    /// Advance by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let Some(clip) = &self.clip else {
            return;
        };

        self.frame_timer += dt;
        while self.frame_timer >= clip.frame_duration {
            self.frame_timer -= clip.frame_duration;
            self.current_frame += 1;

            if self.current_frame >= clip.frame_count {
                if clip.looping {
                    self.current_frame = 0;
                } else {
                    self.current_frame = clip.frame_count - 1;
                    self.playing = false;
                    break;
                }
            }
        }
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}
