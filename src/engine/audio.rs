//! Background music
//!
//! The game plays one looping track. Without the `audio` feature the track
//! is only tracked and logged, which keeps headless builds and CI free of a
//! system audio dependency.

use log::info;

/// Audio errors
#[cfg(feature = "audio")]
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// No output device could be opened
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The track could not be read or decoded
    #[error("Failed to load track {name}: {message}")]
    TrackLoad { name: String, message: String },
}

/// A single background track with play/pause/volume
pub trait BackgroundMusic {
    fn play(&mut self);
    fn pause(&mut self);
    /// Set volume, clamped to [0, 1]
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn is_playing(&self) -> bool;
}

impl<M: BackgroundMusic + ?Sized> BackgroundMusic for Box<M> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn volume(&self) -> f32 {
        (**self).volume()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
}

/// Music that only records its state
#[derive(Debug)]
pub struct SilentMusic {
    track: String,
    volume: f32,
    playing: bool,
}

impl SilentMusic {
    pub fn new(track: impl Into<String>) -> Self {
        Self {
            track: track.into(),
            volume: 1.0,
            playing: false,
        }
    }
}

impl BackgroundMusic for SilentMusic {
    fn play(&mut self) {
        if !self.playing {
            info!("Music: {} (silent build)", self.track);
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(feature = "audio")]
pub use rodio_music::RodioMusic;

#[cfg(feature = "audio")]
mod rodio_music {
    use super::{AudioError, BackgroundMusic};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    /// Looping track played through rodio
    pub struct RodioMusic {
        // The stream must outlive the sink
        _stream: OutputStream,
        _handle: OutputStreamHandle,
        sink: Sink,
    }

    impl RodioMusic {
        /// Open the default device and queue the track, paused
        pub fn open(path: &Path) -> Result<Self, AudioError> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
            let sink =
                Sink::try_new(&handle).map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

            let name = path.to_string_lossy().to_string();
            let file = File::open(path).map_err(|e| AudioError::TrackLoad {
                name: name.clone(),
                message: e.to_string(),
            })?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::TrackLoad {
                name,
                message: e.to_string(),
            })?;

            sink.pause();
            sink.append(source.repeat_infinite());

            Ok(Self {
                _stream: stream,
                _handle: handle,
                sink,
            })
        }
    }

    impl BackgroundMusic for RodioMusic {
        fn play(&mut self) {
            self.sink.play();
        }

        fn pause(&mut self) {
            self.sink.pause();
        }

        fn set_volume(&mut self, volume: f32) {
            self.sink.set_volume(volume.clamp(0.0, 1.0));
        }

        fn volume(&self) -> f32 {
            self.sink.volume()
        }

        fn is_playing(&self) -> bool {
            !self.sink.is_paused()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_music_state() {
        let mut music = SilentMusic::new("theme.ogg");
        assert!(!music.is_playing());

        music.play();
        assert!(music.is_playing());

        music.pause();
        assert!(!music.is_playing());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut music = SilentMusic::new("theme.ogg");
        music.set_volume(0.5);
        assert_eq!(music.volume(), 0.5);

        music.set_volume(3.0);
        assert_eq!(music.volume(), 1.0);

        music.set_volume(-1.0);
        assert_eq!(music.volume(), 0.0);
    }

    #[test]
    fn test_boxed_music_forwards() {
        let mut music: Box<dyn BackgroundMusic> = Box::new(SilentMusic::new("theme.ogg"));
        music.set_volume(0.25);
        music.play();
        assert!(music.is_playing());
        assert_eq!(music.volume(), 0.25);
    }

    #[cfg(feature = "audio")]
    #[test]
    fn test_error_display() {
        let err = AudioError::TrackLoad {
            name: "theme.ogg".to_string(),
            message: "unsupported".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load track theme.ogg: unsupported");
    }
}
