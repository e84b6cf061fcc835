// Decoded sprite images and their optional animation sidecar

use super::{AssetError, AssetId, AssetLoader, AssetType};
use image::RgbaImage;
use serde::Deserialize;
use std::path::Path;

/// Sprite-sheet layout read from `<stem>.anim.toml` next to a texture
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SheetLayout {
    /// Width of each frame in pixels
    pub frame_width: u32,
    /// Height of each frame in pixels
    pub frame_height: u32,
    /// Number of columns in the sheet
    pub columns: u32,
    /// Frames in the clip, read left to right, top to bottom
    pub frames: u32,
    /// Playback rate
    pub fps: f32,
}

impl SheetLayout {
    /// Normalized UV rect (u_min, v_min, u_max, v_max) of a frame
    pub fn frame_uvs(&self, frame: u32, texture_width: u32, texture_height: u32) -> [f32; 4] {
        let columns = self.columns.max(1);
        let col = (frame % columns) as f32;
        let row = (frame / columns) as f32;
        let u = self.frame_width as f32 / texture_width.max(1) as f32;
        let v = self.frame_height as f32 / texture_height.max(1) as f32;

        [col * u, row * v, (col + 1.0) * u, (row + 1.0) * v]
    }

    /// Check the layout against the texture it slices
    fn validate(&self, texture_width: u32, texture_height: u32) -> Result<(), String> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err("frame size must be non-zero".to_string());
        }
        if self.columns == 0 || self.frames == 0 {
            return Err("columns and frames must be non-zero".to_string());
        }
        if !(self.fps > 0.0) || self.fps.is_infinite() {
            return Err("fps must be positive".to_string());
        }

        let rows = self.frames.div_ceil(self.columns);
        let sheet_width = u64::from(self.columns) * u64::from(self.frame_width);
        let sheet_height = u64::from(rows) * u64::from(self.frame_height);
        if sheet_width > u64::from(texture_width) || sheet_height > u64::from(texture_height) {
            return Err(format!(
                "{}x{} sheet does not fit a {}x{} texture",
                sheet_width, sheet_height, texture_width, texture_height
            ));
        }
        Ok(())
    }
}

/// A decoded texture ready for upload
#[derive(Debug)]
pub struct Visual {
    pub id: AssetId,
    pub name: String,
    pub image: RgbaImage,
    /// Animation layout, when the texture is a sprite sheet
    pub sheet: Option<SheetLayout>,
}

impl Visual {
    /// Name of the animation sidecar for a texture name
    pub fn sidecar_name(name: &str) -> String {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        format!("{}.anim.toml", stem)
    }

    /// Read and decode a texture plus its sidecar, if any
    pub fn decode(loader: &AssetLoader, name: &str) -> Result<Self, AssetError> {
        if !AssetLoader::is_supported(AssetType::Texture, name) {
            return Err(AssetError::LoadError(format!(
                "{} is not a supported texture format",
                name
            )));
        }

        let bytes = loader.load_bytes(AssetType::Texture, name)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                name: name.to_string(),
                source,
            })?
            .to_rgba8();

        let sidecar = Self::sidecar_name(name);
        let sheet = match loader.load_optional_text(AssetType::Texture, &sidecar)? {
            Some(text) => {
                let layout: SheetLayout =
                    toml::from_str(&text).map_err(|e| AssetError::InvalidSheet {
                        name: sidecar.clone(),
                        message: e.to_string(),
                    })?;
                layout
                    .validate(image.width(), image.height())
                    .map_err(|message| AssetError::InvalidSheet {
                        name: sidecar.clone(),
                        message,
                    })?;
                Some(layout)
            }
            None => None,
        };

        Ok(Self {
            id: AssetId::from_path(name),
            name: name.to_string(),
            image,
            sheet,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
