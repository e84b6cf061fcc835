// GPU textures keyed by asset id

use image::RgbaImage;
use log::debug;
use std::collections::HashMap;

use crate::engine::assets::{AssetId, Visual};

/// A texture on the GPU with the bind group that samples it
pub struct Texture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Upload an RGBA image
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let (width, height) = image.dimensions();
        Self::from_pixels(device, queue, layout, image.as_raw(), width, height, label)
    }

    /// A single-pixel texture of `color`
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        color: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        Self::from_pixels(device, queue, layout, &color, 1, 1, label)
    }

    fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        pixels: &[u8],
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            _texture: texture,
            bind_group,
            width,
            height,
        }
    }
}

/// Textures uploaded so far, plus a white fallback for untextured sprites
pub struct TextureManager {
    textures: HashMap<AssetId, Texture>,
    white: Texture,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> Self {
        Self {
            textures: HashMap::new(),
            white: Texture::from_color(device, queue, layout, [255; 4], Some("White Texture")),
        }
    }

    /// Upload a decoded visual; already uploaded ids are skipped
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        visual: &Visual,
    ) {
        if self.textures.contains_key(&visual.id) {
            return;
        }
        let texture = Texture::from_rgba(device, queue, layout, &visual.image, Some(&visual.name));
        debug!(
            "Uploaded {} ({}x{}) as {}",
            visual.name, texture.width, texture.height, visual.id
        );
        self.textures.insert(visual.id, texture);
    }

    /// Bind group for `id`, falling back to white while it is missing
    pub fn bind_group(&self, id: Option<AssetId>) -> &wgpu::BindGroup {
        id.and_then(|id| self.textures.get(&id))
            .map_or(&self.white.bind_group, |texture| &texture.bind_group)
    }
}
