// Sprite rendering system
//
// Sprites are expanded into world-space quads on the CPU each frame, sorted
// back to front, and drawn in runs that share a texture.

use super::{Camera, CameraUniform, TextureManager, Vertex, QUAD_INDICES};
use crate::engine::assets::AssetId;
use anyhow::Result;
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::ops::Range;
use wgpu::util::DeviceExt;

/// How a sprite's quad is oriented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Upright and turned toward the camera; `position` is the center
    Billboard,
    /// Flat on the XZ plane; `size` spans x and z
    Ground,
    /// Covers the whole viewport; `position` and `size` are ignored
    Screen,
}

/// A textured quad in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    /// Width and height in world units
    pub size: Vec2,
    pub facing: Facing,
    /// `[u_min, v_min, u_max, v_max]`
    pub uv: [f32; 4],
    /// Color tint (RGBA, 1.0 = full color)
    pub color: Vec4,
    /// Texture to sample (None = white texture)
    pub texture: Option<AssetId>,
    /// Draw layer; higher layers are drawn on top
    pub layer: i32,
}

impl Sprite {
    pub const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    pub fn new(position: Vec3, size: Vec2, facing: Facing) -> Self {
        Self {
            position,
            size,
            facing,
            uv: Self::FULL_UV,
            color: Vec4::ONE,
            texture: None,
            layer: 0,
        }
    }

    pub fn billboard(position: Vec3, size: Vec2) -> Self {
        Self::new(position, size, Facing::Billboard)
    }

    pub fn ground(position: Vec3, size: Vec2) -> Self {
        Self::new(position, size, Facing::Ground)
    }

    /// Full-viewport quad
    pub fn screen() -> Self {
        Self::new(Vec3::ZERO, Vec2::ONE, Facing::Screen)
    }

    pub fn with_texture(mut self, texture: AssetId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// World-space corners: bottom-left, bottom-right, top-right, top-left
    pub fn corners(&self, camera: &Camera) -> [Vec3; 4] {
        let half = self.size * 0.5;
        match self.facing {
            Facing::Billboard => {
                let right = camera.right() * half.x;
                let up = camera.up() * half.y;
                [
                    self.position - right - up,
                    self.position + right - up,
                    self.position + right + up,
                    self.position - right + up,
                ]
            }
            Facing::Ground => {
                let x = Vec3::X * half.x;
                let z = Vec3::Z * half.y;
                // Near edge at the bottom of the texture
                [
                    self.position - x + z,
                    self.position + x + z,
                    self.position + x - z,
                    self.position - x - z,
                ]
            }
            Facing::Screen => {
                let depth = 0.5;
                [
                    camera.ndc_to_world(Vec3::new(-1.0, -1.0, depth)),
                    camera.ndc_to_world(Vec3::new(1.0, -1.0, depth)),
                    camera.ndc_to_world(Vec3::new(1.0, 1.0, depth)),
                    camera.ndc_to_world(Vec3::new(-1.0, 1.0, depth)),
                ]
            }
        }
    }
}

/// A run of indices drawn with one texture
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub texture: Option<AssetId>,
    pub indices: Range<u32>,
}

/// CPU-side geometry for one frame
#[derive(Debug, Default)]
pub struct FrameGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub batches: Vec<Batch>,
}

impl FrameGeometry {
    /// Sort `sprites` for drawing and expand them into quads.
    /// Screen sprites never cull; others are dropped when behind the camera.
    pub fn build(sprites: &[Sprite], camera: &Camera) -> Self {
        let mut order: Vec<(&Sprite, f32)> = sprites
            .iter()
            .filter_map(|sprite| {
                let depth = match sprite.facing {
                    Facing::Screen => 0.0,
                    _ => camera.depth_of(sprite.position),
                };
                let behind = sprite.facing == Facing::Billboard && depth <= 0.0;
                (!behind).then_some((sprite, depth))
            })
            .collect();
        order.sort_by(|(a, da), (b, db)| a.layer.cmp(&b.layer).then(db.total_cmp(da)));

        let mut frame = FrameGeometry::default();
        for (sprite, _) in order {
            let base = frame.vertices.len() as u32;
            frame
                .vertices
                .extend(Vertex::quad(sprite.corners(camera), sprite.uv, sprite.color));

            let start = frame.indices.len() as u32;
            frame.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
            let end = frame.indices.len() as u32;

            match frame.batches.last_mut() {
                Some(batch) if batch.texture == sprite.texture => batch.indices.end = end,
                _ => frame.batches.push(Batch {
                    texture: sprite.texture,
                    indices: start..end,
                }),
            }
        }
        frame
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Draws sprites with one pipeline and growable vertex/index buffers
pub struct SpriteRenderer {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    /// Capacity of both buffers, in quads
    capacity: usize,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    batches: Vec<Batch>,
    index_count: u32,
}

impl SpriteRenderer {
    const INITIAL_CAPACITY: usize = 256;

    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Result<Self> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Ground quads are seen from above, billboards from the front
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let (vertex_buffer, index_buffer) = Self::create_buffers(device, Self::INITIAL_CAPACITY);

        let camera_uniform = CameraUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            capacity: Self::INITIAL_CAPACITY,
            camera_buffer,
            camera_bind_group,
            texture_bind_group_layout,
            batches: Vec::new(),
            index_count: 0,
        })
    }

    fn create_buffers(device: &wgpu::Device, quads: usize) -> (wgpu::Buffer, wgpu::Buffer) {
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (quads * 4 * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Index Buffer"),
            size: (quads * 6 * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        (vertex_buffer, index_buffer)
    }

    /// Upload this frame's sprites and camera
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        sprites: &[Sprite],
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::new(camera)]),
        );

        let frame = FrameGeometry::build(sprites, camera);
        let quads = frame.quad_count();
        if quads > self.capacity {
            self.capacity = quads.next_power_of_two();
            let (vertices, indices) = Self::create_buffers(device, self.capacity);
            self.vertex_buffer = vertices;
            self.index_buffer = indices;
        }

        if quads > 0 {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&frame.vertices));
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&frame.indices));
        }
        self.index_count = frame.indices.len() as u32;
        self.batches = frame.batches;
    }

    /// Draw what the last `prepare` uploaded
    pub fn render<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        textures: &'a TextureManager,
    ) {
        if self.index_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for batch in &self.batches {
            render_pass.set_bind_group(1, textures.bind_group(batch.texture), &[]);
            render_pass.draw_indexed(batch.indices.clone(), 0, 0..1);
        }
    }

    pub fn texture_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_bind_group_layout
    }

    // Draw calls issued per frame
}
