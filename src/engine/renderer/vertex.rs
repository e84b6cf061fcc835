// Vertex layout shared by every quad the renderer draws

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Index order for one quad, relative to its first vertex
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// World-space vertex with texture coordinates and tint
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, tex_coords: Vec2, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            tex_coords: tex_coords.to_array(),
            color: color.to_array(),
        }
    }

    /// Four vertices for a quad.
    /// `corners` run bottom-left, bottom-right, top-right, top-left;
    /// `uv` is `[u_min, v_min, u_max, v_max]` with v growing downward.
    pub fn quad(corners: [Vec3; 4], uv: [f32; 4], color: Vec4) -> [Vertex; 4] {
        let [u0, v0, u1, v1] = uv;
        [
            Vertex::new(corners[0], Vec2::new(u0, v1), color),
            Vertex::new(corners[1], Vec2::new(u1, v1), color),
            Vertex::new(corners[2], Vec2::new(u1, v0), color),
            Vertex::new(corners[3], Vec2::new(u0, v0), color),
        ]
    }

    /// Get the vertex buffer layout descriptor
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Tex Coords
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
