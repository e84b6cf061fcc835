// Perspective camera that trails the runner

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Default vertical field of view in degrees
pub const DEFAULT_FOV_Y: f32 = 75.0;

/// Perspective camera looking along a fixed direction
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Unit view direction
    forward: Vec3,
    /// Vertical field of view in radians
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view_proj: Mat4,
}

impl Camera {
    /// Camera at `position` looking down -Z
    pub fn new(position: Vec3, viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            position,
            forward: Vec3::NEG_Z,
            fov_y: DEFAULT_FOV_Y.to_radians(),
            aspect: aspect_ratio(viewport_width, viewport_height),
            near: 0.1,
            far: 1000.0,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        camera
    }

    fn update_view_proj(&mut self) {
        let view = Mat4::look_to_rh(self.position, self.forward, Vec3::Y);
        let projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        self.view_proj = projection * view;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view_proj();
    }

    /// Sit at `offset` from `target`
    pub fn follow(&mut self, target: Vec3, offset: Vec3) {
        self.set_position(target + offset);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.aspect = aspect_ratio(width, height);
        self.update_view_proj();
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }

    /// Screen-right in world space
    pub fn right(&self) -> Vec3 {
        self.forward.cross(Vec3::Y).normalize_or_zero()
    }

    /// Screen-up in world space
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward)
    }

    /// Normalized device coordinates → world point
    pub fn ndc_to_world(&self, ndc: Vec3) -> Vec3 {
        self.view_proj.inverse().project_point3(ndc)
    }

    /// Distance along the view direction; negative behind the camera
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.forward)
    }
}

fn aspect_ratio(width: f32, height: f32) -> f32 {
    if width > 0.0 && height > 0.0 {
        width / height
    } else {
        1.0
    }
}

/// Camera uniform for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Create a new camera uniform from a camera
    pub fn new(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj_matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
impl Camera {
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        self.view_proj_matrix().project_point3(point)
    }
}
