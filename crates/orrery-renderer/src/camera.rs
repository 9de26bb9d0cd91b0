//! Perspective camera

use glam::{Mat4, Vec3};
use orrery_core::CameraSpec;

use crate::config::CameraConfig;

/// Camera uniform as laid out in the shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of the rotation-only view projection, for skybox rays
    pub inv_sky_view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            inv_sky_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self::from_spec(&CameraSpec::default(), aspect)
    }

    pub fn from_spec(spec: &CameraSpec, aspect: f32) -> Self {
        Self {
            position: spec.position,
            target: spec.target,
            up: Vec3::Y,
            fov_degrees: spec.fov_degrees,
            aspect,
            near: spec.near,
            far: spec.far,
        }
    }

    /// Override projection settings from the renderer configuration.
    pub fn apply_config(&mut self, config: &CameraConfig) {
        self.fov_degrees = config.fov_degrees;
        self.near = config.near_plane;
        self.far = config.far_plane;
    }

    pub fn update_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        let mut sky_view = self.view_matrix();
        sky_view.w_axis = glam::Vec4::W;
        let sky_view_proj = self.projection_matrix() * sky_view;

        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            inv_sky_view_proj: sky_view_proj.inverse().to_cols_array_2d(),
            eye: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(200.0, 50.0, 0.0));
        assert_eq!(camera.fov_degrees, 75.0);
        assert_eq!(camera.near, 1.0);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::default();
        let clip = camera.view_projection() * camera.target.extend(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_aspect_ignored() {
        let mut camera = Camera::new(2.0);
        camera.update_aspect(0.0);
        assert_eq!(camera.aspect, 2.0);
        camera.update_aspect(1.5);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }
}
