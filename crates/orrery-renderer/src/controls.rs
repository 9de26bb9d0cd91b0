//! Orbit camera controls.
//!
//! Drag rotates the camera around its target, scrolling dollies in and out.
//! Rotation is damped: input accumulates into a pending delta that is applied
//! a fraction at a time by [`OrbitControls::update`], once per frame.

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ControlsConfig;

/// Keeps the polar angle away from the poles, where the view matrix degenerates.
const POLE_EPSILON: f32 = 1e-6;
const ZOOM_STEP: f32 = 0.95;

/// Spherical coordinates around the target, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth around Y, measured from +Z
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

pub struct OrbitControls {
    config: ControlsConfig,
    target: Vec3,
    spherical: Spherical,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig, camera: &Camera) -> Self {
        Self {
            config,
            target: camera.target,
            spherical: Spherical::from_offset(camera.position - camera.target),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = std::f32::consts::TAU * self.config.rotate_speed / viewport_height;
        self.pending_theta -= delta.x * scale;
        self.pending_phi -= delta.y * scale;
    }

    /// Queue a dolly step; positive scroll moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        let step = ZOOM_STEP.powf(self.config.zoom_speed);
        if scroll > 0.0 {
            self.pending_scale *= step;
        } else if scroll < 0.0 {
            self.pending_scale /= step;
        }
    }

    /// Apply damped input to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let damping = self.config.damping.clamp(0.0, 1.0);
        let before = camera.position;

        self.spherical.theta += self.pending_theta * damping;
        self.spherical.phi += self.pending_phi * damping;
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);

        self.spherical.radius = (self.spherical.radius * self.pending_scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_scale = 1.0;

        camera.position = self.target + self.spherical.to_offset();
        camera.target = self.target;

        camera.position.distance_squared(before) > f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (OrbitControls, Camera) {
        let camera = Camera::default();
        (OrbitControls::new(ControlsConfig::default(), &camera), camera)
    }

    #[test]
    fn test_initial_update_keeps_camera() {
        let (mut controls, mut camera) = setup();
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position.y, 50.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (mut controls, mut camera) = setup();
        for _ in 0..100 {
            controls.zoom(1.0);
            controls.update(&mut camera);
        }
        assert_relative_eq!(controls.distance(), 200.0);

        for _ in 0..200 {
            controls.zoom(-1.0);
            controls.update(&mut camera);
        }
        assert_relative_eq!(controls.distance(), 1000.0);
        assert_relative_eq!(camera.position.length(), 1000.0, epsilon = 1e-2);
    }

    #[test]
    fn test_polar_angle_stays_above_horizon() {
        let (mut controls, mut camera) = setup();
        // Drag upwards a lot: the camera would swing below the target
        controls.rotate(Vec2::new(0.0, -10_000.0), 600.0);
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(controls.polar_angle() <= std::f32::consts::FRAC_PI_2);
        assert!(camera.position.y >= -1e-3);
    }

    #[test]
    fn test_rotation_is_damped() {
        let (mut controls, mut camera) = setup();
        let start = controls.spherical.theta;
        controls.rotate(Vec2::new(100.0, 0.0), 600.0);
        let total = -100.0 * std::f32::consts::TAU / 600.0;

        controls.update(&mut camera);
        assert_relative_eq!(controls.spherical.theta - start, total * 0.05, epsilon = 1e-5);

        for _ in 0..500 {
            controls.update(&mut camera);
        }
        assert_relative_eq!(controls.spherical.theta - start, total, epsilon = 1e-3);
    }
}
