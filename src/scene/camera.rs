//! Camera

use glam::{Mat4, Vec3};

pub const MIN_ZOOM_DEGREES: f32 = 1.0;
pub const MAX_ZOOM_DEGREES: f32 = 45.0;

/// Perspective camera for viewing the scene.
///
/// The field of view doubles as a zoom value: scrolling narrows it down to
/// 1 degree and back out to the default 45.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            zoom: MAX_ZOOM_DEGREES,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the forward direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Update aspect ratio after a resize
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Narrow or widen the field of view, clamped to the zoom range
    pub fn adjust_zoom(&mut self, delta_degrees: f32) {
        self.zoom = (self.zoom - delta_degrees).clamp(MIN_ZOOM_DEGREES, MAX_ZOOM_DEGREES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_clamps_to_range() {
        let mut camera = Camera::default();
        camera.adjust_zoom(100.0);
        assert_eq!(camera.zoom, MIN_ZOOM_DEGREES);
        camera.adjust_zoom(-100.0);
        assert_eq!(camera.zoom, MAX_ZOOM_DEGREES);
    }

    #[test]
    fn view_matrix_looks_down_negative_z_by_default() {
        let camera = Camera::default();
        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }
}
