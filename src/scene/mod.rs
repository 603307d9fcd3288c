//! Scene description

mod camera;
mod camera_controller;

pub use camera::{Camera, MAX_ZOOM_DEGREES, MIN_ZOOM_DEGREES};
pub use camera_controller::{CameraController, CameraInput, FreeFlyController};

use glam::Vec3;

/// A point light with an HDR color (intensity folded into the color).
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// The demo scene: a row of material spheres, one light, one camera.
pub struct Scene {
    pub camera: Camera,
    pub light: PointLight,
    pub sphere_positions: Vec<Vec3>,
}

impl Scene {
    /// A centered row of `count` spheres spaced along the X axis, the light
    /// sitting behind the viewer.
    pub fn sphere_row(count: usize, spacing: f32) -> Self {
        let half = (count / 2) as i32;
        let sphere_positions = (0..count as i32)
            .map(|i| Vec3::new((i - half) as f32 * spacing, 0.0, 0.0))
            .collect();

        Self {
            camera: Camera::default(),
            light: PointLight::new(Vec3::new(0.0, 0.0, 10.0), Vec3::splat(150.0)),
            sphere_positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_row_is_centered() {
        let scene = Scene::sphere_row(5, 2.5);
        assert_eq!(scene.sphere_positions.len(), 5);
        assert_eq!(scene.sphere_positions[0], Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(scene.sphere_positions[2], Vec3::ZERO);
        assert_eq!(scene.sphere_positions[4], Vec3::new(5.0, 0.0, 0.0));
    }
}
