//! Camera controller
//!
//! FreeFly: WASD movement, mouse look, scroll zoom.

use glam::{Vec2, Vec3};

use super::Camera;

/// Input state for camera controllers
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    /// Movement keys (WASD)
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,

    /// Sprint modifier (shift)
    pub sprint: bool,

    /// Mouse delta since last frame (in pixels)
    pub mouse_delta: Vec2,

    /// Mouse scroll delta (positive = scroll up)
    pub scroll_delta: f32,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Abstract camera controller trait
pub trait CameraController {
    /// Update the camera based on input and delta time
    fn update(&mut self, camera: &mut Camera, input: &CameraInput, dt: f32);
}

/// Free-fly camera controller (FPS-style)
///
/// - WASD: Move forward/backward/left/right
/// - Mouse: Look around
/// - Scroll: Zoom (narrow/widen the field of view)
/// - Shift: Sprint (2x speed)
pub struct FreeFlyController {
    /// Current yaw angle (horizontal rotation) in radians
    pub yaw: f32,
    /// Current pitch angle (vertical rotation) in radians
    pub pitch: f32,
    /// Base movement speed in units per second
    pub move_speed: f32,
    /// Mouse sensitivity (radians per pixel)
    pub mouse_sensitivity: f32,
    /// Speed multiplier when sprinting
    pub sprint_multiplier: f32,
}

impl Default for FreeFlyController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 2.5,
            mouse_sensitivity: 0.003,
            sprint_multiplier: 2.0,
        }
    }
}

impl FreeFlyController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom speed settings
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Initialize yaw/pitch from camera's current orientation
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        let forward = (camera.target - camera.position).normalize();
        self.yaw = forward.z.atan2(forward.x);
        self.pitch = (-forward.y).asin();
    }

    /// Get the forward direction based on yaw/pitch
    fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            -self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Get the right direction (perpendicular to forward, on XZ plane)
    fn right_direction(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos()).normalize()
    }
}

impl CameraController for FreeFlyController {
    fn update(&mut self, camera: &mut Camera, input: &CameraInput, dt: f32) {
        // Scroll wheel zooms the camera
        if input.scroll_delta != 0.0 {
            camera.adjust_zoom(input.scroll_delta);
        }

        // Mouse look
        if input.mouse_delta != Vec2::ZERO {
            self.yaw += input.mouse_delta.x * self.mouse_sensitivity;
            self.pitch += input.mouse_delta.y * self.mouse_sensitivity;

            // Clamp pitch to avoid gimbal lock
            let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
            self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

            // Keep yaw in reasonable range
            self.yaw %= 2.0 * std::f32::consts::PI;
        }

        // Movement direction
        let forward = self.forward_direction();
        let right = self.right_direction();

        let mut velocity = Vec3::ZERO;

        if input.forward {
            velocity += forward;
        }
        if input.backward {
            velocity -= forward;
        }
        if input.right {
            velocity += right;
        }
        if input.left {
            velocity -= right;
        }

        // Normalize if moving diagonally
        if velocity.length_squared() > 0.0 {
            velocity = velocity.normalize();
        }

        let speed = if input.sprint {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };

        camera.position += velocity * speed * dt;
        camera.target = camera.position + forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controller = FreeFlyController::new();
        controller.sync_with_camera(&camera);

        let input = CameraInput {
            forward: true,
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 1.0);

        let moved = camera.position - start;
        assert!((moved.length() - controller.move_speed).abs() < 1e-4);
        assert!(moved.z < 0.0, "default camera looks toward -Z");
    }

    #[test]
    fn sprint_doubles_distance() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controller = FreeFlyController::new();

        let input = CameraInput {
            forward: true,
            sprint: true,
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.5);

        let expected = controller.move_speed * controller.sprint_multiplier * 0.5;
        assert!(((camera.position - start).length() - expected).abs() < 1e-4);
    }

    #[test]
    fn pitch_clamped_under_vertical() {
        let mut camera = Camera::default();
        let mut controller = FreeFlyController::new();

        let input = CameraInput {
            mouse_delta: Vec2::new(0.0, 1e6),
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.016);

        assert!(controller.pitch < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn scroll_zooms_camera() {
        let mut camera = Camera::default();
        let mut controller = FreeFlyController::new();

        let input = CameraInput {
            scroll_delta: 10.0,
            ..CameraInput::new()
        };
        controller.update(&mut camera, &input, 0.016);

        assert_eq!(camera.zoom, 35.0);
    }
}
