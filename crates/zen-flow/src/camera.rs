use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};

const FOV_Y_DEG: f32 = 60.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1_000.0;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const ZOOM_PER_NOTCH: f32 = 0.95;

/// Orbit camera around the origin.
///
/// Starts at `(0, 0, 8)` looking at the origin. Drag rotates, the wheel
/// dollies, and auto-rotation spins the yaw while enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Turns per minute; 0.5 gives one turn every two minutes.
    pub auto_rotate_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self { yaw: 0.0, pitch: 0.0, distance: 8.0, auto_rotate_speed: 0.5 }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Advances auto-rotation by `dt` seconds.
    pub fn auto_rotate(&mut self, dt: f32) {
        self.yaw = (self.yaw + TAU / 60.0 * self.auto_rotate_speed * dt) % TAU;
    }

    /// Pointer drag in pixels; a full viewport height sweeps one turn.
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.yaw -= TAU * dx / h;
        self.pitch = (self.pitch + TAU * dy / h).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Wheel notches; positive zooms in.
    pub fn zoom(&mut self, notches: f32) {
        self.distance =
            (self.distance * ZOOM_PER_NOTCH.powf(notches)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}
