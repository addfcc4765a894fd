use crate::shape::ShapeId;

/// Accepted range for the particle-count control.
pub const PARTICLE_COUNT_RANGE: (usize, usize) = (1_000, 20_000);

/// Accepted range for the particle-size control.
pub const PARTICLE_SIZE_RANGE: (f32, f32) = (0.5, 5.0);

/// Accepted range for the noise-strength control.
pub const NOISE_STRENGTH_RANGE: (f32, f32) = (0.0, 2.0);

/// Startup configuration for a [`Flow`](crate::Flow).
///
/// Defaults match the values the cloud starts with when launched without
/// arguments: 8000 particles morphing from a sphere, camera off.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub particle_count: usize,
    pub particle_size: f32,
    pub noise_strength: f32,
    pub shape: ShapeId,
    pub camera_enabled: bool,

    /// String rendered for [`ShapeId::TextA`].
    pub text_a: String,
    /// String rendered for [`ShapeId::TextB`].
    pub text_b: String,

    /// A finger count is stable once it has repeated more than this many frames.
    pub stability_frames: u32,
    /// Morph progress added per rendered frame.
    pub morph_step: f32,
    /// Exponential smoothing factor for expansion and scale.
    pub smoothing: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            particle_count: 8_000,
            particle_size: 1.2,
            noise_strength: 0.2,
            shape: ShapeId::Sphere,
            camera_enabled: false,
            text_a: "Abinash Sharma".to_string(),
            text_b: "A & S".to_string(),
            stability_frames: 15,
            morph_step: 0.02,
            smoothing: 0.1,
        }
    }
}
