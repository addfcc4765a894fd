use crate::noise::Displacement;
use crate::shape::ShapeId;
use crate::state::AppState;

/// Smoothed expansion and scale fed to the vertex stage.
///
/// Targets are recomputed from [`AppState`] every frame; the values chase them
/// with `value += (target - value) * smoothing`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderParams {
    pub expansion: f32,
    pub scale: f32,
    smoothing: f32,
}

impl RenderParams {
    pub fn new(smoothing: f32) -> Self {
        Self { expansion: 0.0, scale: 1.0, smoothing }
    }

    /// `(expansion, scale)` the values are pulled toward at time `t` seconds.
    pub fn targets(state: &AppState, t: f32) -> (f32, f32) {
        if state.camera_enabled {
            let expansion = if state.shape == ShapeId::Fireworks && state.exploding {
                5.0 + (t * 10.0).sin()
            } else {
                state.gesture_open * 2.5
            };
            (expansion, 0.5 + state.gesture_distance * 1.5)
        } else {
            // idle breathing
            (0.2 + t.sin() * 0.1, 1.0)
        }
    }

    pub fn update(&mut self, state: &AppState, t: f32) {
        let (expansion, scale) = Self::targets(state, t);
        self.expansion += (expansion - self.expansion) * self.smoothing;
        self.scale += (scale - self.scale) * self.smoothing;
    }
}

impl Default for RenderParams {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Everything the GPU stage needs besides the two position buffers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Uniforms {
    /// Seconds since start.
    pub time: f32,
    pub size: f32,
    pub noise_strength: f32,
    pub morph: f32,
    pub expansion: f32,
    pub scale: f32,
    /// sRGB-encoded color in `[0, 1]`.
    pub color: [f32; 3],
}

impl Uniforms {
    pub fn displacement(&self) -> Displacement {
        Displacement {
            time: self.time,
            expansion: self.expansion,
            noise_strength: self.noise_strength,
            scale: self.scale,
        }
    }
}
