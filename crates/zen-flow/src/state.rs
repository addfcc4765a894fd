//! Shared application state and its update queue.
//!
//! Writers (UI, gesture classifier, sequence controller) never touch
//! [`AppState`] directly. They submit [`StateUpdate`]s to the [`StateStore`],
//! which applies them in arrival order once per frame, before the render step
//! reads the state.

use std::collections::VecDeque;

use crate::config::{
    FlowConfig, NOISE_STRENGTH_RANGE, PARTICLE_COUNT_RANGE, PARTICLE_SIZE_RANGE,
};
use crate::shape::ShapeId;

// ── Rgb ───────────────────────────────────────────────────────────────────

/// Straight sRGB color, 8 bits per channel.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB` → color.
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parses `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match s.len() {
            6 => u32::from_str_radix(s, 16).ok().map(Self::from_u32),
            3 => {
                let v = u32::from_str_radix(s, 16).ok()?;
                let expand = |n: u32| (n * 0x11) as u8;
                Some(Self::new(expand((v >> 8) & 0xf), expand((v >> 4) & 0xf), expand(v & 0xf)))
            }
            _ => None,
        }
    }

    /// Channels as `[0, 1]` floats, still in sRGB encoding.
    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0]
    }
}

// ── AppState ──────────────────────────────────────────────────────────────

/// Everything the render loop reads each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub particle_count: usize,
    pub particle_size: f32,
    pub noise_strength: f32,
    pub color: Rgb,
    pub shape: ShapeId,
    pub camera_enabled: bool,
    /// Hand openness in `[0, 1]`.
    pub gesture_open: f32,
    /// Hand separation in `[0, 1]`; 0.5 is neutral.
    pub gesture_distance: f32,
    pub finger_count: u8,
    pub exploding: bool,
}

impl AppState {
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            particle_count: config.particle_count.clamp(PARTICLE_COUNT_RANGE.0, PARTICLE_COUNT_RANGE.1),
            particle_size: config.particle_size.clamp(PARTICLE_SIZE_RANGE.0, PARTICLE_SIZE_RANGE.1),
            noise_strength: config
                .noise_strength
                .clamp(NOISE_STRENGTH_RANGE.0, NOISE_STRENGTH_RANGE.1),
            color: config.shape.theme(),
            shape: config.shape,
            camera_enabled: config.camera_enabled,
            gesture_open: 0.0,
            gesture_distance: 0.5,
            finger_count: 0,
            exploding: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

// ── StateUpdate ───────────────────────────────────────────────────────────

/// A partial update; `None` fields are left untouched.
///
/// Selecting a shape without an explicit color also applies the shape's
/// theme color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub particle_count: Option<usize>,
    pub particle_size: Option<f32>,
    pub noise_strength: Option<f32>,
    pub color: Option<Rgb>,
    pub shape: Option<ShapeId>,
    pub camera_enabled: Option<bool>,
    pub gesture_open: Option<f32>,
    pub gesture_distance: Option<f32>,
    pub finger_count: Option<u8>,
    pub exploding: Option<bool>,
}

impl StateUpdate {
    pub fn shape(shape: ShapeId) -> Self {
        Self { shape: Some(shape), ..Self::default() }
    }

    pub fn particle_count(n: usize) -> Self {
        Self { particle_count: Some(n), ..Self::default() }
    }

    pub fn particle_size(size: f32) -> Self {
        Self { particle_size: Some(size), ..Self::default() }
    }

    pub fn noise_strength(strength: f32) -> Self {
        Self { noise_strength: Some(strength), ..Self::default() }
    }

    pub fn color(color: Rgb) -> Self {
        Self { color: Some(color), ..Self::default() }
    }

    pub fn camera(enabled: bool) -> Self {
        Self { camera_enabled: Some(enabled), ..Self::default() }
    }

    pub fn exploding(on: bool) -> Self {
        Self { exploding: Some(on), ..Self::default() }
    }

    pub fn with_exploding(mut self, on: bool) -> Self {
        self.exploding = Some(on);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Continuous hand metrics forwarded every frame.
    pub fn gesture(open: f32, distance: f32, finger_count: u8) -> Self {
        Self {
            gesture_open: Some(open),
            gesture_distance: Some(distance),
            finger_count: Some(finger_count),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, state: &mut AppState) {
        if let Some(n) = self.particle_count {
            state.particle_count = n.clamp(PARTICLE_COUNT_RANGE.0, PARTICLE_COUNT_RANGE.1);
        }
        if let Some(s) = self.particle_size {
            state.particle_size = s.clamp(PARTICLE_SIZE_RANGE.0, PARTICLE_SIZE_RANGE.1);
        }
        if let Some(s) = self.noise_strength {
            state.noise_strength = s.clamp(NOISE_STRENGTH_RANGE.0, NOISE_STRENGTH_RANGE.1);
        }
        if let Some(shape) = self.shape {
            state.shape = shape;
            state.color = shape.theme();
        }
        if let Some(c) = self.color {
            state.color = c;
        }
        if let Some(on) = self.camera_enabled {
            state.camera_enabled = on;
        }
        if let Some(v) = self.gesture_open {
            state.gesture_open = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.gesture_distance {
            state.gesture_distance = v.clamp(0.0, 1.0);
        }
        if let Some(n) = self.finger_count {
            state.finger_count = n.min(5);
        }
        if let Some(on) = self.exploding {
            state.exploding = on;
        }
    }
}

// ── StateStore ────────────────────────────────────────────────────────────

/// Owns [`AppState`] and a FIFO of pending updates.
#[derive(Debug, Default)]
pub struct StateStore {
    state: AppState,
    pending: VecDeque<StateUpdate>,
}

impl StateStore {
    pub fn new(state: AppState) -> Self {
        Self { state, pending: VecDeque::new() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Queues an update; it becomes visible after the next [`apply_pending`](Self::apply_pending).
    pub fn submit(&mut self, update: StateUpdate) {
        self.pending.push_back(update);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Applies every queued update in arrival order. Returns how many were applied.
    pub fn apply_pending(&mut self) -> usize {
        let n = self.pending.len();
        while let Some(update) = self.pending.pop_front() {
            update.apply_to(&mut self.state);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_values() {
        let s = AppState::default();
        assert_eq!(s.particle_count, 8_000);
        assert_eq!(s.shape, ShapeId::Sphere);
        assert_eq!(s.particle_size, 1.2);
        assert_eq!(s.noise_strength, 0.2);
        assert_eq!(s.color, ShapeId::Sphere.theme());
        assert!(!s.camera_enabled && !s.exploding);
        assert_eq!(s.gesture_distance, 0.5);
    }

    #[test]
    fn updates_are_invisible_until_applied() {
        let mut store = StateStore::default();
        store.submit(StateUpdate::shape(ShapeId::Heart));
        assert_eq!(store.state().shape, ShapeId::Sphere);
        assert_eq!(store.apply_pending(), 1);
        assert_eq!(store.state().shape, ShapeId::Heart);
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn updates_apply_in_arrival_order() {
        let mut store = StateStore::default();
        store.submit(StateUpdate::shape(ShapeId::Bow));
        store.submit(StateUpdate::shape(ShapeId::Heart));
        store.submit(StateUpdate::exploding(true));
        store.submit(StateUpdate::exploding(false));
        store.apply_pending();
        assert_eq!(store.state().shape, ShapeId::Heart);
        assert!(!store.state().exploding);
    }

    #[test]
    fn shape_selection_applies_theme_unless_overridden() {
        let mut state = AppState::default();
        StateUpdate::shape(ShapeId::Saturn).apply_to(&mut state);
        assert_eq!(state.color, ShapeId::Saturn.theme());

        let custom = Rgb::new(1, 2, 3);
        StateUpdate::shape(ShapeId::Flower).with_color(custom).apply_to(&mut state);
        assert_eq!(state.shape, ShapeId::Flower);
        assert_eq!(state.color, custom);
    }

    #[test]
    fn ui_ranges_are_clamped() {
        let mut state = AppState::default();
        StateUpdate::particle_count(50).apply_to(&mut state);
        assert_eq!(state.particle_count, 1_000);
        StateUpdate::particle_count(90_000).apply_to(&mut state);
        assert_eq!(state.particle_count, 20_000);
        StateUpdate::particle_size(9.0).apply_to(&mut state);
        assert_eq!(state.particle_size, 5.0);
        StateUpdate::noise_strength(-1.0).apply_to(&mut state);
        assert_eq!(state.noise_strength, 0.0);
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(Rgb::parse_hex("#3b82f6"), Some(Rgb::new(0x3b, 0x82, 0xf6)));
        assert_eq!(Rgb::parse_hex("fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("zzzzzz"), None);
    }

    #[test]
    fn hex_rejects_signs() {
        assert_eq!(Rgb::parse_hex("+12345"), None);
        assert_eq!(Rgb::parse_hex("#+fff"), None);
        assert_eq!(Rgb::parse_hex("+ff"), None);
    }
}
