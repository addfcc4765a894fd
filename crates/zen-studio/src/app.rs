use zen_engine::core::{App, AppControl, FrameCtx};
use zen_engine::input::{InputFrame, InputState, Key, MouseButton};
use zen_engine::paint::Color;
use zen_engine::render::{PointCloud, PointRenderer, PointUniforms};
use zen_flow::{Flow, OrbitCamera, SequenceState, ShapeId, StateUpdate};

use crate::simulated::SharedHand;

const TITLE: &str = "Zen Particle Flow";
const BACKGROUND: u32 = 0x050505;

const COUNT_STEP: usize = 1_000;
const SIZE_STEP: f32 = 0.1;
const NOISE_STEP: f32 = 0.1;
const POSE_STEP: f32 = 0.1;

/// Finger keys for the simulated hand: F1 holds zero fingers up, F5 four.
const FINGER_KEYS: [(Key, u8); 5] =
    [(Key::F1, 0), (Key::F2, 1), (Key::F3, 2), (Key::F4, 3), (Key::F5, 4)];

/// Ties the flow to the window: keyboard/mouse in, point cloud out.
pub struct StudioApp {
    flow: Flow,
    hand: SharedHand,
    camera: OrbitCamera,
    renderer: PointRenderer,
    background: Color,

    last_fingers: u8,
    last_sequence: SequenceState,
    camera_note: Option<String>,
    title: String,
}

impl StudioApp {
    pub fn new(flow: Flow, hand: SharedHand) -> Self {
        Self {
            flow,
            hand,
            camera: OrbitCamera::default(),
            renderer: PointRenderer::new(),
            background: Color::from_hex(BACKGROUND),
            last_fingers: 0,
            last_sequence: SequenceState::Idle,
            camera_note: None,
            title: String::new(),
        }
    }

    // ── controls ──────────────────────────────────────────────────────────

    /// Maps this frame's key presses to state updates. Returns `false` on quit.
    fn handle_keys(&mut self, frame: &InputFrame, now_ms: u64) -> bool {
        let state = self.flow.state();
        let (count, size, noise, camera) = (
            state.particle_count,
            state.particle_size,
            state.noise_strength,
            state.camera_enabled,
        );

        for &key in &frame.keys_pressed {
            if let Some(n) = key.digit() {
                // 1..9 then 0 walk the shape list
                let idx = if n == 0 { 9 } else { n as usize - 1 };
                if let Some(&shape) = ShapeId::ALL.get(idx) {
                    self.flow.submit(StateUpdate::shape(shape));
                }
                continue;
            }

            let update = match key {
                Key::Escape => return false,

                Key::Equal => StateUpdate::particle_count(count + COUNT_STEP),
                Key::Minus => StateUpdate::particle_count(count.saturating_sub(COUNT_STEP)),
                Key::BracketLeft => StateUpdate::particle_size(size - SIZE_STEP),
                Key::BracketRight => StateUpdate::particle_size(size + SIZE_STEP),
                Key::Semicolon => StateUpdate::noise_strength(noise - NOISE_STEP),
                Key::Quote => StateUpdate::noise_strength(noise + NOISE_STEP),
                Key::C => StateUpdate::camera(!camera),

                Key::B => {
                    log::info!("bow sequence requested from keyboard");
                    self.flow.trigger_bow(now_ms);
                    continue;
                }

                _ => continue,
            };
            self.flow.submit(update);
        }

        true
    }

    /// Rewrites the simulated pose from the keys held this frame.
    fn drive_hand(&mut self, input: &InputState, frame: &InputFrame) {
        let mut hand = self.hand.get();

        hand.fingers = FINGER_KEYS
            .iter()
            .rev()
            .find(|(key, _)| input.key_down(*key))
            .map_or(0, |&(_, n)| n);

        let step = |down: Key, up: Key| {
            let mut d = 0.0;
            if frame.pressed(up) {
                d += POSE_STEP;
            }
            if frame.pressed(down) {
                d -= POSE_STEP;
            }
            d
        };
        hand.openness = (hand.openness + step(Key::ArrowDown, Key::ArrowUp)).clamp(0.0, 1.0);
        hand.separation =
            (hand.separation + step(Key::ArrowLeft, Key::ArrowRight)).clamp(0.0, 1.0);

        if frame.pressed(Key::H) {
            hand.visible = !hand.visible;
            log::info!("simulated hands {}", if hand.visible { "shown" } else { "hidden" });
        }

        self.hand.set(hand);
    }

    fn drive_camera(&mut self, ctx: &FrameCtx<'_, '_>) {
        if ctx.input.button_down(MouseButton::Left) {
            let (dx, dy) = ctx.input_frame.pointer_delta;
            let (_, h) = ctx.window.logical_size();
            self.camera.drag(dx, dy, h);
        }
        if ctx.input_frame.scroll_lines != 0.0 {
            self.camera.zoom(ctx.input_frame.scroll_lines);
        }
        if self.flow.wants_auto_rotate() {
            self.camera.auto_rotate(ctx.time.dt);
        }
    }

    // ── status ────────────────────────────────────────────────────────────

    /// Logs what the on-screen guide would show and keeps the title current.
    fn report(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        if let Some(err) = self.flow.take_camera_error() {
            log::warn!("camera disabled: {err}");
            self.camera_note = Some(err.to_string());
        }

        let state = self.flow.state();
        if state.camera_enabled {
            self.camera_note = None;
        }

        if state.finger_count != self.last_fingers {
            log::info!("fingers: {}", state.finger_count);
            self.last_fingers = state.finger_count;
        }

        let sequence = self.flow.sequence_state();
        if sequence != self.last_sequence {
            log::debug!("sequence: {:?} -> {:?}", self.last_sequence, sequence);
            self.last_sequence = sequence;
        }

        let camera = match (&self.camera_note, state.camera_enabled) {
            (Some(note), _) => format!("camera unavailable ({note})"),
            (None, true) => format!("camera on · {} fingers", state.finger_count),
            (None, false) => "camera off".to_string(),
        };
        let title = format!(
            "{TITLE} · {} · {} particles · {camera}",
            state.shape, state.particle_count
        );
        if title != self.title {
            ctx.runtime.set_title(title.clone());
            self.title = title;
        }
    }
}

impl App for StudioApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let now_ms = ctx.time.elapsed_ms();

        if !self.handle_keys(ctx.input_frame, now_ms) {
            log::info!("quit requested");
            return AppControl::Exit;
        }
        self.drive_hand(ctx.input, ctx.input_frame);
        self.drive_camera(ctx);

        let aspect = ctx.window.aspect();
        let out = self.flow.frame(now_ms);

        let cloud = PointCloud {
            current: out.current.as_slice(),
            target: out.target.as_slice(),
            version: out.buffers_version,
        };
        let [r, g, b] = out.uniforms.color;
        let uniforms = PointUniforms {
            view: self.camera.view(),
            projection: self.camera.projection(aspect),
            time: out.uniforms.time,
            size: out.uniforms.size,
            noise_strength: out.uniforms.noise_strength,
            morph: out.uniforms.morph,
            expansion: out.uniforms.expansion,
            scale: out.uniforms.scale,
            color: Color::from_srgb(r, g, b, 1.0),
        };

        let renderer = &mut self.renderer;
        let control = ctx.render(self.background, |rctx, target| {
            renderer.render(rctx, target, &cloud, &uniforms);
        });

        self.report(ctx);
        control
    }
}
