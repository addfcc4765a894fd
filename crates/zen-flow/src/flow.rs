use log::{debug, error, info};

use crate::config::FlowConfig;
use crate::error::CameraError;
use crate::gesture::{GestureClassifier, GestureEvent, GestureService, NEUTRAL_SEPARATION};
use crate::morph::MorphEngine;
use crate::params::{RenderParams, Uniforms};
use crate::sequence::{SequenceController, SequenceState};
use crate::shape::{PositionBuffer, ShapeGenerator};
use crate::state::{AppState, StateStore, StateUpdate};

/// What the GPU stage draws for one frame.
#[derive(Debug)]
pub struct FrameOutput<'a> {
    pub state: &'a AppState,
    pub current: &'a PositionBuffer,
    pub target: &'a PositionBuffer,
    /// Changes whenever `current` or `target` was replaced.
    pub buffers_version: u64,
    pub uniforms: Uniforms,
    pub sequence: SequenceState,
}

/// Per-frame orchestrator owning every piece of the core.
///
/// All mutation goes through [`Flow::submit`] or the gesture service and is
/// applied inside [`Flow::frame`], so one call sees a consistent state.
pub struct Flow {
    generator: ShapeGenerator,
    store: StateStore,
    classifier: GestureClassifier,
    stability_frames: u32,
    sequence: SequenceController,
    morph: MorphEngine,
    params: RenderParams,
    gestures: Option<GestureService>,
    camera_active: bool,
    camera_error: Option<CameraError>,
}

impl Flow {
    pub fn new(config: FlowConfig, generator: ShapeGenerator) -> Self {
        let generator = generator.with_texts(config.text_a.clone(), config.text_b.clone());
        let state = AppState::from_config(&config);
        let morph = MorphEngine::new(&generator, state.shape, state.particle_count, config.morph_step);
        Self {
            generator,
            store: StateStore::new(state),
            classifier: GestureClassifier::new(config.stability_frames),
            stability_frames: config.stability_frames,
            sequence: SequenceController::new(),
            morph,
            params: RenderParams::new(config.smoothing),
            gestures: None,
            camera_active: false,
            camera_error: None,
        }
    }

    /// Installs the detection service used while the camera is enabled.
    pub fn attach_gestures(&mut self, service: GestureService) {
        if let Some(mut old) = self.gestures.replace(service) {
            old.stop();
        }
        self.camera_active = false;
    }

    pub fn gestures(&self) -> Option<&GestureService> {
        self.gestures.as_ref()
    }

    /// Queues a partial update; it lands at the next [`frame`](Self::frame).
    pub fn submit(&mut self, update: StateUpdate) {
        self.store.submit(update);
    }

    /// Starts the bow sequence directly, as if a one-finger gesture fired.
    pub fn trigger_bow(&mut self, now_ms: u64) {
        let update = self.sequence.trigger(now_ms);
        self.store.submit(update);
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.sequence.state()
    }

    pub fn morph(&self) -> &MorphEngine {
        &self.morph
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn camera_active(&self) -> bool {
        self.camera_active
    }

    /// Last camera failure, cleared by reading it.
    pub fn take_camera_error(&mut self) -> Option<CameraError> {
        self.camera_error.take()
    }

    /// The view should spin on its own only when nobody is steering it.
    pub fn wants_auto_rotate(&self) -> bool {
        let s = self.store.state();
        !s.camera_enabled && s.gesture_open == 0.0
    }

    /// Runs one frame at virtual time `now_ms` (milliseconds since start).
    pub fn frame(&mut self, now_ms: u64) -> FrameOutput<'_> {
        self.sync_camera();
        self.poll_gestures(now_ms);

        for update in self.sequence.poll(now_ms) {
            self.store.submit(update);
        }
        self.store.apply_pending();

        let state = self.store.state();
        self.morph.sync(&self.generator, state.shape, state.particle_count);
        self.morph.advance();

        let t = now_ms as f32 / 1_000.0;
        self.params.update(state, t);

        FrameOutput {
            state,
            current: self.morph.current(),
            target: self.morph.target(),
            buffers_version: self.morph.version(),
            uniforms: Uniforms {
                time: t,
                size: state.particle_size,
                noise_strength: state.noise_strength,
                morph: self.morph.progress(),
                expansion: self.params.expansion,
                scale: self.params.scale,
                color: state.color.to_f32(),
            },
            sequence: self.sequence.state(),
        }
    }

    // ── camera lifecycle ──────────────────────────────────────────────────

    fn sync_camera(&mut self) {
        let wanted = self.store.state().camera_enabled;

        if wanted && !self.camera_active {
            let started = match self.gestures.as_mut() {
                Some(service) => service.start(),
                None => Err(CameraError::device("no video source attached")),
            };
            match started {
                Ok(()) => {
                    info!("camera started");
                    self.classifier = GestureClassifier::new(self.stability_frames);
                    self.camera_active = true;
                }
                Err(e) => {
                    error!("camera access failed: {e}");
                    self.camera_error = Some(e);
                    self.store.submit(StateUpdate {
                        camera_enabled: Some(false),
                        ..Self::neutral_gesture()
                    });
                }
            }
        } else if !wanted && self.camera_active {
            // the bow sequence keeps running on its own timers
            if let Some(service) = self.gestures.as_mut() {
                service.stop();
            }
            self.camera_active = false;
            self.store.submit(Self::neutral_gesture());
        }
    }

    fn neutral_gesture() -> StateUpdate {
        StateUpdate::gesture(0.0, NEUTRAL_SEPARATION, 0)
    }

    fn poll_gestures(&mut self, now_ms: u64) {
        if !self.camera_active {
            return;
        }
        let Some((ts, frame)) = self.gestures.as_mut().and_then(GestureService::poll) else {
            return;
        };
        let active = self.store.state().shape;
        if let Some(event) = self.classifier.observe(ts, frame, active) {
            self.handle_gesture(event, now_ms);
        }
    }

    fn handle_gesture(&mut self, event: GestureEvent, now_ms: u64) {
        match event {
            GestureEvent::BowTrigger => self.trigger_bow(now_ms),
            GestureEvent::ShapeRequest(shape) => {
                if self.sequence.cancel() {
                    debug!("bow sequence preempted by {shape}");
                }
                info!("gesture selected {shape}");
                self.store.submit(StateUpdate::shape(shape).with_exploding(false));
            }
            GestureEvent::Continuous { openness, separation, finger_count } => {
                self.store.submit(StateUpdate::gesture(openness, separation, finger_count));
            }
        }
    }
}
