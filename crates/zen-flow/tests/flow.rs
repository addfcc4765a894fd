//! Whole-pipeline checks: scripted hands on a virtual clock driving
//! `Flow::frame` exactly like the render loop does.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;
use zen_flow::gesture::{
    HandLandmarks, HandTracker, VideoSource, FINGER_KNUCKLES, FINGER_TIPS, LANDMARK_COUNT,
};
use zen_flow::{
    CameraError, Flow, FlowConfig, GestureService, InitError, SequenceState, ShapeGenerator,
    ShapeId, StateUpdate,
};

const RENDER_STEP_MS: u64 = 16;
const VIDEO_STEP_MS: u64 = 33;

#[derive(Clone, Copy)]
struct Pose {
    fingers: usize,
    reach: f32,
    visible: bool,
}

fn hand(pose: Pose) -> HandLandmarks {
    let wrist = Vec3::new(0.5, 0.8, 0.0);
    let mut points = [wrist; LANDMARK_COUNT];
    for (n, (&tip, &knuckle)) in FINGER_TIPS.iter().zip(FINGER_KNUCKLES.iter()).enumerate() {
        points[tip] = Vec3::new(0.5, wrist.y - pose.reach, 0.0);
        let dy = if n < pose.fingers { 0.05 } else { -0.05 };
        points[knuckle] = Vec3::new(0.5, wrist.y - pose.reach + dy, 0.0);
    }
    HandLandmarks::new(points)
}

struct ScriptedTracker {
    pose: Rc<Cell<Pose>>,
    fail: bool,
}

impl HandTracker for ScriptedTracker {
    fn initialize(&mut self) -> Result<(), InitError> {
        if self.fail { Err(InitError("model unavailable".into())) } else { Ok(()) }
    }

    fn detect(&mut self, _timestamp_ms: u64) -> Vec<HandLandmarks> {
        let pose = self.pose.get();
        if pose.visible { vec![hand(pose)] } else { Vec::new() }
    }
}

struct ClockVideo {
    now: Rc<Cell<u64>>,
    open: Rc<Cell<bool>>,
    deny: bool,
}

impl VideoSource for ClockVideo {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.deny {
            return Err(CameraError::permission_denied("blocked by test"));
        }
        self.open.set(true);
        Ok(())
    }

    fn close(&mut self) {
        self.open.set(false);
    }

    fn current_time(&self) -> Option<u64> {
        self.open.get().then(|| self.now.get() / VIDEO_STEP_MS * VIDEO_STEP_MS)
    }
}

struct Harness {
    flow: Flow,
    now: Rc<Cell<u64>>,
    pose: Rc<Cell<Pose>>,
    video_open: Rc<Cell<bool>>,
    log: RefCell<Vec<(ShapeId, bool, SequenceState)>>,
}

impl Harness {
    fn new(fail_init: bool, deny: bool) -> Self {
        let now = Rc::new(Cell::new(0));
        let pose = Rc::new(Cell::new(Pose { fingers: 0, reach: 0.3, visible: false }));
        let video_open = Rc::new(Cell::new(false));

        let config = FlowConfig { particle_count: 1_000, ..FlowConfig::default() };
        let mut flow = Flow::new(config, ShapeGenerator::new());
        flow.attach_gestures(GestureService::new(
            Box::new(ScriptedTracker { pose: pose.clone(), fail: fail_init }),
            Box::new(ClockVideo { now: now.clone(), open: video_open.clone(), deny }),
        ));

        Self { flow, now, pose, video_open, log: RefCell::new(Vec::new()) }
    }

    /// Enabling takes two frames: one to apply the toggle, one to open the camera.
    fn camera_on(&mut self) {
        self.flow.submit(StateUpdate::camera(true));
        self.run_ms(2 * RENDER_STEP_MS);
        assert!(self.flow.camera_active());
    }

    fn show(&self, fingers: usize) {
        self.pose.set(Pose { fingers, reach: 0.3, visible: true });
    }

    fn run_ms(&mut self, ms: u64) {
        let end = self.now.get() + ms;
        while self.now.get() < end {
            let t = self.now.get() + RENDER_STEP_MS;
            self.now.set(t);
            let out = self.flow.frame(t);
            self.log.borrow_mut().push((out.state.shape, out.state.exploding, out.sequence));
        }
    }

    fn bow_starts(&self) -> usize {
        self.log
            .borrow()
            .windows(2)
            .filter(|w| w[0].2 != SequenceState::ShowingBow && w[1].2 == SequenceState::ShowingBow)
            .count()
    }
}

#[test]
fn one_finger_plays_the_whole_arc_once() {
    let mut h = Harness::new(false, false);
    h.camera_on();

    h.show(1);
    h.run_ms(6_000);

    assert_eq!(h.bow_starts(), 1);
    let log = h.log.borrow();
    assert!(log.iter().any(|e| e.0 == ShapeId::Bow));
    assert!(log.iter().any(|e| e.0 == ShapeId::Heart && e.1));
    let last = log.last().copied().unwrap();
    assert_eq!(last, (ShapeId::Heart, false, SequenceState::Idle));
}

#[test]
fn short_pose_does_not_trigger() {
    let mut h = Harness::new(false, false);
    h.camera_on();

    // about ten video frames
    h.show(1);
    h.run_ms(330);
    h.show(0);
    h.run_ms(2_000);
    assert_eq!(h.bow_starts(), 0);
    assert_eq!(h.flow.state().shape, ShapeId::Sphere);
}

#[test]
fn stopping_the_camera_keeps_the_sequence_running() {
    let mut h = Harness::new(false, false);
    h.camera_on();
    h.show(1);
    while h.flow.sequence_state() == SequenceState::Idle {
        h.run_ms(RENDER_STEP_MS);
        assert!(h.now.get() < 5_000, "bow never triggered");
    }

    h.flow.submit(StateUpdate::camera(false));
    h.run_ms(2 * RENDER_STEP_MS);
    assert!(!h.flow.camera_active());
    assert!(!h.video_open.get());

    h.run_ms(4_000);
    let log = h.log.borrow();
    assert!(log.iter().any(|e| e.1), "explosion still happened");
    assert_eq!(log.last().map(|e| e.2), Some(SequenceState::Idle));
}

#[test]
fn shape_gesture_preempts_running_sequence() {
    let mut h = Harness::new(false, false);
    h.camera_on();
    h.flow.trigger_bow(h.now.get());
    h.show(3);
    h.run_ms(1_000);

    assert_eq!(h.flow.state().shape, ShapeId::Jagannath);
    assert_eq!(h.flow.sequence_state(), SequenceState::Idle);
    assert!(!h.flow.state().exploding);

    h.run_ms(4_000);
    assert_eq!(h.flow.state().shape, ShapeId::Jagannath, "no stale heart timer");
}

#[test]
fn continuous_metrics_flow_every_frame() {
    let mut h = Harness::new(false, false);
    h.camera_on();
    h.pose.set(Pose { fingers: 0, reach: 0.4, visible: true });
    h.run_ms(100);

    let state = h.flow.state();
    assert!((state.gesture_open - 0.9).abs() < 1e-3, "open = {}", state.gesture_open);
    assert_eq!(state.gesture_distance, 0.5);
    assert!(!h.flow.wants_auto_rotate());
}

#[test]
fn denied_camera_turns_itself_off() {
    let mut h = Harness::new(false, true);
    h.flow.submit(StateUpdate::camera(true));
    h.run_ms(3 * RENDER_STEP_MS);
    assert!(!h.flow.state().camera_enabled);
    assert!(!h.flow.camera_active());
    assert!(h.flow.take_camera_error().is_some());
    assert_eq!(h.flow.state().gesture_open, 0.0);
}

#[test]
fn tracker_failure_leaves_shapes_working() {
    let mut h = Harness::new(true, false);
    h.flow.submit(StateUpdate::camera(true));
    h.show(2);
    h.run_ms(2_000);
    assert!(h.flow.camera_active());
    assert_eq!(h.flow.state().shape, ShapeId::Sphere);

    h.flow.submit(StateUpdate::shape(ShapeId::Saturn));
    h.run_ms(RENDER_STEP_MS * 60);
    assert_eq!(h.flow.state().shape, ShapeId::Saturn);
    assert_eq!(h.flow.morph().progress(), 1.0);
}
