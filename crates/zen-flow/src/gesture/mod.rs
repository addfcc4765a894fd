//! Hand-gesture input: metric derivation, debounced classification, and the
//! owned detection service.
//!
//! Continuous metrics (openness, separation) pass straight through every frame.
//! Discrete decisions (shape requests, the bow trigger) only fire once the
//! finger count has been stable for the configured number of frames.

mod landmarks;
mod service;

pub use landmarks::{
    HandLandmarks, FINGER_KNUCKLES, FINGER_TIPS, LANDMARK_COUNT, NEUTRAL_SEPARATION, WRIST,
};
pub use service::{GestureService, HandTracker, VideoSource};

use crate::shape::ShapeId;

/// Per-video-frame hand metrics produced by the detector.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureFrame {
    /// `[0, 1]`, averaged across detected hands.
    pub openness: f32,
    /// `[0, 1]` wrist distance when two hands are visible, else 0.5.
    pub hand_separation: f32,
    /// `0..=4` raised fingers (thumb excluded), max across hands.
    pub finger_count: u8,
    pub hands_detected: bool,
}

impl GestureFrame {
    pub fn no_hands() -> Self {
        Self {
            openness: 0.0,
            hand_separation: NEUTRAL_SEPARATION,
            finger_count: 0,
            hands_detected: false,
        }
    }
}

/// What the classifier decided for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureEvent {
    /// Switch directly to a shape.
    ShapeRequest(ShapeId),
    /// Start the bow → heart → explode sequence.
    BowTrigger,
    /// No discrete transition; forward the continuous metrics.
    Continuous { openness: f32, separation: f32, finger_count: u8 },
}

// ── GestureClassifier ─────────────────────────────────────────────────────

/// Debounces finger counts into discrete [`GestureEvent`]s.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    threshold: u32,
    counter: u32,
    last_count: u8,
    last_timestamp: Option<u64>,
}

impl GestureClassifier {
    /// `threshold`: the count is stable once `counter > threshold`.
    pub fn new(threshold: u32) -> Self {
        Self { threshold, counter: 0, last_count: 0, last_timestamp: None }
    }

    pub fn stability(&self) -> u32 {
        self.counter
    }

    pub fn is_stable(&self) -> bool {
        self.counter > self.threshold
    }

    /// Consumes the frame detected at `timestamp_ms`.
    ///
    /// Returns `None` for a timestamp that was already seen; otherwise exactly
    /// one event describing what to do with this frame.
    pub fn observe(
        &mut self,
        timestamp_ms: u64,
        frame: GestureFrame,
        active: ShapeId,
    ) -> Option<GestureEvent> {
        if self.last_timestamp == Some(timestamp_ms) {
            return None;
        }
        self.last_timestamp = Some(timestamp_ms);

        if frame.finger_count == self.last_count {
            self.counter = self.counter.saturating_add(1);
        } else {
            self.counter = 0;
            self.last_count = frame.finger_count;
        }

        if self.is_stable() && frame.hands_detected {
            match (frame.finger_count, active) {
                (2, s) if s != ShapeId::TextA => return Some(GestureEvent::ShapeRequest(ShapeId::TextA)),
                (4, s) if s != ShapeId::TextB => return Some(GestureEvent::ShapeRequest(ShapeId::TextB)),
                (3, s) if s != ShapeId::Jagannath => {
                    return Some(GestureEvent::ShapeRequest(ShapeId::Jagannath));
                }
                (1, s) if s != ShapeId::Bow && s != ShapeId::Heart => {
                    self.counter = 0;
                    return Some(GestureEvent::BowTrigger);
                }
                _ => {}
            }
        }

        Some(GestureEvent::Continuous {
            openness: frame.openness,
            separation: frame.hand_separation,
            finger_count: frame.finger_count,
        })
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingers(n: u8) -> GestureFrame {
        GestureFrame { openness: 0.4, hand_separation: 0.5, finger_count: n, hands_detected: true }
    }

    /// Feeds `frames` copies of `frame` on fresh timestamps, returning every
    /// discrete event.
    fn feed(
        c: &mut GestureClassifier,
        ts: &mut u64,
        frame: GestureFrame,
        frames: usize,
        active: ShapeId,
    ) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        for _ in 0..frames {
            *ts += 33;
            match c.observe(*ts, frame, active) {
                Some(GestureEvent::Continuous { .. }) | None => {}
                Some(ev) => out.push(ev),
            }
        }
        out
    }

    #[test]
    fn seventeen_frames_trigger_bow_once() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        // the first one-finger frame resets the counter to zero
        let events = feed(&mut c, &mut ts, fingers(1), 16, ShapeId::Sphere);
        assert!(events.is_empty());
        let events = feed(&mut c, &mut ts, fingers(1), 1, ShapeId::Sphere);
        assert_eq!(events, vec![GestureEvent::BowTrigger]);
    }

    #[test]
    fn fifteen_frames_trigger_nothing() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        assert!(feed(&mut c, &mut ts, fingers(1), 15, ShapeId::Sphere).is_empty());
    }

    #[test]
    fn trigger_resets_stability() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        let events = feed(&mut c, &mut ts, fingers(1), 40, ShapeId::Sphere);
        // fires at frame 17, then needs another 16 increments
        assert_eq!(events, vec![GestureEvent::BowTrigger, GestureEvent::BowTrigger]);
        assert_eq!(c.stability(), 40 - 17 - 16);
    }

    #[test]
    fn bow_or_heart_active_blocks_retrigger() {
        for active in [ShapeId::Bow, ShapeId::Heart] {
            let mut c = GestureClassifier::default();
            let mut ts = 0;
            assert!(feed(&mut c, &mut ts, fingers(1), 100, active).is_empty());
        }
    }

    #[test]
    fn stable_counts_request_shapes() {
        for (n, shape) in [(2, ShapeId::TextA), (3, ShapeId::Jagannath), (4, ShapeId::TextB)] {
            let mut c = GestureClassifier::default();
            let mut ts = 0;
            let events = feed(&mut c, &mut ts, fingers(n), 17, ShapeId::Sphere);
            assert_eq!(events, vec![GestureEvent::ShapeRequest(shape)]);
        }
    }

    #[test]
    fn active_shape_is_not_requested_again() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        assert!(feed(&mut c, &mut ts, fingers(2), 30, ShapeId::TextA).is_empty());
    }

    #[test]
    fn shape_requests_repeat_until_applied() {
        // no reset for shape requests: the active shape guard stops them
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        let events = feed(&mut c, &mut ts, fingers(3), 20, ShapeId::Sphere);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn hands_missing_blocks_discrete_events() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        let frame = GestureFrame { hands_detected: false, ..fingers(1) };
        assert!(feed(&mut c, &mut ts, frame, 40, ShapeId::Sphere).is_empty());
    }

    #[test]
    fn duplicate_timestamps_are_ignored() {
        let mut c = GestureClassifier::default();
        assert!(c.observe(100, fingers(1), ShapeId::Sphere).is_some());
        for _ in 0..50 {
            assert!(c.observe(100, fingers(1), ShapeId::Sphere).is_none());
        }
        assert_eq!(c.stability(), 0);
    }

    #[test]
    fn continuous_metrics_pass_through_unstable_frames() {
        let mut c = GestureClassifier::default();
        let frame = GestureFrame { openness: 0.9, hand_separation: 0.2, ..fingers(3) };
        assert_eq!(
            c.observe(1, frame, ShapeId::Sphere),
            Some(GestureEvent::Continuous { openness: 0.9, separation: 0.2, finger_count: 3 })
        );
    }

    #[test]
    fn changing_count_resets_counter() {
        let mut c = GestureClassifier::default();
        let mut ts = 0;
        feed(&mut c, &mut ts, fingers(1), 10, ShapeId::Sphere);
        assert_eq!(c.stability(), 9);
        feed(&mut c, &mut ts, fingers(2), 1, ShapeId::Sphere);
        assert_eq!(c.stability(), 0);
    }
}
