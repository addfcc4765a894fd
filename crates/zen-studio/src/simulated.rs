//! Keyboard-driven stand-ins for the hand tracker and the webcam.
//!
//! Both halves share one [`SimHand`] cell: the app writes the pose from held
//! keys, the tracker turns it into landmarks whenever the service polls.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use glam::Vec3;
use zen_flow::gesture::{
    HandLandmarks, HandTracker, VideoSource, FINGER_KNUCKLES, FINGER_TIPS, LANDMARK_COUNT,
};
use zen_flow::{CameraError, InitError};

/// Simulated video runs at roughly 30 fps.
const FRAME_MS: u64 = 33;

/// Pose of the simulated hands.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimHand {
    /// Raised fingers, 0..=4.
    pub fingers: u8,
    pub openness: f32,
    pub separation: f32,
    pub visible: bool,
}

impl Default for SimHand {
    fn default() -> Self {
        Self { fingers: 0, openness: 0.0, separation: 0.5, visible: true }
    }
}

impl SimHand {
    /// Two hands mirrored about the image centre, `separation` apart.
    pub fn landmarks(&self) -> Vec<HandLandmarks> {
        if !self.visible {
            return Vec::new();
        }
        let half = self.separation.clamp(0.0, 1.0) * 0.5;
        vec![self.hand(0.5 - half), self.hand(0.5 + half)]
    }

    fn hand(&self, x: f32) -> HandLandmarks {
        let wrist = Vec3::new(x, 0.8, 0.0);
        // inverse of openness = (reach - 0.1) * 3
        let reach = self.openness.clamp(0.0, 1.0) / 3.0 + 0.1;

        let mut points = [wrist; LANDMARK_COUNT];
        for (n, (&tip, &knuckle)) in FINGER_TIPS.iter().zip(FINGER_KNUCKLES.iter()).enumerate() {
            let tip_y = wrist.y - reach;
            points[tip] = Vec3::new(x, tip_y, 0.0);
            // a raised finger has its tip above (smaller y than) the knuckle
            let dy = if n < self.fingers as usize { 0.03 } else { -0.03 };
            points[knuckle] = Vec3::new(x, tip_y + dy, 0.0);
        }
        HandLandmarks::new(points)
    }
}

pub type SharedHand = Rc<Cell<SimHand>>;

pub struct SimulatedTracker {
    hand: SharedHand,
}

impl SimulatedTracker {
    pub fn new(hand: SharedHand) -> Self {
        Self { hand }
    }
}

impl HandTracker for SimulatedTracker {
    fn initialize(&mut self) -> Result<(), InitError> {
        log::info!("simulated hand tracker ready");
        Ok(())
    }

    fn detect(&mut self, _timestamp_ms: u64) -> Vec<HandLandmarks> {
        self.hand.get().landmarks()
    }
}

/// Wall-clock frame source; frames exist only while open.
#[derive(Default)]
pub struct SimulatedVideo {
    opened_at: Option<Instant>,
}

impl VideoSource for SimulatedVideo {
    fn open(&mut self) -> Result<(), CameraError> {
        self.opened_at = Some(Instant::now());
        Ok(())
    }

    fn close(&mut self) {
        self.opened_at = None;
    }

    fn current_time(&self) -> Option<u64> {
        let ms = self.opened_at?.elapsed().as_millis() as u64;
        Some(ms / FRAME_MS * FRAME_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zen_flow::GestureFrame;

    #[test]
    fn pose_round_trips_through_landmarks() {
        let hand = SimHand { fingers: 3, openness: 0.6, separation: 0.8, visible: true };
        let frame = GestureFrame::from_hands(&hand.landmarks());
        assert!(frame.hands_detected);
        assert_eq!(frame.finger_count, 3);
        assert!((frame.openness - 0.6).abs() < 1e-4, "openness = {}", frame.openness);
        assert!((frame.hand_separation - 0.8).abs() < 1e-4);
    }

    #[test]
    fn every_finger_count_is_reachable() {
        for fingers in 0..=4 {
            let hand = SimHand { fingers, ..SimHand::default() };
            let frame = GestureFrame::from_hands(&hand.landmarks());
            assert_eq!(frame.finger_count, fingers);
        }
    }

    #[test]
    fn hidden_hand_reports_nothing() {
        let hand = SimHand { visible: false, ..SimHand::default() };
        assert!(hand.landmarks().is_empty());
        assert!(!GestureFrame::from_hands(&hand.landmarks()).hands_detected);
    }

    #[test]
    fn closed_video_has_no_frames() {
        let mut video = SimulatedVideo::default();
        assert_eq!(video.current_time(), None);
        video.open().unwrap();
        assert_eq!(video.current_time().map(|t| t % FRAME_MS), Some(0));
        video.close();
        assert_eq!(video.current_time(), None);
    }
}
