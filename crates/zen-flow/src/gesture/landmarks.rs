use glam::Vec3;

use super::GestureFrame;

/// Landmarks per tracked hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
/// Index, middle, ring, pinky fingertips.
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];
/// Middle knuckles matching [`FINGER_TIPS`] pairwise.
pub const FINGER_KNUCKLES: [usize; 4] = [6, 10, 14, 18];

const INDEX_TIP: usize = 8;
const MIDDLE_TIP: usize = 12;

/// Separation reported unless exactly two hands are visible.
pub const NEUTRAL_SEPARATION: f32 = 0.5;

/// One hand's landmarks in normalized image coordinates (Y grows downward).
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn wrist(&self) -> Vec3 {
        self.points[WRIST]
    }

    /// Raised fingers, thumb excluded. A finger is up when its tip sits
    /// above its knuckle on screen.
    pub fn finger_count(&self) -> u8 {
        FINGER_TIPS
            .iter()
            .zip(FINGER_KNUCKLES.iter())
            .filter(|&(&tip, &knuckle)| self.points[tip].y < self.points[knuckle].y)
            .count() as u8
    }

    /// `[0, 1]` spread of the hand from the longest index/middle reach.
    pub fn openness(&self) -> f32 {
        let wrist = self.wrist().truncate();
        let d1 = (self.points[INDEX_TIP].truncate() - wrist).length();
        let d2 = (self.points[MIDDLE_TIP].truncate() - wrist).length();
        ((d1.max(d2) - 0.1) * 3.0).clamp(0.0, 1.0)
    }
}

impl GestureFrame {
    /// Derives the per-frame metrics from every hand visible in one video frame.
    pub fn from_hands(hands: &[HandLandmarks]) -> Self {
        if hands.is_empty() {
            return GestureFrame::no_hands();
        }

        let openness = hands.iter().map(HandLandmarks::openness).sum::<f32>() / hands.len() as f32;
        let finger_count = hands.iter().map(HandLandmarks::finger_count).max().unwrap_or(0);
        let hand_separation = match hands {
            [a, b] => (a.wrist().truncate() - b.wrist().truncate()).length().clamp(0.0, 1.0),
            _ => NEUTRAL_SEPARATION,
        };

        GestureFrame { openness, hand_separation, finger_count, hands_detected: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand with its wrist at `(0.5, 0.8)` and the first `up` fingers raised.
    fn hand(up: usize, reach: f32) -> HandLandmarks {
        let wrist = Vec3::new(0.5, 0.8, 0.0);
        let mut points = [wrist; LANDMARK_COUNT];
        for (n, (&tip, &knuckle)) in FINGER_TIPS.iter().zip(FINGER_KNUCKLES.iter()).enumerate() {
            let x = 0.45 + n as f32 * 0.03;
            points[tip] = Vec3::new(x, wrist.y - reach, 0.0);
            let dy = if n < up { 0.05 } else { -0.05 };
            points[knuckle] = Vec3::new(x, wrist.y - reach + dy, 0.0);
        }
        HandLandmarks::new(points)
    }

    #[test]
    fn counts_raised_fingers() {
        for up in 0..=4 {
            assert_eq!(hand(up, 0.3).finger_count(), up as u8);
        }
    }

    #[test]
    fn openness_is_clamped_reach() {
        assert_eq!(hand(4, 0.05).openness(), 0.0);
        assert_eq!(hand(4, 0.9).openness(), 1.0);
        let mid = hand(4, 0.3).openness();
        assert!(mid > 0.0 && mid < 1.0, "openness = {mid}");
    }

    #[test]
    fn single_hand_reports_neutral_separation() {
        let frame = GestureFrame::from_hands(&[hand(2, 0.3)]);
        assert!(frame.hands_detected);
        assert_eq!(frame.finger_count, 2);
        assert_eq!(frame.hand_separation, NEUTRAL_SEPARATION);
    }

    #[test]
    fn two_hands_report_wrist_distance_and_max_fingers() {
        let left = hand(1, 0.2);
        let mut right = hand(3, 0.4);
        for p in right.points.iter_mut() {
            p.x += 0.3;
        }
        let frame = GestureFrame::from_hands(&[left.clone(), right.clone()]);
        assert_eq!(frame.finger_count, 3);
        assert!((frame.hand_separation - 0.3).abs() < 1e-5);
        let avg = (left.openness() + right.openness()) / 2.0;
        assert!((frame.openness - avg).abs() < 1e-6);
    }

    #[test]
    fn no_hands_is_neutral() {
        let frame = GestureFrame::from_hands(&[]);
        assert_eq!(frame, GestureFrame::no_hands());
    }
}
