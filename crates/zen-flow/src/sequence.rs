//! The bow → heart → explode arc as an explicit timed state machine.
//!
//! Time is injected: callers pass the current virtual time in milliseconds to
//! [`SequenceController::trigger`] and [`SequenceController::poll`], so tests
//! step the clock instead of sleeping.

use log::{debug, info};

use crate::shape::ShapeId;
use crate::state::StateUpdate;

/// How long the bow is shown before the arrow "hits".
pub const BOW_MS: u64 = 1_500;
/// How long the heart holds before exploding.
pub const HEART_MS: u64 = 800;
/// Length of the explosion.
pub const EXPLODE_MS: u64 = 1_500;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SequenceState {
    Idle,
    ShowingBow,
    ShowingHeart,
    Exploding,
}

/// At most one timer is pending at any time; a new trigger or a cancel
/// replaces it.
#[derive(Debug, Clone)]
pub struct SequenceController {
    state: SequenceState,
    due_ms: Option<u64>,
}

impl SequenceController {
    pub fn new() -> Self {
        Self { state: SequenceState::Idle, due_ms: None }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Time the pending transition fires, if any.
    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    pub fn is_running(&self) -> bool {
        self.state != SequenceState::Idle
    }

    /// Starts (or restarts) the sequence at `now_ms`.
    ///
    /// Any pending timer from a previous run is dropped first.
    pub fn trigger(&mut self, now_ms: u64) -> StateUpdate {
        if self.due_ms.take().is_some() {
            debug!("sequence restarted from {:?}", self.state);
        }
        info!("bow sequence triggered");
        self.state = SequenceState::ShowingBow;
        self.due_ms = Some(now_ms + BOW_MS);
        StateUpdate::shape(ShapeId::Bow).with_exploding(false)
    }

    /// Drops the pending timer and returns to idle. Returns whether a run was
    /// in progress.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        if was_running {
            debug!("sequence cancelled in {:?}", self.state);
        }
        self.state = SequenceState::Idle;
        self.due_ms = None;
        was_running
    }

    /// Fires every transition due at or before `now_ms`, in order.
    ///
    /// Each next timer is scheduled from the previous one's due time, so a
    /// late poll catches up without stretching the sequence.
    pub fn poll(&mut self, now_ms: u64) -> Vec<StateUpdate> {
        let mut updates = Vec::new();
        while let Some(due) = self.due_ms {
            if due > now_ms {
                break;
            }
            let (next, update, delay) = match self.state {
                SequenceState::ShowingBow => (
                    SequenceState::ShowingHeart,
                    StateUpdate::shape(ShapeId::Heart),
                    Some(HEART_MS),
                ),
                SequenceState::ShowingHeart => {
                    (SequenceState::Exploding, StateUpdate::exploding(true), Some(EXPLODE_MS))
                }
                SequenceState::Exploding => (SequenceState::Idle, StateUpdate::exploding(false), None),
                SequenceState::Idle => {
                    self.due_ms = None;
                    break;
                }
            };
            debug!("sequence {:?} -> {:?} at {due} ms", self.state, next);
            self.state = next;
            self.due_ms = delay.map(|d| due + d);
            updates.push(update);
        }
        updates
    }
}

impl Default for SequenceController {
    fn default() -> Self {
        Self::new()
    }
}
