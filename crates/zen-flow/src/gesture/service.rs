use log::{error, info};

use super::{GestureFrame, HandLandmarks};
use crate::error::{CameraError, InitError};

/// Landmark model behind the gesture features.
pub trait HandTracker {
    /// Loads the model. Called on each start until it succeeds.
    fn initialize(&mut self) -> Result<(), InitError>;

    /// Hands visible in the video frame at `timestamp_ms`.
    fn detect(&mut self, timestamp_ms: u64) -> Vec<HandLandmarks>;
}

/// Camera feed the tracker reads from.
pub trait VideoSource {
    fn open(&mut self) -> Result<(), CameraError>;

    /// Releases the device. Must tolerate being called when already closed.
    fn close(&mut self);

    /// Presentation time of the newest frame, or `None` until one is ready.
    fn current_time(&self) -> Option<u64>;
}

/// Owns a tracker and a video source and yields one [`GestureFrame`] per new
/// video timestamp.
///
/// Not a global: each owner (the flow, a test) holds its own instance.
pub struct GestureService {
    tracker: Box<dyn HandTracker>,
    video: Box<dyn VideoSource>,
    tracker_ready: bool,
    running: bool,
    last_video_time: Option<u64>,
}

impl GestureService {
    pub fn new(tracker: Box<dyn HandTracker>, video: Box<dyn VideoSource>) -> Self {
        Self {
            tracker,
            video,
            tracker_ready: false,
            running: false,
            last_video_time: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the landmark model loaded. When false the service still runs
    /// but never yields frames.
    pub fn tracker_ready(&self) -> bool {
        self.tracker_ready
    }

    /// Opens the camera and loads the tracker.
    ///
    /// A camera failure is returned and leaves the service stopped. A tracker
    /// failure is only logged.
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.running {
            return Ok(());
        }
        self.video.open()?;

        if !self.tracker_ready {
            match self.tracker.initialize() {
                Ok(()) => {
                    info!("hand tracker initialized");
                    self.tracker_ready = true;
                }
                Err(e) => error!("{e}; gesture input unavailable"),
            }
        }

        self.last_video_time = None;
        self.running = true;
        Ok(())
    }

    /// Stops polling and releases the camera. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.video.close();
        info!("gesture detection stopped");
    }

    /// Runs detection if the video has advanced since the last call.
    pub fn poll(&mut self) -> Option<(u64, GestureFrame)> {
        if !self.running || !self.tracker_ready {
            return None;
        }
        let ts = self.video.current_time()?;
        if self.last_video_time == Some(ts) {
            return None;
        }
        self.last_video_time = Some(ts);

        let hands = self.tracker.detect(ts);
        Some((ts, GestureFrame::from_hands(&hands)))
    }
}

impl Drop for GestureService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Counters {
        opens: Cell<u32>,
        closes: Cell<u32>,
        inits: Cell<u32>,
        detects: Cell<u32>,
    }

    struct FakeTracker {
        counters: Rc<Counters>,
        fail: bool,
    }

    impl HandTracker for FakeTracker {
        fn initialize(&mut self) -> Result<(), InitError> {
            self.counters.inits.set(self.counters.inits.get() + 1);
            if self.fail { Err(InitError("model missing".into())) } else { Ok(()) }
        }

        fn detect(&mut self, _timestamp_ms: u64) -> Vec<HandLandmarks> {
            self.counters.detects.set(self.counters.detects.get() + 1);
            Vec::new()
        }
    }

    struct FakeVideo {
        counters: Rc<Counters>,
        time: Rc<RefCell<Option<u64>>>,
        deny: bool,
    }

    impl VideoSource for FakeVideo {
        fn open(&mut self) -> Result<(), CameraError> {
            if self.deny {
                return Err(CameraError::permission_denied("user refused"));
            }
            self.counters.opens.set(self.counters.opens.get() + 1);
            Ok(())
        }

        fn close(&mut self) {
            self.counters.closes.set(self.counters.closes.get() + 1);
        }

        fn current_time(&self) -> Option<u64> {
            *self.time.borrow()
        }
    }

    fn service(
        fail_init: bool,
        deny: bool,
    ) -> (GestureService, Rc<Counters>, Rc<RefCell<Option<u64>>>) {
        let counters = Rc::new(Counters::default());
        let time = Rc::new(RefCell::new(None));
        let svc = GestureService::new(
            Box::new(FakeTracker { counters: counters.clone(), fail: fail_init }),
            Box::new(FakeVideo { counters: counters.clone(), time: time.clone(), deny }),
        );
        (svc, counters, time)
    }

    #[test]
    fn polls_once_per_video_timestamp() {
        let (mut svc, counters, time) = service(false, false);
        svc.start().unwrap();
        assert!(svc.poll().is_none(), "no frame ready yet");

        *time.borrow_mut() = Some(33);
        let (ts, frame) = svc.poll().unwrap();
        assert_eq!(ts, 33);
        assert!(!frame.hands_detected);
        assert!(svc.poll().is_none());
        assert!(svc.poll().is_none());

        *time.borrow_mut() = Some(66);
        assert!(svc.poll().is_some());
        assert_eq!(counters.detects.get(), 2);
    }

    #[test]
    fn double_stop_is_harmless() {
        let (mut svc, counters, time) = service(false, false);
        svc.start().unwrap();
        svc.stop();
        svc.stop();
        assert_eq!(counters.closes.get(), 1);
        assert!(!svc.is_running());

        *time.borrow_mut() = Some(10);
        assert!(svc.poll().is_none());
    }

    #[test]
    fn camera_denial_leaves_service_stopped() {
        let (mut svc, counters, _) = service(false, true);
        let err = svc.start().unwrap_err();
        assert_eq!(err.kind, crate::error::CameraErrorKind::PermissionDenied);
        assert!(!svc.is_running());
        assert_eq!(counters.inits.get(), 0);
    }

    #[test]
    fn tracker_failure_keeps_camera_running_without_frames() {
        let (mut svc, counters, time) = service(true, false);
        svc.start().unwrap();
        assert!(svc.is_running());
        assert!(!svc.tracker_ready());

        *time.borrow_mut() = Some(33);
        assert!(svc.poll().is_none());
        assert_eq!(counters.detects.get(), 0);
    }

    #[test]
    fn tracker_loads_once_across_restarts() {
        let (mut svc, counters, _) = service(false, false);
        svc.start().unwrap();
        svc.stop();
        svc.start().unwrap();
        assert_eq!(counters.inits.get(), 1);
        assert_eq!(counters.opens.get(), 2);
    }

    #[test]
    fn drop_releases_camera() {
        let (mut svc, counters, _) = service(false, false);
        svc.start().unwrap();
        drop(svc);
        assert_eq!(counters.closes.get(), 1);
    }
}
