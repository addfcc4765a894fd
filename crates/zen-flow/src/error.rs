use std::fmt;

/// Returned by [`HandTracker::initialize`](crate::gesture::HandTracker::initialize)
/// when the landmark model cannot be loaded.
#[derive(Debug, Clone)]
pub struct InitError(pub String);

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hand tracker init error: {}", self.0)
    }
}

impl std::error::Error for InitError {}

/// Why video acquisition failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraErrorKind {
    /// The user (or platform policy) refused camera access.
    PermissionDenied,
    /// The device is missing, busy, or failed mid-stream.
    Device,
}

/// Returned by [`VideoSource::open`](crate::gesture::VideoSource::open).
#[derive(Debug, Clone)]
pub struct CameraError {
    pub kind: CameraErrorKind,
    pub message: String,
}

impl CameraError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self { kind: CameraErrorKind::PermissionDenied, message: msg.into() }
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self { kind: CameraErrorKind::Device, message: msg.into() }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CameraErrorKind::PermissionDenied => {
                write!(f, "camera permission denied: {}", self.message)
            }
            CameraErrorKind::Device => write!(f, "camera device error: {}", self.message),
        }
    }
}

impl std::error::Error for CameraError {}
