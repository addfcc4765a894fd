//! Zen engine crate.
//!
//! Platform and GPU runtime for the particle cloud: winit event loop, wgpu
//! device/surface, frame timing, input state, logging, and the point-cloud
//! renderer. Knows nothing about shapes or gestures.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
pub mod render;
