//! Zen flow: the simulation core behind the particle cloud.
//!
//! Everything here is CPU-side and single-threaded. A frame is driven by
//! [`Flow::frame`], which drains gesture results, advances the bow → heart →
//! explode sequence, applies queued state updates in arrival order, advances
//! the morph, and smooths the render parameters handed to the GPU stage.
//!
//! ```rust,ignore
//! use zen_flow::{Flow, FlowConfig, ShapeGenerator, StateUpdate, ShapeId};
//!
//! let mut flow = Flow::new(FlowConfig::default(), ShapeGenerator::new());
//! flow.submit(StateUpdate::shape(ShapeId::Saturn));
//! let frame = flow.frame(16);
//! // upload frame.current / frame.target, draw with frame.uniforms
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod flow;
pub mod gesture;
pub mod morph;
pub mod noise;
pub mod params;
pub mod sequence;
pub mod shape;
pub mod state;

pub use camera::OrbitCamera;
pub use config::FlowConfig;
pub use error::{CameraError, CameraErrorKind, InitError};
pub use flow::{Flow, FrameOutput};
pub use gesture::{GestureClassifier, GestureEvent, GestureFrame, GestureService};
pub use morph::MorphEngine;
pub use params::{RenderParams, Uniforms};
pub use sequence::{SequenceController, SequenceState};
pub use shape::{PositionBuffer, ShapeGenerator, ShapeId};
pub use state::{AppState, Rgb, StateStore, StateUpdate};
