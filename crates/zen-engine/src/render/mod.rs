//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and creates them
//! lazily on first use or when the surface format changes.

mod common;
mod ctx;
mod points;

pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use points::{PointCloud, PointRenderer, PointUniforms};
