//! Color primitives shared by the renderers.

mod color;

pub use color::Color;
