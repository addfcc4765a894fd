//! Procedural point-cloud shapes.
//!
//! Every shape is a stochastic sampler: each call to [`ShapeGenerator::generate`]
//! redraws its samples, so two buffers for the same shape differ point by point
//! while describing the same silhouette.
//!
//! Invariant: a generated buffer always holds exactly the requested number of
//! points. Shapes that can fail to produce geometry (text without a usable font
//! or with empty glyph coverage) fall back to a solid sphere of radius
//! [`FALLBACK_RADIUS`].

mod sampling;
mod text;

use std::fmt;

use rand::Rng;

use crate::state::Rgb;

pub use sampling::{random_in_sphere, tilt_x, FALLBACK_RADIUS};
pub use text::{TextBitmap, TextRaster, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Full depth of the slab text particles are spread through.
const TEXT_DEPTH: f32 = 0.5;

// ── ShapeId ───────────────────────────────────────────────────────────────

/// Closed set of shapes the cloud can morph between.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShapeId {
    Sphere,
    Heart,
    Flower,
    Saturn,
    Buddha,
    Fireworks,
    Jagannath,
    Bow,
    TextA,
    TextB,
}

impl ShapeId {
    pub const ALL: [ShapeId; 10] = [
        ShapeId::Sphere,
        ShapeId::Heart,
        ShapeId::Flower,
        ShapeId::Saturn,
        ShapeId::Buddha,
        ShapeId::Fireworks,
        ShapeId::Jagannath,
        ShapeId::Bow,
        ShapeId::TextA,
        ShapeId::TextB,
    ];

    /// Display name; also accepted by [`ShapeId::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            ShapeId::Sphere => "sphere",
            ShapeId::Heart => "heart",
            ShapeId::Flower => "flower",
            ShapeId::Saturn => "saturn",
            ShapeId::Buddha => "buddha",
            ShapeId::Fireworks => "fireworks",
            ShapeId::Jagannath => "jagannath",
            ShapeId::Bow => "bow",
            ShapeId::TextA => "text-a",
            ShapeId::TextB => "text-b",
        }
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<ShapeId> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Default display color applied when the shape is selected without an
    /// explicit color.
    pub fn theme(self) -> Rgb {
        let hex = match self {
            ShapeId::Sphere => 0x3b82f6,
            ShapeId::Heart => 0xef4444,
            ShapeId::Flower => 0xd946ef,
            ShapeId::Saturn => 0xf59e0b,
            ShapeId::Buddha => 0x10b981,
            ShapeId::Fireworks => 0xffffff,
            ShapeId::Jagannath => 0x000000,
            ShapeId::Bow => 0x8b5cf6,
            ShapeId::TextA => 0x0ea5e9,
            ShapeId::TextB => 0xf43f5e,
        };
        Rgb::from_u32(hex)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── PositionBuffer ────────────────────────────────────────────────────────

/// `N` points stored row-major as `[x0, y0, z0, x1, y1, z1, ...]`.
///
/// Buffers used for a morph are index-aligned: point `i` of the start buffer
/// travels to point `i` of the target buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionBuffer {
    data: Vec<f32>,
}

impl PositionBuffer {
    pub fn with_capacity(points: usize) -> Self {
        Self { data: Vec::with_capacity(points * 3) }
    }

    pub fn push(&mut self, p: [f32; 3]) {
        self.data.extend_from_slice(&p);
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        let j = i * 3;
        [self.data[j], self.data[j + 1], self.data[j + 2]]
    }

    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.data.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Flat view suitable for a vertex-buffer upload.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl FromIterator<[f32; 3]> for PositionBuffer {
    fn from_iter<I: IntoIterator<Item = [f32; 3]>>(iter: I) -> Self {
        let mut buf = PositionBuffer::default();
        for p in iter {
            buf.push(p);
        }
        buf
    }
}

// ── ShapeGenerator ────────────────────────────────────────────────────────

/// Turns `(shape, count)` into a freshly sampled [`PositionBuffer`].
pub struct ShapeGenerator {
    raster: TextRaster,
    text_a: String,
    text_b: String,
}

impl ShapeGenerator {
    /// Generator without a font: both text shapes fall back to the sphere.
    pub fn new() -> Self {
        Self::with_raster(TextRaster::default())
    }

    pub fn with_raster(raster: TextRaster) -> Self {
        Self {
            raster,
            text_a: "Abinash Sharma".to_string(),
            text_b: "A & S".to_string(),
        }
    }

    /// Overrides the strings rendered for the two text shapes.
    pub fn with_texts(mut self, text_a: impl Into<String>, text_b: impl Into<String>) -> Self {
        self.text_a = text_a.into();
        self.text_b = text_b.into();
        self
    }

    pub fn has_font(&self) -> bool {
        self.raster.has_font()
    }

    pub fn generate(&self, shape: ShapeId, count: usize) -> PositionBuffer {
        self.generate_with(shape, count, &mut rand::rng())
    }

    pub fn generate_with<R: Rng>(
        &self,
        shape: ShapeId,
        count: usize,
        rng: &mut R,
    ) -> PositionBuffer {
        let buf = match shape {
            ShapeId::TextA => self.text_points(&self.text_a, count, rng),
            ShapeId::TextB => self.text_points(&self.text_b, count, rng),
            _ => (0..count).map(|_| sampling::sample(shape, rng)).collect(),
        };
        debug_assert_eq!(buf.len(), count);
        buf
    }

    fn text_points<R: Rng>(&self, text: &str, count: usize, rng: &mut R) -> PositionBuffer {
        let pixels = self
            .raster
            .rasterize(text)
            .map(|bitmap| bitmap.bright_points())
            .unwrap_or_default();

        if pixels.is_empty() {
            log::debug!("no glyph coverage for {text:?}; using sphere fallback");
            return (0..count)
                .map(|_| random_in_sphere(rng, FALLBACK_RADIUS))
                .collect();
        }

        sample_pixels(&pixels, count, rng)
    }
}

/// Draws `count` points from the lit pixels, with replacement, giving each
/// a depth in `[-0.25, 0.25]`. `pixels` must not be empty.
fn sample_pixels<R: Rng>(pixels: &[[f32; 2]], count: usize, rng: &mut R) -> PositionBuffer {
    (0..count)
        .map(|_| {
            let [x, y] = pixels[rng.random_range(0..pixels.len())];
            [x, y, (rng.random::<f32>() - 0.5) * TEXT_DEPTH]
        })
        .collect()
}

impl Default for ShapeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
