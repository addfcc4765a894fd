use std::fmt;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

/// Offscreen canvas width in pixels.
pub const CANVAS_WIDTH: usize = 1024;
/// Offscreen canvas height in pixels.
pub const CANVAS_HEIGHT: usize = 512;

/// World units per canvas pixel.
const PIXEL_SCALE: f32 = 0.015;
/// Coverage above this value counts as a lit pixel.
const BRIGHTNESS_THRESHOLD: u8 = 128;
const FONT_PX: f32 = 120.0;
/// Blank pixels kept on each side of a line that had to shrink.
const CANVAS_MARGIN: usize = 16;

/// Error returned by [`TextRaster::from_font_bytes`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// 8-bit coverage canvas the text is drawn into.
#[derive(Debug, Clone)]
pub struct TextBitmap {
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

impl TextBitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, coverage: vec![0; width * height] }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.coverage[y * self.width + x]
    }

    /// Max-blends a glyph bitmap with its top-left corner at `(ox, oy)`.
    /// Pixels falling outside the canvas are clipped.
    pub fn blit(&mut self, ox: i32, oy: i32, w: usize, h: usize, glyph: &[u8]) {
        for gy in 0..h {
            let y = oy + gy as i32;
            if y < 0 || y as usize >= self.height {
                continue;
            }
            for gx in 0..w {
                let x = ox + gx as i32;
                if x < 0 || x as usize >= self.width {
                    continue;
                }
                let dst = &mut self.coverage[y as usize * self.width + x as usize];
                *dst = (*dst).max(glyph[gy * w + gx]);
            }
        }
    }

    /// Lit pixels mapped into model space: centred on the origin, Y up.
    pub fn bright_points(&self) -> Vec<[f32; 2]> {
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) > BRIGHTNESS_THRESHOLD {
                    out.push([(x as f32 - cx) * PIXEL_SCALE, -(y as f32 - cy) * PIXEL_SCALE]);
                }
            }
        }
        out
    }
}

/// Renders strings to a [`TextBitmap`] with a single loaded font.
///
/// A raster without a font renders nothing; callers treat that the same as
/// empty glyph coverage.
#[derive(Default)]
pub struct TextRaster {
    font: Option<fontdue::Font>,
}

impl TextRaster {
    /// Parses a TrueType or OpenType font. Bold faces give the densest clouds.
    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draws `text` as a single line centred on a [`CANVAS_WIDTH`] ×
    /// [`CANVAS_HEIGHT`] canvas. Lines wider than the canvas are drawn at a
    /// smaller size so they fit.
    ///
    /// Returns `None` when no font is loaded.
    pub fn rasterize(&self, text: &str) -> Option<TextBitmap> {
        let font = self.font.as_ref()?;

        let mut layout = layout_line(font, text, FONT_PX);
        let Some(mut ink) = InkBounds::of(&layout) else {
            return Some(TextBitmap::new(CANVAS_WIDTH, CANVAS_HEIGHT));
        };
        let room = (CANVAS_WIDTH - 2 * CANVAS_MARGIN) as f32;
        if ink.width() > room {
            let px = FONT_PX * room / ink.width();
            log::debug!("{text:?} is {:.0}px wide; shrinking to {px:.0}px", ink.width());
            layout = layout_line(font, text, px);
            if let Some(shrunk) = InkBounds::of(&layout) {
                ink = shrunk;
            }
        }

        let (cx, cy) = ink.centre();
        let dx = CANVAS_WIDTH as f32 / 2.0 - cx;
        let dy = CANVAS_HEIGHT as f32 / 2.0 - cy;

        let mut bitmap = TextBitmap::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        for g in layout.glyphs() {
            if g.width == 0 || g.height == 0 {
                continue;
            }
            let (metrics, coverage) = font.rasterize_config(g.key);
            bitmap.blit(
                (g.x + dx).round() as i32,
                (g.y + dy).round() as i32,
                metrics.width,
                metrics.height,
                &coverage,
            );
        }
        Some(bitmap)
    }
}

/// Lays `text` out on one line; no width limit means no wrapping.
fn layout_line(font: &fontdue::Font, text: &str, px: f32) -> Layout<()> {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, px, 0));
    layout
}

/// Box around every visible glyph of a layout.
#[derive(Debug, Clone, Copy)]
struct InkBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl InkBounds {
    fn of(layout: &Layout<()>) -> Option<Self> {
        layout
            .glyphs()
            .iter()
            .filter(|g| g.width > 0 && g.height > 0)
            .map(|g| Self {
                min_x: g.x,
                min_y: g.y,
                max_x: g.x + g.width as f32,
                max_y: g.y + g.height as f32,
            })
            .reduce(|a, b| Self {
                min_x: a.min_x.min(b.min_x),
                min_y: a.min_y.min(b.min_y),
                max_x: a.max_x.max(b.max_x),
                max_y: a.max_y.max(b.max_y),
            })
    }

    fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    fn centre(&self) -> (f32, f32) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bright_points_are_centred_and_flipped() {
        let mut bitmap = TextBitmap::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        // top-left lit pixel and the exact centre
        bitmap.blit(0, 0, 1, 1, &[255]);
        bitmap.blit(512, 256, 1, 1, &[200]);

        let pts = bitmap.bright_points();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], [-512.0 * PIXEL_SCALE, 256.0 * PIXEL_SCALE]);
        assert_eq!(pts[1], [0.0, 0.0]);
    }

    #[test]
    fn dim_pixels_are_ignored() {
        let mut bitmap = TextBitmap::new(8, 8);
        bitmap.blit(2, 2, 2, 1, &[128, 129]);
        assert_eq!(bitmap.bright_points().len(), 1);
    }

    #[test]
    fn blit_clips_and_max_blends() {
        let mut bitmap = TextBitmap::new(4, 4);
        bitmap.blit(-1, -1, 3, 3, &[9; 9]);
        bitmap.blit(1, 1, 1, 1, &[3]);
        assert_eq!(bitmap.get(0, 0), 9);
        assert_eq!(bitmap.get(1, 1), 9);
        assert_eq!(bitmap.get(2, 2), 0);
        bitmap.blit(3, 3, 2, 2, &[7; 4]);
        assert_eq!(bitmap.get(3, 3), 7);
    }

    #[test]
    fn raster_without_font_renders_nothing() {
        let raster = TextRaster::default();
        assert!(!raster.has_font());
        assert!(raster.rasterize("A & S").is_none());
    }

    const BOLD_FONT: &[u8] = include_bytes!("../../tests/fonts/DejaVuSans-Bold.ttf");

    /// `(min_x, max_x, min_y, max_y)` of the lit pixels, in model units.
    fn extent(points: &[[f32; 2]]) -> (f32, f32, f32, f32) {
        points.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(x0, x1, y0, y1), &[x, y]| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        )
    }

    #[test]
    fn long_text_stays_on_one_line() {
        let raster = TextRaster::from_font_bytes(BOLD_FONT).unwrap();
        let pts = raster.rasterize("Abinash Sharma").unwrap().bright_points();
        let (x0, x1, y0, y1) = extent(&pts);

        // a wrapped second line would roughly double the height
        assert!(y1 - y0 < 1.2 * FONT_PX * PIXEL_SCALE, "height {}", y1 - y0);
        // wider than the 120px line would be, so it was shrunk rather than clipped
        let half = (CANVAS_WIDTH / 2 - CANVAS_MARGIN) as f32 * PIXEL_SCALE;
        let slack = 3.0 * PIXEL_SCALE;
        assert!(x0 >= -half - slack && x1 <= half + slack, "x in [{x0}, {x1}]");
        assert!(x1 - x0 > 0.9 * 2.0 * half);
    }

    #[test]
    fn short_text_is_centred_at_full_size() {
        let raster = TextRaster::from_font_bytes(BOLD_FONT).unwrap();
        let pts = raster.rasterize("A & S").unwrap().bright_points();
        let (x0, x1, y0, y1) = extent(&pts);

        assert!(((x0 + x1) / 2.0).abs() < 3.0 * PIXEL_SCALE, "x in [{x0}, {x1}]");
        assert!(((y0 + y1) / 2.0).abs() < 3.0 * PIXEL_SCALE, "y in [{y0}, {y1}]");
        // cap height of a 120px bold face
        assert!(y1 - y0 > 0.6 * FONT_PX * PIXEL_SCALE);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(TextRaster::from_font_bytes(b"not a font").is_err());
    }
}
