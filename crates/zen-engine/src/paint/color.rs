/// Linear RGBA color.
///
/// Renderers and clear passes take linear values; an sRGB surface encodes them
/// on write. Construct from sRGB with [`Color::from_srgb_u8`] or
/// [`Color::from_hex`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// sRGB transfer function, one channel in `[0, 1]`.
fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl Color {
    pub const BLACK: Self = Self::linear(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn linear(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From sRGB bytes; alpha is already linear.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_srgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub fn from_srgb(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Opaque color from `0xRRGGBB`.
    pub fn from_hex(rgb: u32) -> Self {
        let [_, r, g, b] = rgb.to_be_bytes();
        Self::from_srgb_u8(r, g, b, 255)
    }

    /// Linear RGB as an array, for uniform upload.
    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_pass_through() {
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        let white = Color::from_hex(0xffffff);
        assert!((white.r - 1.0).abs() < 1e-6 && (white.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mid_grey_is_darker_in_linear() {
        let c = Color::from_srgb_u8(128, 128, 128, 255);
        assert!((c.r - 0.2158).abs() < 1e-3, "r = {}", c.r);
    }

    #[test]
    fn hex_channel_order() {
        let c = Color::from_hex(0xff0000);
        assert_eq!(c.rgb()[1], 0.0);
        assert_eq!(c.rgb()[2], 0.0);
        assert!(c.r > 0.99);
    }
}
