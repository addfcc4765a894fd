//! CPU mirror of the point-cloud vertex stage.
//!
//! [`snoise`] is the Ashima Arts / Stefan Gustavson 3D simplex noise, the same
//! lattice the WGSL shader evaluates, so CPU-side checks and picking see the
//! positions the GPU draws.

use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    1.792_842_9 - 0.853_734_7 * r
}

/// GLSL `step(edge, x)`: 0 where `x < edge`, else 1.
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

/// 3D simplex noise, roughly in `[-1, 1]`.
pub fn snoise(v: Vec3) -> f32 {
    const C: [f32; 2] = [1.0 / 6.0, 1.0 / 3.0];

    // skew to the simplex cell
    let i = (v + v.dot(Vec3::splat(C[1]))).floor();
    let x0 = v - i + i.dot(Vec3::splat(C[0]));

    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + C[0];
    let x2 = x0 - i2 + C[1];
    let x3 = x0 - 0.5;

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + i.y
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + i.x
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // gradients: 7x7 points over a square, mapped onto an octahedron
    let n_ = 0.142_857_15_f32;
    let ns = Vec3::new(2.0 * n_, 0.5 * n_ - 1.0, n_);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);
    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    let m = (0.6 - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3))).max(Vec4::ZERO);
    let m = m * m;
    42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

/// Inputs the vertex stage reads besides the per-particle position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Displacement {
    pub time: f32,
    pub expansion: f32,
    pub noise_strength: f32,
    pub scale: f32,
}

impl Displacement {
    /// Scaled noise value at an interpolated position.
    pub fn noise_at(&self, mixed: Vec3) -> f32 {
        snoise(mixed * 2.0 + self.time * 0.5) * self.noise_strength
    }

    /// Final model-space position: radial push by `expansion`, wobbled by
    /// noise, then the global scale.
    pub fn apply(&self, mixed: Vec3) -> Vec3 {
        let noise = self.noise_at(mixed);
        let direction = (mixed + 0.001).normalize();
        (mixed + direction * self.expansion * (1.0 + noise)) * self.scale
    }

    /// Per-particle alpha flicker.
    pub fn alpha(&self, mixed: Vec3) -> f32 {
        0.6 + 0.4 * (self.time + self.noise_at(mixed) * 10.0).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec3> {
        (0..2_000).map(|n| {
            let f = n as f32;
            Vec3::new(f * 0.173 - 50.0, (f * 0.311).sin() * 7.0, f * 0.057)
        })
    }

    #[test]
    fn noise_is_bounded_and_finite() {
        for p in grid() {
            let n = snoise(p);
            assert!(n.is_finite());
            assert!(n.abs() <= 1.05, "snoise({p}) = {n}");
        }
    }

    #[test]
    fn noise_is_deterministic_and_continuous() {
        for p in grid().take(200) {
            assert_eq!(snoise(p), snoise(p));
            let d = (snoise(p) - snoise(p + Vec3::splat(1e-3))).abs();
            assert!(d < 0.05, "jump of {d} at {p}");
        }
    }

    #[test]
    fn noise_actually_varies() {
        let values: Vec<f32> = grid().take(100).map(snoise).collect();
        let min = values.iter().cloned().fold(f32::MAX, f32::min);
        let max = values.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.3);
    }

    #[test]
    fn zero_expansion_unit_scale_is_identity() {
        let d = Displacement { time: 3.0, expansion: 0.0, noise_strength: 1.0, scale: 1.0 };
        let p = Vec3::new(1.0, -2.0, 0.5);
        assert!((d.apply(p) - p).length() < 1e-6);
    }

    #[test]
    fn expansion_pushes_radially() {
        let d = Displacement { time: 0.0, expansion: 2.0, noise_strength: 0.0, scale: 1.0 };
        let p = Vec3::new(0.0, 3.0, 0.0);
        let out = d.apply(p);
        assert!((out.length() - 5.0).abs() < 1e-3);
        assert!(out.x.abs() < 1e-3);
    }

    #[test]
    fn scale_applies_last() {
        let d = Displacement { time: 0.0, expansion: 1.0, noise_strength: 0.0, scale: 0.5 };
        let p = Vec3::new(2.0, 0.0, 0.0);
        assert!((d.apply(p).x - 1.5).abs() < 1e-3);
    }

    #[test]
    fn alpha_stays_in_range() {
        let d = Displacement { time: 1.3, expansion: 0.0, noise_strength: 2.0, scale: 1.0 };
        for p in grid().take(200) {
            let a = d.alpha(p);
            assert!((0.2 - 1e-5..=1.0 + 1e-5).contains(&a));
        }
    }
}
