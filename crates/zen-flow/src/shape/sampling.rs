use std::f32::consts::{PI, TAU};

use rand::Rng;

use super::ShapeId;

/// Radius of the solid sphere used by Sphere, Fireworks, and every fallback.
pub const FALLBACK_RADIUS: f32 = 2.5;

const HEART_SCALE: f32 = 0.15;
const HEART_LIFT: f32 = 0.5;

const SATURN_PLANET_SHARE: f32 = 0.4;
const SATURN_PLANET_RADIUS: f32 = 1.5;
const SATURN_RING_INNER: f32 = 2.2;
const SATURN_RING_OUTER: f32 = 3.7;
const SATURN_TILT: f32 = PI / 6.0;

const FLOWER_PETALS: f32 = 5.0;

const BOW_HALF_SPAN: f32 = PI * 0.4;
const BOW_AIM: f32 = -PI / 4.0;

/// Uniform sample inside a solid sphere.
///
/// The radius is scaled by the cube root of a uniform draw so the density is
/// constant per unit volume rather than clumping at the centre.
pub fn random_in_sphere<R: Rng>(rng: &mut R, radius: f32) -> [f32; 3] {
    let theta = TAU * rng.random::<f32>();
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.random::<f32>().cbrt() * radius;
    [
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    ]
}

/// Rotates `p` about the X axis by `angle` radians.
pub fn tilt_x(p: [f32; 3], angle: f32) -> [f32; 3] {
    let (s, c) = angle.sin_cos();
    let [x, y, z] = p;
    [x, y * c - z * s, y * s + z * c]
}

/// Rotates `p` in the XY plane by `angle` radians.
fn rotate_z(p: [f32; 3], angle: f32) -> [f32; 3] {
    let (s, c) = angle.sin_cos();
    let [x, y, z] = p;
    [x * c - y * s, x * s + y * c, z]
}

/// One sample of a non-text shape.
pub(super) fn sample<R: Rng>(shape: ShapeId, rng: &mut R) -> [f32; 3] {
    match shape {
        ShapeId::Heart => heart(rng),
        ShapeId::Saturn => saturn(rng),
        ShapeId::Flower => flower(rng),
        ShapeId::Buddha => buddha(rng),
        ShapeId::Jagannath => jagannath(rng),
        ShapeId::Bow => bow(rng),
        // Text shapes are handled by the generator; reaching here means the
        // caller asked for a single sample, so use the fallback.
        ShapeId::Sphere | ShapeId::Fireworks | ShapeId::TextA | ShapeId::TextB => {
            random_in_sphere(rng, FALLBACK_RADIUS)
        }
    }
}

// ── heart ─────────────────────────────────────────────────────────────────

fn heart<R: Rng>(rng: &mut R) -> [f32; 3] {
    let t = rng.random::<f32>() * TAU;
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    let z = (rng.random::<f32>() - 0.5) * 5.0;
    [x * HEART_SCALE, y * HEART_SCALE + HEART_LIFT, z * 0.5]
}

// ── saturn ────────────────────────────────────────────────────────────────

fn saturn<R: Rng>(rng: &mut R) -> [f32; 3] {
    if rng.random::<f32>() < SATURN_PLANET_SHARE {
        random_in_sphere(rng, SATURN_PLANET_RADIUS)
    } else {
        tilt_x(saturn_ring(rng), SATURN_TILT)
    }
}

/// Ring sample before the tilt: flat annulus in XZ with a thin Y band.
pub(super) fn saturn_ring<R: Rng>(rng: &mut R) -> [f32; 3] {
    let angle = rng.random::<f32>() * TAU;
    let dist = SATURN_RING_INNER + rng.random::<f32>() * (SATURN_RING_OUTER - SATURN_RING_INNER);
    let y = (rng.random::<f32>() - 0.5) * 0.1;
    [angle.cos() * dist, y, angle.sin() * dist]
}

// ── flower ────────────────────────────────────────────────────────────────

fn flower<R: Rng>(rng: &mut R) -> [f32; 3] {
    let theta = rng.random::<f32>() * TAU;
    let phi = rng.random::<f32>() * PI;
    let r = (2.0 + (FLOWER_PETALS * theta).cos() * phi.sin()) * rng.random::<f32>().sqrt();
    [
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    ]
}

// ── buddha ────────────────────────────────────────────────────────────────

fn buddha<R: Rng>(rng: &mut R) -> [f32; 3] {
    let region = rng.random::<f32>();
    if region < 0.3 {
        // seated base
        let angle = rng.random::<f32>() * TAU;
        let rad = 1.5 * rng.random::<f32>().sqrt();
        [angle.cos() * rad, -1.5 + rng.random::<f32>() * 0.5, angle.sin() * rad]
    } else if region < 0.7 {
        let [x, y, z] = random_in_sphere(rng, 1.1);
        [x * 0.8, y, z * 0.8]
    } else {
        let [x, y, z] = random_in_sphere(rng, 0.6);
        [x, y + 1.2, z]
    }
}

// ── jagannath ─────────────────────────────────────────────────────────────

fn jagannath<R: Rng>(rng: &mut R) -> [f32; 3] {
    let region = rng.random::<f32>();
    if region < 0.4 {
        let [x, y, z] = random_in_sphere(rng, 2.5);
        [x, y * 0.9, z * 0.2]
    } else if region < 0.7 {
        let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let angle = rng.random::<f32>() * TAU;
        let rad = rng.random::<f32>().sqrt() * 0.8;
        [side * 1.2 + angle.cos() * rad, 0.5 + angle.sin() * rad, 0.2]
    } else {
        // mouth: lower half of an ellipse
        let t = rng.random::<f32>() * PI + PI;
        [1.5 * t.cos(), -1.0 + 0.5 * t.sin(), 0.2]
    }
}

// ── bow ───────────────────────────────────────────────────────────────────

fn bow<R: Rng>(rng: &mut R) -> [f32; 3] {
    let region = rng.random::<f32>();
    let p = if region < 0.4 {
        let t = (rng.random::<f32>() * 2.0 - 1.0) * BOW_HALF_SPAN;
        [t.cos() * 2.5, t.sin() * 4.0, 0.0]
    } else if region < 0.5 {
        [0.5, (rng.random::<f32>() - 0.5) * 7.0, 0.0]
    } else {
        [(rng.random::<f32>() - 0.5) * 5.0, 0.0, 0.0]
    };
    rotate_z(p, BOW_AIM)
}
