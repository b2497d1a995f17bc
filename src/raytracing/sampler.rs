//! Stateless per-pixel randomness.
//!
//! Every value is a pure function of the pixel, the frame seed and a salt,
//! so pixels can be traced on any thread in any order and a frame can be
//! reproduced exactly from its seed.

use std::f64::consts::TAU;

use rand::Rng;

use super::math::Vec3;

/// Integer pixel position, `y = 0` is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    pub fn new(x: u32, y: u32) -> Self {
        PixelCoord { x, y }
    }
}

/// Three uniform values in [0, 1) drawn once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSeed(pub Vec3);

impl FrameSeed {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        FrameSeed(Vec3::new(rng.gen(), rng.gen(), rng.gen()))
    }
}

// offsets keeping successive bounces and the jitter stream decorrelated
const BOUNCE_SALT: (f64, f64) = (0.1031, 0.1973);
const JITTER_SALT: (f64, f64) = (17.31, 43.17);

/// Fractional part folded into [0, 1).
#[inline(always)]
fn fract(value: f64) -> f64 {
    let f = value - value.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// Multiplicative-sine hash of a 2D point into two values in [0, 1).
#[inline(always)]
fn hash2(px: f64, py: f64) -> (f64, f64) {
    let a = px * 127.1 + py * 311.7;
    let b = px * 269.5 + py * 183.3;
    (fract(a.sin() * 43758.5453), fract(b.sin() * 43758.5453))
}

#[inline(always)]
fn pixel_center(pixel: PixelCoord) -> (f64, f64) {
    (pixel.x as f64 + 0.5, pixel.y as f64 + 0.5)
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(pixel: PixelCoord, seed: FrameSeed, bounce: u32) -> Vec3 {
    let (cx, cy) = pixel_center(pixel);
    let bounce = bounce as f64;
    let (u, v) = hash2(
        cx * seed.0.x + bounce * BOUNCE_SALT.0,
        cy * seed.0.y + bounce * BOUNCE_SALT.1,
    );

    let theta = TAU * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
}

/// Sub-pixel offset in [0, 1) on both axes, for anti-aliasing.
pub fn pixel_jitter(pixel: PixelCoord, seed: FrameSeed) -> (f64, f64) {
    let (cx, cy) = pixel_center(pixel);
    hash2(
        cx * seed.0.y + JITTER_SALT.0,
        cy * seed.0.z + JITTER_SALT.1,
    )
}
