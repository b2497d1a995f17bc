//! Bounded path walk: intersect, scatter, attenuate, until a light, the sky
//! or the bounce budget ends the path.

use super::core::{hit_scene, Scene};
use super::error::{Error, Result};
use super::material::{scatter, SampleContext, Scatter};
use super::math::{Ray, Vec3};
use super::sampler::{FrameSeed, PixelCoord};

const SKY_ZENITH: Vec3 = Vec3::new(0.5, 0.7, 1.0);

/// Tunable constants of the tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSettings {
    /// Surface interactions before the path falls back to the sky color
    pub max_bounces: u32,
    /// Multiplies the albedo at every non-emissive bounce
    pub decay: f64,
    /// Offset of a bounced ray's origin along its direction
    pub surface_epsilon: f64,
    /// Sub-pixel anti-aliasing offsets
    pub jitter: bool,
    /// Smallest camera motion that restarts accumulation
    pub motion_epsilon: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        TraceSettings {
            max_bounces: 20,
            decay: 0.7,
            surface_epsilon: 1e-4,
            jitter: true,
            motion_epsilon: 1e-6,
        }
    }
}

impl TraceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_bounces == 0 {
            return Err(Error::InvalidSettings(
                "at least one bounce is required".to_string(),
            ));
        }
        if !(self.decay.is_finite() && self.decay >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "decay must be a non-negative number, got {}",
                self.decay
            )));
        }
        if !(self.surface_epsilon.is_finite() && self.surface_epsilon >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "surface epsilon must be a non-negative number, got {}",
                self.surface_epsilon
            )));
        }
        if !(self.motion_epsilon.is_finite() && self.motion_epsilon >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "motion epsilon must be a non-negative number, got {}",
                self.motion_epsilon
            )));
        }
        Ok(())
    }
}

/// Vertical white-to-blue background.
pub fn sky_gradient(direction: Vec3) -> Vec3 {
    let t = 0.5 * (direction.y + 1.0);
    Vec3::ONE.lerp(SKY_ZENITH, t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    Light,
    Sky,
    DepthLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Vec3,
    pub end: PathEnd,
    /// Surfaces hit, including the terminating emitter
    pub bounces: u32,
}

pub fn trace_path(
    scene: &Scene,
    ray: Ray,
    pixel: PixelCoord,
    seed: FrameSeed,
    settings: &TraceSettings,
) -> PathSample {
    let mut light_decay = Vec3::ONE;
    let mut ray = ray;

    for bounce in 0..settings.max_bounces {
        let Some(hit) = hit_scene(scene, &ray) else {
            return PathSample {
                radiance: light_decay * sky_gradient(ray.direction),
                end: PathEnd::Sky,
                bounces: bounce,
            };
        };

        let context = SampleContext {
            pixel,
            seed,
            bounce,
        };
        match scatter(&ray, &hit, &context, settings.surface_epsilon) {
            Scatter::Emit(radiance) => {
                return PathSample {
                    radiance: light_decay * radiance,
                    end: PathEnd::Light,
                    bounces: bounce + 1,
                };
            }
            Scatter::Bounce(next) => {
                light_decay *= hit.albedo * settings.decay;
                ray = next;
            }
        }
    }

    PathSample {
        radiance: light_decay * sky_gradient(ray.direction),
        end: PathEnd::DepthLimit,
        bounces: settings.max_bounces,
    }
}

/// Radiance estimate of one sample for one pixel.
pub fn trace(
    scene: &Scene,
    ray: Ray,
    pixel: PixelCoord,
    seed: FrameSeed,
    settings: &TraceSettings,
) -> Vec3 {
    trace_path(scene, ray, pixel, seed, settings).radiance
}
