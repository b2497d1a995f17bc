use super::core::{HitRecord, MaterialKind};
use super::math::{Ray, Vec3};
use super::sampler::{random_unit_vector, FrameSeed, PixelCoord};

/// Outcome of a surface interaction: the path either continues along a
/// new ray or ends by emitting light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scatter {
    Bounce(Ray),
    Emit(Vec3),
}

impl Scatter {
    pub fn ray(&self) -> Option<Ray> {
        match self {
            Scatter::Bounce(ray) => Some(*ray),
            Scatter::Emit(_) => None,
        }
    }

    pub fn emission(&self) -> Option<Vec3> {
        match self {
            Scatter::Bounce(_) => None,
            Scatter::Emit(radiance) => Some(*radiance),
        }
    }
}

/// Where the randomness of a diffuse bounce comes from.
#[derive(Debug, Clone, Copy)]
pub struct SampleContext {
    pub pixel: PixelCoord,
    pub seed: FrameSeed,
    pub bounce: u32,
}

/// Pure per-material response. Attenuation is left to the integrator.
pub fn scatter(ray: &Ray, hit: &HitRecord, context: &SampleContext, epsilon: f64) -> Scatter {
    let direction = match hit.material {
        MaterialKind::Specular => ray.direction.reflect(hit.normal),
        MaterialKind::Diffuse => {
            let offset = random_unit_vector(context.pixel, context.seed, context.bounce);
            // a sample opposite the normal cancels it out
            (hit.normal + offset).try_normalize().unwrap_or(hit.normal)
        }
        MaterialKind::Emissive => return Scatter::Emit(hit.albedo),
    };
    // start slightly off the surface so the next test does not hit it again
    Scatter::Bounce(Ray::new(hit.point + direction * epsilon, direction))
}
