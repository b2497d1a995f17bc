use super::error::{Error, Result};
use super::math::{Ray, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Perfect mirror
    Specular,
    /// Scatters around the normal
    Diffuse,
    /// Light source, ends the path
    Emissive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    /// Per-channel reflectance; for emitters, the emitted radiance (may exceed 1).
    pub albedo: Vec3,
    pub material: MaterialKind,
}

/// Ordered spheres for one frame. Order matters: on equal hit distances
/// the sphere that comes first wins.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SphereCenter {
    Fixed(Vec3),
    /// Circles `pivot` in the xz plane: `pivot + (sin(a) * radius, 0, cos(a) * radius)`
    Orbit { pivot: Vec3, radius: f64 },
}

impl SphereCenter {
    pub fn at(&self, angle: f64) -> Vec3 {
        match *self {
            SphereCenter::Fixed(center) => center,
            SphereCenter::Orbit { pivot, radius } => {
                let (sin, cos) = angle.sin_cos();
                pivot + Vec3::new(sin * radius, 0.0, cos * radius)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereDescription {
    pub center: SphereCenter,
    pub radius: f64,
    pub albedo: Vec3,
    pub material: MaterialKind,
}

/// Scene as configured, before the animation angle of a frame is applied.
#[derive(Clone, Debug, Default)]
pub struct SceneDescription {
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// The scene the renderer shows when no scene file is given: a white
    /// ground, a large cyan ball, two mirrors (one circling), two small
    /// diffuse balls and a small red light.
    pub fn reference() -> SceneDescription {
        let fixed = |x, y, z| SphereCenter::Fixed(Vec3::new(x, y, z));
        let sphere = |center, radius, albedo, material| SphereDescription {
            center,
            radius,
            albedo,
            material,
        };
        SceneDescription {
            spheres: vec![
                sphere(
                    fixed(0.0, 0.4, -1.0),
                    0.8,
                    Vec3::new(0.5, 1.0, 1.0),
                    MaterialKind::Diffuse,
                ),
                sphere(
                    fixed(0.0, -100.5, -1.0),
                    100.1,
                    Vec3::splat(0.7),
                    MaterialKind::Diffuse,
                ),
                sphere(
                    SphereCenter::Orbit {
                        pivot: Vec3::new(0.0, -0.1, -1.0),
                        radius: 1.0,
                    },
                    0.3,
                    Vec3::new(1.0, 1.0, 0.0),
                    MaterialKind::Specular,
                ),
                sphere(
                    fixed(1.0, 0.0, -0.5),
                    0.3,
                    Vec3::ONE,
                    MaterialKind::Specular,
                ),
                sphere(
                    fixed(-0.9, 0.7, -0.8),
                    0.15,
                    Vec3::new(1.0, 1.0, 0.0),
                    MaterialKind::Diffuse,
                ),
                sphere(
                    fixed(1.0, 0.7, 0.0),
                    0.1,
                    Vec3::new(30.0, 0.0, 0.0),
                    MaterialKind::Emissive,
                ),
                sphere(
                    fixed(-1.0, 0.4, -1.0),
                    0.2,
                    Vec3::new(1.0, 0.5, 0.7),
                    MaterialKind::Diffuse,
                ),
            ],
        }
    }

    /// Rejects spheres that would put NaN or infinity into a frame.
    pub fn validate(&self) -> Result<()> {
        for (index, sphere) in self.spheres.iter().enumerate() {
            let invalid = |reason: String| -> Result<()> {
                Err(Error::InvalidSphere { index, reason })
            };
            if !(sphere.radius > 0.0 && sphere.radius.is_finite()) {
                return invalid(format!("radius must be positive, got {}", sphere.radius));
            }
            if !sphere.albedo.is_finite() {
                return invalid(format!("albedo {:?} is not finite", sphere.albedo));
            }
            match sphere.center {
                SphereCenter::Fixed(center) if !center.is_finite() => {
                    return invalid(format!("center {:?} is not finite", center));
                }
                SphereCenter::Orbit { pivot, radius }
                    if !(pivot.is_finite() && radius.is_finite()) =>
                {
                    return invalid(format!(
                        "orbit pivot {:?} with radius {} is not finite",
                        pivot, radius
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Evaluates the animated centers once for a frame.
    pub fn at(&self, angle: f64) -> Scene {
        Scene {
            spheres: self
                .spheres
                .iter()
                .map(|desc| Sphere {
                    center: desc.center.at(angle),
                    radius: desc.radius,
                    albedo: desc.albedo,
                    material: desc.material,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub t: f64,
    pub point: Vec3,
    /// Unit length, pointing out of the sphere
    pub normal: Vec3,
    pub albedo: Vec3,
    pub material: MaterialKind,
}

/// Near-root intersection only. A ray starting inside a sphere never
/// sees its far wall, so it misses that sphere.
pub fn hit_sphere(sphere: &Sphere, ray: &Ray) -> Option<HitRecord> {
    let oc = ray.origin - sphere.center;
    let a = ray.direction.dot(ray.direction);
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let discriminant = b * b - a * c;
    // also rejects a NaN discriminant
    if !(discriminant > 0.0) {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / a;
    if t < 0.0 {
        return None;
    }

    let point = ray.at(t);
    Some(HitRecord {
        t,
        point,
        normal: (point - sphere.center) / sphere.radius,
        albedo: sphere.albedo,
        material: sphere.material,
    })
}

/// Closest hit over all spheres; the first sphere wins a tie.
pub fn hit_scene(scene: &Scene, ray: &Ray) -> Option<HitRecord> {
    let mut closest: Option<HitRecord> = None;
    for sphere in &scene.spheres {
        if let Some(hit) = hit_sphere(sphere, ray) {
            if closest.map_or(true, |best| hit.t < best.t) {
                closest = Some(hit);
            }
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(center: Vec3, radius: f64, material: MaterialKind) -> Sphere {
        Sphere {
            center,
            radius,
            albedo: Vec3::ONE,
            material,
        }
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_hit_through_center_faces_ray() {
        let scene = Scene {
            spheres: vec![sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, MaterialKind::Diffuse)],
        };
        let ray = forward_ray();
        let hit = hit_scene(&scene, &ray).expect("ray aims at the center");
        assert!(hit.t > 0.0);
        assert!((hit.t - 2.0).abs() < 1e-12);
        assert!(hit.normal.dot(ray.direction) < 0.0);
        assert!((hit.normal.len() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_and_tangent_are_not_hits() {
        let ray = forward_ray();
        let far_off = sphere(Vec3::new(5.0, 0.0, -3.0), 1.0, MaterialKind::Diffuse);
        assert!(hit_sphere(&far_off, &ray).is_none());
        // grazing contact has a zero discriminant
        let tangent = sphere(Vec3::new(1.0, 0.0, -3.0), 1.0, MaterialKind::Diffuse);
        assert!(hit_sphere(&tangent, &ray).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_is_ignored() {
        let behind = sphere(Vec3::new(0.0, 0.0, 3.0), 1.0, MaterialKind::Diffuse);
        assert!(hit_sphere(&behind, &forward_ray()).is_none());
    }

    #[test]
    fn test_origin_inside_sphere_misses() {
        let around = sphere(Vec3::ZERO, 2.0, MaterialKind::Diffuse);
        assert!(hit_sphere(&around, &forward_ray()).is_none());
    }

    #[test]
    fn test_nearest_hit_wins_regardless_of_order() {
        let near = sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, MaterialKind::Specular);
        let far = sphere(Vec3::new(0.0, 0.0, -4.0), 0.5, MaterialKind::Emissive);
        let scene = Scene {
            spheres: vec![far, near],
        };
        let hit = hit_scene(&scene, &forward_ray()).unwrap();
        assert_eq!(hit.material, MaterialKind::Specular);
        assert!((hit.t - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_equal_distance_keeps_first_sphere() {
        let first = Sphere {
            albedo: Vec3::new(1.0, 0.0, 0.0),
            ..sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, MaterialKind::Diffuse)
        };
        let second = Sphere {
            albedo: Vec3::new(0.0, 0.0, 1.0),
            ..sphere(Vec3::new(0.0, 0.0, -2.0), 0.5, MaterialKind::Emissive)
        };
        let scene = Scene {
            spheres: vec![first, second],
        };
        let hit = hit_scene(&scene, &forward_ray()).unwrap();
        assert_eq!(hit.albedo, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hit.material, MaterialKind::Diffuse);
    }

    #[test]
    fn test_orbit_center_follows_angle() {
        let center = SphereCenter::Orbit {
            pivot: Vec3::new(0.0, -0.1, -1.0),
            radius: 1.0,
        };
        assert_eq!(center.at(0.0), Vec3::new(0.0, -0.1, 0.0));
        let quarter = center.at(std::f64::consts::FRAC_PI_2);
        assert!((quarter.x - 1.0).abs() < 1e-12);
        assert!((quarter.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_radius() {
        let mut description = SceneDescription::reference();
        assert!(description.validate().is_ok());
        description.spheres[3].radius = 0.0;
        assert!(matches!(
            description.validate(),
            Err(Error::InvalidSphere { index: 3, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_fields() {
        let mut description = SceneDescription::reference();
        description.spheres[0].center = SphereCenter::Fixed(Vec3::new(f64::NAN, 0.0, -5.0));
        assert!(matches!(
            description.validate(),
            Err(Error::InvalidSphere { index: 0, .. })
        ));

        let mut description = SceneDescription::reference();
        description.spheres[2].center = SphereCenter::Orbit {
            pivot: Vec3::new(0.0, 0.0, -1.0),
            radius: f64::INFINITY,
        };
        assert!(matches!(
            description.validate(),
            Err(Error::InvalidSphere { index: 2, .. })
        ));

        let mut description = SceneDescription::reference();
        description.spheres[5].albedo = Vec3::new(f64::INFINITY, 0.0, 0.0);
        assert!(matches!(
            description.validate(),
            Err(Error::InvalidSphere { index: 5, .. })
        ));
    }

    #[test]
    fn test_nan_sphere_never_hides_a_real_hit() {
        let scene = Scene {
            spheres: vec![
                sphere(Vec3::new(f64::NAN, 0.0, -5.0), 0.5, MaterialKind::Diffuse),
                sphere(Vec3::new(0.0, 0.0, -3.0), 0.5, MaterialKind::Emissive),
            ],
        };
        let hit = hit_scene(&scene, &forward_ray()).unwrap();
        assert_eq!(hit.material, MaterialKind::Emissive);
        assert!((hit.t - 2.5).abs() < 1e-12);
    }
}
