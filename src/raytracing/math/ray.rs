use super::Vec3;

/// Half-line starting at `origin`; `direction` is unit length by convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray { origin, direction }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ray.at(0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ray.at(2.5), Vec3::new(0.0, 1.0, -2.5));
    }
}
