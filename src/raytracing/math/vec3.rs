use std::ops;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Vec3 {
    #[inline(always)]
    fn from(value: [f64; 3]) -> Self {
        Vec3::new(value[0], value[1], value[2])
    }
}

impl ops::Add<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::AddAssign<Vec3> for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl ops::Sub<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Neg for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl ops::Mul<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl ops::Mul<Vec3> for f64 {
    type Output = Vec3;

    #[inline(always)]
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs * self
    }
}

/// Component-wise product, used for color attenuation.
impl ops::Mul<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl ops::MulAssign<Vec3> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Vec3) {
        self.x *= rhs.x;
        self.y *= rhs.y;
        self.z *= rhs.z;
    }
}

impl ops::Div<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f64) -> Self::Output {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3 { x, y, z }
    }

    #[inline(always)]
    pub const fn splat(value: f64) -> Vec3 {
        Vec3::new(value, value, value)
    }

    #[inline(always)]
    pub fn y_axis() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub fn reflect(self, axis: Vec3) -> Vec3 {
        // mirror this vector about the plane orthogonal to `axis`
        self - axis * 2.0 * self.dot(axis)
    }

    #[inline(always)]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline(always)]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline(always)]
    pub fn squared_len(self) -> f64 {
        self.dot(self)
    }

    #[inline(always)]
    pub fn len(self) -> f64 {
        self.squared_len().sqrt()
    }

    /// Unit vector in the same direction, or `None` when the length is zero
    /// (or not finite) and no direction exists.
    #[inline(always)]
    pub fn try_normalize(self) -> Option<Vec3> {
        let len = self.len();
        if len > f64::MIN_POSITIVE && len.is_finite() {
            Some(self / len)
        } else {
            None
        }
    }

    /// Unit vector for inputs already known to be non-zero.
    /// Zero-length input yields NaN components.
    #[inline(always)]
    pub fn normalize(self) -> Vec3 {
        self / self.len()
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    #[inline(always)]
    pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
        self * (1.0 - t) + other * t
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Vec3 {
        Vec3::new(f(self.x), f(self.y), f(self.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_is_orthogonal() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let c = a.cross(b);
        assert!(c.dot(a).abs() < 1e-12);
        assert!(c.dot(b).abs() < 1e-12);
    }

    #[test]
    fn test_try_normalize_rejects_zero() {
        assert_eq!(Vec3::ZERO.try_normalize(), None);
        let n = Vec3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
        assert_eq!(n, Vec3::new(0.6, 0.0, 0.8));
    }

    #[test]
    fn test_reflect_flips_normal_component() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(v.reflect(Vec3::y_axis()), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Vec3::ONE;
        let b = Vec3::new(0.5, 0.7, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }
}
