use log::debug;

use super::error::{Error, Result};
use super::math::{Ray, Vec3};

/// Ray-generation frame of a pinhole camera. Always rebuilt, never edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub origin: Vec3,
    pub lower_left_corner: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
}

impl CameraBasis {
    /// Builds the image plane one unit in front of `origin`.
    ///
    /// Fails when `origin == look_at`, when `up` is parallel to the view
    /// direction, or when the field of view or aspect ratio is unusable.
    pub fn build(
        origin: Vec3,
        look_at: Vec3,
        up: Vec3,
        vertical_fov_degrees: f64,
        aspect_ratio: f64,
    ) -> Result<CameraBasis> {
        if !(vertical_fov_degrees > 0.0 && vertical_fov_degrees < 180.0) {
            return Err(Error::DegenerateCamera(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                vertical_fov_degrees
            )));
        }
        if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
            return Err(Error::DegenerateCamera(format!(
                "aspect ratio must be positive, got {}",
                aspect_ratio
            )));
        }

        let w = (origin - look_at).try_normalize().ok_or_else(|| {
            Error::DegenerateCamera("look-from and look-at coincide".to_string())
        })?;
        let u = up.cross(w).try_normalize().ok_or_else(|| {
            Error::DegenerateCamera("up vector is parallel to the view direction".to_string())
        })?;
        let v = w.cross(u);

        let half_height = (vertical_fov_degrees.to_radians() / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        Ok(CameraBasis {
            origin,
            lower_left_corner: origin - u * half_width - v * half_height - w,
            horizontal: u * (2.0 * half_width),
            vertical: v * (2.0 * half_height),
        })
    }

    /// Ray through the normalized screen position `(s, t)`, with `(0, 0)`
    /// the lower-left corner and `(1, 1)` the upper-right one.
    pub fn generate_ray(&self, s: f64, t: f64) -> Ray {
        let target = self.lower_left_corner + self.horizontal * s + self.vertical * t;
        Ray::new(self.origin, (target - self.origin).normalize())
    }
}

/// Camera orbiting a fixed target about the `up` axis.
///
/// Rotation around `up` keeps the angle between the view offset and `up`,
/// so a camera valid at construction stays valid for every angle.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    look_at: Vec3,
    offset: Vec3,
    up: Vec3,
    vertical_fov_degrees: f64,
    aspect_ratio: f64,
    angle: f64,
}

impl OrbitCamera {
    pub fn new(
        look_from: Vec3,
        look_at: Vec3,
        up: Vec3,
        vertical_fov_degrees: f64,
        aspect_ratio: f64,
    ) -> Result<OrbitCamera> {
        CameraBasis::build(look_from, look_at, up, vertical_fov_degrees, aspect_ratio)?;
        let up = up
            .try_normalize()
            .ok_or_else(|| Error::DegenerateCamera("up vector has zero length".to_string()))?;
        Ok(OrbitCamera {
            look_at,
            offset: look_from - look_at,
            up,
            vertical_fov_degrees,
            aspect_ratio,
            angle: 0.0,
        })
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    /// Current position, the offset rotated by `angle` around `up`.
    pub fn look_from(&self) -> Vec3 {
        // Rodrigues' rotation
        let k = self.up;
        let v = self.offset;
        let (sin, cos) = self.angle.sin_cos();
        let rotated = v * cos + k.cross(v) * sin + k * (k.dot(v) * (1.0 - cos));
        self.look_at + rotated
    }

    pub fn basis(&self) -> Result<CameraBasis> {
        CameraBasis::build(
            self.look_from(),
            self.look_at,
            self.up,
            self.vertical_fov_degrees,
            self.aspect_ratio,
        )
    }

    /// Applies an orbit-angle change and returns the new basis.
    /// On failure the camera keeps its previous angle.
    pub fn rotate(&mut self, delta: f64) -> Result<CameraBasis> {
        let previous = self.angle;
        self.angle += delta;
        match self.basis() {
            Ok(basis) => {
                debug!(
                    "camera orbit angle {:.4} -> {:.4}, eye at {:?}",
                    previous,
                    self.angle,
                    basis.origin
                );
                Ok(basis)
            }
            Err(err) => {
                self.angle = previous;
                Err(err)
            }
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) -> Result<CameraBasis> {
        let previous = self.aspect_ratio;
        self.aspect_ratio = aspect_ratio;
        self.basis().inspect_err(|_| self.aspect_ratio = previous)
    }
}
