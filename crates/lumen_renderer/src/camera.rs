//! Pinhole camera for primary ray generation.

use lumen_math::{Ray, Vec3};

/// Pinhole camera.
///
/// Screen coordinates are normalized: `(0, 0)` is the bottom-left corner of
/// the image and `(1, 1)` the top-right.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    eye: Vec3,
    look_at: Vec3,
    vup: Vec3,

    fov: f64,          // Vertical field of view in degrees
    aspect_ratio: f64, // Width over height

    // Cached computed values (set by initialize())
    look: Vec3,
    u: Vec3,
    v: Vec3,
}

impl Camera {
    /// Camera at the origin looking down -Z with a 30 degree field of view.
    pub fn new() -> Self {
        let mut camera = Self {
            eye: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            fov: 30.0,
            aspect_ratio: 1.0,
            look: Vec3::NEG_Z,
            u: Vec3::X,
            v: Vec3::Y,
        };
        camera.initialize();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, eye: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.eye = eye;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, fov: f64) -> Self {
        self.fov = fov;
        self.initialize();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.initialize();
        self
    }

    /// Recompute the view basis from the current settings.
    pub fn initialize(&mut self) {
        self.look = (self.look_at - self.eye).normalize_or_zero();
        let right = self.look.cross(self.vup).normalize_or_zero();
        let up = right.cross(self.look);

        // Image plane one unit in front of the eye
        let normalized_height = 2.0 * (self.fov.to_radians() / 2.0).tan();
        self.u = right * normalized_height * self.aspect_ratio;
        self.v = up * normalized_height;
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Ray from the eye through screen position `(x, y)`.
    pub fn ray_through(&self, x: f64, y: f64) -> Ray {
        let x = x - 0.5;
        let y = y - 0.5;
        let direction = self.look + x * self.u + y * self.v;
        Ray::new(self.eye, direction.normalize_or_zero())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
