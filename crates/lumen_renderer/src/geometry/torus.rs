//! Torus primitive.
//!
//! The torus lies in the XY plane around the Z axis: a tube of radius `minor`
//! swept along a circle of radius `major`. Its implicit form is
//!
//! ```text
//! (x² + y² + z² + A² - B²)² = 4A²(x² + y²)
//! ```
//!
//! Substituting the ray `P = E + tD` gives a quartic in `t`.

use lumen_math::roots::solve_quartic;
use lumen_math::{Aabb, Ray, Vec3, RAY_EPSILON};

use crate::intersection::LocalHit;

/// A torus with major radius `A` and minor radius `B`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    pub major: f64,
    pub minor: f64,
}

impl Torus {
    pub fn new(major: f64, minor: f64) -> Self {
        Self { major, minor }
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = self.major + self.minor;
        Aabb::from_points(
            Vec3::new(-r, -r, -self.minor),
            Vec3::new(r, r, self.minor),
        )
    }

    /// Nearest intersection beyond `RAY_EPSILON`.
    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        // The quartic is expensive; reject rays that miss the hull first
        self.bounding_box().intersect(ray)?;

        let t = self
            .roots(ray)
            .into_iter()
            .filter(|t| t.is_finite() && *t > RAY_EPSILON)
            .fold(f64::INFINITY, f64::min);
        if !t.is_finite() {
            return None;
        }

        Some(LocalHit::new(t, self.normal_at(ray.at(t))))
    }

    /// Real roots of the ray/torus quartic.
    fn roots(&self, ray: &Ray) -> Vec<f64> {
        let d = ray.direction;
        let e = ray.origin;
        let a2 = self.major * self.major;
        let b2 = self.minor * self.minor;

        // |P|^2 = J t^2 + K t + M
        let j = d.dot(d);
        let k = 2.0 * e.dot(d);
        let m = e.dot(e);
        let l = m + a2 - b2;

        // 4A^2 (Px^2 + Py^2) = I t^2 + H t + G
        let g = 4.0 * a2 * (e.x * e.x + e.y * e.y);
        let h = 8.0 * a2 * (d.x * e.x + d.y * e.y);
        let i = 4.0 * a2 * (d.x * d.x + d.y * d.y);

        solve_quartic(
            j * j,
            2.0 * j * k,
            k * k + 2.0 * j * l - i,
            2.0 * k * l - h,
            l * l - g,
        )
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        let ring = (p.x * p.x + p.y * p.y).sqrt();
        if ring == 0.0 {
            return Vec3::new(0.0, 0.0, p.z.signum());
        }
        let alpha = 1.0 - self.major / ring;
        Vec3::new(alpha * p.x, alpha * p.y, p.z).normalize_or_zero()
    }

    /// Value of the implicit function; zero on the surface.
    pub fn implicit(&self, p: Vec3) -> f64 {
        let a2 = self.major * self.major;
        let s = p.length_squared() + a2 - self.minor * self.minor;
        s * s - 4.0 * a2 * (p.x * p.x + p.y * p.y)
    }
}
