use crate::Vec3;

/// A geometric ray: an origin and a direction.
///
/// This is the bare form used by intersection tests. The tracer wraps it with
/// the per-ray medium stack it needs for refraction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// The direction is not normalized; `t` is measured in its units.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same line traversed in the opposite direction, starting at `at(t)`.
    pub fn reversed_from(&self, t: f64) -> Ray {
        Ray::new(self.at(t), -self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_scales_with_direction_length() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -2.0));

        assert_eq!(ray.at(0.0), ray.origin);
        assert_eq!(ray.at(1.5), Vec3::new(0.0, 1.0, -3.0));
        assert_eq!(ray.at(-0.5), Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_reversed_from() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);
        let back = ray.reversed_from(4.0);

        assert_eq!(back.origin, Vec3::new(1.0, 6.0, 3.0));
        assert_eq!(back.direction, -Vec3::Y);
        assert_eq!(back.at(4.0), ray.origin);
    }
}
