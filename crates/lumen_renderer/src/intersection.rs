//! Ray/geometry hit records.

use lumen_math::Vec3;

use crate::scene::MaterialId;

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Distance along the ray that produced the hit (always > 0)
    pub t: f64,
    /// Outward surface normal at the hit, unit length
    pub normal: Vec3,
    /// Material to shade the hit with
    pub material: MaterialId,
}

impl Intersection {
    pub fn new(t: f64, normal: Vec3, material: MaterialId) -> Self {
        Self { t, normal, material }
    }

    /// True if a ray travelling along `direction` crosses this surface from
    /// outside to inside.
    #[inline]
    pub fn is_entering(&self, direction: Vec3) -> bool {
        direction.dot(self.normal) < 0.0
    }
}

/// A hit in a primitive's local frame, before the material is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LocalHit {
    pub t: f64,
    pub normal: Vec3,
}

impl LocalHit {
    pub fn new(t: f64, normal: Vec3) -> Self {
        Self { t, normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_entering() {
        let hit = Intersection::new(1.0, Vec3::Z, MaterialId(0));
        assert!(hit.is_entering(Vec3::NEG_Z));
        assert!(!hit.is_entering(Vec3::Z));
    }
}
