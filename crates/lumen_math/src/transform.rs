// Object/world helpers on top of glam's transform_point3 and inverse.

use crate::{Aabb, Mat3, Mat4, Vec3};

/// Smallest determinant accepted for an object transform.
const MIN_DETERMINANT: f64 = 1.0e-12;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Matrix that carries surface normals through this transform
    /// (inverse transpose of the upper 3x3).
    fn normal_matrix(&self) -> Mat3;

    /// World box around the 8 transformed corners of `aabb`.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// True if the matrix can be inverted without blowing up.
    fn is_invertible(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(*self).inverse().transpose()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());
        let corner = |i: usize| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        };

        let first = self.transform_point3(lo);
        let (min, max) = (1..8)
            .map(|i| self.transform_point3(corner(i)))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

        Aabb::from_points(min, max)
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > MIN_DETERMINANT
    }
}
