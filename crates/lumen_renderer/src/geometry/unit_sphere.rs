//! The unit sphere at the origin.

use lumen_math::{Ray, RAY_EPSILON};

use crate::intersection::LocalHit;

pub(crate) fn intersect(ray: &Ray) -> Option<LocalHit> {
    let oc = ray.origin;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - 1.0;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    // Find the nearest root ahead of the origin
    let mut root = (-half_b - sqrtd) / a;
    if root <= RAY_EPSILON {
        root = (-half_b + sqrtd) / a;
        if root <= RAY_EPSILON {
            return None;
        }
    }

    Some(LocalHit::new(root, ray.at(root)))
}
