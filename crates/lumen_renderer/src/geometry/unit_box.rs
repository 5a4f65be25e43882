//! The unit box `[-0.5, 0.5]^3`.

use lumen_math::{Aabb, Ray, RAY_EPSILON};

use crate::intersection::LocalHit;

/// Intersect the unit box with a local-frame ray.
///
/// Reports the entry face when it lies ahead of the origin, and the exit face
/// when the ray starts inside the box.
pub(crate) fn intersect(ray: &Ray) -> Option<LocalHit> {
    let slab = Aabb::unit().intersect(ray)?;

    if slab.t_min > RAY_EPSILON {
        Some(LocalHit::new(slab.t_min, slab.normal))
    } else if slab.t_max > RAY_EPSILON {
        Some(LocalHit::new(slab.t_max, slab.exit_normal))
    } else {
        None
    }
}
