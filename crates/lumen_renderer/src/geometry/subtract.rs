//! CSG difference `a - b`.
//!
//! The ray is walked through the surface crossings of both children in order.
//! Whether the ray is inside a child is read off the orientation of that
//! child's next crossing. A crossing is visible when it changes membership in
//! `a - b`: crossings of `a` count while the ray is outside `b`, crossings of
//! `b` while it is inside `a`. The latter bound the cavity `b` carves out of
//! `a`, so they are reported with the normal flipped and `a`'s material.
//!
//! Only the first few crossings are resolved. Rays that cross the children
//! more often than that without finding a visible surface report no hit.

use lumen_math::{Ray, Vec3, RAY_EPSILON};

use super::{GeometryArena, GeometryId};
use crate::intersection::Intersection;
use crate::scene::MaterialId;

/// A torus alone meets a line four times; allow that for each child.
const MAX_CROSSINGS: usize = 8;

pub(crate) fn intersect(
    arena: &GeometryArena,
    a: GeometryId,
    b: GeometryId,
    ray: &Ray,
    material: MaterialId,
) -> Option<Intersection> {
    let a = arena.get(a);
    let b = arena.get(b);
    let a_material = a.resolved_material(material);
    let direction = ray.direction;

    // Nothing of a - b can be visible along a ray that never meets a
    let mut next_a = Some(a.intersect(arena, ray, material)?);
    let mut next_b = b.intersect(arena, ray, material);

    // Distance from the ray origin to the current probe origin
    let mut offset = 0.0;

    for _ in 0..MAX_CROSSINGS {
        let t = match (next_a, next_b) {
            (None, None) => return None,
            (Some(hit), None) | (None, Some(hit)) => hit.t,
            (Some(hit_a), Some(hit_b)) => hit_a.t.min(hit_b.t),
        };

        // Coincident faces of a and b are crossed together
        let cross_a = next_a.filter(|hit| hit.t - t <= RAY_EPSILON);
        let cross_b = next_b.filter(|hit| hit.t - t <= RAY_EPSILON);

        let inside_a = is_inside(next_a, direction);
        let inside_b = is_inside(next_b, direction);
        let after_a = cross_a.map_or(inside_a, |hit| hit.is_entering(direction));
        let after_b = cross_b.map_or(inside_b, |hit| hit.is_entering(direction));

        if (inside_a && !inside_b) != (after_a && !after_b) {
            return match (cross_a, cross_b) {
                (Some(hit), _) => Some(Intersection {
                    t: offset + hit.t,
                    ..hit
                }),
                (None, Some(hit)) => Some(Intersection::new(
                    offset + hit.t,
                    -hit.normal,
                    a_material,
                )),
                (None, None) => None,
            };
        }

        // Step past the hidden crossing and look again
        offset += t + RAY_EPSILON;
        let probe = Ray::new(ray.at(offset), direction);
        next_a = a.intersect(arena, &probe, material);
        next_b = b.intersect(arena, &probe, material);
    }

    None
}

/// A closed solid contains the ray origin when its next crossing leaves it.
fn is_inside(next: Option<Intersection>, direction: Vec3) -> bool {
    next.is_some_and(|hit| !hit.is_entering(direction))
}
