use crate::{Interval, Ray, Vec3};

/// Axis-aligned box, one closed interval per axis.
///
/// Serves as a rejection test around transformed objects and is the exact
/// shape of the unit box primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

/// Result of a slab test: the parametric entry/exit distances along the ray and the
/// outward face normals at those two crossings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlabHit {
    pub t_min: f64,
    pub t_max: f64,
    /// Normal of the face that produced `t_min`; points against the ray direction.
    pub normal: Vec3,
    /// Normal of the face that produced `t_max`; points along the ray direction.
    pub exit_normal: Vec3,
}

/// Thinnest extent a box may have along any axis.
const MIN_EXTENT: f64 = 1.0e-4;

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Box spanned by two opposite corners, in any order.
    ///
    /// Flat axes are widened to `MIN_EXTENT` so planar meshes still get a
    /// volume the slab test can hit.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let widen = |span: Interval| {
            if span.size() < MIN_EXTENT {
                span.expand(MIN_EXTENT)
            } else {
                span
            }
        };
        Self {
            x: widen(Interval::ordered(a.x, b.x)),
            y: widen(Interval::ordered(a.y, b.y)),
            z: widen(Interval::ordered(a.z, b.z)),
        }
    }

    /// Smallest box holding both inputs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&a.x, &b.x),
            y: Interval::surrounding(&a.y, &b.y),
            z: Interval::surrounding(&a.z, &b.z),
        }
    }

    /// The box `[-0.5, 0.5]^3`.
    pub fn unit() -> Self {
        Self::from_points(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Does the box contain this point?
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Slab-method ray/box test (Kay-Kajiya).
    ///
    /// Axes along which the ray direction is zero impose no constraint, unless the
    /// origin lies outside that slab, in which case the ray can never enter.
    /// Returns `None` when the running interval empties or lies entirely behind the
    /// origin, and for a zero direction.
    pub fn intersect(&self, r: &Ray) -> Option<SlabHit> {
        let mut span = Interval::UNBOUNDED;
        let mut normal = Vec3::ZERO;
        let mut exit_normal = Vec3::ZERO;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let vd = r.direction[axis];
            let origin = r.origin[axis];

            // Ray is parallel to this pair of planes
            if vd == 0.0 {
                if !slab.contains(origin) {
                    return None;
                }
                continue;
            }

            let t = Interval::ordered((slab.min - origin) / vd, (slab.max - origin) / vd);
            let facing = if vd < 0.0 { 1.0 } else { -1.0 };

            if t.min > span.min {
                span.min = t.min;
                normal = Vec3::ZERO;
                normal[axis] = facing;
            }
            if t.max < span.max {
                span.max = t.max;
                exit_normal = Vec3::ZERO;
                exit_normal[axis] = -facing;
            }

            if span.is_empty() || span.max < 0.0 {
                return None;
            }
        }

        // Zero direction: nothing was ever tightened
        if span.min == f64::NEG_INFINITY {
            return None;
        }

        Some(SlabHit {
            t_min: span.min,
            t_max: span.max,
            normal,
            exit_normal,
        })
    }
}
