//! Scene geometry: an arena of transformed shapes.
//!
//! Every node carries an object-to-parent transform and intersects in its own
//! local frame: the incoming ray is pulled into that frame, the shape is tested
//! there, and the hit is pushed back out with its distance rescaled so callers
//! always see distances along the ray they passed in.
//!
//! CSG nodes refer to their children by [`GeometryId`]; the arena owns every
//! node, so there is no shared ownership between parents and children.

mod subtract;
mod torus;
mod trimesh;
mod unit_box;
mod unit_sphere;

pub use torus::Torus;
pub use trimesh::Trimesh;

use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Vec3};

use crate::intersection::{Intersection, LocalHit};
use crate::scene::MaterialId;

/// Handle of a node in a [`GeometryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// The shape of a geometry node, in its local frame.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Unit box `[-0.5, 0.5]^3`
    Box,
    /// Unit sphere at the origin
    Sphere,
    Torus(Torus),
    Mesh(Trimesh),
    /// Everything in `a` that is not in `b`
    Subtract { a: GeometryId, b: GeometryId },
}

/// A shape placed in its parent's frame.
#[derive(Debug, Clone)]
pub struct Geometry {
    shape: Shape,
    /// Object-to-parent transform
    transform: Mat4,
    /// Parent-to-object transform
    inverse: Mat4,
    /// Carries local normals to the parent frame
    normal_matrix: Mat3,
    /// Own material; `None` inherits the parent's
    material: Option<MaterialId>,
}

impl Geometry {
    /// Create a node with an identity transform and no material of its own.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            transform: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            material: None,
        }
    }

    /// Set the object-to-parent transform. It must be invertible.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self.inverse = transform.inverse();
        self.normal_matrix = transform.normal_matrix();
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Own material, or the inherited one.
    pub fn resolved_material(&self, inherited: MaterialId) -> MaterialId {
        self.material.unwrap_or(inherited)
    }

    /// CSG nodes report no bounding box and are tested against every ray.
    pub fn has_bounding_box(&self) -> bool {
        !matches!(self.shape, Shape::Subtract { .. })
    }

    /// Bounding box in the local frame.
    pub fn local_bounding_box(&self) -> Option<Aabb> {
        match &self.shape {
            Shape::Box => Some(Aabb::unit()),
            Shape::Sphere => Some(Aabb::from_points(-Vec3::ONE, Vec3::ONE)),
            Shape::Torus(torus) => Some(torus.bounding_box()),
            Shape::Mesh(mesh) => Some(mesh.bounding_box()),
            Shape::Subtract { .. } => None,
        }
    }

    /// Bounding box in the parent frame.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.local_bounding_box()
            .map(|local| self.transform.transform_aabb(&local))
    }

    /// Intersect a ray given in the parent frame.
    ///
    /// Returns the nearest hit beyond a small epsilon, with `t` measured along
    /// `ray` and the normal in the parent frame.
    pub fn intersect(
        &self,
        arena: &GeometryArena,
        ray: &lumen_math::Ray,
        inherited: MaterialId,
    ) -> Option<Intersection> {
        // Transform the ray into the object's local frame
        let origin = self.inverse.transform_point3(ray.origin);
        let direction = self.inverse.transform_vector3(ray.direction);
        let length = direction.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        let local = lumen_math::Ray::new(origin, direction / length);

        let material = self.resolved_material(inherited);
        let hit = match &self.shape {
            Shape::Box => attach(unit_box::intersect(&local), material),
            Shape::Sphere => attach(unit_sphere::intersect(&local), material),
            Shape::Torus(torus) => attach(torus.intersect(&local), material),
            Shape::Mesh(mesh) => attach(mesh.intersect(&local), material),
            Shape::Subtract { a, b } => subtract::intersect(arena, *a, *b, &local, material),
        }?;

        Some(Intersection {
            t: hit.t / length,
            normal: (self.normal_matrix * hit.normal).normalize_or_zero(),
            material: hit.material,
        })
    }
}

fn attach(hit: Option<LocalHit>, material: MaterialId) -> Option<Intersection> {
    hit.map(|h| Intersection::new(h.t, h.normal, material))
}

/// Owner of every geometry node of a scene.
#[derive(Debug, Clone, Default)]
pub struct GeometryArena {
    nodes: Vec<Geometry>,
}

impl GeometryArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add(&mut self, geometry: Geometry) -> GeometryId {
        self.nodes.push(geometry);
        GeometryId(self.nodes.len() - 1)
    }

    /// Get a node. Ids only come from [`GeometryArena::add`], so they are
    /// always in range for the arena that issued them.
    pub fn get(&self, id: GeometryId) -> &Geometry {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, direction: Vec3) -> lumen_math::Ray {
        lumen_math::Ray::new(origin, direction)
    }

    #[test]
    fn test_translated_box() {
        let mut arena = GeometryArena::new();
        let id = arena.add(
            Geometry::new(Shape::Box)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0))),
        );

        let hit = arena
            .get(id)
            .intersect(&arena, &ray(Vec3::ZERO, Vec3::NEG_Z), MaterialId(0))
            .unwrap();
        assert!((hit.t - 2.5).abs() < 1e-9);
        assert!((hit.normal - Vec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_scaled_sphere_rescales_t() {
        let mut arena = GeometryArena::new();
        let id = arena.add(Geometry::new(Shape::Sphere).with_transform(Mat4::from_scale(Vec3::splat(2.0))));

        // Unit sphere scaled by 2: surface at distance 3 from (0, 0, 5)
        let hit = arena
            .get(id)
            .intersect(&arena, &ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z), MaterialId(0))
            .unwrap();
        assert!((hit.t - 3.0).abs() < 1e-9);

        // Unnormalized world direction: t is measured in its units
        let hit = arena
            .get(id)
            .intersect(&arena, &ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0)), MaterialId(0))
            .unwrap();
        assert!((hit.t - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_uniform_scale_normal() {
        let mut arena = GeometryArena::new();
        let id = arena.add(
            Geometry::new(Shape::Sphere).with_transform(Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0))),
        );

        // Hit the ellipsoid off-axis and check the normal against the implicit gradient
        let origin = Vec3::new(2.0, 0.5, 5.0);
        let hit = arena
            .get(id)
            .intersect(&arena, &ray(origin, Vec3::NEG_Z), MaterialId(0))
            .unwrap();
        let p = origin + hit.t * Vec3::NEG_Z;
        let gradient = Vec3::new(p.x / 16.0, p.y, p.z).normalize();
        assert!((hit.normal - gradient).length() < 1e-9);
    }

    #[test]
    fn test_material_inheritance() {
        let inherited = Geometry::new(Shape::Box);
        let own = Geometry::new(Shape::Box).with_material(MaterialId(3));

        assert_eq!(inherited.resolved_material(MaterialId(1)), MaterialId(1));
        assert_eq!(own.resolved_material(MaterialId(1)), MaterialId(3));
    }

    #[test]
    fn test_bounding_boxes() {
        let moved = Geometry::new(Shape::Box)
            .with_transform(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let bbox = moved.bounding_box().unwrap();
        assert!((bbox.min() - Vec3::new(0.5, -0.5, -0.5)).length() < 1e-9);

        let sphere = Geometry::new(Shape::Sphere).bounding_box().unwrap();
        assert!((sphere.max() - Vec3::ONE).length() < 1e-9);

        let mut arena = GeometryArena::new();
        let a = arena.add(Geometry::new(Shape::Box));
        let b = arena.add(Geometry::new(Shape::Sphere));
        let csg = Geometry::new(Shape::Subtract { a, b });
        assert!(!csg.has_bounding_box());
        assert!(csg.bounding_box().is_none());
    }

    #[test]
    fn test_zero_direction_misses() {
        let arena = GeometryArena::new();
        let geometry = Geometry::new(Shape::Box);
        assert!(geometry
            .intersect(&arena, &ray(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO), MaterialId(0))
            .is_none());
    }
}
