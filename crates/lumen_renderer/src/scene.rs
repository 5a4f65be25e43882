//! The renderable scene.
//!
//! A scene owns its materials, its geometry arena, its lights and a camera.
//! Top-level objects are split by [`Scene::init_scene`] into those with a
//! bounding box and those without; [`Scene::intersect`] scans both lists.

use lumen_core::{Bitmap, Color, Material, SceneResult};
use lumen_math::{Aabb, Ray};

use crate::camera::Camera;
use crate::geometry::{Geometry, GeometryArena, GeometryId, Shape, Trimesh};
use crate::intersection::Intersection;
use crate::light::Light;

/// Handle of a material owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Material used by objects that neither have nor inherit one.
pub const DEFAULT_MATERIAL: MaterialId = MaterialId(0);

/// Diffuse grey given to height map terrain.
const HEIGHT_MAP_KD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Scene {
    camera: Camera,
    materials: Vec<Material>,
    geometry: GeometryArena,
    /// Top-level objects in insertion order
    objects: Vec<GeometryId>,
    bounded: Vec<GeometryId>,
    unbounded: Vec<GeometryId>,
    /// Union of the bounded objects' world boxes
    bounds: Option<Aabb>,
    lights: Vec<Light>,
    initialized: bool,
}

impl Scene {
    /// Create an empty scene seen through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            materials: vec![Material::default()],
            geometry: GeometryArena::new(),
            objects: Vec::new(),
            bounded: Vec::new(),
            unbounded: Vec::new(),
            bounds: None,
            lights: Vec::new(),
            initialized: false,
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Get a material. Ids are only issued by [`Scene::add_material`].
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    /// Add a node that is only reachable through a CSG parent.
    pub fn add_child(&mut self, geometry: Geometry) -> GeometryId {
        self.geometry.add(geometry)
    }

    /// Add a top-level object. The scene must be (re)initialized afterwards.
    pub fn add_object(&mut self, geometry: Geometry) -> GeometryId {
        let id = self.geometry.add(geometry);
        self.objects.push(id);
        self.initialized = false;
        id
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn geometry(&self) -> &GeometryArena {
        &self.geometry
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn bounded_objects(&self) -> &[GeometryId] {
        &self.bounded
    }

    pub fn unbounded_objects(&self) -> &[GeometryId] {
        &self.unbounded
    }

    /// World box around every bounded object, once initialized.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Split the objects into bounded and unbounded lists and accumulate the
    /// scene bounds. Rebuilds from scratch, so it can be run again after more
    /// objects are added.
    pub fn init_scene(&mut self) {
        self.bounded.clear();
        self.unbounded.clear();
        self.bounds = None;

        for &id in &self.objects {
            match self.geometry.get(id).bounding_box() {
                Some(bbox) => {
                    self.bounded.push(id);
                    self.bounds = Some(match self.bounds {
                        Some(bounds) => Aabb::surrounding(&bounds, &bbox),
                        None => bbox,
                    });
                }
                None => self.unbounded.push(id),
            }
        }
        self.initialized = true;

        log::info!(
            "Scene initialized: {} bounded, {} unbounded objects, {} lights",
            self.bounded.len(),
            self.unbounded.len(),
            self.lights.len()
        );
        log::debug!("Scene bounds: {:?}", self.bounds);
    }

    /// Nearest intersection along `ray` over every object.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        debug_assert!(self.initialized, "Scene::intersect called before init_scene");

        let mut closest: Option<Intersection> = None;
        for &id in self.unbounded.iter().chain(&self.bounded) {
            let Some(hit) = self.geometry.get(id).intersect(&self.geometry, ray, DEFAULT_MATERIAL) else {
                continue;
            };
            if closest.map_or(true, |best| hit.t < best.t) {
                closest = Some(hit);
            }
        }
        closest
    }

    /// Sum of the ambient lights' colors.
    pub fn ambient(&self) -> Color {
        self.lights
            .iter()
            .filter(|light| light.is_ambient())
            .map(|light| light.color())
            .sum()
    }

    /// Add terrain built from a height map as a bounded object.
    pub fn load_height_map(&mut self, bitmap: &Bitmap) -> SceneResult<GeometryId> {
        let mesh = Trimesh::from_height_map(bitmap)?;
        let material = self.add_material(Material::diffuse(Color::splat(HEIGHT_MAP_KD)));

        log::info!(
            "Height map: {}x{} -> {} triangles",
            bitmap.width,
            bitmap.height,
            mesh.face_count()
        );

        let was_initialized = self.initialized;
        let id = self.add_object(Geometry::new(Shape::Mesh(mesh)).with_material(material));
        if was_initialized {
            self.init_scene();
        }
        Ok(id)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::{Mat4, Vec3};

    fn two_boxes() -> Scene {
        let mut scene = Scene::default();
        let near = scene.add_material(Material::diffuse(Color::X));
        let far = scene.add_material(Material::diffuse(Color::Y));
        scene.add_object(
            Geometry::new(Shape::Box)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)))
                .with_material(near),
        );
        scene.add_object(
            Geometry::new(Shape::Box)
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)))
                .with_material(far),
        );
        scene.init_scene();
        scene
    }

    #[test]
    fn test_intersect_keeps_nearest() {
        let scene = two_boxes();
        let hit = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-9);
        assert_eq!(scene.material(hit.material).kd, Color::X);

        // From behind, the other box is nearer
        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z))
            .unwrap();
        assert!((hit.t - 4.5).abs() < 1e-9);
        assert_eq!(scene.material(hit.material).kd, Color::Y);
    }

    #[test]
    fn test_intersect_miss() {
        let scene = two_boxes();
        assert!(scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }

    #[test]
    fn test_init_scene_partitions_objects() {
        let mut scene = Scene::default();
        let a = scene.add_child(Geometry::new(Shape::Box));
        let b = scene.add_child(Geometry::new(Shape::Sphere));
        scene.add_object(Geometry::new(Shape::Subtract { a, b }));
        scene.add_object(Geometry::new(Shape::Sphere));
        scene.add_object(
            Geometry::new(Shape::Box).with_transform(Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0))),
        );

        scene.init_scene();
        assert_eq!(scene.unbounded_objects().len(), 1);
        assert_eq!(scene.bounded_objects().len(), 2);

        let bounds = scene.bounds().unwrap();
        assert!((bounds.min() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-9);
        assert!((bounds.max() - Vec3::new(3.5, 1.0, 1.0)).length() < 1e-9);

        // Running it again rebuilds rather than appends
        scene.init_scene();
        assert_eq!(scene.bounded_objects().len() + scene.unbounded_objects().len(), 3);
    }

    #[test]
    fn test_default_material_for_bare_objects() {
        let mut scene = Scene::default();
        scene.add_object(Geometry::new(Shape::Sphere));
        scene.init_scene();

        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z))
            .unwrap();
        assert_eq!(hit.material, DEFAULT_MATERIAL);
        assert_eq!(*scene.material(hit.material), Material::default());
    }

    #[test]
    fn test_load_height_map() {
        let mut scene = Scene::default();
        scene.init_scene();

        let bitmap = Bitmap::filled(4, 4, [128, 0, 0]).unwrap();
        let id = scene.load_height_map(&bitmap).unwrap();

        assert!(scene.is_initialized());
        assert_eq!(scene.bounded_objects(), &[id]);

        // Flat terrain at height 128/255, seen from above
        let hit = scene
            .intersect(&Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::NEG_Y))
            .unwrap();
        assert!((hit.t - (5.0 - 128.0 / 255.0)).abs() < 1e-9);
        assert!((hit.normal - Vec3::Y).length() < 1e-9);
        assert_eq!(scene.material(hit.material).kd, Color::splat(0.5));
    }

    #[test]
    fn test_ambient_sum() {
        let mut scene = Scene::default();
        scene.add_light(Light::ambient(Color::splat(0.1)));
        scene.add_light(Light::ambient(Color::new(0.2, 0.0, 0.0)));
        scene.add_light(Light::point(Vec3::ONE, Color::ONE));

        assert!((scene.ambient() - Color::new(0.3, 0.1, 0.1)).length() < 1e-12);
    }
}
