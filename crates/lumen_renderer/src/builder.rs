//! Build an intersectable [`Scene`] from a [`SceneDescription`].

use std::collections::HashMap;

use lumen_core::{
    CameraDesc, LightDesc, Material, MaterialRef, ObjectDesc, SceneDescription, SceneError,
    SceneResult, ShapeDesc,
};
use lumen_math::Mat4Ext;

use crate::camera::Camera;
use crate::geometry::{Geometry, GeometryId, Shape, Torus, Trimesh};
use crate::light::{Attenuation, Light};
use crate::scene::{MaterialId, Scene};

/// Build and initialize a scene.
///
/// Fails on references to unknown materials and on parameters no renderer
/// could use: non-positive refractive indices or torus radii, malformed
/// meshes and transforms that cannot be inverted.
pub fn build_scene(description: &SceneDescription) -> SceneResult<Scene> {
    let mut builder = SceneBuilder {
        scene: Scene::new(build_camera(&description.camera)),
        named: HashMap::new(),
    };

    for (name, material) in &description.materials {
        let id = builder.add_material(name, material)?;
        builder.named.insert(name.clone(), id);
    }

    for object in &description.objects {
        let geometry = builder.build_geometry(object)?;
        builder.scene.add_object(geometry);
    }

    for light in &description.lights {
        builder.scene.add_light(build_light(light));
    }

    let mut scene = builder.scene;
    scene.init_scene();
    Ok(scene)
}

fn build_camera(desc: &CameraDesc) -> Camera {
    Camera::new()
        .with_position(desc.position, desc.look_at, desc.up)
        .with_fov(desc.fov)
        .with_aspect_ratio(desc.aspect_ratio)
}

fn build_light(desc: &LightDesc) -> Light {
    match desc {
        LightDesc::Directional { direction, color } => Light::directional(*direction, *color),
        LightDesc::Point {
            position,
            color,
            attenuation,
        } => Light::point(*position, *color).with_attenuation(Attenuation::from(*attenuation)),
        LightDesc::Spot {
            position,
            direction,
            color,
            cone_angle,
            focus,
            attenuation,
        } => Light::spot(*position, *direction, *color, *cone_angle, *focus)
            .with_attenuation(Attenuation::from(*attenuation)),
        LightDesc::Ambient { color } => Light::ambient(*color),
    }
}

struct SceneBuilder {
    scene: Scene,
    named: HashMap<String, MaterialId>,
}

impl SceneBuilder {
    fn add_material(&mut self, name: &str, material: &Material) -> SceneResult<MaterialId> {
        if !material.has_valid_index() {
            return Err(SceneError::InvalidParameter(format!(
                "material '{}' has refractive index {}",
                name, material.index
            )));
        }
        Ok(self.scene.add_material(material.clone()))
    }

    fn resolve_material(&mut self, material: &MaterialRef) -> SceneResult<MaterialId> {
        match material {
            MaterialRef::Named(name) => self
                .named
                .get(name)
                .copied()
                .ok_or_else(|| SceneError::UnknownMaterial(name.clone())),
            MaterialRef::Inline(material) => self.add_material("<inline>", material),
        }
    }

    /// Build one object. CSG children are added to the arena as they are
    /// built; the returned node is left for the caller to place.
    fn build_geometry(&mut self, desc: &ObjectDesc) -> SceneResult<Geometry> {
        let shape = match &desc.shape {
            ShapeDesc::Box => Shape::Box,
            ShapeDesc::Sphere => Shape::Sphere,
            ShapeDesc::Torus {
                major_radius,
                minor_radius,
            } => {
                if !(*major_radius > 0.0 && *minor_radius > 0.0) {
                    return Err(SceneError::InvalidParameter(format!(
                        "torus radii must be positive, got {} and {}",
                        major_radius, minor_radius
                    )));
                }
                Shape::Torus(Torus::new(*major_radius, *minor_radius))
            }
            ShapeDesc::Mesh {
                vertices,
                faces,
                normals,
            } => {
                let mut mesh = Trimesh::new(vertices.clone(), faces.clone())?;
                if normals.is_empty() {
                    mesh.generate_normals();
                } else {
                    mesh = mesh.with_normals(normals.clone())?;
                }
                Shape::Mesh(mesh)
            }
            ShapeDesc::Subtract { a, b } => {
                let a = self.build_child(a)?;
                let b = self.build_child(b)?;
                Shape::Subtract { a, b }
            }
        };

        let transform = desc.transform.matrix();
        if !transform.is_invertible() {
            return Err(SceneError::NonInvertibleTransform(format!(
                "{:?}",
                desc.transform
            )));
        }

        let mut geometry = Geometry::new(shape).with_transform(transform);
        if let Some(material) = &desc.material {
            geometry = geometry.with_material(self.resolve_material(material)?);
        }
        log::debug!("Built {}", shape_name(&desc.shape));
        Ok(geometry)
    }

    fn build_child(&mut self, desc: &ObjectDesc) -> SceneResult<GeometryId> {
        let geometry = self.build_geometry(desc)?;
        Ok(self.scene.add_child(geometry))
    }
}

fn shape_name(shape: &ShapeDesc) -> &'static str {
    match shape {
        ShapeDesc::Box => "box",
        ShapeDesc::Sphere => "sphere",
        ShapeDesc::Torus { .. } => "torus",
        ShapeDesc::Mesh { .. } => "mesh",
        ShapeDesc::Subtract { .. } => "subtract",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Color;
    use lumen_math::{Ray, Vec3};

    fn build(json: &str) -> SceneResult<Scene> {
        build_scene(&SceneDescription::from_json(json).unwrap())
    }

    #[test]
    fn test_build_full_scene() {
        let scene = build(
            r#"{
                "camera": { "position": [0, 0, 10], "look_at": [0, 0, 0] },
                "materials": { "red": { "kd": [0.8, 0.1, 0.1] } },
                "objects": [
                    { "shape": "sphere", "material": "red" },
                    { "shape": "torus", "major_radius": 2, "minor_radius": 0.5,
                      "transform": { "translate": [0, 0, -5] } },
                    { "shape": "subtract", "material": { "kd": [0, 1, 0] },
                      "a": { "shape": "box" },
                      "b": { "shape": "box", "transform": { "translate": [0.4, 0, 0] } },
                      "transform": { "translate": [5, 0, 0] } },
                    { "shape": "mesh", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 2]],
                      "transform": { "translate": [-5, 0, 0] } }
                ],
                "lights": [
                    { "type": "ambient", "color": [0.1, 0.1, 0.1] },
                    { "type": "point", "position": [0, 5, 5] }
                ]
            }"#,
        )
        .unwrap();

        assert!(scene.is_initialized());
        assert_eq!(scene.object_count(), 4);
        assert_eq!(scene.bounded_objects().len(), 3);
        assert_eq!(scene.unbounded_objects().len(), 1);
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.camera().eye(), Vec3::new(0.0, 0.0, 10.0));

        // Named material on the sphere
        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z))
            .unwrap();
        assert!((hit.t - 9.0).abs() < 1e-9);
        assert_eq!(scene.material(hit.material).kd, Color::new(0.8, 0.1, 0.1));

        // CSG children inherit the inline material of the subtract node
        let hit = scene
            .intersect(&Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::X))
            .unwrap();
        assert!((hit.t - 2.5).abs() < 1e-9);
        assert_eq!(scene.material(hit.material).kd, Color::Y);
    }

    #[test]
    fn test_unknown_material() {
        let result = build(r#"{ "objects": [ { "shape": "box", "material": "chrome" } ] }"#);
        assert!(matches!(result, Err(SceneError::UnknownMaterial(name)) if name == "chrome"));
    }

    #[test]
    fn test_invalid_parameters() {
        let bad_index = build(r#"{ "materials": { "void": { "index": 0 } } }"#);
        assert!(matches!(bad_index, Err(SceneError::InvalidParameter(_))));

        let bad_torus = build(
            r#"{ "objects": [ { "shape": "torus", "major_radius": 1, "minor_radius": -0.5 } ] }"#,
        );
        assert!(matches!(bad_torus, Err(SceneError::InvalidParameter(_))));

        let bad_mesh = build(
            r#"{ "objects": [ { "shape": "mesh", "vertices": [[0, 0, 0]], "faces": [[0, 1, 2]] } ] }"#,
        );
        assert!(matches!(bad_mesh, Err(SceneError::InvalidParameter(_))));
    }

    #[test]
    fn test_flat_scale_is_rejected() {
        let result = build(
            r#"{ "objects": [ { "shape": "box", "transform": { "scale": [1, 0, 1] } } ] }"#,
        );
        assert!(matches!(result, Err(SceneError::NonInvertibleTransform(_))));
    }

    #[test]
    fn test_lights_are_converted() {
        let scene = build(
            r#"{ "lights": [
                { "type": "directional", "direction": [0, -2, 0], "color": [1, 0, 0] },
                { "type": "spot", "position": [0, 4, 0], "direction": [0, -1, 0], "cone_angle": 30, "focus": 1,
                  "attenuation": [2, 0, 0] }
            ] }"#,
        )
        .unwrap();

        let lights = scene.lights();
        assert_eq!(lights[0].direction(Vec3::ZERO), Vec3::Y);
        assert_eq!(lights[0].color(), Color::X);
        assert!((lights[1].distance_attenuation(Vec3::ZERO) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_scenes_build() {
        for json in [
            include_str!("../../../scenes/glass.json"),
            include_str!("../../../scenes/csg.json"),
        ] {
            let description = SceneDescription::from_json(json).unwrap();
            let scene = build_scene(&description).unwrap();
            assert!(scene.object_count() > 0);
            assert!(description.render.is_some());
        }
    }
}
