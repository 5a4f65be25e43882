//! Phong local illumination.

use lumen_core::Color;

use crate::intersection::Intersection;
use crate::ray::Ray;
use crate::scene::Scene;

/// Shininess in [0, 1] maps onto Phong exponents up to this value.
const SHININESS_SCALE: f64 = 128.0;

/// Local illumination of a hit: emission, ambient, plus diffuse and specular
/// terms from every non-ambient light, each scaled by the light's color,
/// distance falloff and shadowing. The result is not clamped.
pub fn shade(scene: &Scene, ray: &Ray, isect: &Intersection) -> Color {
    let material = scene.material(isect.material);
    let point = ray.at(isect.t);
    let opacity = Color::ONE - material.kt;

    let mut result = material.ke + material.ka * scene.ambient() * opacity;

    let n = isect.normal;
    let v = -ray.direction();
    for light in scene.lights().iter().filter(|light| !light.is_ambient()) {
        let l = light.direction(point);
        let nl = n.dot(l);
        if nl <= 0.0 {
            continue;
        }

        let diffuse = material.kd * nl * opacity;

        let r = (2.0 * nl * n - l).normalize_or_zero();
        let rv = r.dot(v).max(0.0);
        let specular = material.ks * rv.powf(material.shininess * SHININESS_SCALE);

        let atten = light.shadow_attenuation(scene, point) * light.distance_attenuation(point);
        result += atten * light.color() * (diffuse + specular);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Shape};
    use crate::light::{Attenuation, Light};
    use lumen_core::Material;
    use lumen_math::Vec3;

    fn scene_with(material: Material, lights: Vec<Light>) -> Scene {
        let mut scene = Scene::default();
        let id = scene.add_material(material);
        scene.add_object(Geometry::new(Shape::Box).with_material(id));
        for light in lights {
            scene.add_light(light);
        }
        scene.init_scene();
        scene
    }

    fn hit_front(scene: &Scene) -> (Ray, Intersection) {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let isect = scene.intersect(&ray.geometric()).unwrap();
        (ray, isect)
    }

    #[test]
    fn test_ambient_only_is_exact() {
        let material = Material {
            ke: Color::new(0.1, 0.0, 0.0),
            ka: Color::new(0.5, 0.5, 1.0),
            kd: Color::ONE,
            kt: Color::new(0.0, 0.5, 0.0),
            ..Default::default()
        };
        let ambient = Color::new(0.2, 0.4, 0.6);
        let scene = scene_with(material.clone(), vec![Light::ambient(ambient)]);
        let (ray, isect) = hit_front(&scene);

        let expected = material.ke + material.ka * ambient * (Color::ONE - material.kt);
        assert_eq!(shade(&scene, &ray, &isect), expected);
    }

    #[test]
    fn test_diffuse_falls_off_with_angle() {
        let light = Light::directional(Vec3::new(0.0, -1.0, -1.0), Color::ONE);
        let scene = scene_with(Material::diffuse(Color::ONE), vec![light]);
        let (ray, isect) = hit_front(&scene);

        let expected = std::f64::consts::FRAC_1_SQRT_2;
        let color = shade(&scene, &ray, &isect);
        assert!((color - Color::splat(expected)).length() < 1e-12);
    }

    #[test]
    fn test_light_behind_surface_contributes_nothing() {
        let light = Light::point(Vec3::new(0.0, 0.0, -5.0), Color::ONE);
        let scene = scene_with(Material::diffuse(Color::ONE), vec![light]);
        let (ray, isect) = hit_front(&scene);

        assert_eq!(shade(&scene, &ray, &isect), Color::ZERO);
    }

    #[test]
    fn test_specular_highlight() {
        // Light straight behind the viewer: R == V, so the highlight is full
        let material = Material {
            ks: Color::splat(0.5),
            shininess: 0.5,
            ..Default::default()
        };
        let light = Light::point(Vec3::new(0.0, 0.0, 10.0), Color::ONE)
            .with_attenuation(Attenuation::new(2.0, 0.0, 0.0));
        let scene = scene_with(material, vec![light]);
        let (ray, isect) = hit_front(&scene);

        let color = shade(&scene, &ray, &isect);
        assert!((color - Color::splat(0.25)).length() < 1e-9);
    }
}
