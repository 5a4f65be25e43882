//! Surface materials for Phong shading and dielectric refraction.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// RGB color with components nominally in [0, 1].
pub type Color = Vec3;

/// A Phong material.
///
/// Every coefficient is an RGB triple. Values outside [0, 1] are accepted and
/// simply scale the corresponding term. Materials are immutable once a scene is
/// built and are shared between objects by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Emissive color, added regardless of lighting
    pub ke: Color,

    /// Ambient reflectance
    pub ka: Color,

    /// Diffuse reflectance
    pub kd: Color,

    /// Specular reflectance
    pub ks: Color,

    /// Mirror reflectance, weights the reflected ray
    pub kr: Color,

    /// Transmittance, weights the refracted ray and lets light through shadows
    pub kt: Color,

    /// Specular exponent in [0, 1]; scaled by 128 when shading
    pub shininess: f64,

    /// Refractive index of the medium behind the surface
    pub index: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ke: Color::ZERO,
            ka: Color::ZERO,
            kd: Color::ZERO,
            ks: Color::ZERO,
            kr: Color::ZERO,
            kt: Color::ZERO,
            shininess: 0.0,
            index: 1.0,
        }
    }
}

impl Material {
    /// A plain diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Default::default()
        }
    }

    /// A clear dielectric: fully transmissive with a touch of mirror reflection.
    pub fn glass(index: f64) -> Self {
        Self {
            ks: Color::splat(0.8),
            kr: Color::splat(0.1),
            kt: Color::splat(0.9),
            shininess: 1.0,
            index,
            ..Default::default()
        }
    }

    /// True if the material lets no light through.
    pub fn is_opaque(&self) -> bool {
        self.kt == Color::ZERO
    }

    /// Check that the refractive index is usable for Snell's law.
    pub fn has_valid_index(&self) -> bool {
        self.index.is_finite() && self.index > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_black_vacuum() {
        let m = Material::default();
        assert_eq!(m.kd, Color::ZERO);
        assert_eq!(m.index, 1.0);
        assert!(m.is_opaque());
        assert!(m.has_valid_index());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let m: Material = serde_json::from_str(r#"{ "kd": [0.2, 0.4, 0.6], "index": 1.5 }"#).unwrap();
        assert_eq!(m.kd, Color::new(0.2, 0.4, 0.6));
        assert_eq!(m.index, 1.5);
        assert_eq!(m.ks, Color::ZERO);
        assert_eq!(m.shininess, 0.0);
    }

    #[test]
    fn test_glass_is_transmissive() {
        let glass = Material::glass(1.5);
        assert!(!glass.is_opaque());
        assert_eq!(glass.index, 1.5);
    }

    #[test]
    fn test_invalid_index() {
        let m = Material {
            index: 0.0,
            ..Default::default()
        };
        assert!(!m.has_valid_index());
    }
}
