//! Serializable scene description.
//!
//! This is the on-disk form of a scene: a camera, named materials, a list of
//! objects (primitives and CSG nodes) and lights. It carries no derived state;
//! the renderer turns it into an intersectable scene.
//!
//! ```json
//! {
//!   "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0], "fov": 30 },
//!   "materials": { "red": { "kd": [0.8, 0.1, 0.1] } },
//!   "objects": [
//!     { "shape": "sphere", "material": "red",
//!       "transform": { "translate": [0, 0, -1], "scale": [2, 2, 2] } },
//!     { "shape": "torus", "major_radius": 2.0, "minor_radius": 0.5 }
//!   ],
//!   "lights": [ { "type": "point", "position": [5, 5, 5], "color": [1, 1, 1] } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use lumen_math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RenderConfig;
use crate::material::{Color, Material};

/// Errors that can occur while loading or building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Transform is not invertible: {0}")]
    NonInvertibleTransform(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A complete scene as read from a file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: CameraDesc,

    /// Materials referenced by name from objects
    pub materials: BTreeMap<String, Material>,

    pub objects: Vec<ObjectDesc>,

    pub lights: Vec<LightDesc>,

    /// Render settings stored with the scene; explicit caller settings win
    pub render: Option<RenderConfig>,
}

impl SceneDescription {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a description file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let description = Self::from_json(&json)?;

        log::info!(
            "Loaded scene description {}: {} materials, {} objects, {} lights",
            path.display(),
            description.materials.len(),
            description.objects.len(),
            description.lights.len()
        );

        Ok(description)
    }
}

/// Pinhole camera placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f64,
    /// Width over height of the image plane
    pub aspect_ratio: f64,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 30.0,
            aspect_ratio: 1.0,
        }
    }
}

/// Material of an object: a name from the material table or an inline value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialRef {
    Named(String),
    Inline(Material),
}

/// One object: a shape, its placement and its material.
///
/// CSG children without a material inherit the one of their parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(flatten)]
    pub shape: ShapeDesc,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialRef>,

    #[serde(default)]
    pub transform: TransformDesc,
}

impl ObjectDesc {
    /// An untransformed object without a material.
    pub fn new(shape: ShapeDesc) -> Self {
        Self {
            shape,
            material: None,
            transform: TransformDesc::default(),
        }
    }

    pub fn with_material(mut self, material: MaterialRef) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_transform(mut self, transform: TransformDesc) -> Self {
        self.transform = transform;
        self
    }
}

/// Shape of an object, in its local frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDesc {
    /// Unit box `[-0.5, 0.5]^3`
    Box,

    /// Unit sphere at the origin
    Sphere,

    /// Torus around the Z axis, ring in the XY plane
    Torus { major_radius: f64, minor_radius: f64 },

    /// Triangle mesh; normals are generated when not given
    Mesh {
        vertices: Vec<Vec3>,
        faces: Vec<[usize; 3]>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        normals: Vec<Vec3>,
    },

    /// `a` minus `b`
    Subtract {
        a: std::boxed::Box<ObjectDesc>,
        b: std::boxed::Box<ObjectDesc>,
    },
}

/// Rotation about an axis, in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationDesc {
    pub axis: Vec3,
    pub angle: f64,
}

/// Placement of an object, applied as scale, then rotate, then translate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    pub translate: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<RotationDesc>,
    pub scale: Vec3,
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translate: Vec3::ZERO,
            rotate: None,
            scale: Vec3::ONE,
        }
    }
}

impl TransformDesc {
    pub fn translation(translate: Vec3) -> Self {
        Self {
            translate,
            ..Default::default()
        }
    }

    /// Object-to-parent matrix, `T * R * S`.
    pub fn matrix(&self) -> Mat4 {
        let rotation = self
            .rotate
            .as_ref()
            .and_then(|r| {
                let axis = r.axis.normalize_or_zero();
                (axis != Vec3::ZERO).then(|| Quat::from_axis_angle(axis, r.angle.to_radians()))
            })
            .unwrap_or(Quat::IDENTITY);

        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translate)
    }
}

fn white() -> Color {
    Color::ONE
}

/// A light source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDesc {
    /// Parallel light travelling along `direction`
    Directional {
        direction: Vec3,
        #[serde(default = "white")]
        color: Color,
    },

    /// Omnidirectional light with `[constant, linear, quadratic]` falloff
    Point {
        position: Vec3,
        #[serde(default = "white")]
        color: Color,
        #[serde(default)]
        attenuation: [f64; 3],
    },

    /// Cone light; `cone_angle` is the half angle in degrees
    Spot {
        position: Vec3,
        direction: Vec3,
        #[serde(default = "white")]
        color: Color,
        cone_angle: f64,
        #[serde(default)]
        focus: f64,
        #[serde(default)]
        attenuation: [f64; 3],
    },

    /// Uniform light with no direction
    Ambient {
        #[serde(default = "white")]
        color: Color,
    },
}
