//! Lumen Renderer - recursive Whitted ray tracing
//!
//! A CPU ray tracer with Phong shading, mirror reflection and refraction
//! through nested dielectrics. Geometry lives in an arena of transformed
//! shapes: boxes, spheres, tori, triangle meshes and CSG differences.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::SceneDescription;
//! use lumen_renderer::{build_scene, RayTracer};
//! use rand::SeedableRng;
//!
//! let description = SceneDescription::load("scenes/glass.json")?;
//! let scene = build_scene(&description)?;
//! let mut tracer = RayTracer::new(scene, description.render.unwrap_or_default());
//! tracer.render(&mut rand::rngs::StdRng::seed_from_u64(0));
//! tracer.buffer().save("glass.png")?;
//! ```

mod builder;
mod camera;
pub mod geometry;
mod intersection;
mod light;
mod ray;
mod renderer;
mod scene;
mod shading;

pub use builder::build_scene;
pub use camera::Camera;
pub use geometry::{Geometry, GeometryArena, GeometryId, Shape, Torus, Trimesh};
pub use intersection::Intersection;
pub use light::{Attenuation, Light};
pub use ray::{MediumStack, Ray};
pub use renderer::{
    color_to_rgb, is_entering, reflect_dir, refract_dir, total_internal_reflection, FrameBuffer,
    RayTracer,
};
pub use scene::{MaterialId, Scene, DEFAULT_MATERIAL};
pub use shading::shade;

/// Re-export common types from lumen_core and lumen_math
pub use lumen_core::{Color, Material, RenderConfig};
pub use lumen_math::{Aabb, Vec3};
