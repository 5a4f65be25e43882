//! Lumen Core - scene data shared by the renderer and its front ends.
//!
//! This crate provides:
//!
//! - **Materials**: Phong coefficients plus refractive index
//! - **Bitmaps**: RGB images for backgrounds and height maps
//! - **Scene descriptions**: the JSON form of a scene, before it is built
//! - **Render configuration**: the settings a render is driven by
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::SceneDescription;
//!
//! let description = SceneDescription::load("scenes/glass.json")?;
//! println!("{} objects, {} lights",
//!     description.objects.len(),
//!     description.lights.len());
//! ```

pub mod bitmap;
pub mod config;
pub mod description;
pub mod material;

// Re-export commonly used types
pub use bitmap::{Bitmap, BitmapError, BitmapResult};
pub use config::RenderConfig;
pub use description::{
    CameraDesc, LightDesc, MaterialRef, ObjectDesc, SceneDescription, SceneError, SceneResult,
    ShapeDesc, TransformDesc,
};
pub use material::{Color, Material};
