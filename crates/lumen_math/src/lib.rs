// Re-export glam for convenience
pub use glam::*;

// The tracer works in double precision throughout; these shadow the f32 glam names.
pub type Vec3 = DVec3;
pub type Vec2 = DVec2;
pub type Mat3 = DMat3;
pub type Mat4 = DMat4;
pub type Quat = DQuat;

// Lumen math types
mod aabb;
mod interval;
mod ray;
pub mod roots;
mod transform;

pub use aabb::{Aabb, SlabHit};
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Offset applied along a ray before re-casting from a surface point.
pub const RAY_EPSILON: f64 = 1.0e-5;

/// Offset applied along a surface normal when spawning secondary rays.
pub const NORMAL_EPSILON: f64 = 1.0e-5;
