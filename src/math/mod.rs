mod aabb;

pub use aabb::Aabb;

/// 3D point type used for mesh geometry.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type used for mesh geometry.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Single-precision 3D point, as uploaded to the GPU.
pub type Point3f = nalgebra::Point3<f32>;

/// Single-precision 3D vector, as uploaded to the GPU.
pub type Vector3f = nalgebra::Vector3<f32>;

/// Single-precision 4x4 matrix, as set on shader uniforms.
pub type Matrix4f = nalgebra::Matrix4<f32>;

/// A pointer position in window coordinates (origin at the top-left corner).
pub type ScreenPoint = nalgebra::Point2<f32>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
