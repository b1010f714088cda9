//! Ember path tracing core.
//!
//! A progressive Monte Carlo path tracer: primitives and a BVH for
//! closest-hit queries, scatter-based materials, sampled lights with
//! next-event estimation, and a sample-accumulating framebuffer.

mod bvh;
mod camera;
mod framebuffer;
mod hittable;
mod integrator;
mod light;
mod material;
mod mesh;
mod plane;
mod progressive;
mod scene;
mod sphere;
mod triangle;

pub mod sampling;
pub mod texture;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use framebuffer::Framebuffer;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::Integrator;
pub use light::{AreaLight, Light, LightSample, PointLight};
pub use material::{
    Color, Dielectric, Emissive, Lambertian, Material, Metal, ScatterResult, TexturedLambertian,
};
pub use mesh::Mesh;
pub use plane::Plane;
pub use progressive::ProgressiveRenderer;
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{CheckerTexture, ImageTexture, NormalMap, SolidColor, Texture, TextureError};
pub use triangle::Triangle;

/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
