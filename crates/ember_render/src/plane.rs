//! Infinite plane primitive.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};

/// UV tiling scale: world units per texture repeat.
const UV_SCALE: f32 = 0.1;

/// An infinite plane through `point` with the given normal.
pub struct Plane {
    point: Point3,
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Plane {
    /// Create a new plane. The normal need not be unit length.
    pub fn new(point: Point3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
        }
    }

    /// Tangent axes for UV projection, chosen from whichever world axis
    /// is least aligned with the normal.
    fn tangent_axes(&self) -> (Vec3, Vec3) {
        let u_axis = if self.normal.x.abs() < 0.9 {
            self.normal.cross(Vec3::X).normalize()
        } else {
            self.normal.cross(Vec3::Y).normalize()
        };
        let v_axis = self.normal.cross(u_axis).normalize();
        (u_axis, v_axis)
    }

    /// Planar UV mapping: project onto the tangent axes and wrap to [0, 1).
    fn compute_uv(&self, point: Point3) -> (f32, f32) {
        let (u_axis, v_axis) = self.tangent_axes();
        let local = point - self.point;

        let u = local.dot(u_axis) * UV_SCALE;
        let v = local.dot(v_axis) * UV_SCALE;

        (u - u.floor(), v - v.floor())
    }
}

impl Hittable for Plane {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let denominator = ray.direction().dot(self.normal);

        // Ray is parallel to the plane
        if denominator.abs() < 1e-8 {
            return false;
        }

        let t = (self.point - ray.origin()).dot(self.normal) / denominator;
        if !ray_t.contains(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        (rec.u, rec.v) = self.compute_uv(rec.p);
        let (tangent, bitangent) = self.tangent_axes();
        rec.set_tangent_frame(tangent, bitangent);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        // Unbounded: the scene keeps planes out of BVH builds
        Aabb::UNIVERSE
    }
}
