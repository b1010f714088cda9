//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};

/// A sphere primitive.
pub struct Sphere {
    center: Point3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Point3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    ///
    /// u comes from the azimuth around Y, v from the polar angle, both
    /// normalized to [0, 1].
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        let u = phi / (2.0 * PI);
        let v = theta / PI;
        (u, v)
    }

    /// Tangent frame from a reference axis not parallel to the normal.
    fn tangent_frame(outward_normal: Vec3) -> (Vec3, Vec3) {
        let reference = if outward_normal.x.abs() < 0.9 {
            Vec3::X
        } else {
            Vec3::Y
        };
        let tangent = outward_normal.cross(reference).normalize();
        let bitangent = outward_normal.cross(tangent);
        (tangent, bitangent)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - self.center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        let (tangent, bitangent) = Self::tangent_frame(outward_normal);
        rec.set_tangent_frame(tangent, bitangent);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
