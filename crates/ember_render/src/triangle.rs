//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Point3,
    v1: Point3,
    v2: Point3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    /// Material
    material: Arc<dyn Material>,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Point3, v1: Point3, v2: Point3, material: Arc<dyn Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize();

        let bbox = Self::bounds(v0, v1, v2);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    fn bounds(v0: Point3, v1: Point3, v2: Point3) -> Aabb {
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);

        // Pad thin dimensions to avoid degenerate AABBs
        let delta = 0.0001;
        Aabb::from_points(min - Vec3::splat(delta), max + Vec3::splat(delta))
    }
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Returns `(t, u, v)` for a hit inside the parameter window, where u and
/// v are the barycentric coordinates. A near-zero determinant means the
/// ray is parallel and misses.
pub(crate) fn intersect_triangle(
    ray: &Ray,
    v0: Point3,
    v1: Point3,
    v2: Point3,
    ray_t: Interval,
) -> Option<(f32, f32, f32)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction().cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin() - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction().dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !ray_t.contains(t) {
        return None;
    }

    Some((t, u, v))
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let Some((t, u, v)) = intersect_triangle(ray, self.v0, self.v1, self.v2, ray_t) else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        // Barycentric coordinates double as UVs
        rec.u = u;
        rec.v = v;
        let tangent = (self.v1 - self.v0).normalize();
        rec.set_tangent_frame(tangent, self.normal.cross(tangent));
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Color, Lambertian};

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    #[test]
    fn test_triangle_hit_barycentric() {
        // Unit right triangle in the XY plane, ray straight down +Z -> -Z:
        // t = 1 and the barycentrics match the hit offset.
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            gray(),
        );

        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_outside_barycentric_misses() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            gray(),
        );

        // Beyond the hypotenuse: u + v > 1
        let ray = Ray::new(Vec3::new(0.75, 0.75, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_triangle_parallel_ray_misses() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            gray(),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_triangle_tangent_frame() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            gray(),
        );

        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        // Tangent follows edge1, bitangent completes the frame
        assert!((rec.tangent - Vec3::X).length() < 1e-5);
        assert!(rec.bitangent.dot(rec.tangent).abs() < 1e-5);
    }
}
