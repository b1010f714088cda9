//! Indexed triangle mesh.
//!
//! Faces index into a vertex buffer shared across the whole mesh, and
//! intersection queries go through a per-mesh BVH over the faces.

use std::sync::Arc;

use crate::triangle::intersect_triangle;
use crate::{BvhNode, HitRecord, Hittable, Material};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

/// A triangle mesh with a shared vertex buffer and indexed faces.
pub struct Mesh {
    faces: Option<BvhNode>,
    bbox: Aabb,
}

/// One face of a mesh, borrowing the shared vertex buffer.
struct MeshFace {
    vertices: Arc<Vec<Point3>>,
    face: [u32; 3],
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Mesh {
    /// Create a mesh from vertices and triangular faces.
    ///
    /// Faces with out-of-range indices or zero area are dropped with a
    /// warning. The rng drives the split-axis choices of the interior
    /// BVH build.
    pub fn new(
        vertices: Vec<Point3>,
        faces: Vec<[u32; 3]>,
        material: Arc<dyn Material>,
        rng: &mut dyn RngCore,
    ) -> Self {
        let vertices = Arc::new(vertices);
        let mut triangles: Vec<Arc<dyn Hittable>> = Vec::with_capacity(faces.len());

        for face in faces {
            match MeshFace::new(vertices.clone(), face, material.clone()) {
                Some(tri) => triangles.push(Arc::new(tri)),
                None => log::warn!(
                    "Dropping invalid mesh face {:?}, vertex count: {}",
                    face,
                    vertices.len()
                ),
            }
        }

        if triangles.is_empty() {
            log::warn!("Mesh has no valid faces");
            return Self {
                faces: None,
                bbox: Aabb::EMPTY,
            };
        }

        let bbox = triangles
            .iter()
            .map(|t| t.bounding_box())
            .reduce(|a, b| Aabb::surrounding(&a, &b))
            .unwrap_or(Aabb::EMPTY);

        Self {
            faces: Some(BvhNode::new(triangles, rng)),
            bbox,
        }
    }

    /// True if no valid face survived construction.
    pub fn is_empty(&self) -> bool {
        self.faces.is_none()
    }
}

impl Hittable for Mesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match &self.faces {
            Some(bvh) => bvh.hit(ray, ray_t, rec),
            None => false,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

impl MeshFace {
    /// Validate a face against the vertex buffer.
    fn new(vertices: Arc<Vec<Point3>>, face: [u32; 3], material: Arc<dyn Material>) -> Option<Self> {
        let count = vertices.len();
        if face.iter().any(|&i| i as usize >= count) {
            return None;
        }

        let [v0, v1, v2] = Self::positions(&vertices, face);
        let cross = (v1 - v0).cross(v2 - v0);
        if cross.length_squared() < 1e-12 {
            // Degenerate face: no area, no normal
            return None;
        }
        let normal = cross.normalize();

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let delta = 0.0001;
        let bbox = Aabb::from_points(min - Vec3::splat(delta), max + Vec3::splat(delta));

        Some(Self {
            vertices,
            face,
            normal,
            material,
            bbox,
        })
    }

    #[inline]
    fn positions(vertices: &[Point3], face: [u32; 3]) -> [Point3; 3] {
        [
            vertices[face[0] as usize],
            vertices[face[1] as usize],
            vertices[face[2] as usize],
        ]
    }
}

impl Hittable for MeshFace {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let [v0, v1, v2] = Self::positions(&self.vertices, self.face);
        let Some((t, u, v)) = intersect_triangle(ray, v0, v1, v2, ray_t) else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.u = u;
        rec.v = v;
        let tangent = (v1 - v0).normalize();
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    fn quad_mesh(rng: &mut StdRng) -> Mesh {
        // Unit quad in the XY plane at z = 0, two triangles
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        Mesh::new(vertices, faces, gray(), rng)
    }

    #[test]
    fn test_mesh_hit_closest_face() {
        let mut rng = StdRng::seed_from_u64(1);
        let mesh = quad_mesh(&mut rng);

        let ray = Ray::new(Vec3::new(0.5, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(mesh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 2.0).abs() < 1e-4);
        // Normal opposes the incoming ray
        assert!(rec.normal.z > 0.0);
    }

    #[test]
    fn test_mesh_miss_outside_quad() {
        let mut rng = StdRng::seed_from_u64(2);
        let mesh = quad_mesh(&mut rng);

        let ray = Ray::new(Vec3::new(3.0, 3.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(!mesh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_mesh_drops_invalid_faces() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        // One good face, one out of range, one degenerate
        let faces = vec![[0, 1, 2], [0, 1, 9], [0, 0, 1]];

        let mut rng = StdRng::seed_from_u64(3);
        let mesh = Mesh::new(vertices, faces, gray(), &mut rng);
        assert!(!mesh.is_empty());

        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(mesh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let mut rng = StdRng::seed_from_u64(4);
        let mesh = Mesh::new(Vec::new(), vec![[0, 1, 2]], gray(), &mut rng);
        assert!(mesh.is_empty());

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(!mesh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_mesh_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mesh = quad_mesh(&mut rng);

        let bbox = mesh.bounding_box();
        assert!(bbox.is_finite());
        assert!(bbox.x.min <= 0.0 && bbox.x.max >= 1.0);
        assert!(bbox.y.min <= 0.0 && bbox.y.max >= 1.0);
    }
}
