//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over scene primitives. Each node is itself a
//! [`Hittable`], so the tree composes with lists and single primitives.
//! Children are shared references into scene-owned data: a single-object
//! range makes both children alias that object.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// An interior BVH node with two children and their enclosing box.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over the given objects.
    ///
    /// Every object must have a finite bounding box; unbounded primitives
    /// are a caller error, not a runtime condition. The split axis at
    /// each node is drawn uniformly from the rng.
    ///
    /// # Panics
    ///
    /// Panics if `objects` is empty.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        assert!(!objects.is_empty(), "cannot build a BVH over zero objects");
        Self::build(&mut objects, rng)
    }

    /// Recursive median split over a sub-range.
    fn build(objects: &mut [Arc<dyn Hittable>], rng: &mut dyn RngCore) -> Self {
        let axis: usize = rng.gen_range(0..3);

        let (left, right) = match objects.len() {
            1 => {
                // Leaf: both children alias the single primitive
                (objects[0].clone(), objects[0].clone())
            }
            2 => {
                if box_compare(&objects[0], &objects[1], axis) == Ordering::Greater {
                    (objects[1].clone(), objects[0].clone())
                } else {
                    (objects[0].clone(), objects[1].clone())
                }
            }
            _ => {
                // Stable sort: equal keys keep their input order
                objects.sort_by(|a, b| box_compare(a, b, axis));

                let mid = objects.len() / 2;
                let (front, back) = objects.split_at_mut(mid);
                let left: Arc<dyn Hittable> = Arc::new(Self::build(front, rng));
                let right: Arc<dyn Hittable> = Arc::new(Self::build(back, rng));
                (left, right)
            }
        };

        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
        debug_assert!(bbox.is_finite(), "BVH built over an unbounded primitive");

        Self { left, right, bbox }
    }
}

/// Order two objects by bounding-box minimum along an axis.
fn box_compare(a: &Arc<dyn Hittable>, b: &Arc<dyn Hittable>, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let hit_left = self.left.hit(ray, ray_t, rec);

        // Only check right up to the closest hit so far
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rec);

        hit_left || hit_right
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
