//! Scene: primitive and light ownership plus the closest-hit query.

use std::sync::Arc;

use crate::{BvhNode, HitRecord, Hittable, Light};
use ember_math::{Interval, Ray};
use rand::RngCore;

/// A renderable scene.
///
/// The scene owns its primitives and lights and answers the single
/// closest-hit query used by both camera rays and shadow rays. During
/// rendering the scene is read-only; mutate, then rebuild the BVH.
pub struct Scene {
    objects: Vec<Arc<dyn Hittable>>,
    lights: Vec<Arc<dyn Light>>,
    /// Tree over the bounded primitives, built on demand.
    bvh: Option<BvhNode>,
    /// Unbounded primitives (planes) that stay outside the tree.
    unbounded: Vec<Arc<dyn Hittable>>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            bvh: None,
            unbounded: Vec::new(),
        }
    }

    /// Add a primitive. Invalidates a previously built BVH.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
        self.bvh = None;
        self.unbounded.clear();
    }

    /// Add a light source.
    ///
    /// Lights are independent of geometry: emissive surfaces meant for
    /// direct sampling must also be added as primitives.
    pub fn add_light(&mut self, light: Arc<dyn Light>) {
        self.lights.push(light);
    }

    /// Remove all primitives and lights.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.lights.clear();
        self.bvh = None;
        self.unbounded.clear();
    }

    /// The registered lights.
    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    /// Number of primitives.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Build the acceleration structure over the bounded primitives.
    ///
    /// Unbounded primitives keep getting tested linearly. The rng drives
    /// the per-node split-axis choices.
    pub fn build_bvh(&mut self, rng: &mut dyn RngCore) {
        let (bounded, unbounded): (Vec<_>, Vec<_>) = self
            .objects
            .iter()
            .cloned()
            .partition(|o| o.bounding_box().is_finite());

        log::debug!(
            "Building BVH over {} primitives ({} unbounded)",
            bounded.len(),
            unbounded.len()
        );

        self.bvh = if bounded.is_empty() {
            None
        } else {
            Some(BvhNode::new(bounded, rng))
        };
        self.unbounded = unbounded;
    }

    /// Closest hit along the ray within the parameter window.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if self.bvh.is_some() || !self.unbounded.is_empty() {
            let mut hit_anything = false;
            let mut closest_so_far = ray_t.max;

            if let Some(bvh) = &self.bvh {
                if bvh.hit(ray, ray_t, rec) {
                    hit_anything = true;
                    closest_so_far = rec.t;
                }
            }

            for object in &self.unbounded {
                let interval = Interval::new(ray_t.min, closest_so_far);
                if object.hit(ray, interval, rec) {
                    hit_anything = true;
                    closest_so_far = rec.t;
                }
            }

            return hit_anything;
        }

        // No BVH yet: linear scan over everything
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
