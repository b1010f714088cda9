//! Path integrator: next-event estimation plus recursive indirect light.

use crate::{Color, HitRecord, Scene};
use ember_math::{Interval, Ray};
use rand::RngCore;

/// Offset applied to shadow and bounce queries to avoid
/// self-intersection at the surface.
const SHADOW_EPSILON: f32 = 0.001;

/// Recursive path-tracing integrator.
///
/// Direct lighting is estimated per bounce by sampling every scene light
/// and casting a shadow ray; indirect lighting recurses through the
/// material's scattered ray. Termination is a hard depth cutoff, which
/// trades a small amount of bias for bounded variance and stack depth.
pub struct Integrator;

impl Integrator {
    pub fn new() -> Self {
        Self
    }

    /// Radiance arriving along the ray.
    pub fn trace(&self, ray: &Ray, scene: &Scene, depth: i32, rng: &mut dyn RngCore) -> Color {
        if depth <= 0 {
            return Color::ZERO;
        }

        let mut rec = HitRecord::default();
        if !scene.hit(ray, Interval::new(SHADOW_EPSILON, f32::INFINITY), &mut rec) {
            return sky_gradient(ray);
        }

        let emitted = rec.emitted();

        // Emitters and absorbed rays terminate the path
        let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
            return emitted;
        };

        let direct = self.direct_lighting(&rec, scene, rng);
        let indirect =
            scatter.attenuation * self.trace(&scatter.scattered, scene, depth - 1, rng);

        emitted + scatter.attenuation * direct + indirect
    }

    /// Next-event estimation: sample every light with a shadow ray.
    fn direct_lighting(&self, rec: &HitRecord, scene: &Scene, rng: &mut dyn RngCore) -> Color {
        let mut direct = Color::ZERO;

        for light in scene.lights() {
            let sample = light.sample(rec.p, rng);

            let shadow_ray = Ray::new(rec.p, sample.direction);
            let mut shadow_rec = HitRecord::default();
            let occluded = scene.hit(
                &shadow_ray,
                Interval::new(SHADOW_EPSILON, sample.distance - SHADOW_EPSILON),
                &mut shadow_rec,
            );

            if !occluded {
                let cos_theta = rec.normal.dot(sample.direction).max(0.0);
                direct += sample.radiance * cos_theta / sample.pdf;
            }
        }

        direct
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Background radiance for rays that leave the scene: a vertical
/// white-to-blue gradient. Enclosed scenes never reach this.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    (1.0 - a) * white + a * blue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Emissive, Lambertian};
    use crate::{AreaLight, Material, PointLight, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_depth_zero_is_black() {
        let scene = Scene::new();
        let integrator = Integrator::new();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(integrator.trace(&ray, &scene, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_sky() {
        let scene = Scene::new();
        let integrator = Integrator::new();
        let mut rng = StdRng::seed_from_u64(2);

        // Straight up is the blue end of the gradient
        let up = integrator.trace(&Ray::new(Vec3::ZERO, Vec3::Y), &scene, 5, &mut rng);
        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-5);

        // Straight down is white
        let down = integrator.trace(&Ray::new(Vec3::ZERO, -Vec3::Y), &scene, 5, &mut rng);
        assert!((down - Color::ONE).length() < 1e-5);
    }

    #[test]
    fn test_emitter_terminates_path() {
        let mut scene = Scene::new();
        let emitter: Arc<dyn Material> = Arc::new(Emissive::new(Color::new(3.0, 2.0, 1.0)));
        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, emitter)));

        let integrator = Integrator::new();
        let mut rng = StdRng::seed_from_u64(3);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let radiance = integrator.trace(&ray, &scene, 5, &mut rng);
        assert_eq!(radiance, Color::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_shadow_ray_occlusion() {
        // A diffuse floor sphere lit by a point light, with and without a
        // blocker between them.
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));

        let mut open = Scene::new();
        open.add(Arc::new(Sphere::new(Vec3::new(0.0, -1.0, 0.0), 1.0, gray.clone())));
        open.add_light(Arc::new(PointLight::new(
            Vec3::new(0.0, 5.0, 0.0),
            Color::splat(50.0),
        )));

        let mut blocked = Scene::new();
        blocked.add(Arc::new(Sphere::new(Vec3::new(0.0, -1.0, 0.0), 1.0, gray.clone())));
        blocked.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.5, 0.0), 1.0, gray)));
        blocked.add_light(Arc::new(PointLight::new(
            Vec3::new(0.0, 5.0, 0.0),
            Color::splat(50.0),
        )));

        let integrator = Integrator::new();

        // Probe the direct term at the top of the floor sphere
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();
        assert!(open.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        let mut rng = StdRng::seed_from_u64(4);
        let lit = integrator.direct_lighting(&rec, &open, &mut rng);
        assert!(lit.x > 0.0);

        let mut rec = HitRecord::default();
        assert!(blocked.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        let shadowed = integrator.direct_lighting(&rec, &blocked, &mut rng);
        assert_eq!(shadowed, Color::ZERO);
    }

    #[test]
    fn test_area_light_direct_contribution() {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));

        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, -1.0, 0.0), 1.0, gray)));
        scene.add_light(Arc::new(AreaLight::new(
            Vec3::new(-0.5, 3.0, -0.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Color::splat(10.0),
        )));

        let integrator = Integrator::new();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();
        assert!(scene.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        let mut rng = StdRng::seed_from_u64(5);
        let direct = integrator.direct_lighting(&rec, &scene, &mut rng);
        assert!(direct.x > 0.0);
        assert!(direct.x.is_finite());
    }

    #[test]
    fn test_trace_produces_finite_radiance() {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.0, gray)));
        scene.add_light(Arc::new(PointLight::new(
            Vec3::new(2.0, 2.0, 0.0),
            Color::splat(10.0),
        )));

        let integrator = Integrator::new();
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..50 {
            let radiance = integrator.trace(
                &Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
                &scene,
                10,
                &mut rng,
            );
            assert!(radiance.x.is_finite() && radiance.y.is_finite() && radiance.z.is_finite());
            assert!(radiance.min_element() >= 0.0);
        }
    }
}
