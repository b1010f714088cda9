//! Light sources for direct-lighting estimation.
//!
//! Lights are sampled explicitly by the integrator (next-event
//! estimation). They are independent of geometry: an emissive surface
//! that should also be sampled directly must be registered with the
//! scene as both a primitive and a light.

use crate::sampling::gen_f32;
use crate::Color;
use ember_math::{Point3, Vec3};
use rand::RngCore;

/// A sampled point on a light, as seen from a shading point.
pub struct LightSample {
    /// Position on the light
    pub position: Point3,
    /// Unit direction from the shading point toward the light
    pub direction: Vec3,
    /// Distance from the shading point to the sampled position
    pub distance: f32,
    /// Incident radiance along `direction`
    pub radiance: Color,
    /// Probability density of this sample in solid-angle measure.
    /// Delta lights report 1.
    pub pdf: f32,
}

/// Trait for sampleable light sources.
pub trait Light: Send + Sync {
    /// Sample the light from the given shading point.
    fn sample(&self, hit_point: Point3, rng: &mut dyn RngCore) -> LightSample;
}

/// An isotropic point light with inverse-square falloff.
pub struct PointLight {
    position: Point3,
    intensity: Color,
}

impl PointLight {
    pub fn new(position: Point3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

impl Light for PointLight {
    fn sample(&self, hit_point: Point3, _rng: &mut dyn RngCore) -> LightSample {
        let to_light = self.position - hit_point;
        let distance = to_light.length();

        LightSample {
            position: self.position,
            direction: to_light / distance,
            distance,
            // Inverse square falloff
            radiance: self.intensity / (distance * distance),
            // Delta distribution: a scattered ray has zero probability of
            // hitting the point, so direct sampling never double-counts
            pdf: 1.0,
        }
    }
}

/// A rectangular area light spanned by two edge vectors.
pub struct AreaLight {
    center: Point3,
    u_edge: Vec3,
    v_edge: Vec3,
    emission: Color,
}

impl AreaLight {
    pub fn new(center: Point3, u_edge: Vec3, v_edge: Vec3, emission: Color) -> Self {
        Self {
            center,
            u_edge,
            v_edge,
            emission,
        }
    }

    /// The light's fixed emission.
    pub fn emission(&self) -> Color {
        self.emission
    }
}

impl Light for AreaLight {
    fn sample(&self, hit_point: Point3, rng: &mut dyn RngCore) -> LightSample {
        // Uniform point on the parallelogram
        let s = gen_f32(rng);
        let t = gen_f32(rng);
        let position = self.center + s * self.u_edge + t * self.v_edge;

        let to_light = position - hit_point;
        let distance = to_light.length();
        let direction = to_light / distance;

        // Convert the uniform area density to solid-angle measure
        let cross = self.u_edge.cross(self.v_edge);
        let area = cross.length();
        let light_normal = cross / area;
        let cos_theta = light_normal.dot(-direction).abs();

        LightSample {
            position,
            direction,
            distance,
            radiance: self.emission,
            pdf: (distance * distance) / (area * cos_theta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_point_light_falloff() {
        let light = PointLight::new(Vec3::new(0.0, 2.0, 0.0), Color::splat(8.0));
        let mut rng = StdRng::seed_from_u64(1);

        let sample = light.sample(Vec3::ZERO, &mut rng);
        assert!((sample.distance - 2.0).abs() < 1e-5);
        assert!((sample.direction - Vec3::Y).length() < 1e-5);
        // intensity / d^2 = 8 / 4
        assert!((sample.radiance.x - 2.0).abs() < 1e-5);
        assert_eq!(sample.pdf, 1.0);
    }

    #[test]
    fn test_area_light_pdf_unit_rect_overhead() {
        // 1x1 rectangle 1 unit above the shading point, facing down:
        // area = 1 and cos(theta) = 1, so pdf reduces to distance^2.
        let light = AreaLight::new(
            Vec3::new(-0.5, 1.0, -0.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Color::splat(5.0),
        );
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..50 {
            let sample = light.sample(Vec3::ZERO, &mut rng);
            let expected = sample.distance * sample.distance;
            let cos_theta = Vec3::Y.dot(-sample.direction).abs();
            assert!(
                (sample.pdf - expected / cos_theta).abs() < 1e-3,
                "pdf {} vs distance^2/cos {}",
                sample.pdf,
                expected / cos_theta
            );
        }
    }

    #[test]
    fn test_area_light_sample_stays_on_surface() {
        let light = AreaLight::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Color::splat(5.0),
        );
        let mut rng = StdRng::seed_from_u64(3);

        let sample = light.sample(Vec3::ZERO, &mut rng);
        // Samples stay on the parallelogram
        assert!((sample.position.y - 1.0).abs() < 1e-5);
        assert!(sample.pdf > 0.0);
        assert_eq!(sample.radiance, Color::splat(5.0));
    }

    #[test]
    fn test_area_light_samples_cover_rect() {
        let light = AreaLight::new(
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Color::ONE,
        );
        let mut rng = StdRng::seed_from_u64(4);

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for _ in 0..500 {
            let sample = light.sample(Vec3::new(0.0, -3.0, 0.0), &mut rng);
            min = min.min(sample.position);
            max = max.max(sample.position);
        }

        // Uniform draws should spread over most of the rectangle
        assert!(max.x - min.x > 1.5);
        assert!(max.z - min.z > 1.5);
    }
}
