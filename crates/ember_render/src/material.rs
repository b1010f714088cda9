//! Material trait for surface scattering.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector, reflect, refract};
use crate::texture::{NormalMap, Texture};
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of a successful scatter: the surface reflectance and the
/// continuation ray.
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns the attenuation and scattered ray, or None if the ray is
    /// absorbed and the path ends here.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// Light emitted by this material.
    ///
    /// Most materials emit nothing.
    fn emitted(&self) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Scatter in a random direction on the hemisphere around the normal
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Only scatter if the reflected ray stays in the normal's hemisphere
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Pure emitter. Terminates paths and contributes only its radiance.
pub struct Emissive {
    radiance: Color,
}

impl Emissive {
    /// Create an emitter with the given radiance.
    pub fn new(radiance: Color) -> Self {
        Self { radiance }
    }
}

impl Material for Emissive {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Emitters don't scatter rays
        None
    }

    fn emitted(&self) -> Color {
        self.radiance
    }
}

/// Lambertian with a textured albedo and an optional normal map.
///
/// Scattering follows the same cosine law as [`Lambertian`], but the
/// normal used for sampling may first be perturbed by the normal map.
pub struct TexturedLambertian {
    texture: Arc<dyn Texture>,
    normal_map: Option<Arc<NormalMap>>,
}

impl TexturedLambertian {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self {
            texture,
            normal_map: None,
        }
    }

    pub fn with_normal_map(texture: Arc<dyn Texture>, normal_map: Arc<NormalMap>) -> Self {
        Self {
            texture,
            normal_map: Some(normal_map),
        }
    }
}

impl Material for TexturedLambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let surface_normal = match &self.normal_map {
            Some(map) => map.sample_normal(rec),
            None => rec.normal,
        };

        let mut scatter_direction = surface_normal + random_unit_vector(rng);
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = surface_normal;
        }

        Some(ScatterResult {
            attenuation: self.texture.sample(rec.u, rec.v),
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}
