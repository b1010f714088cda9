//! Random sampling helpers.
//!
//! Every function takes the caller's rng. The renderer never touches a
//! global generator, so a seeded session replays deterministically.

use ember_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Uniform f32 in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Uniform point inside the unit sphere, by rejection sampling.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    random_in_unit_sphere(rng).normalize()
}

/// Uniform point inside the unit disk (z = 0), for lens sampling.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with the given ratio of
/// refraction indices.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
