//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use ember_math::{Point3, Ray, Vec3};
use rand::RngCore;

/// A thin-lens pinhole camera.
///
/// Rays are requested in normalized screen coordinates: `get_ray(s, t)`
/// with s, t in [0, 1] mapping across the viewport. A nonzero aperture
/// jitters ray origins over the lens disk for depth of field.
#[derive(Clone, Debug)]
pub struct Camera {
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a camera.
    ///
    /// - `lookfrom`/`lookat`: position and target
    /// - `vup`: view-up vector
    /// - `vfov`: vertical field of view in degrees
    /// - `aspect_ratio`: viewport width over height
    /// - `aperture`: lens diameter, 0 disables defocus
    /// - `focus_dist`: distance to the plane of perfect focus
    pub fn new(
        lookfrom: Point3,
        lookat: Point3,
        vup: Vec3,
        vfov: f32,
        aspect_ratio: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let theta = vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        let w = (lookfrom - lookat).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = lookfrom;
        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    /// Generate a ray through normalized screen coordinates (s, t).
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }
}
