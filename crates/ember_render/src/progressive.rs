//! Progressive renderer: accumulates one sample per pixel per pass.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::sampling::gen_f32;
use crate::{Camera, Color, Framebuffer, Integrator, Scene};

/// Refresh the display every this many samples.
const DISPLAY_INTERVAL: u32 = 10;

/// Renders a scene progressively, one sample per pixel at a time, so a
/// caller can display intermediate results and stop at any point.
///
/// Pixels are independent, so each pass fans out across image rows with
/// rayon. Every row derives its own generator from the session seed, the
/// pass index and the row index; a fixed seed reproduces the same image
/// regardless of thread count.
pub struct ProgressiveRenderer {
    framebuffer: Framebuffer,
    integrator: Integrator,
    sample_count: u32,
    target_samples: u32,
    max_depth: i32,
    seed: u64,
}

impl ProgressiveRenderer {
    /// Create a renderer for the given image size and bounce depth.
    pub fn new(width: u32, height: u32, max_depth: i32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            integrator: Integrator::new(),
            sample_count: 0,
            target_samples: 100,
            max_depth,
            seed: 0,
        }
    }

    /// Seed for the render session. Restarting with the same seed
    /// replays the same sample sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Render one sample per pixel and accumulate it.
    ///
    /// Returns false once the target sample count has been reached. The
    /// display buffer is refreshed every few samples and at the target.
    pub fn render_sample(&mut self, camera: &Camera, scene: &Scene) -> bool {
        if self.sample_count >= self.target_samples {
            return false;
        }

        self.render_single_sample(camera, scene);
        self.sample_count += 1;

        if self.sample_count % DISPLAY_INTERVAL == 0 || self.sample_count == self.target_samples {
            self.framebuffer.update_display(self.sample_count);
        }

        self.sample_count < self.target_samples
    }

    /// Discard all accumulated samples and start over.
    ///
    /// Called whenever the camera or scene changes: samples from a stale
    /// viewpoint are invalid.
    pub fn reset(&mut self) {
        self.sample_count = 0;
        self.framebuffer.clear();
    }

    /// Samples accumulated per pixel so far.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Set the number of samples per pixel to stop at.
    pub fn set_target_samples(&mut self, samples: u32) {
        self.target_samples = samples;
    }

    /// The framebuffer for display or saving.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Force a display refresh at the current sample count.
    pub fn update_display(&mut self) {
        self.framebuffer.update_display(self.sample_count);
    }

    /// One full-resolution sample pass, rows in parallel.
    fn render_single_sample(&mut self, camera: &Camera, scene: &Scene) {
        let width = self.framebuffer.width();
        let height = self.framebuffer.height();
        let max_depth = self.max_depth;
        let integrator = &self.integrator;
        let pass = self.sample_count;
        let seed = self.seed;

        let rows: Vec<Vec<Color>> = (0..height)
            .into_par_iter()
            .map(|y| {
                let mut rng = StdRng::seed_from_u64(row_seed(seed, pass, y));
                (0..width)
                    .map(|x| {
                        let u = (x as f32 + gen_f32(&mut rng)) / (width - 1) as f32;
                        let v = (y as f32 + gen_f32(&mut rng)) / (height - 1) as f32;

                        let ray = camera.get_ray(u, v, &mut rng);
                        integrator.trace(&ray, scene, max_depth, &mut rng)
                    })
                    .collect()
            })
            .collect();

        // Merge after the parallel compute so a cancelled caller never
        // observes a torn sample.
        let samples: Vec<Color> = rows.into_iter().flatten().collect();
        self.framebuffer.add_sample_pass(&samples);
    }
}

/// Derive an independent row seed from session seed, pass and row.
fn row_seed(seed: u64, pass: u32, row: u32) -> u64 {
    let mix = ((pass as u64) << 32) | row as u64;
    seed.wrapping_add(mix.wrapping_mul(0x9E37_79B9_7F4A_7C15)).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::{Material, Sphere, Vec3};
    use std::sync::Arc;

    fn small_scene() -> (Scene, Camera) {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, gray)));

        let camera = Camera::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            90.0,
            1.0,
            0.0,
            1.0,
        );
        (scene, camera)
    }

    #[test]
    fn test_progressive_reaches_target() {
        let (scene, camera) = small_scene();
        let mut renderer = ProgressiveRenderer::new(8, 8, 4).with_seed(7);
        renderer.set_target_samples(3);

        assert!(renderer.render_sample(&camera, &scene));
        assert!(renderer.render_sample(&camera, &scene));
        // Third sample hits the target
        assert!(!renderer.render_sample(&camera, &scene));
        assert_eq!(renderer.sample_count(), 3);

        // Further calls are no-ops
        assert!(!renderer.render_sample(&camera, &scene));
        assert_eq!(renderer.sample_count(), 3);
    }

    #[test]
    fn test_reset_clears_state() {
        let (scene, camera) = small_scene();
        let mut renderer = ProgressiveRenderer::new(8, 8, 4).with_seed(7);
        renderer.set_target_samples(2);

        renderer.render_sample(&camera, &scene);
        renderer.render_sample(&camera, &scene);
        assert_eq!(renderer.sample_count(), 2);

        renderer.reset();
        assert_eq!(renderer.sample_count(), 0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(renderer.framebuffer().get_pixel(x, y), Color::ZERO);
            }
        }
    }

    #[test]
    fn test_seeded_render_is_deterministic() {
        let (scene, camera) = small_scene();

        let mut a = ProgressiveRenderer::new(8, 8, 4).with_seed(99);
        a.set_target_samples(2);
        while a.render_sample(&camera, &scene) {}
        a.update_display();

        let mut b = ProgressiveRenderer::new(8, 8, 4).with_seed(99);
        b.set_target_samples(2);
        while b.render_sample(&camera, &scene) {}
        b.update_display();

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(
                    a.framebuffer().get_pixel(x, y),
                    b.framebuffer().get_pixel(x, y)
                );
            }
        }
    }

    #[test]
    fn test_render_produces_finite_pixels() {
        let (scene, camera) = small_scene();
        let mut renderer = ProgressiveRenderer::new(8, 8, 4).with_seed(3);
        renderer.set_target_samples(2);
        while renderer.render_sample(&camera, &scene) {}

        for y in 0..8 {
            for x in 0..8 {
                let pixel = renderer.framebuffer().get_pixel(x, y);
                assert!(pixel.x.is_finite() && pixel.y.is_finite() && pixel.z.is_finite());
                assert!(pixel.min_element() >= 0.0);
            }
        }
    }
}
