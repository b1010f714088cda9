//! Offline progressive render of a gallery scene.
//!
//! Renders the three-sphere demo and writes both PPM and PNG output.

use anyhow::Result;
use ember_render::ProgressiveRenderer;
use ember_scene::gallery;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    env_logger::init();

    let seed = 1337;
    let mut rng = StdRng::seed_from_u64(seed);
    let (scene, camera) = gallery::three_spheres(&mut rng);

    let width = 640;
    let height = 360;
    let target_samples = 64;

    let mut renderer = ProgressiveRenderer::new(width, height, 50).with_seed(seed);
    renderer.set_target_samples(target_samples);

    log::info!(
        "Rendering {}x{} at {} samples per pixel",
        width,
        height,
        target_samples
    );

    let start = std::time::Instant::now();
    while renderer.render_sample(&camera, &scene) {
        if renderer.sample_count() % 10 == 0 {
            log::info!(
                "{}/{} samples ({:.1?} elapsed)",
                renderer.sample_count(),
                target_samples,
                start.elapsed()
            );
        }
    }
    renderer.update_display();
    log::info!("Finished in {:.1?}", start.elapsed());

    renderer.framebuffer().save_ppm("demo.ppm")?;
    renderer.framebuffer().save_png("demo.png")?;

    Ok(())
}
