//! Ember scene description.
//!
//! This crate loads render scenes from a JSON description: camera
//! settings, primitives, materials, textures and lights. Everything is
//! validated at load time; the render core receives only well-formed
//! scenes.
//!
//! # Example
//!
//! ```ignore
//! use ember_scene::load_scene;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let (scene, camera) = load_scene("scene.json", &mut rng)?;
//! ```

mod builder;
mod error;
mod format;

pub mod gallery;

pub use builder::build_scene;
pub use error::SceneError;
pub use format::{
    CameraDesc, LightDesc, MaterialDesc, NormalMapDesc, PrimitiveDesc, SceneFile, TextureDesc,
};

use ember_render::{Camera, Scene};
use rand::RngCore;
use std::path::Path;

/// Load a scene and camera from a JSON file.
pub fn load_scene(
    path: impl AsRef<Path>,
    rng: &mut dyn RngCore,
) -> Result<(Scene, Camera), SceneError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    log::info!("Loading scene from {}", path.display());
    load_scene_from_str(&contents, rng)
}

/// Load a scene and camera from a JSON string.
pub fn load_scene_from_str(
    json: &str,
    rng: &mut dyn RngCore,
) -> Result<(Scene, Camera), SceneError> {
    let file: SceneFile = serde_json::from_str(json)?;
    build_scene(&file, rng)
}
