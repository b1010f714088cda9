//! Texture sampling for materials.
//!
//! Textures map UV coordinates in [0, 1] to colors. Image-backed textures
//! are decoded to linear float RGB at load time; a failed load surfaces as
//! a [`TextureError`] during construction, never during rendering.

use std::path::Path;
use std::sync::Arc;

use crate::hittable::HitRecord;
use ember_math::Vec3;
use thiserror::Error;

use crate::Color;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Trait for color sources sampled at surface UV coordinates.
pub trait Texture: Send + Sync {
    /// Sample the texture color at (u, v), both in [0, 1].
    fn sample(&self, u: f32, v: f32) -> Color;
}

/// A texture with a single color everywhere.
#[derive(Clone, Debug)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn sample(&self, _u: f32, _v: f32) -> Color {
        self.color
    }
}

/// Procedural checker pattern in UV space.
#[derive(Clone, Debug)]
pub struct CheckerTexture {
    color1: Color,
    color2: Color,
    frequency: f32,
}

impl CheckerTexture {
    /// Create a checker texture. `frequency` is the number of squares
    /// across the [0, 1] UV range.
    pub fn new(color1: Color, color2: Color, frequency: f32) -> Self {
        Self {
            color1,
            color2,
            frequency,
        }
    }
}

impl Texture for CheckerTexture {
    fn sample(&self, u: f32, v: f32) -> Color {
        let u_check = (u * self.frequency).floor() as i32;
        let v_check = (v * self.frequency).floor() as i32;

        // Same parity selects color1, the rest color2
        if (u_check + v_check) % 2 == 0 {
            self.color1
        } else {
            self.color2
        }
    }
}

/// An image-backed texture with bilinear filtering.
///
/// Pixels are stored in linear RGB float format, row-major, with
/// (0, 0) at the bottom-left of the UV domain.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl ImageTexture {
    /// Create a texture from raw linear RGB pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load a texture from an image file, decoding sRGB to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<[f32; 3]> = rgba
            .pixels()
            .map(|p| [srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])])
            .collect();

        log::debug!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(Self::new(width, height, pixels))
    }

    /// Load a normal map from an image file.
    ///
    /// Normal maps encode direction components, not colors, so no sRGB
    /// decode is applied.
    pub fn load_linear(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<[f32; 3]> = rgba
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                ]
            })
            .collect();

        Ok(Self::new(width, height, pixels))
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or([0.0, 0.0, 0.0])
    }
}

impl Texture for ImageTexture {
    fn sample(&self, u: f32, v: f32) -> Color {
        // Wrap UV coordinates
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Convert to pixel coordinates, flipping V for image row order
        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0);

        // Bilinear interpolation
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let p00 = self.get_pixel(x0, y0);
        let p10 = self.get_pixel(x1, y0);
        let p01 = self.get_pixel(x0, y1);
        let p11 = self.get_pixel(x1, y1);

        let top = Vec3::new(
            p00[0] * (1.0 - fx) + p10[0] * fx,
            p00[1] * (1.0 - fx) + p10[1] * fx,
            p00[2] * (1.0 - fx) + p10[2] * fx,
        );
        let bottom = Vec3::new(
            p01[0] * (1.0 - fx) + p11[0] * fx,
            p01[1] * (1.0 - fx) + p11[1] * fx,
            p01[2] * (1.0 - fx) + p11[2] * fx,
        );

        top * (1.0 - fy) + bottom * fy
    }
}

/// Tangent-space normal map.
///
/// Samples are decoded from the [0, 1] color range to [-1, 1] directions,
/// blended toward the unperturbed normal by `strength`, then transformed
/// to world space through the hit's tangent frame.
pub struct NormalMap {
    texture: Arc<dyn Texture>,
    strength: f32,
}

impl NormalMap {
    /// Create a normal map. `strength` of 0 leaves the surface normal
    /// untouched, 1 applies the full perturbation.
    pub fn new(texture: Arc<dyn Texture>, strength: f32) -> Self {
        Self { texture, strength }
    }

    /// Sample the perturbed world-space normal at the hit point.
    pub fn sample_normal(&self, rec: &HitRecord) -> Vec3 {
        let encoded = self.texture.sample(rec.u, rec.v);

        // (0.5, 0.5, 1.0) encodes the unperturbed normal
        let tangent_normal = Vec3::new(
            2.0 * encoded.x - 1.0,
            2.0 * encoded.y - 1.0,
            2.0 * encoded.z - 1.0,
        );

        let blended = (Vec3::Z + self.strength * (tangent_normal - Vec3::Z)).normalize();

        // TBN transform into world space
        let world = blended.x * rec.tangent + blended.y * rec.bitangent + blended.z * rec.normal;
        world.normalize()
    }
}

/// Convert an sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
