//! Progressive framebuffer: sample accumulation and display conversion.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::Color;

/// Gamma used when quantizing the display buffer for output.
const GAMMA: f32 = 2.2;

/// A framebuffer with a running accumulation buffer for progressive
/// rendering and a derived display buffer.
///
/// Samples accumulate per pixel; `update_display` divides the sums by
/// the sample count. `clear` returns the buffer to its empty state,
/// which callers trigger whenever camera or scene changes make the
/// accumulated samples stale.
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Display buffer (averaged samples)
    pixels: Vec<Color>,
    /// Accumulation buffer (running per-pixel sums)
    accumulation: Vec<Color>,
}

impl Framebuffer {
    /// Create a framebuffer with both buffers zeroed.
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; size],
            accumulation: vec![Color::ZERO; size],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Set a display pixel directly. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Get a display pixel. Out-of-bounds reads return black.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.index(x, y).map(|i| self.pixels[i]).unwrap_or(Color::ZERO)
    }

    /// Add a sample to the accumulation buffer.
    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.accumulation[idx] += color;
        }
    }

    /// Add one full-resolution sample pass, row-major.
    ///
    /// Used by the renderer to merge a batch computed in parallel;
    /// passes with the wrong length are ignored.
    pub fn add_sample_pass(&mut self, samples: &[Color]) {
        if samples.len() != self.accumulation.len() {
            log::warn!(
                "Sample pass size {} does not match framebuffer size {}",
                samples.len(),
                self.accumulation.len()
            );
            return;
        }
        for (acc, sample) in self.accumulation.iter_mut().zip(samples) {
            *acc += *sample;
        }
    }

    /// Refresh the display buffer as accumulation / sample_count.
    ///
    /// A non-positive count leaves the display untouched.
    pub fn update_display(&mut self, sample_count: u32) {
        if sample_count == 0 {
            return;
        }

        let inv_samples = 1.0 / sample_count as f32;
        for (pixel, acc) in self.pixels.iter_mut().zip(&self.accumulation) {
            *pixel = *acc * inv_samples;
        }
    }

    /// Zero both buffers, returning to the empty state.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::ZERO);
        self.accumulation.fill(Color::ZERO);
    }

    /// The display buffer, row-major.
    pub fn data(&self) -> &[Color] {
        &self.pixels
    }

    /// Save the display buffer as a plain-text PPM (P3).
    ///
    /// Rows are written bottom-to-top. Colors are gamma corrected
    /// (1/2.2), clamped to [0, 1] and quantized to 8 bits, so the output
    /// is deterministic for a given display buffer.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);

        writeln!(out, "P3\n{} {}\n255", self.width, self.height)?;

        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let [r, g, b] = quantize(self.pixels[(y * self.width + x) as usize]);
                writeln!(out, "{} {} {}", r, g, b)?;
            }
        }

        out.flush()?;
        log::info!("Saved image to {}", path.as_ref().display());
        Ok(())
    }

    /// Save the display buffer as a PNG, top-to-bottom.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let mut img = image::RgbImage::new(self.width, self.height);

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let rgb = quantize(self.pixels[(y * self.width + x) as usize]);
            *pixel = image::Rgb(rgb);
        }

        img.save(path.as_ref())?;
        log::info!("Saved image to {}", path.as_ref().display());
        Ok(())
    }
}

/// Clamp to [0, 1], gamma correct and quantize one color to 8-bit RGB.
fn quantize(color: Color) -> [u8; 3] {
    let corrected = color.clamp(Color::ZERO, Color::ONE).powf(1.0 / GAMMA);
    [
        (255.999 * corrected.x) as u8,
        (255.999 * corrected.y) as u8,
        (255.999 * corrected.z) as u8,
    ]
}
