//! RGB bitmaps for background images and height maps.
//!
//! Pixels are stored as packed 8-bit RGB with row 0 at the bottom of the
//! image, matching the framebuffer, so a screen coordinate `(u, v)` with
//! `v = 0` at the bottom maps directly onto a bitmap row.

use std::path::Path;

use lumen_math::Vec3;
use thiserror::Error;

/// Errors that can occur while loading or building a bitmap.
#[derive(Error, Debug)]
pub enum BitmapError {
    #[error("Failed to load bitmap {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Bitmap is empty ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Pixel data has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type BitmapResult<T> = Result<T, BitmapError>;

/// An 8-bit RGB image.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Row-major RGB bytes, bottom row first
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap raw bottom-up RGB bytes.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> BitmapResult<Self> {
        if width == 0 || height == 0 {
            return Err(BitmapError::Empty { width, height });
        }

        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-color bitmap.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> BitmapResult<Self> {
        let count = width as usize * height as usize;
        let pixels = rgb.iter().copied().cycle().take(count * 3).collect();
        Self::from_rgb(width, height, pixels)
    }

    /// Load any format the `image` crate can decode.
    pub fn load(path: impl AsRef<Path>) -> BitmapResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| BitmapError::Load {
            path: path.display().to_string(),
            source,
        })?;

        // Image files are stored top-down
        let rgb = image::imageops::flip_vertical(&img.to_rgb8());
        let (width, height) = rgb.dimensions();
        let bitmap = Self::from_rgb(width, height, rgb.into_raw())?;

        log::debug!("Loaded bitmap: {} ({}x{})", path.display(), width, height);

        Ok(bitmap)
    }

    /// Get the RGB bytes at integer coordinates (y = 0 is the bottom row).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Nearest-sample lookup for `(u, v)` in [0, 1).
    ///
    /// Coordinates are truncated to the containing pixel; values at or past 1
    /// clamp to the last row/column.
    pub fn sample_nearest(&self, u: f64, v: f64) -> Vec3 {
        let x = (u * self.width as f64).max(0.0) as u32;
        let y = (v * self.height as f64).max(0.0) as u32;
        let [r, g, b] = self.pixel(x, y);
        Vec3::new(r as f64, g as f64, b as f64) / 255.0
    }

    /// Red channel of a pixel scaled to [0, 1].
    pub fn intensity(&self, x: u32, y: u32) -> f64 {
        self.pixel(x, y)[0] as f64 / 255.0
    }
}
