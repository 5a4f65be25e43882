//! Recursive Whitted ray tracer.
//!
//! Implements:
//! - Phong local shading at every hit
//! - Mirror reflection and Snell refraction, weighted by `kr` and `kt`
//! - Nested dielectrics through the ray's medium stack
//! - Adaptive termination of weak bounces
//! - Regular or jittered supersampling

use std::path::Path;

use image::{Rgb, RgbImage};
use lumen_core::{Bitmap, BitmapResult, Color, RenderConfig};
use lumen_math::{Vec3, NORMAL_EPSILON};
use rand::{Rng, RngCore};

use crate::ray::{MediumStack, Ray};
use crate::scene::Scene;
use crate::shading::shade;

/// Index of refraction outside every object.
const VACUUM_INDEX: f64 = 1.0;

/// Mirror `l` about `n`. Both point away from the surface.
#[inline]
pub fn reflect_dir(l: Vec3, n: Vec3) -> Vec3 {
    (2.0 * n.dot(l) * n - l).normalize_or_zero()
}

/// Refract `l` through a surface with normal `n` on the incident side,
/// going from index `n_i` to `n_t`. `None` on total internal reflection.
pub fn refract_dir(l: Vec3, n: Vec3, n_i: f64, n_t: f64) -> Option<Vec3> {
    let mu = n_i / n_t;
    let nl = n.dot(l);
    let root = 1.0 - mu * mu * (1.0 - nl * nl);
    if root < 0.0 {
        return None;
    }
    let coeff = mu * nl - root.sqrt();
    Some((coeff * n - mu * l).normalize_or_zero())
}

/// True if the light cannot leave the denser medium at this angle.
#[inline]
pub fn total_internal_reflection(l: Vec3, n: Vec3, n_i: f64, n_t: f64) -> bool {
    let mu = n_i / n_t;
    let nl = n.dot(l);
    1.0 - mu * mu * (1.0 - nl * nl) < 0.0
}

/// True if a ray travelling along `direction` enters the surface.
#[inline]
pub fn is_entering(direction: Vec3, n: Vec3) -> bool {
    direction.dot(n) < 0.0
}

/// Convert a color in [0, 1] to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let c = (color * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8]
}

fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen()
}

/// 8-bit RGB framebuffer; row 0 is the bottom of the image.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Set the pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Top-down image for saving or display.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb(self.pixel(x, self.height - 1 - y))
        })
    }

    /// Write the framebuffer as an image; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> BitmapResult<()> {
        let path = path.as_ref();
        self.to_image().save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// The ray tracing engine: a scene, its render settings, an optional
/// background image, and the framebuffer it renders into.
pub struct RayTracer {
    scene: Scene,
    config: RenderConfig,
    background: Option<Bitmap>,
    buffer: FrameBuffer,
}

impl RayTracer {
    /// Create a tracer. The framebuffer is sized from the config and the
    /// camera's aspect ratio, and the scene is initialized if needed.
    pub fn new(mut scene: Scene, config: RenderConfig) -> Self {
        if !scene.is_initialized() {
            scene.init_scene();
        }
        let (width, height) = config.resolution(scene.camera().aspect_ratio());
        Self {
            scene,
            config,
            background: None,
            buffer: FrameBuffer::new(width, height),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn set_background(&mut self, background: Option<Bitmap>) {
        self.background = background;
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Load a background image. A missing or unreadable file only disables
    /// the background.
    pub fn load_background(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match Bitmap::load(path) {
            Ok(bitmap) => {
                log::info!(
                    "Background: {} ({}x{})",
                    path.display(),
                    bitmap.width,
                    bitmap.height
                );
                self.background = Some(bitmap);
                true
            }
            Err(err) => {
                log::warn!("Background disabled: {}", err);
                self.background = None;
                false
            }
        }
    }

    /// Trace the primary ray through screen position `(x, y)` and clamp the
    /// result to [0, 1].
    pub fn trace(&self, x: f64, y: f64) -> Color {
        let ray = Ray::primary(self.scene.camera().ray_through(x, y), x, y);
        let thresh = Color::splat(self.config.threshold);
        self.trace_ray(&ray, thresh, self.max_depth())
            .clamp(Color::ZERO, Color::ONE)
    }

    /// Configured recursion ceiling, saturated to the signed depth counter.
    fn max_depth(&self) -> i32 {
        i32::try_from(self.config.max_depth).unwrap_or(i32::MAX)
    }

    /// Color seen along `ray` with `depth` bounces left.
    pub fn trace_ray(&self, ray: &Ray, thresh: Color, depth: i32) -> Color {
        if depth < 0 {
            return Color::ZERO;
        }

        let Some(isect) = self.scene.intersect(&ray.geometric()) else {
            return self.miss_color(ray);
        };

        let material = self.scene.material(isect.material);
        let intensity = shade(&self.scene, ray, &isect);

        // Adaptive termination, never on the primary hit
        if depth != self.max_depth() && intensity.cmplt(thresh).all() {
            return Color::ZERO;
        }

        let point = ray.at(isect.t);
        let l = ray.direction();
        let entering = is_entering(l, isect.normal);

        // Normal on the side the ray arrives from
        let n = if entering { isect.normal } else { -isect.normal };

        let mut result = intensity;

        if material.kr != Color::ZERO {
            let reflected = ray.spawn(
                point + n * NORMAL_EPSILON,
                reflect_dir(-l, n),
                ray.media().clone(),
            );
            result += material.kr * self.trace_ray(&reflected, thresh, depth - 1);
        }

        if material.kt != Color::ZERO {
            let (n_i, n_t, media) = if entering {
                let media = ray.media().push(isect.material);
                (self.medium_index(ray.media()), material.index, media)
            } else {
                let media = ray.media().pop();
                (material.index, self.medium_index(&media), media)
            };

            if let Some(direction) = refract_dir(-l, n, n_i, n_t) {
                let refracted = ray.spawn(point - n * NORMAL_EPSILON, direction, media);
                result += material.kt * self.trace_ray(&refracted, thresh, depth - 1);
            }
        }

        result
    }

    /// Index of refraction of the medium on top of `media`.
    fn medium_index(&self, media: &MediumStack) -> f64 {
        media
            .top()
            .map_or(VACUUM_INDEX, |id| self.scene.material(id).index)
    }

    fn miss_color(&self, ray: &Ray) -> Color {
        if !self.config.background_enabled || self.background.is_none() {
            return Color::ZERO;
        }
        let screen = ray.screen();
        self.background_color(screen.x, screen.y)
    }

    /// Background sample at screen position `(u, v)`; black without a
    /// background image, white outside [0, 1].
    pub fn background_color(&self, u: f64, v: f64) -> Color {
        let Some(background) = &self.background else {
            return Color::ZERO;
        };
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return Color::ONE;
        }
        let u = if u == 1.0 { 0.0 } else { u };
        let v = if v == 1.0 { 0.0 } else { v };
        background.sample_nearest(u, v)
    }

    /// Resize the framebuffer if needed and clear it.
    pub fn trace_setup(&mut self, width: u32, height: u32) {
        if self.buffer.width != width || self.buffer.height != height {
            self.buffer = FrameBuffer::new(width, height);
        } else {
            self.buffer.clear();
        }
    }

    /// Render rows `[start, stop)`; `stop` is clamped to the image height.
    pub fn trace_lines(&mut self, start: u32, stop: u32, rng: &mut dyn RngCore) {
        let stop = stop.min(self.buffer.height);
        for j in start..stop {
            for i in 0..self.buffer.width {
                self.trace_pixel(i, j, rng);
            }
        }
    }

    /// Render one pixel into the framebuffer and return its color.
    pub fn trace_pixel(&mut self, i: u32, j: u32, rng: &mut dyn RngCore) -> Color {
        let color = self.sample_pixel(i, j, rng);
        self.buffer.set_pixel(i, j, color_to_rgb(color));
        color
    }

    /// Average color of pixel `(i, j)` over its supersample grid.
    pub fn sample_pixel(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Color {
        let x = i as f64 / self.buffer.width as f64;
        let y = j as f64 / self.buffer.height as f64;

        let n = self.config.supersample;
        if n == 0 {
            return self.trace(x, y);
        }

        let pixel_w = 1.0 / self.buffer.width as f64;
        let pixel_h = 1.0 / self.buffer.height as f64;
        let sub_w = pixel_w / n as f64;
        let sub_h = pixel_h / n as f64;

        let mut color = Color::ZERO;
        for row in 0..n {
            let base_y = y + (row as f64 / n as f64 - 0.5) * pixel_h;
            for col in 0..n {
                let base_x = x + (col as f64 / n as f64 - 0.5) * pixel_w;
                let (sx, sy) = if self.config.jitter {
                    (
                        base_x + (gen_f64(rng) - 0.5) * sub_w,
                        base_y + (gen_f64(rng) - 0.5) * sub_h,
                    )
                } else {
                    (base_x, base_y)
                };
                color += self.trace(sx, sy);
            }
        }
        color / (n * n) as f64
    }

    /// Render the whole image.
    pub fn render(&mut self, rng: &mut dyn RngCore) -> &FrameBuffer {
        let (width, height) = (self.buffer.width, self.buffer.height);
        log::info!(
            "Rendering {}x{} (depth {}, supersample {}{})",
            width,
            height,
            self.config.max_depth,
            self.config.supersample,
            if self.config.jitter { ", jittered" } else { "" }
        );

        self.trace_setup(width, height);
        self.trace_lines(0, height, rng);

        log::info!("Render complete");
        &self.buffer
    }
}
