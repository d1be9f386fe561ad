//! Software rendering into an in-memory image.
//!
//! [`RasterSurface`] draws into an [`image::RgbaImage`] with source-over
//! blending and one pixel of anti-aliasing on shape edges. It needs no GPU,
//! which makes it the backend for headless snapshots.

use std::path::Path;

use glam::Vec2;
use image::{ImageFormat, ImageResult, Rgba as Pixel, RgbaImage};

use crate::surface::{Bounds, Rgba, Surface};

/// A [`Surface`] backed by an RGBA8 image buffer.
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel at `(x, y)` as 8-bit RGBA.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Write the current contents as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)
    }

    /// Blend `color` over every pixel in the box, weighted by `coverage`.
    fn paint<F>(&mut self, min: Vec2, max: Vec2, color: Rgba, coverage: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || color.a <= 0.0 {
            return;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w - 1);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cov = coverage(center).clamp(0.0, 1.0);
                if cov > 0.0 {
                    let px = self.image.get_pixel_mut(x, y);
                    *px = blend(*px, color, color.a * cov);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Bounds {
        let (w, h) = self.image.dimensions();
        Bounds::new(w as f32, h as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self, color: Rgba) {
        let px = Pixel(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let reach = Vec2::splat(radius + 1.0);
        self.paint(center - reach, center + reach, color, |p| {
            radius + 0.5 - p.distance(center)
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let half = width * 0.5;
        let reach = Vec2::splat(half + 1.0);
        self.paint(from.min(to) - reach, from.max(to) + reach, color, |p| {
            half + 0.5 - distance_to_segment(p, from, to)
        });
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Source-over blend of straight-alpha `color` at opacity `alpha`.
fn blend(dst: Pixel<u8>, color: Rgba, alpha: f32) -> Pixel<u8> {
    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        return Pixel([0, 0, 0, 0]);
    }
    let mix = |s: f32, d: f32| (s * alpha + d * da * (1.0 - alpha)) / out_a;
    Rgba::new(mix(color.r, dr), mix(color.g, dg), mix(color.b, db), out_a)
        .to_rgba8()
        .into()
}
