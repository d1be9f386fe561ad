//! Drawing surfaces the animator renders into.
//!
//! The animator only needs an immediate-mode 2D target: clear the whole area,
//! fill a circle, stroke a line. [`Surface`] captures exactly that, so the same
//! animation can drive a browser canvas, a GPU swapchain or an in-memory image.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Size of a drawing surface in surface units (device pixels).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether the point lies within `[0, width] x [0, height]`.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Whether there is any area to place particles in.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Straight (non-premultiplied) RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from 8-bit channels and a float alpha, like CSS `rgba()`.
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Same color with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// 8-bit channels, alpha included.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS color string, e.g. `rgba(99, 102, 241, 0.5)`.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({}, {}, {}, {})", r, g, b, self.a.clamp(0.0, 1.0))
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// An immediate-mode 2D raster target.
///
/// Coordinates are in surface units with the origin at the top-left corner
/// and y growing downward.
pub trait Surface {
    /// Current drawable size.
    fn size(&self) -> Bounds;

    /// Change the drawable size. Existing content may be discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Fill the entire surface with `color`, replacing what was there.
    fn clear(&mut self, color: Rgba);

    /// Fill a circle centered at `center`.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroke a straight line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    /// Flush everything drawn since the last clear. Batching backends submit
    /// their work here; immediate backends need not override it.
    fn present(&mut self) {}
}

/// A single recorded drawing call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    Circle { center: Vec2, radius: f32, color: Rgba },
    Line { from: Vec2, to: Vec2, color: Rgba, width: f32 },
}

/// A surface that remembers what was drawn on it since the last clear.
///
/// Used for tests and benchmarks where pixels do not matter but the exact
/// sequence of drawing calls does.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Bounds,
    commands: Vec<DrawCommand>,
    presents: u64,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Bounds::new(width as f32, height as f32),
            commands: Vec::new(),
            presents: 0,
        }
    }

    /// Commands recorded since the last clear (the clear itself included).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    /// Number of times [`Surface::present`] was called.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Bounds {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = Bounds::new(width as f32, height as f32);
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_matches_source_palette() {
        let indigo = Rgba::from_rgb8(99, 102, 241, 0.5);
        assert_eq!(indigo.to_css(), "rgba(99, 102, 241, 0.5)");
    }

    #[test]
    fn test_bounds_contains_edges() {
        let b = Bounds::new(100.0, 50.0);
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(b.contains(Vec2::new(100.0, 50.0)));
        assert!(!b.contains(Vec2::new(100.1, 10.0)));
        assert!(!b.contains(Vec2::new(10.0, -0.1)));
    }

    #[test]
    fn test_empty_bounds() {
        assert!(Bounds::new(0.0, 10.0).is_empty());
        assert!(Bounds::new(f32::NAN, 10.0).is_empty());
        assert!(!Bounds::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_recording_surface_clear_resets_commands() {
        let mut s = RecordingSurface::new(10, 10);
        s.fill_circle(Vec2::ZERO, 1.0, Rgba::BLACK);
        s.clear(Rgba::TRANSPARENT);
        s.stroke_line(Vec2::ZERO, Vec2::ONE, Rgba::BLACK, 1.0);
        assert_eq!(s.commands().len(), 2);
        assert_eq!(s.circles().count(), 0);
        assert_eq!(s.lines().count(), 1);
    }
}
