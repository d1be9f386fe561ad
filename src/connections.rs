//! Proximity lines between nearby particles.
//!
//! Every unordered pair closer than the connection distance is joined by a
//! line whose alpha fades linearly from `max_opacity` at distance zero to
//! nothing at the threshold.
//!
//! # Cost
//!
//! The pass is a brute-force O(n²) scan over all pairs, run every frame. At
//! the default 80 particles that is 3 160 distance checks, well below a
//! millisecond. Past a few hundred particles a uniform grid with cells of
//! `connection_distance` would be needed so each particle only checks its 3x3
//! neighborhood; this module does not provide one.

use glam::Vec2;

use crate::particle::Particle;
use crate::surface::{Rgba, Surface};

/// How connection lines are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionStyle {
    /// Pairs at or beyond this distance are not connected.
    pub threshold: f32,
    /// Alpha at distance zero.
    pub max_opacity: f32,
    /// Stroke RGB; alpha is replaced per line.
    pub color: Rgba,
    pub width: f32,
}

/// Line alpha for two particles `distance` apart, or `None` when they are too
/// far apart to be connected.
#[inline]
pub fn connection_opacity(distance: f32, threshold: f32, max_opacity: f32) -> Option<f32> {
    if distance < threshold {
        Some((1.0 - distance / threshold) * max_opacity)
    } else {
        None
    }
}

/// Call `f(i, j, distance)` for every pair `i < j` closer than `threshold`.
///
/// Returns the number of pairs visited.
pub fn for_each_connection<F>(particles: &[Particle], threshold: f32, mut f: F) -> usize
where
    F: FnMut(usize, usize, f32),
{
    let threshold_sq = threshold * threshold;
    let mut count = 0;
    for (i, a) in particles.iter().enumerate() {
        for (j, b) in particles.iter().enumerate().skip(i + 1) {
            let dist_sq = a.position.distance_squared(b.position);
            if dist_sq < threshold_sq {
                f(i, j, dist_sq.sqrt());
                count += 1;
            }
        }
    }
    count
}

/// Stroke every connection onto `surface`. Returns the number of lines drawn.
pub fn draw_connections<S: Surface + ?Sized>(
    particles: &[Particle],
    style: &ConnectionStyle,
    surface: &mut S,
) -> usize {
    let mut drawn = 0;
    for_each_connection(particles, style.threshold, |i, j, distance| {
        if let Some(alpha) = connection_opacity(distance, style.threshold, style.max_opacity) {
            let from: Vec2 = particles[i].position;
            let to: Vec2 = particles[j].position;
            surface.stroke_line(from, to, style.color.with_alpha(alpha), style.width);
            drawn += 1;
        }
    });
    drawn
}
