//! Spawn context for particle initialization.
//!
//! Wraps the RNG used when a field is (re)initialized, with helpers for the
//! handful of distributions particles are drawn from.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
// std::time panics on wasm32-unknown-unknown.
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use crate::surface::Bounds;

/// Random source handed to [`Particle::create`](crate::Particle::create).
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(Bounds::new(800.0, 600.0), 42);
/// let p = Particle::create(&mut ctx, &FieldConfig::default());
/// ```
pub struct SpawnContext {
    /// Area particles are placed in.
    pub bounds: Bounds,
    rng: SmallRng,
}

impl SpawnContext {
    /// Context seeded from the system clock, different every run.
    pub fn new(bounds: Bounds) -> Self {
        Self::seeded(bounds, clock_seed())
    }

    /// Context with a fixed seed, for reproducible fields.
    pub fn seeded(bounds: Bounds, seed: u64) -> Self {
        Self {
            bounds,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded if `seed` is given, clock-seeded otherwise.
    pub fn from_seed(bounds: Bounds, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(bounds, seed),
            None => Self::new(bounds),
        }
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random point in `[0, width) x [0, height)`.
    pub fn random_in_bounds(&mut self) -> Vec2 {
        Vec2::new(
            self.random_range(0.0, self.bounds.width),
            self.random_range(0.0, self.bounds.height),
        )
    }

    /// Velocity with each component uniform in `[-max_speed, max_speed)`.
    pub fn random_velocity(&mut self, max_speed: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max_speed, max_speed),
            self.random_range(-max_speed, max_speed),
        )
    }
}

/// Nanoseconds since the Unix epoch, or a fixed value if the clock is
/// before it.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_in_bounds() {
        let mut ctx = SpawnContext::seeded(Bounds::new(640.0, 480.0), 1);
        for _ in 0..500 {
            let p = ctx.random_in_bounds();
            assert!(p.x >= 0.0 && p.x < 640.0);
            assert!(p.y >= 0.0 && p.y < 480.0);
        }
    }

    #[test]
    fn test_random_velocity_range() {
        let mut ctx = SpawnContext::seeded(Bounds::new(1.0, 1.0), 2);
        for _ in 0..500 {
            let v = ctx.random_velocity(0.25);
            assert!(v.x >= -0.25 && v.x < 0.25);
            assert!(v.y >= -0.25 && v.y < 0.25);
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut ctx = SpawnContext::seeded(Bounds::new(1.0, 1.0), 3);
        assert_eq!(ctx.random_range(0.0, 0.0), 0.0);
        assert_eq!(ctx.random_velocity(0.0), Vec2::ZERO);
    }

    #[test]
    fn test_clock_seeded_context_spawns_in_bounds() {
        let mut ctx = SpawnContext::from_seed(Bounds::new(320.0, 240.0), None);
        let p = ctx.random_in_bounds();
        assert!(p.x >= 0.0 && p.x < 320.0);
        assert!(p.y >= 0.0 && p.y < 240.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SpawnContext::seeded(Bounds::new(100.0, 100.0), 9);
        let mut b = SpawnContext::seeded(Bounds::new(100.0, 100.0), 9);
        for _ in 0..10 {
            assert_eq!(a.random_in_bounds(), b.random_in_bounds());
        }
    }
}
