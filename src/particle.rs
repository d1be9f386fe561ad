//! The particle entity: a point drifting in a bounded plane.

use glam::Vec2;

use crate::config::FieldConfig;
use crate::spawn::SpawnContext;
use crate::surface::{Bounds, Rgba, Surface};

/// One particle of the field.
///
/// Velocity is in surface units per frame. It is drawn once at creation and
/// afterwards only changes sign when the particle meets a wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// Spawn a particle somewhere inside `ctx.bounds`.
    pub fn create(ctx: &mut SpawnContext, config: &FieldConfig) -> Self {
        let position = ctx.random_in_bounds();
        let velocity = ctx.random_velocity(config.max_speed);
        let radius = ctx.random_range(config.min_radius, config.max_radius);
        Self::new(position, velocity, radius)
    }

    /// Advance one frame and bounce off the walls of `bounds`.
    pub fn update(&mut self, bounds: Bounds) {
        bounce_axis(&mut self.position.x, &mut self.velocity.x, bounds.width);
        bounce_axis(&mut self.position.y, &mut self.velocity.y, bounds.height);
    }

    /// Paint the particle as a filled circle.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, color: Rgba) {
        surface.fill_circle(self.position, self.radius, color);
    }
}

/// Step one axis within `[0, extent]`.
///
/// A step that crosses a wall turns the velocity toward the interior and
/// mirrors the overshoot back inside. A particle that is already outside
/// (the surface shrank under it) is only turned around and drifts back.
fn bounce_axis(pos: &mut f32, vel: &mut f32, extent: f32) {
    if *pos < 0.0 || *pos > extent {
        *vel = if *pos < 0.0 { vel.abs() } else { -vel.abs() };
        *pos += *vel;
        return;
    }

    *pos += *vel;
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = vel.abs();
    } else if *pos > extent {
        *pos = 2.0 * extent - *pos;
        *vel = -vel.abs();
    }
    // Mirroring overshoots the far wall only when |vel| exceeds the extent.
    *pos = pos.max(0.0).min(extent);
}
