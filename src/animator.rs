//! The particle field animator.
//!
//! [`ParticleField`] owns the particles, the drawing surface and the
//! configuration. It is driven from outside: the host calls
//! [`frame`](ParticleField::frame) whenever the [`FrameScheduler`] fires, and
//! [`on_resize`](ParticleField::on_resize) when the viewport changes. Both run
//! on the same thread, so a resize can never land in the middle of a frame.
//!
//! ```text
//!                 initialize                stop
//! Uninitialized ─────────────▶ Running ─────────────▶ Stopped
//!                                 ▲                      │
//!                                 └──────────────────────┘
//!                                        initialize
//! ```

use tracing::{debug, info, warn};

use crate::config::{FieldConfig, Reinitialize};
use crate::connections::{draw_connections, ConnectionStyle};
use crate::error::FieldError;
use crate::particle::Particle;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::spawn::SpawnContext;
use crate::surface::{Bounds, Surface};
use crate::time::FrameClock;

/// Lifecycle of a [`ParticleField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldState {
    /// Created but no particles spawned yet.
    Uninitialized,
    /// Particles exist and a frame is scheduled.
    Running,
    /// The pending frame was cancelled. Particles are kept.
    Stopped,
}

/// What a single frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub connections: usize,
}

/// A field of drifting particles joined by proximity lines.
pub struct ParticleField<S: Surface> {
    surface: S,
    config: FieldConfig,
    particles: Vec<Particle>,
    bounds: Bounds,
    state: FieldState,
    pending: Option<FrameHandle>,
    clock: FrameClock,
    spawned_batches: u64,
}

impl<S: Surface> ParticleField<S> {
    /// Wrap `surface` in a new, uninitialized field.
    pub fn new(surface: S, config: FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let bounds = surface.size();
        Ok(Self {
            surface,
            config,
            particles: Vec::new(),
            bounds,
            state: FieldState::Uninitialized,
            pending: None,
            clock: FrameClock::new(),
            spawned_batches: 0,
        })
    }

    /// Spawn `config.particle_count` particles and schedule the first frame.
    pub fn initialize<F>(&mut self, scheduler: &mut F) -> Result<(), FieldError>
    where
        F: FrameScheduler + ?Sized,
    {
        self.initialize_with_count(self.config.particle_count as usize, scheduler)
    }

    /// Spawn `count` particles and schedule the first frame.
    ///
    /// Calling this on a running field follows the configured
    /// [`Reinitialize`] policy. Either way at most one frame stays scheduled.
    pub fn initialize_with_count<F>(&mut self, count: usize, scheduler: &mut F) -> Result<(), FieldError>
    where
        F: FrameScheduler + ?Sized,
    {
        if count == 0 {
            return Err(FieldError::EmptyField);
        }
        let bounds = self.surface.size();
        if bounds.is_empty() {
            return Err(FieldError::EmptySurface {
                width: bounds.width,
                height: bounds.height,
            });
        }
        self.bounds = bounds;

        match (self.state, self.config.reinitialize) {
            (FieldState::Running, Reinitialize::Accumulate) => {
                warn!(
                    existing = self.particles.len(),
                    added = count,
                    "field already running, accumulating particles"
                );
            }
            (FieldState::Running, Reinitialize::Reset) => {
                warn!(count, "field already running, resetting particles");
                self.particles.clear();
            }
            _ => self.particles.clear(),
        }

        // Offset the seed per batch so accumulated batches do not overlap.
        let seed = self
            .config
            .seed
            .map(|s| s.wrapping_add(self.spawned_batches));
        let mut ctx = SpawnContext::from_seed(bounds, seed);
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::create(&mut ctx, &self.config));
        }
        self.spawned_batches += 1;

        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.pending = Some(scheduler.request_frame());
        self.state = FieldState::Running;
        self.clock.reset();

        info!(
            particles = self.particles.len(),
            width = bounds.width,
            height = bounds.height,
            "particle field initialized"
        );
        Ok(())
    }

    /// Run one frame: clear, move and draw every particle, draw the
    /// connections, then ask for the next frame.
    ///
    /// Does nothing unless the field is running.
    pub fn frame<F>(&mut self, scheduler: &mut F) -> FrameStats
    where
        F: FrameScheduler + ?Sized,
    {
        if self.state != FieldState::Running {
            return FrameStats::default();
        }
        // The request that brought us here has fired.
        self.pending = None;

        self.surface.clear(self.config.background);

        let color = self.config.particle_color;
        for particle in &mut self.particles {
            particle.update(self.bounds);
            particle.draw(&mut self.surface, color);
        }

        let connections = draw_connections(&self.particles, &self.connection_style(), &mut self.surface);
        self.surface.present();

        if self.clock.tick() {
            debug!(
                frame = self.clock.frame(),
                fps = self.clock.fps(),
                frame_ms = self.clock.delta() * 1000.0,
                connections,
                "frame stats"
            );
        }

        self.pending = Some(scheduler.request_frame());

        FrameStats {
            particles: self.particles.len(),
            connections,
        }
    }

    /// Resize the surface to the new viewport. Particles are left where they
    /// are; any outside the new area find their way back by bouncing.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.bounds = self.surface.size();
        info!(width, height, "particle field resized");
    }

    /// Cancel the pending frame and stop animating. Safe to call repeatedly.
    pub fn stop<F>(&mut self, scheduler: &mut F)
    where
        F: FrameScheduler + ?Sized,
    {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        if self.state == FieldState::Running {
            self.state = FieldState::Stopped;
            info!(
                frames = self.clock.frame(),
                seconds = self.clock.elapsed(),
                "particle field stopped"
            );
        }
    }

    fn connection_style(&self) -> ConnectionStyle {
        ConnectionStyle {
            threshold: self.config.connection_distance,
            max_opacity: self.config.max_line_opacity,
            color: self.config.line_color,
            width: self.config.line_width,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Area particles currently bounce within.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The frame request still outstanding, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Frame timing since the last initialize.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Frames rendered since the last initialize.
    pub fn frames(&self) -> u64 {
        self.clock.frame()
    }

    /// Give the surface back, e.g. to save a raster snapshot.
    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::surface::RecordingSurface;

    fn field(config: FieldConfig) -> ParticleField<RecordingSurface> {
        ParticleField::new(RecordingSurface::new(800, 600), config.with_seed(5)).unwrap()
    }

    #[test]
    fn test_frame_before_initialize_does_nothing() {
        let mut f = field(FieldConfig::default());
        let mut s = ManualScheduler::new();
        assert_eq!(f.frame(&mut s), FrameStats::default());
        assert_eq!(s.requested(), 0);
        assert!(f.surface().commands().is_empty());
    }

    #[test]
    fn test_initialize_schedules_once() {
        let mut f = field(FieldConfig::default());
        let mut s = ManualScheduler::new();
        f.initialize(&mut s).unwrap();
        assert_eq!(f.state(), FieldState::Running);
        assert_eq!(f.particles().len(), 80);
        assert_eq!(s.requested(), 1);
        assert_eq!(f.pending_frame(), s.pending());
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut f = field(FieldConfig::default());
        let mut s = ManualScheduler::new();
        assert!(matches!(
            f.initialize_with_count(0, &mut s),
            Err(FieldError::EmptyField)
        ));
        assert_eq!(f.state(), FieldState::Uninitialized);
    }

    #[test]
    fn test_empty_surface_rejected() {
        let mut f = ParticleField::new(RecordingSurface::new(0, 600), FieldConfig::default()).unwrap();
        let mut s = ManualScheduler::new();
        assert!(matches!(
            f.initialize(&mut s),
            Err(FieldError::EmptySurface { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ParticleField::new(
            RecordingSurface::new(10, 10),
            FieldConfig::default().with_particle_count(0),
        );
        assert!(matches!(result, Err(FieldError::Config(_))));
    }

    #[test]
    fn test_frame_draws_clear_particles_lines() {
        let mut f = field(FieldConfig::default());
        let mut s = ManualScheduler::new();
        f.initialize(&mut s).unwrap();
        s.fire();
        let stats = f.frame(&mut s);

        let cmds = f.surface().commands();
        assert!(matches!(cmds[0], crate::surface::DrawCommand::Clear(_)));
        assert_eq!(f.surface().circles().count(), 80);
        assert_eq!(f.surface().lines().count(), stats.connections);
        assert_eq!(f.surface().presents(), 1);
        assert_eq!(f.frames(), 1);
        assert_eq!(s.requested(), 2);
    }
}
