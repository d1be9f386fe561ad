//! # particle-field
//!
//! A particle network animator: a fixed set of particles drifting inside a
//! rectangle, bouncing off its walls, with a translucent line between every
//! pair closer than a threshold. Lines fade out linearly with distance.
//!
//! The animator does not own a loop or a window. It draws through a
//! [`Surface`] and asks a [`FrameScheduler`] for the next frame, so the same
//! field runs in a browser canvas, a native window or an in-memory image.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! let config = FieldConfig::default()
//!     .with_particle_count(120)
//!     .with_connection_distance(120.0);
//!
//! let mut scheduler = ManualScheduler::new();
//! let mut field = ParticleField::new(RasterSurface::new(800, 600), config)?;
//! field.initialize(&mut scheduler)?;
//!
//! while scheduler.fire() && field.frames() < 60 {
//!     field.frame(&mut scheduler);
//! }
//! field.stop(&mut scheduler);
//! field.into_surface().save_png("field.png")?;
//! ```
//!
//! ## Hosts
//!
//! | Host | Surface | Scheduler |
//! |------|---------|-----------|
//! | tests, benches | [`RecordingSurface`] | [`ManualScheduler`] |
//! | headless snapshot | [`RasterSurface`] | [`ManualScheduler`] |
//! | native window | `gpu::GpuSurface` | `window::RedrawScheduler` |
//! | browser (`wasm32`) | `web::CanvasSurface` | `web::AnimationFrameScheduler` |

mod animator;
mod config;
pub mod connections;
pub mod error;
mod particle;
mod raster;
pub mod scheduler;
mod spawn;
pub mod surface;
pub mod time;

#[cfg(not(target_arch = "wasm32"))]
pub mod gpu;
#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

pub use animator::{FieldState, FrameStats, ParticleField};
pub use config::{FieldConfig, Reinitialize};
pub use connections::{connection_opacity, ConnectionStyle};
pub use error::{ConfigError, FieldError};
pub use glam::Vec2;
pub use particle::Particle;
pub use raster::RasterSurface;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use spawn::SpawnContext;
pub use surface::{Bounds, DrawCommand, RecordingSurface, Rgba, Surface};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animator::{FieldState, FrameStats, ParticleField};
    pub use crate::config::{FieldConfig, Reinitialize};
    pub use crate::particle::Particle;
    pub use crate::raster::RasterSurface;
    pub use crate::scheduler::{FrameScheduler, ManualScheduler};
    pub use crate::surface::{Bounds, RecordingSurface, Rgba, Surface};
    pub use crate::Vec2;
}
