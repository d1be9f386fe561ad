//! Frame timing.
//!
//! Motion in the field is expressed per frame, not per second, so the clock
//! never feeds into particle updates. It exists for reporting: frame counts,
//! frame times and a smoothed FPS figure for window titles and logs.
//!
//! # Example
//!
//! ```ignore
//! use particle_field::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // Once per frame:
//! if clock.tick() {
//!     println!("FPS: {:.1}", clock.fps());
//! }
//! ```

use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Frame counter with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record one frame. Returns `true` when the FPS estimate was refreshed.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            return true;
        }
        false
    }

    /// Seconds since the clock was created or reset.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked since the clock was created or reset.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// How often the FPS estimate is refreshed.
    pub fn set_fps_update_interval(&mut self, interval: Duration) {
        self.fps_update_interval = interval;
    }

    /// Start over from zero.
    pub fn reset(&mut self) {
        *self = Self {
            fps_update_interval: self.fps_update_interval,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
