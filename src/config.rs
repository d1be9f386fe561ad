//! Field configuration.
//!
//! A [`FieldConfig`] can be built in code with the `with_*` methods or loaded
//! from JSON. Missing JSON keys fall back to the defaults, which reproduce the
//! classic portfolio-page particle network: 80 indigo particles joined by
//! lines up to 150 pixels long.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::surface::Rgba;

/// What `initialize` does when the field is already running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reinitialize {
    /// Throw away the current particles and spawn a fresh set.
    #[default]
    Reset,
    /// Keep the current particles and append a new batch.
    Accumulate,
}

/// Complete particle field configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: u32,
    /// Pairs closer than this are connected.
    pub connection_distance: f32,
    /// Line alpha for two particles at the same spot.
    pub max_line_opacity: f32,
    pub line_width: f32,
    /// Each velocity component is drawn from `[-max_speed, max_speed)`.
    pub max_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub particle_color: Rgba,
    /// Only the RGB part is used; alpha is computed per line.
    pub line_color: Rgba,
    pub background: Rgba,
    /// Fixed RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub reinitialize: Reinitialize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            connection_distance: 150.0,
            max_line_opacity: 0.3,
            line_width: 1.0,
            max_speed: 0.25,
            min_radius: 1.0,
            max_radius: 3.0,
            particle_color: Rgba::from_rgb8(99, 102, 241, 0.5),
            line_color: Rgba::from_rgb8(99, 102, 241, 1.0),
            background: Rgba::TRANSPARENT,
            seed: None,
            reinitialize: Reinitialize::Reset,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the connection threshold.
    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    /// Set the line opacity at distance zero.
    pub fn with_max_line_opacity(mut self, opacity: f32) -> Self {
        self.max_line_opacity = opacity;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the per-axis speed limit used when spawning.
    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = speed;
        self
    }

    /// Set the particle radius range.
    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    pub fn with_particle_color(mut self, color: Rgba) -> Self {
        self.particle_color = color;
        self
    }

    pub fn with_line_color(mut self, color: Rgba) -> Self {
        self.line_color = color;
        self
    }

    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Use a fixed seed so the same field is produced every run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_reinitialize(mut self, policy: Reinitialize) -> Self {
        self.reinitialize = policy;
        self
    }

    /// Check every value the animator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(self.connection_distance.is_finite() && self.connection_distance > 0.0) {
            return Err(ConfigError::InvalidConnectionDistance(self.connection_distance));
        }
        if !(0.0..=1.0).contains(&self.max_line_opacity) {
            return Err(ConfigError::InvalidOpacity(self.max_line_opacity));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(ConfigError::InvalidSpeed(self.max_speed));
        }
        if !(self.min_radius > 0.0 && self.max_radius.is_finite() && self.min_radius < self.max_radius) {
            return Err(ConfigError::InvalidRadius {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(ConfigError::InvalidLineWidth(self.line_width));
        }
        Ok(())
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FieldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FieldConfig::from_json(r#"{ "particle_count": 12, "reinitialize": "accumulate" }"#)
            .unwrap();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.connection_distance, 150.0);
        assert_eq!(config.reinitialize, Reinitialize::Accumulate);
    }

    #[test]
    fn test_rejects_zero_particles() {
        let err = FieldConfig::new().with_particle_count(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroParticles));
    }

    #[test]
    fn test_rejects_bad_distance_and_opacity() {
        assert!(matches!(
            FieldConfig::new().with_connection_distance(0.0).validate(),
            Err(ConfigError::InvalidConnectionDistance(_))
        ));
        assert!(matches!(
            FieldConfig::new().with_connection_distance(f32::INFINITY).validate(),
            Err(ConfigError::InvalidConnectionDistance(_))
        ));
        assert!(matches!(
            FieldConfig::new().with_max_line_opacity(1.5).validate(),
            Err(ConfigError::InvalidOpacity(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_radius() {
        assert!(matches!(
            FieldConfig::new().with_radius_range(3.0, 1.0).validate(),
            Err(ConfigError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(
            FieldConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("particle-field-{}.json", std::process::id()));
        let config = FieldConfig::new().with_particle_count(33).with_seed(7);
        config.save(&path).unwrap();
        let loaded = FieldConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
