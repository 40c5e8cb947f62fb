//! Runtime tuning loaded from an optional TOML file.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use marble_maze_system_tilt::Config as TiltConfig;
use serde::Deserialize;

/// Tunable parameters for the headless runner.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) tick_rate_hz: u32,
    pub(crate) player_radius: f32,
    pub(crate) sensor_radius: f32,
    pub(crate) linear_damping: f32,
    pub(crate) points_per_unit: f32,
    pub(crate) accelerometer_scale: f32,
    pub(crate) drag_divisor: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            player_radius: 24.0,
            sensor_radius: 32.0,
            linear_damping: 0.5,
            points_per_unit: 150.0,
            accelerometer_scale: 50.0,
            drag_divisor: 100.0,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        if settings.tick_rate_hz == 0 {
            bail!("tick_rate_hz must be positive");
        }
        if settings.player_radius <= 0.0 || settings.sensor_radius <= 0.0 {
            bail!("collision radii must be positive");
        }
        if settings.linear_damping < 0.0 {
            bail!("linear_damping must not be negative");
        }
        Ok(settings)
    }

    /// Fixed simulation step derived from the tick rate.
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz))
    }

    pub(crate) fn tilt(&self) -> TiltConfig {
        TiltConfig::new(self.accelerometer_scale, self.drag_divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_argument_yields_defaults() {
        let settings = Settings::load(None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.linear_damping, 0.5);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "tick_rate_hz = 120\nplayer_radius = 20.0").expect("write settings");

        let settings = Settings::load(Some(file.path())).expect("settings load");

        assert_eq!(settings.tick_rate_hz, 120);
        assert_eq!(settings.player_radius, 20.0);
        assert_eq!(settings.drag_divisor, 100.0);
        assert_eq!(settings.tick(), Duration::from_secs_f64(1.0 / 120.0));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse("gravity = 9.8").is_err());
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let error = Settings::parse("tick_rate_hz = 0").expect_err("zero rate");
        assert!(error.to_string().contains("tick_rate_hz"));
    }

    #[test]
    fn unreadable_path_names_the_file() {
        let error = Settings::load(Some(Path::new("/nonexistent/marble.toml")))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/marble.toml"));
    }
}
