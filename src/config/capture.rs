// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;
use crate::capture::DEFAULT_POLL_INTERVAL;
use crate::recorder::DEFAULT_MAX_MISSES;
use crate::sampler::DEFAULT_WINDOW;

/// Parses an optional duration string, falling back to the default.
pub(super) fn duration_or(
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    value.as_ref().map_or(Ok(default), |duration| {
        Ok(DurationString::from_string(duration.clone())
            .map_err(|source| ConfigError::Duration {
                value: duration.clone(),
                source,
            })?
            .into())
    })
}

/// A YAML representation of the capture settings.
#[derive(Deserialize, Clone, Default)]
pub struct Capture {
    /// How long each sampling window stays open.
    window: Option<String>,

    /// How many misses in a row throw the attempt away.
    max_misses: Option<u32>,

    /// How often the start trigger is checked while idle.
    poll_interval: Option<String>,
}

impl Capture {
    /// Gets the sampling window.
    pub fn window(&self) -> Result<Duration, ConfigError> {
        duration_or(&self.window, DEFAULT_WINDOW)
    }

    /// Gets the miss threshold.
    pub fn max_misses(&self) -> u32 {
        self.max_misses.unwrap_or(DEFAULT_MAX_MISSES)
    }

    /// Gets the start trigger poll interval.
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        duration_or(&self.poll_interval, DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Capture {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<Capture>()
            .unwrap()
    }

    #[test]
    fn test_capture_deserialize() {
        let capture = parse(
            r#"
            window: 500ms
            max_misses: 3
            poll_interval: 5ms
        "#,
        );

        assert_eq!(Duration::from_millis(500), capture.window().unwrap());
        assert_eq!(3, capture.max_misses());
        assert_eq!(Duration::from_millis(5), capture.poll_interval().unwrap());
    }

    #[test]
    fn test_capture_defaults() {
        let capture = Capture::default();
        assert_eq!(Duration::from_millis(1500), capture.window().unwrap());
        assert_eq!(2, capture.max_misses());
        assert_eq!(Duration::from_millis(10), capture.poll_interval().unwrap());
    }

    #[test]
    fn test_capture_invalid_duration() {
        let capture = parse("window: forever");
        assert!(matches!(
            capture.window(),
            Err(ConfigError::Duration { .. })
        ));
    }
}
