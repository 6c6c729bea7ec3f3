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
use serde::Deserialize;

use super::{parse_duration, ConfigError};
use crate::render::{RejectPolicy, RenderOptions};

const DEFAULT_MAX_DURATION: &str = "55s";

/// What to do with events that have a negative or non-finite offset or length.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnInvalidEvent {
    /// Log the event and leave it out.
    #[default]
    Skip,
    /// Stop rendering with an error.
    Abort,
}

/// A YAML representation of the render settings.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Render {
    /// Upper bound on the rendered length, e.g. "55s" (default: 55s). "unlimited"
    /// renders every event.
    max_duration: Option<String>,

    /// Policy for invalid events (default: skip).
    #[serde(default)]
    on_invalid_event: OnInvalidEvent,
}

impl Render {
    /// Returns the maximum output duration in seconds, or None when unlimited.
    pub fn max_duration(&self) -> Result<Option<f64>, ConfigError> {
        match self.max_duration.as_deref().unwrap_or(DEFAULT_MAX_DURATION) {
            "unlimited" => Ok(None),
            value => Ok(Some(
                parse_duration("render.max_duration", value)?.as_secs_f64(),
            )),
        }
    }

    pub fn on_invalid_event(&self) -> OnInvalidEvent {
        self.on_invalid_event
    }

    /// Builds the render options.
    pub fn options(&self) -> Result<RenderOptions, ConfigError> {
        let policy = match self.on_invalid_event {
            OnInvalidEvent::Skip => RejectPolicy::Skip,
            OnInvalidEvent::Abort => RejectPolicy::Abort,
        };
        let options = RenderOptions::unlimited().with_reject_policy(policy);
        match self.max_duration()? {
            Some(seconds) => options
                .with_max_duration(seconds)
                .map_err(|e| ConfigError::invalid("render.max_duration", e)),
            None => Ok(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Render {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_unlimited() {
        let render = parse("max_duration: unlimited");
        assert_eq!(render.options().unwrap().max_duration(), None);
        assert_eq!(render.on_invalid_event(), OnInvalidEvent::Skip);
    }

    #[test]
    fn test_policy_and_duration() {
        let render = parse(
            r#"
            max_duration: 90s
            on_invalid_event: abort
            "#,
        );
        let options = render.options().unwrap();
        assert_eq!(options.max_duration(), Some(90.0));
        assert_eq!(options.reject_policy(), RejectPolicy::Abort);
    }

    #[test]
    fn test_invalid_duration() {
        assert!(matches!(
            parse("max_duration: forever").options(),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }
}
