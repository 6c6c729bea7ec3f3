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
use std::fmt;

/// A rejected event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("Event for '{key}' has an invalid offset: {offset}")]
    InvalidOffset { key: String, offset: f64 },

    #[error("Event for '{key}' has an invalid length: {length}")]
    InvalidLength { key: String, length: f64 },
}

/// A scheduled placement of one source buffer on the timeline.
///
/// Offsets and lengths are in seconds. Events are plain data and are not validated on
/// construction; renderers call `validate` and apply their rejection policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    offset: f64,
    length: f64,
    source: String,
    gain_db: Option<f64>,
}

impl Event {
    pub fn new<S: Into<String>>(offset: f64, length: f64, source: S) -> Self {
        Self {
            offset,
            length,
            source: source.into(),
            gain_db: None,
        }
    }

    /// Sets a gain adjustment in dB applied to the rendered source.
    pub fn with_gain(mut self, gain_db: f64) -> Self {
        self.gain_db = Some(gain_db);
        self
    }

    /// Start of the event in seconds from the beginning of the timeline.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Requested length in seconds.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The sample table key of the source.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn gain_db(&self) -> Option<f64> {
        self.gain_db
    }

    /// Checks that the offset and length are finite and non-negative.
    pub fn validate(&self) -> Result<(), EventError> {
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(EventError::InvalidOffset {
                key: self.source.clone(),
                offset: self.offset,
            });
        }
        if !self.length.is_finite() || self.length < 0.0 {
            return Err(EventError::InvalidLength {
                key: self.source.clone(),
                length: self.length,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {:.3}s for {:.3}s",
            self.source, self.offset, self.length
        )?;
        if let Some(gain) = self.gain_db {
            write!(f, " ({:+.1} dB)", gain)?;
        }
        Ok(())
    }
}
