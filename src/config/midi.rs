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

use super::ConfigError;
use crate::sequencer::midi::DEFAULT_TICK_DIVISOR;
use crate::sequencer::NoteMapping;

/// A YAML representation of the MIDI input settings.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Midi {
    /// Ticks per second used to turn delta times into lengths (default: 1000)
    tick_divisor: Option<f64>,

    /// Lowest note mapped to its own sample (default: 60, C4)
    lowest_note: Option<u8>,

    /// Highest note mapped to its own sample (default: 83, B5)
    highest_note: Option<u8>,

    /// Sample key for notes outside the range (default: "C4")
    fallback: Option<String>,
}

impl Midi {
    /// Returns the tick divisor (default: 1000)
    pub fn tick_divisor(&self) -> f64 {
        self.tick_divisor.unwrap_or(DEFAULT_TICK_DIVISOR)
    }

    /// Builds the note to sample key mapping.
    pub fn mapping(&self) -> Result<NoteMapping, ConfigError> {
        let default = NoteMapping::default();
        NoteMapping::new(
            self.lowest_note.unwrap_or(default.lowest()),
            self.highest_note.unwrap_or(default.highest()),
            self.fallback
                .clone()
                .unwrap_or_else(|| default.fallback().to_string()),
        )
        .map_err(|e| ConfigError::invalid("midi", e))
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    #[test]
    fn test_defaults() {
        let midi: Midi = Config::builder()
            .add_source(File::from_str("fallback: A4", FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(midi.tick_divisor(), 1000.0);
        let mapping = midi.mapping().unwrap();
        assert_eq!(mapping.key_for(60), "C4");
        assert_eq!(mapping.key_for(83), "B5");
        assert_eq!(mapping.key_for(84), "A4");
    }

    #[test]
    fn test_invalid_range() {
        let midi: Midi = Config::builder()
            .add_source(File::from_str(
                "lowest_note: 80\nhighest_note: 70",
                FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(midi.mapping().is_err());
    }
}
