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
use crate::audio::{BitDepth, Format};

const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
const DEFAULT_CHANNELS: u16 = 1;

/// A YAML representation of the render format.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AudioFormat {
    /// Sample rate in Hz (default: 44100)
    sample_rate: Option<u32>,

    /// Sample format, "int" or "float" (default: "int")
    sample_format: Option<String>,

    /// Bits per sample (default: 16)
    bits_per_sample: Option<u16>,

    /// Channel count (default: 1)
    channels: Option<u16>,
}

impl AudioFormat {
    /// Returns the target sample rate (default: 44100)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the target bits per sample (default: 16)
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample.unwrap_or(DEFAULT_BITS_PER_SAMPLE)
    }

    /// Returns the channel count (default: 1)
    pub fn channels(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    /// Returns the bit depth described by the sample format and bits per sample.
    pub fn bit_depth(&self) -> Result<BitDepth, ConfigError> {
        let float = match self.sample_format.as_deref() {
            None | Some("int") => false,
            Some("float") => true,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "format.sample_format",
                    format!("expected \"int\" or \"float\", got \"{}\"", other),
                ))
            }
        };
        BitDepth::new(self.bits_per_sample(), float)
            .map_err(|e| ConfigError::invalid("format.bits_per_sample", e))
    }

    /// Builds the render format.
    pub fn format(&self) -> Result<Format, ConfigError> {
        Format::new(self.sample_rate(), self.channels(), self.bit_depth()?)
            .map_err(|e| ConfigError::invalid("format", e))
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> AudioFormat {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_float_format() {
        let format = parse(
            r#"
            sample_rate: 48000
            sample_format: float
            bits_per_sample: 32
            "#,
        );
        assert_eq!(
            format.format().unwrap(),
            Format::new(48000, 1, BitDepth::Float32).unwrap()
        );
    }

    #[test]
    fn test_invalid_format() {
        assert!(parse("sample_format: double").bit_depth().is_err());
        assert!(parse("bits_per_sample: 12").format().is_err());
        assert!(parse("sample_rate: 0").format().is_err());
    }
}
