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

use std::{fmt, str::FromStr, time::Duration};

use super::AudioError;

/// Bit depth of the rendered audio. Internally every buffer holds f32 samples in
/// [-1.0, 1.0]; the bit depth decides the quantization grid and the export encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit signed PCM.
    #[default]
    Int16,
    /// 24-bit signed PCM.
    Int24,
    /// 32-bit signed PCM.
    Int32,
    /// 32-bit IEEE float.
    Float32,
}

impl BitDepth {
    /// Creates a bit depth from a bits-per-sample value and an integer/float flag.
    pub fn new(bits_per_sample: u16, float: bool) -> Result<Self, AudioError> {
        match (bits_per_sample, float) {
            (16, false) => Ok(BitDepth::Int16),
            (24, false) => Ok(BitDepth::Int24),
            (32, false) => Ok(BitDepth::Int32),
            (32, true) => Ok(BitDepth::Float32),
            _ => Err(AudioError::UnsupportedBitDepth(bits_per_sample)),
        }
    }

    /// Number of bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Int32 | BitDepth::Float32 => 32,
        }
    }

    /// Whether samples are stored as floating point.
    pub fn is_float(self) -> bool {
        self == BitDepth::Float32
    }

    /// The magnitude of the most negative integer sample (2^(bits-1)), or None for float.
    pub fn full_scale(self) -> Option<f64> {
        if self.is_float() {
            None
        } else {
            Some((1i64 << (self.bits() - 1)) as f64)
        }
    }

    /// Converts a normalized sample to its integer representation, rounding to the
    /// nearest step and saturating at the integer range. None for float depths.
    pub fn to_int(self, sample: f32) -> Option<i32> {
        self.full_scale()
            .map(|scale| (sample as f64 * scale).round().clamp(-scale, scale - 1.0) as i32)
    }

    /// Snaps a normalized sample to the quantization grid of this bit depth.
    pub fn quantize(self, sample: f32) -> f32 {
        match (self.to_int(sample), self.full_scale()) {
            (Some(value), Some(scale)) => (value as f64 / scale) as f32,
            _ => sample,
        }
    }
}

impl FromStr for BitDepth {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "16" | "int16" | "i16" => Ok(BitDepth::Int16),
            "24" | "int24" | "i24" => Ok(BitDepth::Int24),
            "32" | "int32" | "i32" => Ok(BitDepth::Int32),
            "float" | "float32" | "f32" => Ok(BitDepth::Float32),
            _ => Err(AudioError::InvalidParameter(format!(
                "unsupported bit depth: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::Float32 => write!(f, "32-bit float"),
            depth => write!(f, "{}-bit int", depth.bits()),
        }
    }
}

/// The fixed format every buffer in a render shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    sample_rate: u32,
    channels: u16,
    bit_depth: BitDepth,
}

impl Format {
    /// Creates a new format.
    pub fn new(sample_rate: u32, channels: u16, bit_depth: BitDepth) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidParameter(
                "sample rate must be greater than 0".into(),
            ));
        }
        if channels == 0 {
            return Err(AudioError::InvalidParameter(
                "channel count must be greater than 0".into(),
            ));
        }

        Ok(Format {
            sample_rate,
            channels,
            bit_depth,
        })
    }

    /// 44.1kHz mono 16-bit, the format both pipelines default to.
    pub fn cd_mono() -> Self {
        Format {
            sample_rate: 44100,
            channels: 1,
            bit_depth: BitDepth::Int16,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Returns a copy of this format with a different channel count.
    pub fn with_channels(&self, channels: u16) -> Result<Self, AudioError> {
        Format::new(self.sample_rate, channels, self.bit_depth)
    }

    /// Number of frames covering the given number of seconds, rounded to the nearest frame.
    /// Callers are expected to pass a finite, non-negative value.
    pub fn frames_for(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64).round().max(0.0) as usize
    }

    /// Number of frames covering the given duration.
    pub fn frames_for_duration(&self, duration: Duration) -> usize {
        self.frames_for(duration.as_secs_f64())
    }

    /// Length in seconds of the given number of frames.
    pub fn seconds_for(&self, frames: usize) -> f64 {
        frames as f64 / self.sample_rate as f64
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::cd_mono()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz, {} channel(s), {}",
            self.sample_rate, self.channels, self.bit_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depth_from_str() {
        assert_eq!(BitDepth::from_str("16").unwrap(), BitDepth::Int16);
        assert_eq!(BitDepth::from_str("int24").unwrap(), BitDepth::Int24);
        assert_eq!(BitDepth::from_str("float").unwrap(), BitDepth::Float32);
        assert!(BitDepth::from_str("8").is_err());
    }

    #[test]
    fn quantize_snaps_to_grid() {
        let depth = BitDepth::Int16;
        let q = depth.quantize(0.123_456);
        assert_eq!(depth.to_int(q), Some((0.123_456f64 * 32768.0).round() as i32));
        assert_eq!(depth.quantize(q), q);

        // Saturates at full scale.
        assert_eq!(depth.to_int(2.0), Some(32767));
        assert_eq!(depth.to_int(-2.0), Some(-32768));
        assert_eq!(BitDepth::Float32.to_int(0.5), None);

        // Float passes through.
        assert_eq!(BitDepth::Float32.quantize(0.123_456), 0.123_456);
    }

    #[test]
    fn frame_conversions() {
        let format = Format::cd_mono();
        assert_eq!(format.frames_for(1.0), 44100);
        assert_eq!(format.frames_for(0.0), 0);
        assert_eq!(format.frames_for(1.5), 66150);
        assert_eq!(format.frames_for_duration(Duration::from_millis(250)), 11025);
        assert!((format.seconds_for(22050) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_formats() {
        assert!(Format::new(0, 1, BitDepth::Int16).is_err());
        assert!(Format::new(44100, 0, BitDepth::Int16).is_err());
        assert!(BitDepth::new(8, false).is_err());
        assert_eq!(BitDepth::new(32, true).unwrap(), BitDepth::Float32);
    }
}
