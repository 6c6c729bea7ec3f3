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
use tracing::info;

use crate::audio::dsp::{self, Compressor};
use crate::audio::AudioBuffer;

/// Headroom left below full scale when normalizing, in dB.
pub const DEFAULT_HEADROOM_DB: f64 = 0.1;

/// The transforms applied once to a finished render: compression, then peak
/// normalization. Either stage may be turned off; the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessor {
    compressor: Option<Compressor>,
    headroom_db: Option<f64>,
}

impl PostProcessor {
    pub fn new(compressor: Option<Compressor>, headroom_db: Option<f64>) -> Self {
        Self {
            compressor,
            headroom_db,
        }
    }

    /// A chain that only normalizes.
    pub fn normalize_only(headroom_db: f64) -> Self {
        Self::new(None, Some(headroom_db))
    }

    pub fn compressor(&self) -> Option<&Compressor> {
        self.compressor.as_ref()
    }

    pub fn headroom_db(&self) -> Option<f64> {
        self.headroom_db
    }

    pub fn process(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let input_peak = buffer.peak();
        let compressed = match &self.compressor {
            Some(compressor) => compressor.apply(buffer),
            None => buffer.clone(),
        };
        let output = match self.headroom_db {
            Some(headroom_db) => dsp::normalize(&compressed, headroom_db),
            None => compressed,
        };

        info!(
            compressed = self.compressor.is_some(),
            normalized = self.headroom_db.is_some(),
            input_peak,
            output_peak = output.peak(),
            "Post-processed buffer"
        );
        output
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::normalize_only(DEFAULT_HEADROOM_DB)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::{db_to_amplitude, tone, Format};

    fn compressor() -> Compressor {
        Compressor::new(
            -10.0,
            4.0,
            Duration::from_millis(5),
            Duration::from_millis(50),
        )
        .unwrap()
    }

    #[test]
    fn normalizes_to_headroom() {
        let quiet = tone::sine(440.0, 0.5, 0.1, Format::cd_mono()).unwrap();
        let output = PostProcessor::default().process(&quiet);
        let target = db_to_amplitude(-DEFAULT_HEADROOM_DB);
        assert!((output.peak() - target).abs() < 1e-6);
        assert_eq!(output.frames(), quiet.frames());
    }

    #[test]
    fn compresses_before_normalizing() {
        // A loud burst followed by a quiet tail: compression narrows the gap, and the
        // normalized result still peaks at the ceiling.
        let format = Format::cd_mono();
        let loud = tone::sine(220.0, 0.5, 1.0, format).unwrap();
        let quiet = tone::sine(220.0, 0.5, 0.2, format).unwrap();
        let input = loud.concat(&quiet).unwrap();

        let plain = PostProcessor::default().process(&input);
        let chained =
            PostProcessor::new(Some(compressor()), Some(DEFAULT_HEADROOM_DB)).process(&input);

        let tail_peak = |buffer: &AudioBuffer| buffer.slice(33075, 44100).peak();
        assert!(tail_peak(&chained) > tail_peak(&plain));
        assert!((chained.peak() - db_to_amplitude(-DEFAULT_HEADROOM_DB)).abs() < 1e-6);
    }

    #[test]
    fn disabled_stages_pass_through() {
        let input = tone::sine(440.0, 0.1, 0.3, Format::cd_mono()).unwrap();
        let output = PostProcessor::new(None, None).process(&input);
        assert_eq!(output.samples(), input.samples());
    }

    #[test]
    fn silence_stays_silent() {
        let silence = AudioBuffer::silent(Format::cd_mono(), 100);
        let output = PostProcessor::new(Some(compressor()), Some(0.1)).process(&silence);
        assert_eq!(output.peak(), 0.0);
    }
}
