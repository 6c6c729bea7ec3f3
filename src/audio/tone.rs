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

//! Procedural pitched tones.
//!
//! Generated tones are ordinary `AudioBuffer`s and can be placed in a sample table
//! next to decoded samples.

use std::f64::consts::PI;

use super::{AudioBuffer, AudioError, Format};

/// Generates a sine wave starting at phase zero.
///
/// The phase of each frame is computed from its index rather than accumulated, so the
/// waveform is continuous and the same inputs always produce the same samples. Integer
/// bit depths truncate `amplitude * sin * (full_scale - 1)` toward zero. Every channel
/// receives the same signal.
pub fn sine(
    frequency: f64,
    seconds: f64,
    amplitude: f64,
    format: Format,
) -> Result<AudioBuffer, AudioError> {
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(AudioError::InvalidParameter(format!(
            "invalid frequency: {}",
            frequency
        )));
    }
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AudioError::InvalidParameter(format!(
            "invalid tone duration: {}",
            seconds
        )));
    }
    if !(0.0..=1.0).contains(&amplitude) {
        return Err(AudioError::InvalidParameter(format!(
            "amplitude must be within [0, 1], got {}",
            amplitude
        )));
    }

    // Rounded like every other length, so a tone fits an event of the same duration.
    let frames = format.frames_for(seconds);
    let channels = format.channels() as usize;
    let sample_rate = format.sample_rate() as f64;
    let full_scale = format.bit_depth().full_scale();

    let mut samples = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let t = i as f64 / sample_rate;
        let value = amplitude * (2.0 * PI * frequency * t).sin();
        let sample = match full_scale {
            Some(scale) => ((value * (scale - 1.0)).trunc() / scale) as f32,
            None => value as f32,
        };
        samples.extend(std::iter::repeat(sample).take(channels));
    }

    AudioBuffer::new(samples, format)
}

/// Frequency of the note `semitones` above `base` in twelve-tone equal temperament.
pub fn transpose(base: f64, semitones: i32) -> f64 {
    base * 2f64.powf(semitones as f64 / 12.0)
}
