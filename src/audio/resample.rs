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

//! Sample rate and channel layout conversion for decoded samples.

use super::AudioError;

/// Transcodes interleaved samples from one sample rate to another using linear interpolation.
/// Linear interpolation is sufficient for drum hits and one-shot notes.
pub fn transcode(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let channels = channel_count as usize;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);

    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let idx0 = source_frame * channels + channel;
            let idx1 = (source_frame + 1) * channels + channel;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}

/// Converts interleaved samples between channel layouts. Mono is duplicated to every
/// output channel and any layout can be averaged down to mono; other conversions are
/// not supported.
pub fn remix(
    samples: &[f32],
    source_channels: u16,
    target_channels: u16,
) -> Result<Vec<f32>, AudioError> {
    if source_channels == target_channels {
        return Ok(samples.to_vec());
    }

    match (source_channels, target_channels) {
        (1, n) => Ok(samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(n as usize))
            .collect()),
        (n, 1) => Ok(samples
            .chunks(n as usize)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect()),
        (from, to) => Err(AudioError::InvalidParameter(format!(
            "cannot convert {} channels to {}",
            from, to
        ))),
    }
}
