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

//! Fitting source samples to event lengths.
//!
//! A sample longer than the event is cut off. A shorter one is played back to back as
//! many times as needed and then cut off, so a sustained note is the sample looping,
//! not a time-stretched sample. One-shot sources such as drum hits can instead be
//! padded with silence.

use super::RenderError;
use crate::audio::AudioBuffer;
use crate::samples::SampleTable;

/// How a source shorter than the requested length is extended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FitMode {
    /// Repeat the source end to end.
    #[default]
    Loop,
    /// Play the source once and fill the rest with silence.
    Pad,
}

/// Returns exactly `frames` frames of `source`, repeating it end to end when it is too
/// short. An empty source yields silence.
pub fn fit_to_frames(source: &AudioBuffer, frames: usize) -> AudioBuffer {
    let len = source.frames();
    if frames <= len {
        return source.truncate(frames);
    }
    if len == 0 {
        return AudioBuffer::silent(source.format(), frames);
    }
    source.repeat(frames.div_ceil(len)).truncate(frames)
}

/// Returns exactly `frames` frames of `source`, followed by silence when it is too short.
pub fn pad_to_frames(source: &AudioBuffer, frames: usize) -> AudioBuffer {
    let len = source.frames();
    if frames <= len {
        return source.truncate(frames);
    }
    let mut samples = source.samples().to_vec();
    samples.resize(frames * source.format().channels() as usize, 0.0);
    source.with_samples(samples)
}

/// Fits `source` to `frames` frames in the given mode.
pub fn fit(source: &AudioBuffer, frames: usize, mode: FitMode) -> AudioBuffer {
    match mode {
        FitMode::Loop => fit_to_frames(source, frames),
        FitMode::Pad => pad_to_frames(source, frames),
    }
}

/// Looks `key` up in the table and fits it to `frames` frames. Unknown keys produce
/// silence; the second value reports whether the key was found.
pub fn resolve(
    table: &SampleTable,
    key: &str,
    frames: usize,
    mode: FitMode,
) -> (AudioBuffer, bool) {
    match table.get(key) {
        Some(source) => (fit(source, frames, mode), true),
        None => (AudioBuffer::silent(table.format(), frames), false),
    }
}

/// Fits the sample stored under `key` to `seconds` seconds, rounded to the nearest frame.
/// Negative or non-finite lengths are rejected.
pub fn adjust_length(
    table: &SampleTable,
    key: &str,
    seconds: f64,
) -> Result<AudioBuffer, RenderError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(RenderError::InvalidDuration(seconds));
    }
    let frames = table.format().frames_for(seconds);
    Ok(resolve(table, key, frames, FitMode::Loop).0)
}
