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

//! In-memory audio buffers and the signal processing applied to them.
//!
//! This module provides:
//! - The immutable `AudioBuffer` value type and its slicing/mixing operations
//! - Procedural sine tone generation
//! - Compression, normalization and distortion
//! - WAV export and optional playback through the default output device

mod buffer;
pub mod dsp;
mod format;
pub mod playback;
pub mod resample;
pub mod tone;
pub mod wav;

pub use buffer::{amplitude_to_db, db_to_amplitude, AudioBuffer};
pub use format::{BitDepth, Format};

/// Errors produced by buffer operations, generation and export.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: Format, found: Format },

    #[error("Sample count {samples} is not a multiple of the channel count {channels}")]
    PartialFrame { samples: usize, channels: u16 },

    #[error("Crossfade of {crossfade} frames is longer than a segment of {segment} frames")]
    CrossfadeTooLong { crossfade: usize, segment: usize },

    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("WAV error: {0}")]
    WavError(#[from] hound::Error),
}
