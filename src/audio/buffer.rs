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
use std::sync::Arc;
use std::time::Duration;

use super::{AudioError, Format};

/// An immutable block of interleaved f32 audio in a fixed format.
///
/// The sample data is stored in an Arc so that clones made while building a
/// sample table or a track are cheap. Every operation returns a new buffer.
#[derive(Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples, `frames * channels` long.
    samples: Arc<Vec<f32>>,
    /// The format of the samples.
    format: Format,
}

impl AudioBuffer {
    /// Creates a buffer from interleaved samples.
    pub fn new(samples: Vec<f32>, format: Format) -> Result<Self, AudioError> {
        let channels = format.channels();
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::PartialFrame {
                samples: samples.len(),
                channels,
            });
        }

        Ok(Self {
            samples: Arc::new(samples),
            format,
        })
    }

    /// A buffer containing the given number of silent frames.
    pub fn silent(format: Format, frames: usize) -> Self {
        Self {
            samples: Arc::new(vec![0.0; frames * format.channels() as usize]),
            format,
        }
    }

    /// A zero length buffer.
    pub fn empty(format: Format) -> Self {
        Self::silent(format, 0)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn seconds(&self) -> f64 {
        self.format.seconds_for(self.frames())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds())
    }

    /// The largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Returns the frames in `[start, end)`. Both ends are clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let channels = self.format.channels() as usize;
        let end = end.min(self.frames());
        let start = start.min(end);
        Self {
            samples: Arc::new(self.samples[start * channels..end * channels].to_vec()),
            format: self.format,
        }
    }

    /// Returns the first `frames` frames, or the whole buffer if it is shorter.
    pub fn truncate(&self, frames: usize) -> Self {
        if frames >= self.frames() {
            return self.clone();
        }
        self.slice(0, frames)
    }

    /// The buffer played back to back `times` times.
    pub fn repeat(&self, times: usize) -> Self {
        Self {
            samples: Arc::new(self.samples.repeat(times)),
            format: self.format,
        }
    }

    /// This buffer followed immediately by `other`.
    pub fn concat(&self, other: &AudioBuffer) -> Result<Self, AudioError> {
        self.check_format(other)?;
        let mut samples = Vec::with_capacity(self.samples.len() + other.samples.len());
        samples.extend_from_slice(&self.samples);
        samples.extend_from_slice(&other.samples);
        Ok(Self {
            samples: Arc::new(samples),
            format: self.format,
        })
    }

    /// Mixes `other` into a copy of this buffer starting at frame `position`. The result
    /// keeps this buffer's length; anything of `other` past the end is dropped.
    pub fn overlay(&self, other: &AudioBuffer, position: usize) -> Result<Self, AudioError> {
        self.check_format(other)?;
        let channels = self.format.channels() as usize;
        let mut samples = self.samples.as_ref().clone();
        if position < self.frames() {
            samples[position * channels..]
                .iter_mut()
                .zip(other.samples.iter())
                .for_each(|(dst, src)| *dst += *src);
        }
        Ok(Self {
            samples: Arc::new(samples),
            format: self.format,
        })
    }

    /// Scales every sample by a gain in decibels.
    pub fn apply_gain(&self, db: f64) -> Self {
        if db == 0.0 {
            return self.clone();
        }
        let factor = db_to_amplitude(db);
        self.map(|sample| sample * factor)
    }

    /// A buffer of the same format holding `samples`. The caller keeps whole frames.
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len() % self.format.channels() as usize, 0);
        Self {
            samples: Arc::new(samples),
            format: self.format,
        }
    }

    /// Applies a function to every sample.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self {
            samples: Arc::new(self.samples.iter().map(|&s| f(s)).collect()),
            format: self.format,
        }
    }

    /// Linear fade from silence over the first `frames` frames.
    pub fn fade_in(&self, frames: usize) -> Self {
        self.fade(frames, |i, n| i as f32 / n as f32, 0)
    }

    /// Linear fade to silence over the last `frames` frames.
    pub fn fade_out(&self, frames: usize) -> Self {
        let frames = frames.min(self.frames());
        self.fade(
            frames,
            |i, n| 1.0 - i as f32 / n as f32,
            self.frames() - frames,
        )
    }

    fn fade<F: Fn(usize, usize) -> f32>(&self, frames: usize, gain: F, start: usize) -> Self {
        let frames = frames.min(self.frames() - start);
        if frames == 0 {
            return self.clone();
        }
        let channels = self.format.channels() as usize;
        let mut samples = self.samples.as_ref().clone();
        for i in 0..frames {
            let g = gain(i, frames);
            let frame = (start + i) * channels;
            samples[frame..frame + channels]
                .iter_mut()
                .for_each(|s| *s *= g);
        }
        Self {
            samples: Arc::new(samples),
            format: self.format,
        }
    }

    /// Appends `other`, crossfading the last `crossfade` frames of this buffer with the
    /// first `crossfade` frames of `other`. The result is `crossfade` frames shorter than
    /// a plain concatenation.
    pub fn append_crossfade(
        &self,
        other: &AudioBuffer,
        crossfade: usize,
    ) -> Result<Self, AudioError> {
        self.check_format(other)?;
        if crossfade == 0 {
            return self.concat(other);
        }
        for segment in [self.frames(), other.frames()] {
            if crossfade > segment {
                return Err(AudioError::CrossfadeTooLong { crossfade, segment });
            }
        }

        let split = self.frames() - crossfade;
        let tail = self.slice(split, self.frames()).fade_out(crossfade);
        let head = other.slice(0, crossfade).fade_in(crossfade);
        self.slice(0, split)
            .concat(&tail.overlay(&head, 0)?)?
            .concat(&other.slice(crossfade, other.frames()))
    }

    fn check_format(&self, other: &AudioBuffer) -> Result<(), AudioError> {
        if self.format != other.format {
            return Err(AudioError::FormatMismatch {
                expected: self.format,
                found: other.format,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("format", &self.format)
            .field("frames", &self.frames())
            .field("peak", &self.peak())
            .finish()
    }
}

/// Converts a gain in decibels to a linear amplitude factor.
pub fn db_to_amplitude(db: f64) -> f32 {
    10f64.powf(db / 20.0) as f32
}

/// Converts a linear amplitude to decibels. Silence maps to negative infinity.
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BitDepth;

    fn mono(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(samples, Format::cd_mono()).unwrap()
    }

    #[test]
    fn rejects_partial_frames() {
        let stereo = Format::new(44100, 2, BitDepth::Int16).unwrap();
        assert!(matches!(
            AudioBuffer::new(vec![0.0; 3], stereo),
            Err(AudioError::PartialFrame { .. })
        ));
    }

    #[test]
    fn slice_truncate_repeat() {
        let buffer = mono(vec![1.0, 2.0, 3.0]);
        assert_eq!(buffer.slice(1, 3).samples(), &[2.0, 3.0]);
        assert_eq!(buffer.slice(2, 10).samples(), &[3.0]);
        assert_eq!(buffer.truncate(2).samples(), &[1.0, 2.0]);
        assert_eq!(buffer.truncate(5).frames(), 3);
        assert_eq!(buffer.repeat(2).samples(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
        assert!(buffer.repeat(0).is_empty());
    }

    #[test]
    fn overlay_keeps_base_length() {
        let base = mono(vec![1.0, 1.0, 1.0]);
        let top = mono(vec![0.5, 0.5, 0.5]);
        assert_eq!(base.overlay(&top, 1).unwrap().samples(), &[1.0, 1.5, 1.5]);
        assert_eq!(base.overlay(&top, 3).unwrap().samples(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn overlay_rejects_format_mismatch() {
        let stereo = Format::new(44100, 2, BitDepth::Int16).unwrap();
        let base = mono(vec![1.0, 1.0]);
        let other = AudioBuffer::silent(stereo, 1);
        assert!(matches!(
            base.overlay(&other, 0),
            Err(AudioError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn gain_in_decibels() {
        let buffer = mono(vec![0.5, -0.5]);
        let louder = buffer.apply_gain(6.0);
        assert!((louder.samples()[0] - 0.5 * db_to_amplitude(6.0)).abs() < 1e-6);
        assert!((db_to_amplitude(-20.0) - 0.1).abs() < 1e-6);
        assert_eq!(buffer.apply_gain(0.0), buffer);
    }

    #[test]
    fn crossfade_length_and_shape() {
        let a = mono(vec![1.0; 8]);
        let b = mono(vec![1.0; 8]);
        let joined = a.append_crossfade(&b, 4).unwrap();
        assert_eq!(joined.frames(), 12);
        // Linear fades of equal material sum to unity.
        for sample in joined.samples() {
            assert!((sample - 1.0).abs() < 1e-6);
        }

        let short = mono(vec![1.0; 2]);
        assert!(matches!(
            a.append_crossfade(&short, 4),
            Err(AudioError::CrossfadeTooLong { .. })
        ));
        assert_eq!(a.append_crossfade(&short, 0).unwrap().frames(), 10);
    }

    #[test]
    fn fades() {
        let buffer = mono(vec![1.0; 4]);
        assert_eq!(buffer.fade_in(4).samples(), &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(buffer.fade_out(2).samples(), &[1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn peak() {
        assert_eq!(mono(vec![0.1, -0.7, 0.3]).peak(), 0.7);
        assert_eq!(AudioBuffer::empty(Format::cd_mono()).peak(), 0.0);
    }
}
