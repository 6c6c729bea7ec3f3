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
use crate::audio::{AudioBuffer, AudioError, Format};

/// The mutable accumulator a render pass writes into. It is owned by a single render
/// and becomes an immutable `AudioBuffer` when finished.
pub struct Timeline {
    format: Format,
    samples: Vec<f32>,
}

impl Timeline {
    /// An empty timeline for appending.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            samples: Vec::new(),
        }
    }

    /// A silent timeline of fixed length for overlaying.
    pub fn silent(format: Format, frames: usize) -> Self {
        Self {
            format,
            samples: vec![0.0; frames * format.channels() as usize],
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels() as usize
    }

    /// Places the segment directly after the current end.
    pub fn append(&mut self, segment: &AudioBuffer) -> Result<(), AudioError> {
        self.check_format(segment)?;
        self.samples.extend_from_slice(segment.samples());
        Ok(())
    }

    /// Adds the segment into the timeline starting at frame `position`. Whatever falls
    /// past the end of the timeline is dropped.
    pub fn overlay_at(&mut self, segment: &AudioBuffer, position: usize) -> Result<(), AudioError> {
        self.check_format(segment)?;
        let start = position * self.format.channels() as usize;
        if start >= self.samples.len() {
            return Ok(());
        }
        self.samples[start..]
            .iter_mut()
            .zip(segment.samples())
            .for_each(|(dst, src)| *dst += *src);
        Ok(())
    }

    /// Finalizes the timeline.
    pub fn finish(self) -> AudioBuffer {
        AudioBuffer::silent(self.format, 0).with_samples(self.samples)
    }

    fn check_format(&self, segment: &AudioBuffer) -> Result<(), AudioError> {
        if segment.format() != self.format {
            return Err(AudioError::FormatMismatch {
                expected: self.format,
                found: segment.format(),
            });
        }
        Ok(())
    }
}
