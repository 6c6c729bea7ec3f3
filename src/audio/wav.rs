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
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::{AudioBuffer, AudioError};
use crate::util::duration_minutes_seconds;

/// Writes the buffer to a WAV file in the buffer's format. Integer formats are rounded
/// and saturated at full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer) -> Result<(), AudioError> {
    let format = buffer.format();
    let bit_depth = format.bit_depth();
    let spec = WavSpec {
        channels: format.channels(),
        sample_rate: format.sample_rate(),
        bits_per_sample: bit_depth.bits(),
        sample_format: if bit_depth.is_float() {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in buffer.samples() {
        match bit_depth.to_int(sample) {
            Some(value) => writer.write_sample(value)?,
            None => writer.write_sample(sample)?,
        }
    }
    writer.finalize()?;

    info!(
        path = ?path.as_ref(),
        format = %format,
        length = duration_minutes_seconds(buffer.duration()),
        "Wrote WAV file"
    );

    Ok(())
}
