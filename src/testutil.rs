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
use std::{error::Error, fs::File, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::{tone, AudioBuffer, Format};
use crate::samples::SampleTable;

/// Writes an integer WAV file. `samples` holds one vector per channel; all channels must
/// be the same length.
pub fn write_wav(
    path: PathBuf,
    samples: Vec<Vec<i16>>,
    sample_rate: u32,
    bits_per_sample: u16,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;

    let num_channels = samples.len();
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let frames = samples.first().map_or(0, |channel| channel.len());
    assert!(
        samples.iter().all(|channel| channel.len() == frames),
        "Channels differ in length"
    );

    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        },
    )?;

    // WAV data is interleaved frame by frame.
    for frame in 0..frames {
        for channel in &samples {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// A short sine tone standing in for a recorded sample.
pub fn tone_sample(frequency: f64, seconds: f64, format: Format) -> AudioBuffer {
    tone::sine(frequency, seconds, 0.5, format).unwrap()
}

/// A table of short tones keyed like a drum kit.
pub fn drum_kit(format: Format) -> SampleTable {
    let mut table = SampleTable::new(format);
    for (key, frequency) in [
        ("kick", 60.0),
        ("snare", 200.0),
        ("hihat", 6000.0),
        ("clap", 1200.0),
        ("cowbell", 800.0),
    ] {
        table
            .insert(key, tone_sample(frequency, 0.05, format))
            .unwrap();
    }
    table
}
