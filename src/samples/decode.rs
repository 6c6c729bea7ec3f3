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
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::warn;

use super::LoadError;

/// A fully decoded audio file.
pub(super) struct Decoded {
    /// Interleaved f32 samples.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Decodes an entire audio file (WAV, FLAC, MP3, OGG, ...) into memory.
pub(super) fn decode_file(path: &Path) -> Result<Decoded, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint to help the format registry guess the format
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let decode_error = |source: SymphoniaError| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(decode_error)?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| LoadError::NoTrack {
            path: path.to_path_buf(),
        })?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate.ok_or_else(|| LoadError::NoSampleRate {
        path: path.to_path_buf(),
    })?;
    let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&params, &decoder_opts)
        .map_err(decode_error)?;

    let mut samples = Vec::new();
    let mut sample_buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match next_packet(format_reader.as_mut()) {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(path = ?path, error = e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };

        let spec = *decoded.spec();
        let frames = decoded.capacity();
        // SampleBuffer capacity is counted in samples, not frames.
        let needed = frames * spec.channels.count();
        if sample_buffer
            .as_ref()
            .map_or(true, |buffer| buffer.capacity() < needed)
        {
            sample_buffer = Some(SampleBuffer::<f32>::new(frames as u64, spec));
        }
        if let Some(buffer) = sample_buffer.as_mut() {
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
        }
        channels = spec.channels.count() as u16;
    }

    if channels == 0 {
        return Err(LoadError::NoTrack {
            path: path.to_path_buf(),
        });
    }

    Ok(Decoded {
        samples,
        channels,
        sample_rate,
    })
}

/// Reads the next packet. `Ok(None)` marks the end of the stream; some decoders report
/// it as an unexpected EOF.
fn next_packet(format_reader: &mut dyn FormatReader) -> Result<Option<Packet>, SymphoniaError> {
    match format_reader.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
