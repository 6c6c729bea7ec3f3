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

//! Monitoring playback of a finished buffer on the default output device.

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use super::AudioBuffer;

/// Extra time to wait past the end of the buffer for the device to drain.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("No default output device available")]
    NoDevice,

    #[error("Unable to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Unable to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Plays the buffer through the default output device and blocks until it has finished.
pub fn play(buffer: &AudioBuffer) -> Result<(), PlaybackError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(PlaybackError::NoDevice)?;

    let format = buffer.format();
    let config = cpal::StreamConfig {
        channels: format.channels(),
        sample_rate: format.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };

    let source = buffer.clone();
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let mut position = 0usize;
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let samples = source.samples();
            for out in data.iter_mut() {
                *out = samples.get(position).copied().unwrap_or(0.0);
                position += 1;
            }
            if position >= samples.len() {
                // The receiver may already be gone; nothing to do about it here.
                let _ = done_tx.send(());
            }
        },
        |err| error!("CPAL output stream error: {}", err),
        None,
    )?;

    stream.play()?;
    info!(
        format = %format,
        duration_ms = buffer.duration().as_millis(),
        "Playing buffer"
    );

    if done_rx
        .recv_timeout(buffer.duration() + DRAIN_GRACE)
        .is_err()
    {
        error!("Playback did not report completion before the timeout");
    }

    Ok(())
}
