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

//! Whole-buffer effects: dynamic range compression, peak normalization and
//! hard-clipping distortion.

use std::time::Duration;

use tracing::debug;

use super::{amplitude_to_db, db_to_amplitude, AudioBuffer, AudioError};

/// A feed-forward compressor driven by a sliding RMS window.
///
/// The RMS level is measured over a window as long as the attack time. Whenever the
/// level exceeds the threshold the target attenuation is `(1 - 1/ratio)` of the
/// overshoot in dB; the applied attenuation follows the target with one-pole smoothing
/// using the attack time when rising and the release time when falling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compressor {
    threshold_db: f64,
    ratio: f64,
    attack: Duration,
    release: Duration,
}

impl Compressor {
    pub fn new(
        threshold_db: f64,
        ratio: f64,
        attack: Duration,
        release: Duration,
    ) -> Result<Self, AudioError> {
        if !threshold_db.is_finite() || threshold_db > 0.0 {
            return Err(AudioError::InvalidParameter(format!(
                "compressor threshold must be at or below 0 dBFS, got {}",
                threshold_db
            )));
        }
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(AudioError::InvalidParameter(format!(
                "compressor ratio must be at least 1, got {}",
                ratio
            )));
        }

        Ok(Self {
            threshold_db,
            ratio,
            attack,
            release,
        })
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn attack(&self) -> Duration {
        self.attack
    }

    pub fn release(&self) -> Duration {
        self.release
    }

    /// Compresses the buffer.
    pub fn apply(&self, buffer: &AudioBuffer) -> AudioBuffer {
        let format = buffer.format();
        let channels = format.channels() as usize;
        let frames = buffer.frames();
        if frames == 0 {
            return buffer.clone();
        }

        let window = format.frames_for_duration(self.attack).max(1);
        let attack_coef = smoothing_coefficient(format.frames_for_duration(self.attack));
        let release_coef = smoothing_coefficient(format.frames_for_duration(self.release));
        let threshold = db_to_amplitude(self.threshold_db) as f64;
        let slope = 1.0 - 1.0 / self.ratio;

        let input = buffer.samples();
        let frame_power = |frame: usize| -> f64 {
            input[frame * channels..(frame + 1) * channels]
                .iter()
                .map(|&s| (s as f64) * (s as f64))
                .sum::<f64>()
                / channels as f64
        };

        let mut output = Vec::with_capacity(input.len());
        let mut window_sum = 0.0f64;
        let mut attenuation_db = 0.0f64;
        let mut max_attenuation_db = 0.0f64;

        for frame in 0..frames {
            window_sum += frame_power(frame);
            if frame >= window {
                window_sum -= frame_power(frame - window);
            }
            let window_len = (frame + 1).min(window) as f64;
            let rms = (window_sum.max(0.0) / window_len).sqrt();

            let target_db = if rms > threshold {
                slope * amplitude_to_db(rms / threshold)
            } else {
                0.0
            };
            let coef = if target_db > attenuation_db {
                attack_coef
            } else {
                release_coef
            };
            attenuation_db = coef * attenuation_db + (1.0 - coef) * target_db;
            max_attenuation_db = max_attenuation_db.max(attenuation_db);

            let gain = db_to_amplitude(-attenuation_db);
            output.extend(
                input[frame * channels..(frame + 1) * channels]
                    .iter()
                    .map(|&s| s * gain),
            );
        }

        debug!(
            threshold_db = self.threshold_db,
            ratio = self.ratio,
            max_attenuation_db,
            "Compressed buffer"
        );

        buffer.with_samples(output)
    }
}

/// One-pole smoothing coefficient for a time constant of `frames` frames.
fn smoothing_coefficient(frames: usize) -> f64 {
    if frames == 0 {
        0.0
    } else {
        (-1.0 / frames as f64).exp()
    }
}

/// Scales the buffer so that its peak sits `headroom_db` below full scale.
/// Silent buffers are returned unchanged.
pub fn normalize(buffer: &AudioBuffer, headroom_db: f64) -> AudioBuffer {
    let peak = buffer.peak();
    if peak == 0.0 {
        return buffer.clone();
    }
    let target = db_to_amplitude(-headroom_db.abs());
    let factor = target / peak;
    debug!(peak, target, factor, "Normalized buffer");
    buffer.map(|s| s * factor)
}

/// Hard clipping - simply clamps the signal at a threshold.
#[inline]
pub fn hard_clip(sample: f32, threshold: f32) -> f32 {
    sample.clamp(-threshold, threshold)
}

/// Heavy distortion made by compressing a copy of the signal, pushing it into full-scale
/// clipping and mixing it back over the (attenuated) dry signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    /// Gain in dB applied to the compressed copy before clipping.
    drive_db: f64,
    /// Gain in dB applied to the dry signal while the clipped copy is mixed in.
    mix_db: f64,
}

impl Distortion {
    /// Threshold of the compressor shaping the wet signal.
    const THRESHOLD_DB: f64 = -15.0;
    const RATIO: f64 = 6.0;
    const ATTACK: Duration = Duration::from_millis(2);
    const RELEASE: Duration = Duration::from_millis(10);

    pub fn new(drive_db: f64, mix_db: f64) -> Self {
        Self { drive_db, mix_db }
    }

    pub fn drive_db(&self) -> f64 {
        self.drive_db
    }

    pub fn mix_db(&self) -> f64 {
        self.mix_db
    }

    pub fn apply(&self, buffer: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        let compressor =
            Compressor::new(Self::THRESHOLD_DB, Self::RATIO, Self::ATTACK, Self::RELEASE)?;
        let wet = compressor
            .apply(buffer)
            .apply_gain(self.drive_db)
            .map(|s| hard_clip(s, 1.0));
        let dry = buffer.apply_gain(self.mix_db);
        Ok(dry.overlay(&wet, 0)?.map(|s| hard_clip(s, 1.0)))
    }
}
