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
use serde::Deserialize;

use super::{parse_duration, ConfigError};
use crate::audio::dsp::Distortion;
use crate::compose::{default_drum_pattern, PhonkSettings};
use crate::sequencer::{Pattern, Trigger, TriggerRule};

/// A YAML representation of the phonk composition. Anything left out keeps the value
/// of the default arrangement.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Phonk {
    /// Root of the bassline in Hz.
    base_frequency: Option<f64>,

    /// Bassline notes in semitones above the root.
    semitones: Option<Vec<i32>>,

    /// Length of each bass note, e.g. "125ms".
    note_length: Option<String>,

    /// Peak amplitude of the bass tones, between 0 and 1.
    amplitude: Option<f64>,

    /// Boost applied to the bass tones before distortion, in dB.
    bass_gain_db: Option<f64>,

    /// Distortion drive in dB.
    drive_db: Option<f64>,

    /// Gain of the dry signal under the distortion, in dB.
    mix_db: Option<f64>,

    /// Delay of the drums against the bass, e.g. "20ms".
    groove_offset: Option<String>,

    /// Crossfade between sections, e.g. "250ms".
    crossfade: Option<String>,

    /// Crossfade into the outro, e.g. "500ms".
    outro_crossfade: Option<String>,

    /// The drum pattern.
    pattern: Option<DrumPattern>,
}

impl Phonk {
    /// Builds the composition settings.
    pub fn settings(&self) -> Result<PhonkSettings, ConfigError> {
        let drums = match &self.pattern {
            Some(pattern) => pattern.pattern()?,
            None => {
                default_drum_pattern().map_err(|e| ConfigError::invalid("phonk.pattern", e))?
            }
        };
        let mut settings = PhonkSettings::new(drums);

        if let Some(base_frequency) = self.base_frequency {
            settings.base_frequency = base_frequency;
        }
        if let Some(semitones) = &self.semitones {
            settings.semitones = semitones.clone();
        }
        if let Some(note_length) = &self.note_length {
            settings.note_length =
                parse_duration("phonk.note_length", note_length)?.as_secs_f64();
        }
        if let Some(amplitude) = self.amplitude {
            if !(0.0..=1.0).contains(&amplitude) {
                return Err(ConfigError::invalid(
                    "phonk.amplitude",
                    format!("must be within [0, 1], got {}", amplitude),
                ));
            }
            settings.amplitude = amplitude;
        }
        if let Some(bass_gain_db) = self.bass_gain_db {
            settings.bass_gain_db = bass_gain_db;
        }
        settings.distortion = Distortion::new(
            self.drive_db.unwrap_or(settings.distortion.drive_db()),
            self.mix_db.unwrap_or(settings.distortion.mix_db()),
        );
        if let Some(groove_offset) = &self.groove_offset {
            settings.groove_offset = parse_duration("phonk.groove_offset", groove_offset)?;
        }
        if let Some(crossfade) = &self.crossfade {
            settings.crossfade = parse_duration("phonk.crossfade", crossfade)?;
        }
        if let Some(outro_crossfade) = &self.outro_crossfade {
            settings.outro_crossfade =
                parse_duration("phonk.outro_crossfade", outro_crossfade)?;
        }

        Ok(settings)
    }
}

/// A YAML representation of a step pattern.
#[derive(Deserialize, Clone, Debug)]
pub struct DrumPattern {
    /// Number of steps in one repetition.
    steps: usize,

    /// Length of one step, e.g. "125ms".
    beat_length: String,

    /// The voices, in the order simultaneous hits are layered.
    voices: Vec<Voice>,
}

impl DrumPattern {
    pub fn pattern(&self) -> Result<Pattern, ConfigError> {
        let beat_length = parse_duration("phonk.pattern.beat_length", &self.beat_length)?;
        Pattern::new(
            self.steps,
            beat_length.as_secs_f64(),
            self.voices.iter().map(Voice::rule).collect(),
        )
        .map_err(|e| ConfigError::invalid("phonk.pattern", e))
    }
}

/// A YAML representation of one pattern voice.
///
/// `steps` lists the steps the voice plays on. Otherwise the voice plays every `every`
/// steps starting at `offset`, and on every step if neither is given.
#[derive(Deserialize, Clone, Debug)]
pub struct Voice {
    /// The sample key.
    sample: String,

    every: Option<usize>,

    offset: Option<usize>,

    steps: Option<Vec<usize>>,

    /// Gain offset in dB.
    gain_db: Option<f64>,
}

impl Voice {
    pub fn rule(&self) -> TriggerRule {
        let trigger = match (&self.steps, self.every) {
            (Some(steps), _) => Trigger::Steps(steps.clone()),
            (None, Some(every)) => Trigger::Every {
                every,
                offset: self.offset.unwrap_or(0),
            },
            (None, None) => Trigger::Always,
        };
        let rule = TriggerRule::new(self.sample.clone(), trigger);
        match self.gain_db {
            Some(gain_db) => rule.with_gain(gain_db),
            None => rule,
        }
    }
}
