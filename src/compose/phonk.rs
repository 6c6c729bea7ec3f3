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

//! A procedurally composed phonk track.
//!
//! The bassline is a short riff of distorted sine tones and the drums come from a step
//! pattern over a sample kit. The two are layered into a loop, and sections made of
//! the loop, the drums and the bass are joined with crossfades.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info};

use super::ComposeError;
use crate::audio::dsp::{self, hard_clip, Distortion};
use crate::audio::{tone, AudioBuffer};
use crate::postprocess::{PostProcessor, DEFAULT_HEADROOM_DB};
use crate::render::{CompositionMode, FitMode, RenderOptions, Renderer};
use crate::samples::SampleTable;
use crate::sequencer::{Event, Pattern, SequenceError, Sequencer, Trigger, TriggerRule};
use crate::util::duration_minutes_seconds;

/// The drum pattern: 16 steps of 125ms with kick, snare, two hi-hats, clap and cowbell.
pub fn default_drum_pattern() -> Result<Pattern, SequenceError> {
    Pattern::new(
        16,
        0.125,
        vec![
            TriggerRule::new("kick", Trigger::Every { every: 4, offset: 0 }),
            TriggerRule::new("snare", Trigger::Every { every: 4, offset: 2 }),
            TriggerRule::new("hihat", Trigger::Every { every: 2, offset: 0 }),
            TriggerRule::new("hihat", Trigger::Every { every: 2, offset: 1 }).with_gain(-3.0),
            TriggerRule::new("clap", Trigger::Every { every: 8, offset: 4 }),
            TriggerRule::new("cowbell", Trigger::Steps(vec![7, 15])).with_gain(-5.0),
        ],
    )
}

/// Parameters of the composition.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonkSettings {
    /// Root of the bassline in Hz.
    pub base_frequency: f64,
    /// Bassline notes in semitones above the root.
    pub semitones: Vec<i32>,
    /// Length of each bass note in seconds.
    pub note_length: f64,
    /// Peak amplitude of the generated bass tones.
    pub amplitude: f64,
    /// Boost applied to each bass tone before distortion.
    pub bass_gain_db: f64,
    pub distortion: Distortion,
    pub drums: Pattern,
    /// How far the drums are pushed behind the bass in the loop.
    pub groove_offset: Duration,
    /// Crossfade between sections.
    pub crossfade: Duration,
    /// Crossfade into the outro.
    pub outro_crossfade: Duration,
}

impl PhonkSettings {
    /// The default arrangement around the given drum pattern.
    pub fn new(drums: Pattern) -> Self {
        Self {
            base_frequency: 55.0,
            semitones: vec![0, 0, 5, 3, 0, 0, 7, 5],
            note_length: 0.125,
            amplitude: 0.5,
            bass_gain_db: 10.0,
            distortion: Distortion::new(25.0, 0.9),
            drums,
            groove_offset: Duration::from_millis(20),
            crossfade: Duration::from_millis(250),
            outro_crossfade: Duration::from_millis(500),
        }
    }
}

/// Table key of the bass tone `semitones` above the root.
fn bass_key(semitones: i32) -> String {
    format!("bass{:+}", semitones)
}

/// Composes a phonk track from a drum kit.
pub struct PhonkComposer {
    /// The drum kit plus the generated bass tones.
    table: SampleTable,
    settings: PhonkSettings,
}

impl PhonkComposer {
    /// Generates the bass tones and adds them to a copy of the drum kit.
    pub fn new(kit: &SampleTable, settings: PhonkSettings) -> Result<Self, ComposeError> {
        let mut table = kit.clone();
        let format = table.format();

        let intervals: BTreeSet<i32> = settings.semitones.iter().copied().collect();
        for &semitones in &intervals {
            let frequency = tone::transpose(settings.base_frequency, semitones);
            let note = tone::sine(frequency, settings.note_length, settings.amplitude, format)?
                .apply_gain(settings.bass_gain_db)
                .map(|s| hard_clip(s, 1.0));
            table.insert(bass_key(semitones), settings.distortion.apply(&note)?)?;
            debug!(semitones, frequency, "Generated bass tone");
        }

        Ok(Self { table, settings })
    }

    /// The drum kit and the generated bass tones.
    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn settings(&self) -> &PhonkSettings {
        &self.settings
    }

    /// The bass riff, one note after the other, normalized.
    pub fn bassline(&self) -> Result<AudioBuffer, ComposeError> {
        let length = self.settings.note_length;
        let events: Vec<Event> = self
            .settings
            .semitones
            .iter()
            .enumerate()
            .map(|(i, &semitones)| Event::new(i as f64 * length, length, bass_key(semitones)))
            .collect();

        let rendered = Renderer::new(&self.table, RenderOptions::unlimited())
            .render(&events, CompositionMode::Sequential)?;
        Ok(dsp::normalize(&rendered.buffer, DEFAULT_HEADROOM_DB))
    }

    /// One repetition of the drum pattern. Hits play once and are cut at the step end.
    pub fn drums(&self) -> Result<AudioBuffer, ComposeError> {
        let pattern = &self.settings.drums;
        let options = RenderOptions::unlimited().with_fit_mode(FitMode::Pad);
        let rendered = Renderer::new(&self.table, options).render(
            &pattern.events(),
            CompositionMode::Overlay {
                span: Some(pattern.length()),
            },
        )?;
        Ok(rendered.buffer)
    }

    /// The bassline with the drums layered on top. The loop is as long as the bassline.
    pub fn phonk_loop(&self) -> Result<AudioBuffer, ComposeError> {
        self.layer(&self.bassline()?, &self.drums()?)
    }

    fn layer(&self, bass: &AudioBuffer, drums: &AudioBuffer) -> Result<AudioBuffer, ComposeError> {
        let offset = self
            .table
            .format()
            .frames_for_duration(self.settings.groove_offset);
        Ok(bass.overlay(drums, offset)?)
    }

    /// The full arrangement: intro, main, variation, bridge, main and outro.
    pub fn track(&self) -> Result<AudioBuffer, ComposeError> {
        let format = self.table.format();
        let bass = self.bassline()?;
        let drums = self.drums()?;
        let phonk_loop = self.layer(&bass, &drums)?;

        let intro = drums.repeat(2);
        let main = phonk_loop.repeat(4);
        let variation = drums.repeat(2).concat(&phonk_loop.repeat(2))?;
        let bridge = bass.repeat(4).overlay(&drums.repeat(2), 0)?;
        let outro = phonk_loop.repeat(2).concat(&drums)?;

        let crossfade = format.frames_for_duration(self.settings.crossfade);
        let outro_crossfade = format.frames_for_duration(self.settings.outro_crossfade);
        let track = intro
            .append_crossfade(&main, crossfade)?
            .append_crossfade(&variation, crossfade)?
            .append_crossfade(&bridge, crossfade)?
            .append_crossfade(&main, crossfade)?
            .append_crossfade(&outro, outro_crossfade)?;

        info!(
            loop_ms = phonk_loop.duration().as_millis(),
            length = duration_minutes_seconds(track.duration()),
            "Arranged track"
        );
        Ok(track)
    }

    /// The arranged track run through the post-processing chain.
    pub fn render(&self, post: &PostProcessor) -> Result<AudioBuffer, ComposeError> {
        Ok(post.process(&self.track()?))
    }
}
