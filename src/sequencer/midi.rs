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

//! Note events read from Standard MIDI Files.
//!
//! Every Note On message becomes one event whose length is the message's delta time
//! divided by a fixed tick divisor (1000 by default). This ignores tempo and the file's
//! timing division; it is an approximation and is kept as such.

use std::fs;
use std::path::Path;

use midly::{MidiMessage, Smf, TrackEventKind};
use tracing::{debug, info};

use super::{Event, SequenceError, Sequencer};

/// Default number of ticks treated as one second.
pub const DEFAULT_TICK_DIVISOR: f64 = 1000.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// The name of a MIDI note number, with middle C (60) as `C4`.
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// Maps MIDI note numbers to sample table keys.
///
/// Notes within `[lowest, highest]` map to their note name; anything outside maps to the
/// fallback key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMapping {
    lowest: u8,
    highest: u8,
    fallback: String,
}

impl NoteMapping {
    pub fn new<S: Into<String>>(
        lowest: u8,
        highest: u8,
        fallback: S,
    ) -> Result<Self, SequenceError> {
        if lowest > highest || highest > 127 {
            return Err(SequenceError::InvalidMapping(format!(
                "invalid note range {}..={}",
                lowest, highest
            )));
        }
        Ok(Self {
            lowest,
            highest,
            fallback: fallback.into(),
        })
    }

    pub fn lowest(&self) -> u8 {
        self.lowest
    }

    pub fn highest(&self) -> u8 {
        self.highest
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// The sample key for the given note.
    pub fn key_for(&self, note: u8) -> String {
        if (self.lowest..=self.highest).contains(&note) {
            note_name(note)
        } else {
            self.fallback.clone()
        }
    }
}

impl Default for NoteMapping {
    /// C4 through B5, falling back to C4.
    fn default() -> Self {
        Self {
            lowest: 60,
            highest: 83,
            fallback: "C4".to_string(),
        }
    }
}

/// A Note On message: the note number and the delta time in ticks preceding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOn {
    pub note: u8,
    pub delta: u32,
}

/// The Note On messages of a MIDI file, in file order (track by track).
#[derive(Debug, Clone)]
pub struct MidiSequence {
    notes: Vec<NoteOn>,
    tick_divisor: f64,
    mapping: NoteMapping,
}

impl MidiSequence {
    /// Parses a Standard MIDI File.
    pub fn parse(
        bytes: &[u8],
        tick_divisor: f64,
        mapping: NoteMapping,
    ) -> Result<Self, SequenceError> {
        if !tick_divisor.is_finite() || tick_divisor <= 0.0 {
            return Err(SequenceError::InvalidMapping(format!(
                "tick divisor must be positive, got {}",
                tick_divisor
            )));
        }

        let smf = Smf::parse(bytes)?;
        let notes: Vec<NoteOn> = smf
            .tracks
            .iter()
            .flat_map(|track| track.iter())
            .filter_map(|event| match event.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some(NoteOn {
                    note: key.as_int(),
                    delta: event.delta.as_int(),
                }),
                _ => None,
            })
            .collect();

        debug!(
            tracks = smf.tracks.len(),
            notes = notes.len(),
            "Parsed MIDI file"
        );

        Ok(Self {
            notes,
            tick_divisor,
            mapping,
        })
    }

    /// Reads and parses a Standard MIDI File.
    pub fn from_file(
        path: &Path,
        tick_divisor: f64,
        mapping: NoteMapping,
    ) -> Result<Self, SequenceError> {
        let bytes = fs::read(path).map_err(|source| SequenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sequence = Self::parse(&bytes, tick_divisor, mapping)?;
        info!(path = ?path, notes = sequence.notes.len(), "Loaded MIDI file");
        Ok(sequence)
    }

    pub fn notes(&self) -> &[NoteOn] {
        &self.notes
    }
}

impl Sequencer for MidiSequence {
    /// One event per Note On. Offsets accumulate the preceding event lengths, so they
    /// are non-decreasing.
    fn events(&self) -> Vec<Event> {
        let mut offset = 0.0;
        self.notes
            .iter()
            .map(|note| {
                let length = note.delta as f64 / self.tick_divisor;
                let event = Event::new(offset, length, self.mapping.key_for(note.note));
                offset += length;
                event
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use midly::num::{u15, u28, u4, u7};
    use midly::{Format, Header, MetaMessage, Timing, TrackEvent};

    use super::*;

    fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        }
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        }
    }

    fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn midi_bytes(tracks: Vec<Vec<TrackEvent<'static>>>) -> Result<Vec<u8>, Box<dyn Error>> {
        let format = if tracks.len() > 1 {
            Format::Parallel
        } else {
            Format::SingleTrack
        };
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(480))));
        smf.tracks = tracks;
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes)?;
        Ok(bytes)
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(83), "B5");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn default_mapping() {
        let mapping = NoteMapping::default();
        assert_eq!(mapping.key_for(60), "C4");
        assert_eq!(mapping.key_for(73), "C#5");
        assert_eq!(mapping.key_for(83), "B5");
        assert_eq!(mapping.key_for(59), "C4");
        assert_eq!(mapping.key_for(84), "C4");
        assert!(NoteMapping::new(70, 60, "C4").is_err());
    }

    #[test]
    fn note_on_events_become_events() -> Result<(), Box<dyn Error>> {
        let bytes = midi_bytes(vec![vec![
            note_on(0, 60, 100),
            note_off(500, 60),
            note_on(250, 64, 100),
            // Velocity zero still counts as a Note On.
            note_on(1000, 67, 0),
            end_of_track(),
        ]])?;

        let sequence = MidiSequence::parse(&bytes, DEFAULT_TICK_DIVISOR, NoteMapping::default())?;
        let events = sequence.events();

        assert_eq!(
            events,
            vec![
                Event::new(0.0, 0.0, "C4"),
                Event::new(0.0, 0.25, "E4"),
                Event::new(0.25, 1.0, "G4"),
            ]
        );
        Ok(())
    }

    #[test]
    fn tracks_are_read_in_order() -> Result<(), Box<dyn Error>> {
        let bytes = midi_bytes(vec![
            vec![note_on(100, 72, 90), end_of_track()],
            vec![note_on(200, 90, 90), end_of_track()],
        ])?;

        let sequence = MidiSequence::parse(&bytes, 100.0, NoteMapping::default())?;
        let events = sequence.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::new(0.0, 1.0, "C5"));
        // Out of range notes use the fallback key.
        assert_eq!(events[1], Event::new(1.0, 2.0, "C4"));
        Ok(())
    }

    #[test]
    fn invalid_input() {
        assert!(matches!(
            MidiSequence::parse(b"not a midi file", 1000.0, NoteMapping::default()),
            Err(SequenceError::Midi(_))
        ));
        assert!(MidiSequence::parse(&[], 0.0, NoteMapping::default()).is_err());
        assert!(matches!(
            MidiSequence::from_file(
                Path::new("/nonexistent/file.mid"),
                1000.0,
                NoteMapping::default()
            ),
            Err(SequenceError::Io { .. })
        ));
    }
}
