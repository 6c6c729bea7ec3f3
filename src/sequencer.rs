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

//! Event sequencers: sources of timed events for the renderer.

mod event;
pub mod midi;
mod pattern;

use std::path::PathBuf;

pub use event::{Event, EventError};
pub use midi::{MidiSequence, NoteMapping};
pub use pattern::{Pattern, Trigger, TriggerRule};

/// Produces an ordered list of events.
pub trait Sequencer {
    fn events(&self) -> Vec<Event>;
}

#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid MIDI file: {0}")]
    Midi(#[from] midly::Error),

    #[error("Invalid note mapping: {0}")]
    InvalidMapping(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}
