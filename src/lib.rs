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

//! A sample-based audio sequencer.
//!
//! Timed events, from a MIDI file or a step pattern, are rendered against a table of
//! named audio samples into a single buffer. Samples are looped or cut to each event's
//! length, placed back to back or mixed at their offsets, and the result is compressed
//! and normalized before being written to WAV.

pub mod audio;
pub mod compose;
pub mod config;
pub mod postprocess;
pub mod render;
pub mod samples;
pub mod sequencer;
pub mod util;

#[cfg(test)]
mod testutil;
