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

//! End to end pipelines built on the renderer.
//!
//! - The piano pipeline renders a MIDI file against a table of piano samples.
//! - The phonk composer builds a bass and drum loop and arranges it into a track.

mod phonk;
mod piano;

pub use phonk::{default_drum_pattern, PhonkComposer, PhonkSettings};
pub use piano::render_piano;

use crate::audio::AudioError;
use crate::render::RenderError;
use crate::sequencer::SequenceError;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}
