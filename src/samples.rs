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

//! Source samples for rendering.
//!
//! This module provides:
//! - Decoding of sample files and conversion to the render format
//! - Caching of loaded samples by path
//! - The read-only `SampleTable` that renderers look sources up in

mod decode;
mod loader;
mod table;

use std::path::PathBuf;

pub use loader::SampleLoader;
pub use table::SampleTable;

use crate::audio::AudioError;

/// Errors raised while loading sample assets. All of them are fatal: they happen before
/// any rendering starts.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open sample {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode sample {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("Sample {} has no audio track", path.display())]
    NoTrack { path: PathBuf },

    #[error("Sample {} does not specify a sample rate", path.display())]
    NoSampleRate { path: PathBuf },

    #[error("Unable to convert sample {}: {source}", path.display())]
    Audio {
        path: PathBuf,
        #[source]
        source: AudioError,
    },
}
