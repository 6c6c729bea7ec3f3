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

//! YAML configuration.
//!
//! A configuration file is read once at startup into an immutable `EngineConfig` that
//! is handed to the loaders, sequencers and renderers. Every section is optional:
//!
//! ```yaml
//! format:
//!   sample_rate: 44100
//!   bits_per_sample: 16
//! samples:
//!   - key: C4
//!     file: piano/C4.wav
//! render:
//!   max_duration: 55s
//!   on_invalid_event: skip
//! midi:
//!   tick_divisor: 1000
//! post_processing:
//!   headroom_db: 0.1
//! ```

mod error;
mod format;
mod midi;
mod phonk;
mod post_processing;
mod render;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::File;
use duration_string::DurationString;
use serde::Deserialize;
use tracing::debug;

pub use self::error::ConfigError;
pub use self::format::AudioFormat;
pub use self::midi::Midi;
pub use self::phonk::{DrumPattern, Phonk, Voice};
pub use self::post_processing::{Compression, PostProcessing};
pub use self::render::{OnInvalidEvent, Render};

/// The whole configuration file.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EngineConfig {
    #[serde(default)]
    format: AudioFormat,

    /// Sample keys and their audio files, relative to the configuration file.
    #[serde(default)]
    samples: Vec<SampleFile>,

    #[serde(default)]
    render: Render,

    #[serde(default)]
    midi: Midi,

    #[serde(default)]
    post_processing: PostProcessing,

    #[serde(default)]
    phonk: Phonk,

    /// The directory relative sample paths are resolved against.
    #[serde(skip)]
    base_path: PathBuf,
}

impl EngineConfig {
    /// Reads the configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<EngineConfig, ConfigError> {
        let mut parsed = config::Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<EngineConfig>()?;
        parsed.base_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        debug!(path = ?path, samples = parsed.samples.len(), "Loaded configuration");
        Ok(parsed)
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn samples(&self) -> &[SampleFile] {
        &self.samples
    }

    /// The sample files by key. A key listed twice keeps its last file.
    pub fn sample_files(&self) -> BTreeMap<String, PathBuf> {
        self.samples
            .iter()
            .map(|sample| (sample.key.clone(), sample.file.clone()))
            .collect()
    }

    pub fn render(&self) -> &Render {
        &self.render
    }

    pub fn midi(&self) -> &Midi {
        &self.midi
    }

    pub fn post_processing(&self) -> &PostProcessing {
        &self.post_processing
    }

    pub fn phonk(&self) -> &Phonk {
        &self.phonk
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// One entry of the `samples` section.
#[derive(Deserialize, Clone, Debug)]
pub struct SampleFile {
    /// The key events refer to, e.g. a note name like `C4`.
    key: String,

    /// The audio file.
    file: PathBuf,
}

impl SampleFile {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Parses a duration string such as `250ms` or `55s`.
fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    DurationString::from_string(value.to_string())
        .map(Into::into)
        .map_err(|err| ConfigError::InvalidDuration {
            field,
            value: value.to_string(),
            message: err.to_string(),
        })
}
