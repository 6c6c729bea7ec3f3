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

//! Sample loading and caching.
//!
//! Samples are decoded entirely into memory before any rendering starts and converted
//! to the render format.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::decode::decode_file;
use super::{LoadError, SampleTable};
use crate::audio::{resample, AudioBuffer, Format};
use crate::util::filename_display;

/// Manages loading and caching of sample data.
pub struct SampleLoader {
    /// Cache of loaded samples by file path.
    cache: HashMap<PathBuf, AudioBuffer>,
    /// Format every loaded sample is converted to.
    target_format: Format,
}

impl SampleLoader {
    /// Creates a new sample loader.
    pub fn new(target_format: Format) -> Self {
        Self {
            cache: HashMap::new(),
            target_format,
        }
    }

    /// Loads a sample from a file into memory.
    /// Returns a cached version if already loaded.
    pub fn load(&mut self, path: &Path) -> Result<AudioBuffer, LoadError> {
        if let Some(sample) = self.cache.get(path) {
            debug!(path = ?path, "Using cached sample");
            return Ok(sample.clone());
        }

        info!(path = ?path, "Loading sample into memory");

        let decoded = decode_file(path)?;
        let audio_error = |source| LoadError::Audio {
            path: path.to_path_buf(),
            source,
        };

        let samples = if decoded.sample_rate != self.target_format.sample_rate() {
            info!(
                source_rate = decoded.sample_rate,
                target_rate = self.target_format.sample_rate(),
                "Transcoding sample"
            );
            resample::transcode(
                &decoded.samples,
                decoded.channels,
                decoded.sample_rate,
                self.target_format.sample_rate(),
            )
        } else {
            decoded.samples
        };

        let samples = if decoded.channels != self.target_format.channels() {
            debug!(
                source_channels = decoded.channels,
                target_channels = self.target_format.channels(),
                "Remixing sample"
            );
            resample::remix(&samples, decoded.channels, self.target_format.channels())
                .map_err(audio_error)?
        } else {
            samples
        };

        let bit_depth = self.target_format.bit_depth();
        let samples = samples.into_iter().map(|s| bit_depth.quantize(s)).collect();
        let loaded = AudioBuffer::new(samples, self.target_format).map_err(audio_error)?;

        info!(
            file = filename_display(path),
            channels = decoded.channels,
            sample_rate = decoded.sample_rate,
            duration_ms = loaded.duration().as_millis(),
            memory_kb = std::mem::size_of_val(loaded.samples()) / 1024,
            "Sample loaded"
        );

        self.cache.insert(path.to_path_buf(), loaded.clone());

        Ok(loaded)
    }

    /// Loads every sample in the key to file mapping into a table. Relative paths are
    /// resolved against `base_path`. Any failure aborts the whole load.
    pub fn load_table(
        &mut self,
        files: &BTreeMap<String, PathBuf>,
        base_path: &Path,
    ) -> Result<SampleTable, LoadError> {
        let mut table = SampleTable::new(self.target_format);

        for (key, file) in files {
            let full_path = if file.is_absolute() {
                file.clone()
            } else {
                base_path.join(file)
            };

            let sample = self.load(&full_path).inspect_err(|e| {
                warn!(key = key.as_str(), path = ?full_path, error = %e, "Failed to load sample");
            })?;
            table
                .insert(key.clone(), sample)
                .map_err(|source| LoadError::Audio {
                    path: full_path,
                    source,
                })?;
        }

        info!(
            samples = table.len(),
            memory_kb = self.total_memory_usage() / 1024,
            "Sample table loaded"
        );

        Ok(table)
    }

    /// Returns the total memory used by cached samples.
    pub fn total_memory_usage(&self) -> usize {
        self.cache
            .values()
            .map(|s| std::mem::size_of_val(s.samples()))
            .sum()
    }
}

impl std::fmt::Debug for SampleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLoader")
            .field("cached_samples", &self.cache.len())
            .field("target_format", &self.target_format)
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}
