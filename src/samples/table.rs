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
use std::collections::HashMap;
use std::fmt;

use crate::audio::{AudioBuffer, AudioError, Format};

/// Named source buffers, all sharing one format.
///
/// A table is filled once at startup and only read while rendering. Looking up a key
/// that is not present is not an error; renderers substitute silence.
#[derive(Clone)]
pub struct SampleTable {
    format: Format,
    samples: HashMap<String, AudioBuffer>,
}

impl SampleTable {
    /// Creates an empty table for buffers of the given format.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            samples: HashMap::new(),
        }
    }

    /// Adds a buffer under the given key, replacing any previous buffer for that key.
    pub fn insert<K: Into<String>>(
        &mut self,
        key: K,
        buffer: AudioBuffer,
    ) -> Result<(), AudioError> {
        if buffer.format() != self.format {
            return Err(AudioError::FormatMismatch {
                expected: self.format,
                found: buffer.format(),
            });
        }
        self.samples.insert(key.into(), buffer);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&AudioBuffer> {
        self.samples.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.samples.contains_key(key)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.samples.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the memory used by the sample data in bytes. Buffers shared between keys
    /// are counted once per key.
    pub fn memory_size(&self) -> usize {
        self.samples
            .values()
            .map(|b| std::mem::size_of_val(b.samples()))
            .sum()
    }
}

impl fmt::Debug for SampleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleTable")
            .field("format", &self.format)
            .field("keys", &self.keys())
            .field("memory_kb", &(self.memory_size() / 1024))
            .finish()
    }
}
