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
use crate::audio::dsp::Compressor;
use crate::postprocess::{PostProcessor, DEFAULT_HEADROOM_DB};

/// A YAML representation of the post-processing chain.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct PostProcessing {
    /// Dynamic range compression, applied first (default: off)
    compression: Option<Compression>,

    /// Whether to normalize the peak (default: true)
    normalize: Option<bool>,

    /// Headroom below full scale after normalizing, in dB (default: 0.1)
    headroom_db: Option<f64>,
}

impl PostProcessing {
    pub fn compression(&self) -> Option<&Compression> {
        self.compression.as_ref()
    }

    pub fn normalize(&self) -> bool {
        self.normalize.unwrap_or(true)
    }

    pub fn headroom_db(&self) -> f64 {
        self.headroom_db.unwrap_or(DEFAULT_HEADROOM_DB)
    }

    /// Builds the post-processing chain.
    pub fn post_processor(&self) -> Result<PostProcessor, ConfigError> {
        let compressor = self
            .compression
            .as_ref()
            .map(Compression::compressor)
            .transpose()?;
        let headroom = self.normalize().then(|| self.headroom_db());
        Ok(PostProcessor::new(compressor, headroom))
    }
}

/// A YAML representation of compressor settings.
#[derive(Deserialize, Clone, Debug)]
pub struct Compression {
    /// Level above which the signal is reduced, in dBFS.
    threshold_db: f64,

    /// Input to output ratio above the threshold.
    ratio: f64,

    /// Attack time, e.g. "5ms".
    attack: String,

    /// Release time, e.g. "50ms".
    release: String,
}

impl Compression {
    pub fn compressor(&self) -> Result<Compressor, ConfigError> {
        Compressor::new(
            self.threshold_db,
            self.ratio,
            parse_duration("post_processing.compression.attack", &self.attack)?,
            parse_duration("post_processing.compression.release", &self.release)?,
        )
        .map_err(|e| ConfigError::invalid("post_processing.compression", e))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> PostProcessing {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_compression() {
        let post = parse(
            r#"
            compression:
              threshold_db: -10.0
              ratio: 4.0
              attack: 5ms
              release: 50ms
            "#,
        )
        .post_processor()
        .unwrap();

        let compressor = post.compressor().unwrap();
        assert_eq!(compressor.ratio(), 4.0);
        assert_eq!(compressor.release(), Duration::from_millis(50));
        assert_eq!(post.headroom_db(), Some(DEFAULT_HEADROOM_DB));
    }

    #[test]
    fn test_normalize_off() {
        let post = parse("normalize: false").post_processor().unwrap();
        assert_eq!(post.headroom_db(), None);
        assert!(post.compressor().is_none());
    }

    #[test]
    fn test_invalid_compression() {
        let post = parse(
            r#"
            compression:
              threshold_db: 3.0
              ratio: 4.0
              attack: 5ms
              release: 50ms
            "#,
        );
        assert!(matches!(
            post.post_processor(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
