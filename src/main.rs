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
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sampleseq::audio::{playback, tone, wav, AudioBuffer, BitDepth, Format};
use sampleseq::compose::{render_piano, PhonkComposer};
use sampleseq::config::EngineConfig;
use sampleseq::samples::{SampleLoader, SampleTable};
use sampleseq::sequencer::MidiSequence;
use sampleseq::util::duration_minutes_seconds;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sample-based audio sequencer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a MIDI file with the piano samples from the config.
    Piano {
        /// The path to the configuration file.
        config: PathBuf,
        /// The MIDI file to render.
        midi: PathBuf,
        /// Where to write the rendered WAV file.
        output: PathBuf,
        /// Play the result after writing it.
        #[clap(long)]
        play: bool,
    },
    /// Composes a phonk track from the drum samples in the config.
    Phonk {
        /// The path to the configuration file.
        config: PathBuf,
        /// Where to write the rendered WAV file.
        output: PathBuf,
        /// Play the result after writing it.
        #[clap(long)]
        play: bool,
    },
    /// Writes a sine tone to a WAV file.
    Tone {
        /// Where to write the WAV file.
        output: PathBuf,
        /// Frequency in Hz.
        #[clap(long)]
        frequency: f64,
        /// Length of the tone, e.g. 500ms or 2s.
        #[clap(long, default_value = "1s")]
        duration: String,
        /// Peak amplitude between 0 and 1.
        #[clap(long, default_value_t = 0.5)]
        amplitude: f64,
        /// Sample rate in Hz.
        #[clap(long, default_value_t = 44100)]
        sample_rate: u32,
        /// Bit depth: 16, 24, 32 or float.
        #[clap(long, default_value = "16")]
        bit_depth: BitDepth,
    },
    /// Loads and lists the samples in the config.
    Samples {
        /// The path to the configuration file.
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Piano {
            config,
            midi,
            output,
            play,
        } => {
            let config = EngineConfig::deserialize(&config)?;
            let table = load_samples(&config)?;
            let sequence = MidiSequence::from_file(
                &midi,
                config.midi().tick_divisor(),
                config.midi().mapping()?,
            )?;

            let rendered = render_piano(
                &table,
                &sequence,
                config.render().options()?,
                &config.post_processing().post_processor()?,
            )?;

            let stats = &rendered.stats;
            println!(
                "Rendered {} notes ({} cut short, {} past the limit, {} invalid).",
                stats.rendered,
                stats.clipped,
                stats.dropped,
                stats.rejected.len()
            );
            if !stats.missing_keys.is_empty() {
                let missing: Vec<&str> = stats.missing_keys.iter().map(String::as_str).collect();
                println!("Notes without samples: {}", missing.join(", "));
            }

            finish(&rendered.buffer, &output, play)?;
        }
        Commands::Phonk {
            config,
            output,
            play,
        } => {
            let config = EngineConfig::deserialize(&config)?;
            let kit = load_samples(&config)?;
            let composer = PhonkComposer::new(&kit, config.phonk().settings()?)?;
            let track = composer.render(&config.post_processing().post_processor()?)?;

            finish(&track, &output, play)?;
        }
        Commands::Tone {
            output,
            frequency,
            duration,
            amplitude,
            sample_rate,
            bit_depth,
        } => {
            let duration: std::time::Duration = DurationString::from_string(duration)?.into();
            let format = Format::new(sample_rate, 1, bit_depth)?;
            let buffer = tone::sine(frequency, duration.as_secs_f64(), amplitude, format)?;

            finish(&buffer, &output, false)?;
        }
        Commands::Samples { config } => {
            let config = EngineConfig::deserialize(&config)?;
            let table = load_samples(&config)?;

            if table.is_empty() {
                println!("No samples configured.");
                return Ok(());
            }

            println!("Samples (count: {}, {}):", table.len(), table.format());
            for key in table.keys() {
                if let Some(sample) = table.get(key) {
                    println!(
                        "- {} ({}, peak {:.3})",
                        key,
                        duration_minutes_seconds(sample.duration()),
                        sample.peak()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Loads every sample in the config into a table in the configured format.
fn load_samples(config: &EngineConfig) -> Result<SampleTable, Box<dyn Error>> {
    let format = config.format().format()?;
    let mut loader = SampleLoader::new(format);
    Ok(loader.load_table(&config.sample_files(), config.base_path())?)
}

/// Writes the buffer and optionally plays it. Playback problems are reported but do
/// not fail the command.
fn finish(buffer: &AudioBuffer, output: &Path, play: bool) -> Result<(), Box<dyn Error>> {
    wav::write_wav(output, buffer)?;
    println!(
        "Wrote {} ({}).",
        output.display(),
        duration_minutes_seconds(buffer.duration())
    );

    if play {
        info!("Playing back render");
        if let Err(e) = playback::play(buffer) {
            warn!(err = %e, "Playback failed");
        }
    }
    Ok(())
}
