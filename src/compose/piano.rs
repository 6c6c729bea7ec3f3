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
use tracing::{info, warn};

use super::ComposeError;
use crate::postprocess::PostProcessor;
use crate::render::{CompositionMode, RenderOptions, Rendered, Renderer};
use crate::samples::SampleTable;
use crate::sequencer::Sequencer;

/// Renders a note sequence back to back against a table of piano samples, then runs the
/// post-processing chain over the result.
pub fn render_piano<S: Sequencer>(
    table: &SampleTable,
    sequence: &S,
    options: RenderOptions,
    post: &PostProcessor,
) -> Result<Rendered, ComposeError> {
    let events = sequence.events();
    info!(
        events = events.len(),
        max_duration = ?options.max_duration(),
        "Rendering piano"
    );

    let rendered = Renderer::new(table, options).render(&events, CompositionMode::Sequential)?;
    if !rendered.stats.missing_keys.is_empty() {
        warn!(
            keys = ?rendered.stats.missing_keys,
            "Notes without samples were rendered as silence"
        );
    }

    Ok(Rendered {
        buffer: post.process(&rendered.buffer),
        stats: rendered.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{db_to_amplitude, Format};
    use crate::sequencer::Event;
    use crate::testutil::tone_sample;

    struct Notes(Vec<Event>);

    impl Sequencer for Notes {
        fn events(&self) -> Vec<Event> {
            self.0.clone()
        }
    }

    fn piano() -> SampleTable {
        let format = Format::cd_mono();
        let mut table = SampleTable::new(format);
        table.insert("C4", tone_sample(261.63, 0.4, format)).unwrap();
        table.insert("E4", tone_sample(329.63, 0.4, format)).unwrap();
        table
    }

    #[test]
    fn renders_and_normalizes() {
        let notes = Notes(vec![
            Event::new(0.0, 0.5, "C4"),
            Event::new(0.5, 0.25, "E4"),
            Event::new(0.75, 0.5, "G4"),
        ]);
        let rendered = render_piano(
            &piano(),
            &notes,
            RenderOptions::unlimited(),
            &PostProcessor::default(),
        )
        .unwrap();

        assert_eq!(rendered.buffer.frames(), 55125);
        assert!((rendered.buffer.peak() - db_to_amplitude(-0.1)).abs() < 1e-6);
        assert_eq!(rendered.stats.rendered, 3);
        assert!(rendered.stats.missing_keys.contains("G4"));
        // The missing note is silent.
        assert!(rendered.buffer.samples()[33075..]
            .iter()
            .all(|s| *s == 0.0));
    }

    #[test]
    fn truncates_to_max_duration() {
        let notes = Notes((0..100).map(|i| Event::new(i as f64, 1.0, "C4")).collect());
        let rendered = render_piano(
            &piano(),
            &notes,
            RenderOptions::unlimited().with_max_duration(2.5).unwrap(),
            &PostProcessor::default(),
        )
        .unwrap();

        assert_eq!(rendered.buffer.frames(), 110250);
        assert_eq!(rendered.stats.rendered, 3);
        assert_eq!(rendered.stats.dropped, 97);
    }
}
