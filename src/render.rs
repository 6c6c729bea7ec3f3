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

//! Renders event lists into audio.
//!
//! The renderer resolves every event against a sample table, fits the sample to the
//! event's length and places it on a timeline, either back to back or at the event's
//! offset. A duration budget bounds the output; reaching it ends the render normally.

pub mod adjust;
mod timeline;

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::audio::{AudioBuffer, AudioError};
use crate::samples::SampleTable;
use crate::sequencer::{Event, EventError};

pub use adjust::{adjust_length, FitMode};
pub use timeline::Timeline;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Rejected event: {0}")]
    Rejected(#[from] EventError),

    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// How events are placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompositionMode {
    /// Each event directly follows the previous one. Offsets are ignored.
    Sequential,
    /// Each event is mixed in at its offset. The timeline spans `span` seconds, or the
    /// end of the last event if no span is given.
    Overlay { span: Option<f64> },
}

/// What to do with an event whose offset or length is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Log it, count it and keep rendering.
    #[default]
    Skip,
    /// Fail the render.
    Abort,
}

/// Immutable settings for a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    max_duration: Option<f64>,
    reject_policy: RejectPolicy,
    fit_mode: FitMode,
}

impl RenderOptions {
    /// Renders without a duration budget.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Caps the rendered output at `seconds`.
    pub fn with_max_duration(mut self, seconds: f64) -> Result<Self, RenderError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(RenderError::InvalidDuration(seconds));
        }
        self.max_duration = Some(seconds);
        Ok(self)
    }

    pub fn with_reject_policy(mut self, reject_policy: RejectPolicy) -> Self {
        self.reject_policy = reject_policy;
        self
    }

    pub fn with_fit_mode(mut self, fit_mode: FitMode) -> Self {
        self.fit_mode = fit_mode;
        self
    }

    pub fn max_duration(&self) -> Option<f64> {
        self.max_duration
    }

    pub fn reject_policy(&self) -> RejectPolicy {
        self.reject_policy
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }
}

/// What happened during a render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// Events placed on the timeline.
    pub rendered: usize,
    /// Events shortened to fit the budget.
    pub clipped: usize,
    /// Events not rendered because the budget was exhausted.
    pub dropped: usize,
    /// Events refused under the skip policy.
    pub rejected: Vec<EventError>,
    /// Keys that had no sample and rendered as silence.
    pub missing_keys: BTreeSet<String>,
}

/// The output of a render pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub buffer: AudioBuffer,
    pub stats: RenderStats,
}

/// Renders event lists against a sample table.
pub struct Renderer<'a> {
    table: &'a SampleTable,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(table: &'a SampleTable, options: RenderOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the events in the given mode.
    pub fn render(&self, events: &[Event], mode: CompositionMode) -> Result<Rendered, RenderError> {
        let start = Instant::now();
        let rendered = match mode {
            CompositionMode::Sequential => self.render_sequential(events)?,
            CompositionMode::Overlay { span } => self.render_overlay(events, span)?,
        };

        let stats = &rendered.stats;
        info!(
            events = events.len(),
            rendered = stats.rendered,
            clipped = stats.clipped,
            dropped = stats.dropped,
            rejected = stats.rejected.len(),
            missing = stats.missing_keys.len(),
            seconds = rendered.buffer.seconds(),
            duration_ms = start.elapsed().as_millis(),
            "Rendered events"
        );
        Ok(rendered)
    }

    /// Shorthand for sequential rendering.
    pub fn render_sequential(&self, events: &[Event]) -> Result<Rendered, RenderError> {
        let budget = self.budget_frames();
        let mut timeline = Timeline::new(self.table.format());
        let mut stats = RenderStats::default();
        let mut total = 0usize;

        for (index, event) in events.iter().enumerate() {
            if total >= budget {
                stats.dropped = events.len() - index;
                debug!(
                    dropped = stats.dropped,
                    "Duration budget reached, stopping render"
                );
                break;
            }
            if !self.accept(event, &mut stats)? {
                continue;
            }

            let requested = self.table.format().frames_for(event.length());
            let effective = requested.min(budget - total);
            if effective < requested {
                stats.clipped += 1;
            }

            timeline.append(&self.segment(event, effective, &mut stats))?;
            total += effective;
            stats.rendered += 1;
        }

        Ok(Rendered {
            buffer: timeline.finish(),
            stats,
        })
    }

    /// Shorthand for overlay rendering. The timeline length is the span (or the natural
    /// end of the events) capped by the budget. Events draw on the budget in list order
    /// like they do sequentially; events starting past the timeline are dropped and
    /// events running past it are clipped.
    pub fn render_overlay(
        &self,
        events: &[Event],
        span: Option<f64>,
    ) -> Result<Rendered, RenderError> {
        let format = self.table.format();
        let span = match span {
            Some(span) if !span.is_finite() || span < 0.0 => {
                return Err(RenderError::InvalidDuration(span))
            }
            Some(span) => span,
            None => natural_span(events),
        };
        let budget = self.budget_frames();
        let frames = format.frames_for(span).min(budget);
        let mut timeline = Timeline::silent(format, frames);
        let mut stats = RenderStats::default();
        let mut total = 0usize;

        for (index, event) in events.iter().enumerate() {
            if total >= budget {
                stats.dropped += events.len() - index;
                debug!(
                    dropped = stats.dropped,
                    "Duration budget reached, stopping render"
                );
                break;
            }
            if !self.accept(event, &mut stats)? {
                continue;
            }

            let position = format.frames_for(event.offset());
            if position >= frames {
                stats.dropped += 1;
                continue;
            }

            // Measured between rounded positions so grid hits end where the next begins.
            let end = format.frames_for(event.offset() + event.length());
            let requested = end.saturating_sub(position);
            let effective = requested.min(frames - position).min(budget - total);
            if effective < requested {
                stats.clipped += 1;
            }

            timeline.overlay_at(&self.segment(event, effective, &mut stats), position)?;
            total += effective;
            stats.rendered += 1;
        }

        Ok(Rendered {
            buffer: timeline.finish(),
            stats,
        })
    }

    fn budget_frames(&self) -> usize {
        self.options
            .max_duration
            .map_or(usize::MAX, |seconds| self.table.format().frames_for(seconds))
    }

    /// Validates the event. Returns false if it should be skipped.
    fn accept(&self, event: &Event, stats: &mut RenderStats) -> Result<bool, RenderError> {
        match event.validate() {
            Ok(()) => Ok(true),
            Err(err) => match self.options.reject_policy {
                RejectPolicy::Skip => {
                    warn!(err = %err, "Skipping invalid event");
                    stats.rejected.push(err);
                    Ok(false)
                }
                RejectPolicy::Abort => Err(err.into()),
            },
        }
    }

    /// The event's sample fitted to `frames` with its gain applied.
    fn segment(&self, event: &Event, frames: usize, stats: &mut RenderStats) -> AudioBuffer {
        let (segment, found) =
            adjust::resolve(self.table, event.source(), frames, self.options.fit_mode);
        if !found && stats.missing_keys.insert(event.source().to_string()) {
            warn!(key = event.source(), "No sample for key, rendering silence");
        }
        match event.gain_db() {
            Some(gain) => segment.apply_gain(gain),
            None => segment,
        }
    }
}

/// The end of the latest-ending valid event.
fn natural_span(events: &[Event]) -> f64 {
    events
        .iter()
        .filter(|event| event.validate().is_ok())
        .map(|event| event.offset() + event.length())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{tone, Format};

    fn tone_table() -> SampleTable {
        let format = Format::cd_mono();
        let mut table = SampleTable::new(format);
        table
            .insert("C4", tone::sine(440.0, 1.0, 0.5, format).unwrap())
            .unwrap();
        table
            .insert("A", tone::sine(220.0, 0.25, 0.5, format).unwrap())
            .unwrap();
        table
    }

    fn limited(seconds: f64) -> RenderOptions {
        RenderOptions::unlimited().with_max_duration(seconds).unwrap()
    }

    #[test]
    fn looped_tone() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(5.0));
        let rendered = renderer
            .render(&[Event::new(0.0, 2.0, "C4")], CompositionMode::Sequential)
            .unwrap();

        let tone = table.get("C4").unwrap();
        assert_eq!(rendered.buffer.frames(), 88200);
        assert_eq!(&rendered.buffer.samples()[..44100], tone.samples());
        assert_eq!(&rendered.buffer.samples()[44100..], tone.samples());
        assert_eq!(rendered.stats.rendered, 1);
    }

    #[test]
    fn missing_key_renders_silence() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(5.0));
        let rendered = renderer
            .render(&[Event::new(0.0, 1.0, "X")], CompositionMode::Sequential)
            .unwrap();

        assert_eq!(rendered.buffer.frames(), 44100);
        assert_eq!(rendered.buffer.peak(), 0.0);
        assert!(rendered.stats.missing_keys.contains("X"));
    }

    #[test]
    fn budget_clips_last_event() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(1.5));
        let rendered = renderer
            .render(
                &[Event::new(0.0, 1.0, "A"), Event::new(1.0, 1.0, "A")],
                CompositionMode::Sequential,
            )
            .unwrap();

        assert_eq!(rendered.buffer.frames(), 66150);
        assert_eq!(rendered.stats.rendered, 2);
        assert_eq!(rendered.stats.clipped, 1);
        assert_eq!(rendered.stats.dropped, 0);
    }

    #[test]
    fn budget_stops_rendering() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(1.0));
        let events: Vec<Event> = (0..10)
            .map(|i| Event::new(i as f64 * 0.3, 0.3, "A"))
            .collect();
        let rendered = renderer.render(&events, CompositionMode::Sequential).unwrap();

        assert_eq!(rendered.buffer.frames(), 44100);
        assert_eq!(rendered.stats.rendered, 4);
        assert_eq!(rendered.stats.clipped, 1);
        assert_eq!(rendered.stats.dropped, 6);
    }

    #[test]
    fn budget_never_exceeded() {
        let table = tone_table();
        let lengths = [0.0, 0.01, 0.3, 1.7, 0.25, 2.0, 0.125, 0.6];
        for max in [0.0, 0.1, 0.5, 1.0, 2.5, 10.0] {
            let renderer = Renderer::new(&table, limited(max));
            let events: Vec<Event> = lengths
                .iter()
                .map(|length| Event::new(0.0, *length, "C4"))
                .collect();
            let rendered = renderer.render(&events, CompositionMode::Sequential).unwrap();

            let natural: f64 = lengths.iter().sum();
            let expected = Format::cd_mono().frames_for(max.min(natural));
            assert!(rendered.buffer.frames() <= Format::cd_mono().frames_for(max));
            assert!(rendered.buffer.frames().abs_diff(expected) <= lengths.len());
        }
    }

    #[test]
    fn zero_budget_renders_nothing() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(0.0));
        let rendered = renderer
            .render(&[Event::new(0.0, 1.0, "A")], CompositionMode::Sequential)
            .unwrap();
        assert!(rendered.buffer.is_empty());
        assert_eq!(rendered.stats.dropped, 1);
    }

    #[test]
    fn gain_is_applied() {
        let table = tone_table();
        let renderer = Renderer::new(&table, RenderOptions::unlimited());
        let rendered = renderer
            .render(
                &[Event::new(0.0, 0.25, "A").with_gain(-6.0)],
                CompositionMode::Sequential,
            )
            .unwrap();
        let expected = table.get("A").unwrap().apply_gain(-6.0);
        assert_eq!(rendered.buffer.samples(), expected.samples());
    }

    #[test]
    fn invalid_events_are_skipped() {
        let table = tone_table();
        let renderer = Renderer::new(&table, RenderOptions::unlimited());
        let rendered = renderer
            .render(
                &[
                    Event::new(0.0, 0.25, "A"),
                    Event::new(0.0, -1.0, "A"),
                    Event::new(0.0, f64::INFINITY, "A"),
                    Event::new(0.0, 0.25, "A"),
                ],
                CompositionMode::Sequential,
            )
            .unwrap();
        assert_eq!(rendered.buffer.frames(), 22050);
        assert_eq!(rendered.stats.rendered, 2);
        assert_eq!(rendered.stats.rejected.len(), 2);
    }

    #[test]
    fn invalid_events_abort() {
        let table = tone_table();
        let renderer = Renderer::new(
            &table,
            RenderOptions::unlimited().with_reject_policy(RejectPolicy::Abort),
        );
        let result = renderer.render(
            &[Event::new(0.0, 0.25, "A"), Event::new(0.0, -1.0, "A")],
            CompositionMode::Sequential,
        );
        assert!(matches!(result, Err(RenderError::Rejected(_))));
    }

    #[test]
    fn invalid_budget() {
        assert!(RenderOptions::unlimited().with_max_duration(-1.0).is_err());
        assert!(RenderOptions::unlimited().with_max_duration(f64::NAN).is_err());
    }

    #[test]
    fn overlay_mixes_at_offsets() {
        let table = tone_table();
        let renderer = Renderer::new(&table, RenderOptions::unlimited());
        let events = vec![
            Event::new(0.0, 0.25, "A"),
            Event::new(0.0, 0.25, "A"),
            Event::new(0.5, 0.25, "A"),
        ];
        let rendered = renderer
            .render(&events, CompositionMode::Overlay { span: Some(1.0) })
            .unwrap();

        let tone = table.get("A").unwrap();
        let buffer = &rendered.buffer;
        assert_eq!(buffer.frames(), 44100);
        for (mixed, source) in buffer.samples()[..11025].iter().zip(tone.samples()) {
            assert_eq!(*mixed, source * 2.0);
        }
        assert!(buffer.samples()[11025..22050].iter().all(|s| *s == 0.0));
        assert_eq!(&buffer.samples()[22050..33075], tone.samples());
        assert!(buffer.samples()[33075..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn overlay_respects_span_and_budget() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(0.6));
        let events = vec![
            Event::new(0.0, 0.25, "A"),
            Event::new(0.5, 0.25, "A"),
            Event::new(0.75, 0.25, "A"),
        ];
        let rendered = renderer
            .render(&events, CompositionMode::Overlay { span: Some(2.0) })
            .unwrap();

        assert_eq!(rendered.buffer.frames(), 26460);
        assert_eq!(rendered.stats.rendered, 2);
        assert_eq!(rendered.stats.clipped, 1);
        assert_eq!(rendered.stats.dropped, 1);
    }

    #[test]
    fn overlay_stacked_events_share_budget() {
        let table = tone_table();
        let renderer = Renderer::new(&table, limited(0.6));
        let events = vec![
            Event::new(0.0, 0.5, "A"),
            Event::new(0.0, 0.5, "A"),
            Event::new(0.1, 0.5, "A"),
        ];
        let rendered = renderer
            .render(&events, CompositionMode::Overlay { span: None })
            .unwrap();

        assert_eq!(rendered.buffer.frames(), 26460);
        assert_eq!(rendered.stats.rendered, 2);
        assert_eq!(rendered.stats.clipped, 1);
        assert_eq!(rendered.stats.dropped, 1);

        // The second event only gets the 0.1s left after the first.
        let tone = table.get("A").unwrap();
        let buffer = &rendered.buffer;
        for (mixed, source) in buffer.samples()[..4410].iter().zip(tone.samples()) {
            assert_eq!(*mixed, source * 2.0);
        }
        assert_eq!(&buffer.samples()[4410..11025], &tone.samples()[4410..]);
    }

    #[test]
    fn overlay_budget_never_exceeded() {
        let table = tone_table();
        let format = Format::cd_mono();
        let events: Vec<Event> = (0..8)
            .map(|i| Event::new(i as f64 * 0.05, 0.3, "C4"))
            .collect();
        for max in [0.0, 0.1, 0.35, 0.7, 5.0] {
            let rendered = Renderer::new(&table, limited(max))
                .render(&events, CompositionMode::Overlay { span: None })
                .unwrap();
            let stats = &rendered.stats;
            assert!(rendered.buffer.frames() <= format.frames_for(max));
            assert_eq!(stats.rendered + stats.dropped, events.len());
        }
    }

    #[test]
    fn grid_hits_end_at_the_next_step() {
        let table = tone_table();
        let renderer = Renderer::new(&table, RenderOptions::unlimited());
        let rendered = renderer
            .render(
                &[Event::new(0.125, 0.125, "A")],
                CompositionMode::Overlay { span: Some(0.5) },
            )
            .unwrap();

        // Step one starts at frame 5513 and step two at 11025.
        let tone = table.get("A").unwrap();
        let buffer = &rendered.buffer;
        assert!(buffer.samples()[..5513].iter().all(|s| *s == 0.0));
        assert_eq!(&buffer.samples()[5513..11025], &tone.samples()[..5512]);
        assert!(buffer.samples()[11025..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn overlay_natural_span() {
        let table = tone_table();
        let renderer = Renderer::new(&table, RenderOptions::unlimited());
        let events = vec![Event::new(0.5, 0.25, "A"), Event::new(0.0, 0.25, "A")];
        let rendered = renderer
            .render(&events, CompositionMode::Overlay { span: None })
            .unwrap();
        assert_eq!(rendered.buffer.frames(), 33075);
        assert!(renderer
            .render(&events, CompositionMode::Overlay { span: Some(-1.0) })
            .is_err());
    }

    #[test]
    fn padded_hits_do_not_loop() {
        let table = tone_table();
        let renderer = Renderer::new(
            &table,
            RenderOptions::unlimited().with_fit_mode(FitMode::Pad),
        );
        let rendered = renderer
            .render(
                &[Event::new(0.0, 0.5, "A")],
                CompositionMode::Overlay { span: None },
            )
            .unwrap();
        let source = table.get("A").unwrap();
        assert_eq!(rendered.buffer.frames(), 22050);
        assert_eq!(&rendered.buffer.samples()[..11025], source.samples());
        assert!(rendered.buffer.samples()[11025..].iter().all(|s| *s == 0.0));
    }
}
