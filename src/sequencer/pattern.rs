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

//! Step-grid rhythm patterns.
//!
//! A pattern is a number of equally long steps and a set of voices. Each voice decides
//! from the step index alone whether it fires, so any step can be regenerated without
//! walking the steps before it.

use super::{Event, SequenceError, Sequencer};

/// Decides whether a voice fires on a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fires when `step % every == offset`.
    Every { every: usize, offset: usize },
    /// Fires on the listed steps.
    Steps(Vec<usize>),
    /// Fires on every step.
    Always,
}

impl Trigger {
    pub fn fires(&self, step: usize) -> bool {
        match self {
            Trigger::Every { every, offset } => step % every == *offset,
            Trigger::Steps(steps) => steps.contains(&step),
            Trigger::Always => true,
        }
    }
}

/// One voice of a pattern: the source it plays, when it plays, and how loud.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRule {
    source: String,
    trigger: Trigger,
    gain_db: Option<f64>,
}

impl TriggerRule {
    pub fn new<S: Into<String>>(source: S, trigger: Trigger) -> Self {
        Self {
            source: source.into(),
            trigger,
            gain_db: None,
        }
    }

    /// Sets a gain offset in dB for every hit of this voice.
    pub fn with_gain(mut self, gain_db: f64) -> Self {
        self.gain_db = Some(gain_db);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn gain_db(&self) -> Option<f64> {
        self.gain_db
    }
}

/// A rhythmic pattern of `steps` steps, each `beat_length` seconds long.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    steps: usize,
    beat_length: f64,
    rules: Vec<TriggerRule>,
}

impl Pattern {
    pub fn new(
        steps: usize,
        beat_length: f64,
        rules: Vec<TriggerRule>,
    ) -> Result<Self, SequenceError> {
        if !beat_length.is_finite() || beat_length <= 0.0 {
            return Err(SequenceError::InvalidPattern(format!(
                "beat length must be positive, got {}",
                beat_length
            )));
        }
        for rule in &rules {
            if let Trigger::Every { every: 0, .. } = rule.trigger {
                return Err(SequenceError::InvalidPattern(format!(
                    "voice '{}' repeats every 0 steps",
                    rule.source
                )));
            }
        }

        Ok(Self {
            steps,
            beat_length,
            rules,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn beat_length(&self) -> f64 {
        self.beat_length
    }

    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    /// Length of one repetition in seconds.
    pub fn length(&self) -> f64 {
        self.steps as f64 * self.beat_length
    }

    /// Events for the steps from `start_step` to the end of the pattern. Offsets stay
    /// relative to step zero. Each hit lasts one step; voices firing on the same step
    /// produce separate events in rule order.
    pub fn events_from(&self, start_step: usize) -> Vec<Event> {
        (start_step..self.steps)
            .flat_map(|step| {
                let offset = step as f64 * self.beat_length;
                self.rules
                    .iter()
                    .filter(move |rule| rule.trigger.fires(step))
                    .map(move |rule| {
                        let event = Event::new(offset, self.beat_length, rule.source.clone());
                        match rule.gain_db {
                            Some(gain) => event.with_gain(gain),
                            None => event,
                        }
                    })
            })
            .collect()
    }
}

impl Sequencer for Pattern {
    fn events(&self) -> Vec<Event> {
        self.events_from(0)
    }
}
