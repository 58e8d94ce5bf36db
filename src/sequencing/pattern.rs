/*
Timed Patterns
==============

A pattern is a list of note names plus one offset per note, in milliseconds
from the moment the pattern starts:

    notes    ["D3", "A3", "D4"]
    offsets  [0,    500,  1000]

Validation happens here, on the control thread, before anything is sent to
the renderer. A pattern is rejected if:

    - it is empty
    - the two lists differ in length
    - an offset is negative
    - an offset is smaller than the one before it
    - a note name is not on the instrument

Equal offsets are allowed (two notes struck together) and keep their list
order. Every note is held for `PATTERN_NOTE_LENGTH`; the pattern is finished
once the last note's hold has elapsed.
*/

use std::time::Duration;

use crate::{error::ValidationError, sequencing::NoteLength, tuning::FrequencyTable};

/// Hold used for every pattern note.
pub const PATTERN_NOTE_LENGTH: NoteLength = NoteLength::Short;

/// One resolved pattern step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    /// From pattern start.
    pub offset: Duration,
    pub frequency: f32,
    pub hold: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    notes: Vec<ScheduledNote>,
}

impl Pattern {
    /// Validate and resolve a pattern against the tuning table.
    pub fn new(
        table: &FrequencyTable,
        names: &[&str],
        offsets_ms: &[i64],
    ) -> Result<Self, ValidationError> {
        if names.is_empty() && offsets_ms.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }
        if names.len() != offsets_ms.len() {
            return Err(ValidationError::LengthMismatch {
                notes: names.len(),
                offsets: offsets_ms.len(),
            });
        }

        let mut notes = Vec::with_capacity(names.len());
        let mut previous = 0i64;

        for (index, (&name, &offset_ms)) in names.iter().zip(offsets_ms).enumerate() {
            if offset_ms < 0 {
                return Err(ValidationError::NegativeOffset { index, offset_ms });
            }
            if offset_ms < previous {
                return Err(ValidationError::DecreasingOffset { index, offset_ms });
            }
            previous = offset_ms;

            notes.push(ScheduledNote {
                offset: Duration::from_millis(offset_ms as u64),
                frequency: table.frequency(name)?,
                hold: PATTERN_NOTE_LENGTH.hold(),
            });
        }

        Ok(Self { notes })
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<ScheduledNote> {
        self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Last offset plus its hold.
    pub fn duration(&self) -> Duration {
        self.notes
            .iter()
            .map(|n| n.offset + n.hold)
            .max()
            .unwrap_or_default()
    }
}
