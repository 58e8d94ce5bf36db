//! Pattern notes waiting for their transport frame.
//!
//! The queue owns the note buffer that arrived with the `PlayPattern`
//! command and walks it with a cursor, so loading, firing and cancelling a
//! pattern never allocate on the audio thread. Replaced buffers are handed
//! back to the caller, which returns them to the control side.

use crate::{
    engine::message::PatternId,
    sequencing::{duration::duration_to_frames, ScheduledNote},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedNote {
    /// Transport frame the note fires on.
    pub at: u64,
    pub pattern: PatternId,
    /// Position in the pattern.
    pub index: usize,
    pub frequency: f32,
    pub hold_frames: u64,
}

/// One pattern's notes, in firing order.
#[derive(Debug)]
pub struct EventQueue {
    sample_rate: f32,
    pattern: PatternId,
    /// Transport frame of offset zero.
    start: u64,
    notes: Vec<ScheduledNote>,
    cursor: usize,
}

impl EventQueue {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            pattern: PatternId(0),
            start: 0,
            notes: Vec::new(),
            cursor: 0,
        }
    }

    /// Replace the queue with `notes` starting at frame `start`.
    ///
    /// Returns the previous buffer. Notes should arrive sorted by offset
    /// (`Pattern` guarantees it); anything else is put in order here,
    /// keeping equal offsets in their given order.
    pub fn load(
        &mut self,
        pattern: PatternId,
        start: u64,
        mut notes: Vec<ScheduledNote>,
    ) -> Vec<ScheduledNote> {
        if !notes.windows(2).all(|w| w[0].offset <= w[1].offset) {
            // Insertion sort: stable and in place.
            for i in 1..notes.len() {
                let mut j = i;
                while j > 0 && notes[j - 1].offset > notes[j].offset {
                    notes.swap(j - 1, j);
                    j -= 1;
                }
            }
        }

        self.pattern = pattern;
        self.start = start;
        self.cursor = 0;
        std::mem::replace(&mut self.notes, notes)
    }

    /// Frame on which the last loaded note's hold ends, saturating.
    pub fn end_at(&self) -> u64 {
        self.notes
            .iter()
            .map(|n| {
                self.frame_of(n)
                    .saturating_add(duration_to_frames(n.hold, self.sample_rate))
            })
            .max()
            .unwrap_or(self.start)
    }

    fn frame_of(&self, note: &ScheduledNote) -> u64 {
        self.start
            .saturating_add(duration_to_frames(note.offset, self.sample_rate))
    }

    /// Frame of the next pending note.
    pub fn next_at(&self) -> Option<u64> {
        self.notes.get(self.cursor).map(|n| self.frame_of(n))
    }

    /// Take the next note if it is due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<QueuedNote> {
        let note = self.notes.get(self.cursor)?;
        let at = self.frame_of(note);
        if at > now {
            return None;
        }

        let queued = QueuedNote {
            at,
            pattern: self.pattern,
            index: self.cursor,
            frequency: note.frequency,
            hold_frames: duration_to_frames(note.hold, self.sample_rate),
        };
        self.cursor += 1;
        Some(queued)
    }

    /// Drop every pending note and return the buffer.
    pub fn clear(&mut self) -> Vec<ScheduledNote> {
        self.cursor = 0;
        std::mem::take(&mut self.notes)
    }

    pub fn pending(&self) -> usize {
        self.notes.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SR: f32 = 1_000.0;

    fn note(offset_ms: u64, frequency: f32) -> ScheduledNote {
        ScheduledNote {
            offset: Duration::from_millis(offset_ms),
            frequency,
            hold: Duration::from_millis(10),
        }
    }

    #[test]
    fn pops_in_time_order_with_stable_ties() {
        let mut queue = EventQueue::new(SR);
        queue.load(
            PatternId(1),
            0,
            vec![note(200, 1.0), note(100, 2.0), note(200, 3.0), note(100, 4.0)],
        );

        let order: Vec<f32> = std::iter::from_fn(|| queue.pop_due(u64::MAX))
            .map(|n| n.frequency)
            .collect();
        assert_eq!(order, vec![2.0, 4.0, 1.0, 3.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn only_due_notes_are_popped() {
        let mut queue = EventQueue::new(SR);
        queue.load(PatternId(1), 40, vec![note(0, 1.0), note(500, 2.0)]);

        let first = queue.pop_due(45).unwrap();
        assert_eq!((first.index, first.at, first.hold_frames), (0, 40, 10));
        assert_eq!(queue.pop_due(45), None);
        assert_eq!(queue.next_at(), Some(540));
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.end_at(), 550);
    }

    #[test]
    fn load_hands_back_the_previous_buffer() {
        let mut queue = EventQueue::new(SR);
        queue.load(PatternId(1), 0, vec![note(0, 1.0), note(500, 2.0)]);
        queue.pop_due(0);

        let old = queue.load(PatternId(2), 100, vec![note(0, 3.0)]);
        assert_eq!(old.len(), 2);
        assert_eq!(queue.next_at(), Some(100));
        assert_eq!(queue.pop_due(100).map(|n| n.pattern), Some(PatternId(2)));
    }

    #[test]
    fn clear_cancels_pending() {
        let mut queue = EventQueue::new(SR);
        queue.load(PatternId(1), 0, vec![note(0, 1.0), note(500, 2.0)]);
        assert_eq!(queue.clear().len(), 2);

        assert_eq!(queue.next_at(), None);
        assert_eq!(queue.pop_due(u64::MAX), None);
    }

    #[test]
    fn huge_offsets_saturate_instead_of_wrapping() {
        let mut queue = EventQueue::new(48_000.0);
        let far = ScheduledNote {
            offset: Duration::from_millis(i64::MAX as u64),
            frequency: 2.0,
            hold: Duration::from_millis(300),
        };
        queue.load(PatternId(1), 1_000, vec![note(0, 1.0), far]);

        assert_eq!(queue.end_at(), u64::MAX);
        assert!(queue.pop_due(1_000).is_some());
        assert_eq!(queue.next_at(), Some(u64::MAX));
        assert_eq!(queue.pop_due(1_000_000), None);
    }
}
