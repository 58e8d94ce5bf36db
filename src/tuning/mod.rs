//! The instrument's fixed tuning: note names, frequencies and ring order.

pub mod chords;

pub use chords::{ChordDefinition, Color};

use crate::error::ValidationError;

/*
D Kurd 10 at 432 Hz
===================

A handpan has one low "ding" in the center and a ring of tone fields around
it. The instrument modelled here is a D Kurd with nine ring fields, tuned in
just intonation on a 432 Hz reference, with the ding at D3 = 144 Hz
(432 / 3).

    Note   Ratio to D3   Frequency
    ----   -----------   ---------
    D3        1/1         144.0 Hz   (center)
    A3        3/2         216.0 Hz
    Bb3       8/5         230.4 Hz
    C4       16/9         256.0 Hz
    D4        2/1         288.0 Hz
    E4        9/4         324.0 Hz
    F4       12/5         345.6 Hz
    G4        8/3         384.0 Hz
    A4        3/1         432.0 Hz
    C5       32/9         512.0 Hz

These intervals are not 12-tone equal temperament, which is why the engine
speaks Hz everywhere instead of MIDI note numbers: 440 Hz ET note numbers
cannot name these pitches exactly.

The ring is stored in ascending pitch order. Where each field sits on the
drawn instrument (the zig-zag around the shell) is the UI's business; the
ring index is all this table promises.
*/

/// Where a note lives on the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePosition {
    /// The central ding.
    Center,
    /// A tone field on the outer ring, in ascending pitch order.
    Ring { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteDefinition {
    pub name: &'static str,
    pub frequency_hz: f32,
    pub position: NotePosition,
}

/// Lookup table for one instrument's tuning.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    center: NoteDefinition,
    ring: Vec<NoteDefinition>,
}

const DING_HZ: f32 = 144.0;

const D_KURD_RING: [(&str, f32); 9] = [
    ("A3", 3.0 / 2.0),
    ("Bb3", 8.0 / 5.0),
    ("C4", 16.0 / 9.0),
    ("D4", 2.0),
    ("E4", 9.0 / 4.0),
    ("F4", 12.0 / 5.0),
    ("G4", 8.0 / 3.0),
    ("A4", 3.0),
    ("C5", 32.0 / 9.0),
];

impl FrequencyTable {
    /// Build a table from a center note and the ordered ring.
    ///
    /// Positions are assigned here; every frequency must be positive and
    /// every name unique.
    pub fn new(
        center: (&'static str, f32),
        ring: &[(&'static str, f32)],
    ) -> Result<Self, ValidationError> {
        let center = NoteDefinition {
            name: center.0,
            frequency_hz: crate::error::check_frequency(center.1)?,
            position: NotePosition::Center,
        };

        let mut notes: Vec<NoteDefinition> = Vec::with_capacity(ring.len());
        for (index, &(name, frequency_hz)) in ring.iter().enumerate() {
            let frequency_hz = crate::error::check_frequency(frequency_hz)?;
            if name == center.name || notes.iter().any(|n| n.name == name) {
                return Err(ValidationError::DuplicateNote(name.to_string()));
            }
            notes.push(NoteDefinition {
                name,
                frequency_hz,
                position: NotePosition::Ring { index },
            });
        }

        Ok(Self {
            center,
            ring: notes,
        })
    }

    /// The shipped instrument: D Kurd, just intonation, 432 Hz reference.
    pub fn d_kurd_432() -> Self {
        let ring: Vec<(&'static str, f32)> = D_KURD_RING
            .iter()
            .map(|&(name, ratio)| (name, DING_HZ * ratio))
            .collect();

        match Self::new(("D3", DING_HZ), &ring) {
            Ok(table) => table,
            Err(err) => unreachable!("built-in tuning is valid: {err}"),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&NoteDefinition, ValidationError> {
        self.iter()
            .find(|note| note.name == name)
            .ok_or_else(|| ValidationError::UnknownNote(name.to_string()))
    }

    pub fn frequency(&self, name: &str) -> Result<f32, ValidationError> {
        self.lookup(name).map(|note| note.frequency_hz)
    }

    pub fn center(&self) -> &NoteDefinition {
        &self.center
    }

    /// Outer notes in ring order.
    pub fn ring(&self) -> &[NoteDefinition] {
        &self.ring
    }

    /// Center first, then the ring.
    pub fn iter(&self) -> impl Iterator<Item = &NoteDefinition> {
        std::iter::once(&self.center).chain(self.ring.iter())
    }

    pub fn len(&self) -> usize {
        self.ring.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::d_kurd_432()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d_kurd_has_center_and_nine_ring_notes() {
        let table = FrequencyTable::d_kurd_432();
        assert_eq!(table.center().name, "D3");
        assert_eq!(table.center().position, NotePosition::Center);
        assert_eq!(table.ring().len(), 9);
        assert_eq!(table.len(), 10);

        for (index, note) in table.ring().iter().enumerate() {
            assert_eq!(note.position, NotePosition::Ring { index });
        }
    }

    #[test]
    fn ring_ascends_in_pitch() {
        let table = FrequencyTable::d_kurd_432();
        let ring = table.ring();
        assert!(ring.windows(2).all(|w| w[0].frequency_hz < w[1].frequency_hz));
    }

    #[test]
    fn lookup_finds_reference_pitch() {
        let table = FrequencyTable::d_kurd_432();
        let a4 = table.lookup("A4").unwrap();
        assert!((a4.frequency_hz - 432.0).abs() < 1e-3);
        assert!((table.frequency("Bb3").unwrap() - 230.4).abs() < 1e-3);
    }

    #[test]
    fn lookup_rejects_unknown_names() {
        let table = FrequencyTable::d_kurd_432();
        assert_eq!(
            table.lookup("F#4"),
            Err(ValidationError::UnknownNote("F#4".into()))
        );
    }

    #[test]
    fn new_rejects_duplicates_and_bad_frequencies() {
        assert_eq!(
            FrequencyTable::new(("D3", 144.0), &[("A3", 216.0), ("A3", 432.0)]).err(),
            Some(ValidationError::DuplicateNote("A3".into()))
        );
        assert_eq!(
            FrequencyTable::new(("D3", 144.0), &[("D3", 288.0)]).err(),
            Some(ValidationError::DuplicateNote("D3".into()))
        );
        assert!(FrequencyTable::new(("D3", 0.0), &[]).is_err());
        assert!(FrequencyTable::new(("D3", 144.0), &[("A3", -216.0)]).is_err());
    }
}
