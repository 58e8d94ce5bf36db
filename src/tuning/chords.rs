//! Chord pads built from the instrument's own notes.
//!
//! A chord is a list of note names rather than frequencies, so a pad can only
//! ever sound pitches the instrument actually has. Resolution against a
//! [`FrequencyTable`] is where that invariant is checked.

use super::FrequencyTable;
use crate::error::ValidationError;

/// Display color for a chord pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordDefinition {
    /// Short identifier, e.g. `"Dm"`.
    pub key: &'static str,
    pub note_names: Vec<&'static str>,
    pub display_name: &'static str,
    pub color: Color,
}

impl ChordDefinition {
    pub fn new(
        key: &'static str,
        note_names: &[&'static str],
        display_name: &'static str,
        color: Color,
    ) -> Self {
        Self {
            key,
            note_names: note_names.to_vec(),
            display_name,
            color,
        }
    }

    /// Check every note resolves in `table`.
    pub fn validate(&self, table: &FrequencyTable) -> Result<(), ValidationError> {
        self.frequencies(table).map(|_| ())
    }

    /// Resolve the chord to frequencies, in the order the notes are listed.
    pub fn frequencies(&self, table: &FrequencyTable) -> Result<Vec<f32>, ValidationError> {
        self.note_names
            .iter()
            .map(|&name| {
                table
                    .frequency(name)
                    .map_err(|_| ValidationError::UnknownChordNote {
                        chord: self.key.to_string(),
                        note: name.to_string(),
                    })
            })
            .collect()
    }

    /// The pads offered alongside the D Kurd layout.
    pub fn default_pads() -> Vec<ChordDefinition> {
        vec![
            Self::new("Dm", &["D4", "F4", "A4"], "D minor", Color::rgb(0x5b, 0x8d, 0xef)),
            Self::new("F", &["F4", "A4", "C5"], "F major", Color::rgb(0xf2, 0xa6, 0x5a)),
            Self::new("C", &["C4", "E4", "G4"], "C major", Color::rgb(0xf6, 0xd3, 0x65)),
            Self::new("Gm", &["G4", "Bb3", "D4"], "G minor", Color::rgb(0x8e, 0x6c, 0xd8)),
            Self::new("Bb", &["Bb3", "D4", "F4"], "B-flat major", Color::rgb(0xe0, 0x6c, 0x75)),
            Self::new("Am", &["A3", "C4", "E4"], "A minor", Color::rgb(0x4f, 0xb4, 0x8f)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pads_resolve_against_d_kurd() {
        let table = FrequencyTable::d_kurd_432();
        for chord in ChordDefinition::default_pads() {
            assert!(chord.validate(&table).is_ok(), "{} should resolve", chord.key);
            assert_eq!(chord.frequencies(&table).unwrap().len(), chord.note_names.len());
        }
    }

    #[test]
    fn unknown_chord_note_is_rejected() {
        let table = FrequencyTable::d_kurd_432();
        let chord = ChordDefinition::new("D", &["D4", "F#4", "A4"], "D major", Color::rgb(0, 0, 0));
        assert_eq!(
            chord.validate(&table),
            Err(ValidationError::UnknownChordNote {
                chord: "D".into(),
                note: "F#4".into()
            })
        );
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#5b8def"), Some(Color::rgb(0x5b, 0x8d, 0xef)));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }
}
