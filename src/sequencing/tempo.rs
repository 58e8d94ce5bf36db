use std::{fmt, time::Duration};

/// Metronome tempo in beats (quarter notes) per minute.
///
/// Always within [`Bpm::MIN`, `Bpm::MAX`]: out-of-range requests are
/// clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bpm(u32);

impl Bpm {
    pub const MIN: u32 = 40;
    pub const MAX: u32 = 200;

    pub fn new(bpm: u32) -> Self {
        Bpm(bpm.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn beat_interval(self) -> Duration {
        Duration::from_secs_f64(60.0 / self.0 as f64)
    }

    /// Quarter-note spacing in samples. Fractional so long runs don't drift.
    pub fn frames_per_beat(self, sample_rate: f32) -> f64 {
        60.0 * sample_rate as f64 / self.0 as f64
    }
}

impl From<u32> for Bpm {
    fn from(bpm: u32) -> Self {
        Bpm::new(bpm)
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_tempos() {
        assert_eq!(Bpm::new(10).get(), 40);
        assert_eq!(Bpm::new(0).get(), 40);
        assert_eq!(Bpm::new(500).get(), 200);
        assert_eq!(Bpm::new(120).get(), 120);
    }

    #[test]
    fn beat_spacing() {
        assert_eq!(Bpm::new(120).beat_interval(), Duration::from_millis(500));
        assert_eq!(Bpm::new(80).frames_per_beat(48_000.0), 36_000.0);
    }
}
