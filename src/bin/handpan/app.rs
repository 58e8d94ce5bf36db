//! Key handling and the event loop.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use handpan_dsp::{
    tuning::ChordDefinition, HandpanEngine, NoteLength, PlaybackEvent,
};
use ratatui::DefaultTerminal;
use tracing::warn;

use crate::ui;

/// How long a struck pad stays lit.
const HIGHLIGHT: Duration = Duration::from_millis(250);
const VOLUME_STEP_DB: f32 = 3.0;
const BPM_STEP: u32 = 4;
const DRONE_NOTE: &str = "D3";

const DEMO_NOTES: [&str; 8] = ["D3", "A3", "Bb3", "C4", "D4", "E4", "F4", "A4"];
const DEMO_OFFSETS_MS: [i64; 8] = [0, 400, 800, 1_200, 1_600, 2_000, 2_400, 3_200];

const CHORD_KEYS: [char; 6] = ['z', 'x', 'c', 'v', 'b', 'n'];

/// What the screen shows, rebuilt from the engine every frame.
pub struct View<'a> {
    pub engine: &'a HandpanEngine,
    pub chords: &'a [ChordDefinition],
    /// One entry per note: center first, then the ring.
    pub lit_notes: Vec<bool>,
    pub lit_chord: Option<usize>,
    pub beat: Option<(u64, bool)>,
    pub bpm: u32,
    pub hidden: bool,
    pub status: &'a str,
}

pub struct HandpanApp {
    engine: HandpanEngine,
    chords: Vec<ChordDefinition>,
    note_lit_at: Vec<Option<Instant>>,
    chord_lit_at: Option<(usize, Instant)>,
    beat: Option<(u64, bool, Instant)>,
    bpm: u32,
    hidden: bool,
    status: String,
    should_quit: bool,
}

impl HandpanApp {
    pub fn new(engine: HandpanEngine) -> Self {
        let notes = engine.table().len();
        let bpm = engine.default_bpm().get();
        Self {
            engine,
            chords: ChordDefinition::default_pads(),
            note_lit_at: vec![None; notes],
            chord_lit_at: None,
            beat: None,
            bpm,
            hidden: false,
            status: "press any key to start audio".into(),
            should_quit: false,
        }
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_engine();

            terminal.draw(|frame| ui::render(frame, &self.view()))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        if let Err(err) = self.engine.dispose() {
            warn!(%err, "dispose failed");
        }
        Ok(())
    }

    fn view(&self) -> View<'_> {
        let now = Instant::now();
        let lit = |at: &Option<Instant>| at.is_some_and(|t| now.duration_since(t) < HIGHLIGHT);
        View {
            engine: &self.engine,
            chords: &self.chords,
            lit_notes: self.note_lit_at.iter().map(lit).collect(),
            lit_chord: self
                .chord_lit_at
                .filter(|(_, t)| now.duration_since(*t) < HIGHLIGHT)
                .map(|(i, _)| i),
            beat: self
                .beat
                .filter(|(_, _, t)| now.duration_since(*t) < HIGHLIGHT)
                .map(|(i, accent, _)| (i, accent)),
            bpm: self.bpm,
            hidden: self.hidden,
            status: &self.status,
        }
    }

    fn poll_engine(&mut self) {
        for event in self.engine.poll_events() {
            match event {
                PlaybackEvent::PatternNote { frequency, .. } => {
                    let index = self
                        .engine
                        .table()
                        .iter()
                        .position(|n| (n.frequency_hz - frequency).abs() < 1e-3);
                    if let Some(index) = index {
                        self.note_lit_at[index] = Some(Instant::now());
                    }
                }
                PlaybackEvent::PatternFinished { .. } => {
                    self.status = "pattern finished".into();
                }
                PlaybackEvent::Beat { index, accent, .. } => {
                    self.beat = Some((index, accent, Instant::now()));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
            self.should_quit = true;
            return;
        }

        // Every key press counts as the unlock gesture until it succeeds.
        if !self.engine.is_ready() && !self.hidden {
            if let Err(err) = self.engine.unlock() {
                self.status = format!("audio unavailable: {err} (press a key to retry)");
                return;
            }
            self.status = "audio ready".into();
        }

        let result = match key {
            KeyCode::Char(' ') => self.strike(0),
            KeyCode::Char(c @ '1'..='9') => self.strike(c as usize - '0' as usize),
            KeyCode::Char(c) if CHORD_KEYS.contains(&c) => {
                let index = CHORD_KEYS.iter().position(|&k| k == c).unwrap_or(0);
                self.chord(index)
            }
            KeyCode::Char('m') => {
                self.toggle_metronome();
                Ok(())
            }
            KeyCode::Char('[') => {
                self.change_bpm(-(BPM_STEP as i64));
                Ok(())
            }
            KeyCode::Char(']') => {
                self.change_bpm(BPM_STEP as i64);
                Ok(())
            }
            KeyCode::Char('p') => self.toggle_pattern(),
            KeyCode::Char('d') => self.toggle_drone(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.engine
                    .set_volume(self.engine.volume_db() + VOLUME_STEP_DB);
                Ok(())
            }
            KeyCode::Char('-') => {
                self.engine
                    .set_volume(self.engine.volume_db() - VOLUME_STEP_DB);
                Ok(())
            }
            KeyCode::Char('h') => {
                self.hidden = !self.hidden;
                self.engine.handle_visibility_change(!self.hidden)
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.status = err.to_string();
        }
    }

    /// `index` 0 is the center, 1.. the ring.
    fn strike(&mut self, index: usize) -> handpan_dsp::Result<()> {
        let Some(note) = self.engine.table().iter().nth(index) else {
            return Ok(());
        };
        let frequency = note.frequency_hz;
        self.engine.play_note(frequency, NoteLength::Medium)?;
        self.note_lit_at[index] = Some(Instant::now());
        Ok(())
    }

    fn chord(&mut self, index: usize) -> handpan_dsp::Result<()> {
        let Some(chord) = self.chords.get(index) else {
            return Ok(());
        };
        self.engine.play_chord_pad(chord, NoteLength::Long)?;
        self.status = format!("{} ({})", chord.display_name, chord.note_names.join(" "));
        self.chord_lit_at = Some((index, Instant::now()));
        Ok(())
    }

    fn toggle_metronome(&mut self) {
        if self.engine.transport_state().active_loop.is_some() {
            self.engine.stop_metronome();
        } else {
            self.engine.start_metronome(self.bpm);
        }
    }

    fn change_bpm(&mut self, delta: i64) {
        let bpm = (self.bpm as i64 + delta).max(0) as u32;
        self.bpm = handpan_dsp::sequencing::Bpm::new(bpm).get();
        if self.engine.transport_state().active_loop.is_some() {
            self.engine.start_metronome(self.bpm);
        }
    }

    fn toggle_pattern(&mut self) -> handpan_dsp::Result<()> {
        if self.engine.transport_state().active_pattern.is_some() {
            self.engine.stop_pattern();
            self.status = "pattern stopped".into();
        } else if self.engine.play_pattern(&DEMO_NOTES, &DEMO_OFFSETS_MS)?.is_some() {
            self.status = "playing pattern".into();
        }
        Ok(())
    }

    fn toggle_drone(&mut self) -> handpan_dsp::Result<()> {
        if self.engine.drone_state().active {
            self.engine.stop_drone();
        } else {
            let frequency = self.engine.table().frequency(DRONE_NOTE)?;
            self.engine.start_drone(frequency)?;
        }
        Ok(())
    }
}
