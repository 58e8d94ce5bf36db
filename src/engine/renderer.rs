/*
Renderer
========

The renderer is everything that runs on the audio thread: the bell voice
pool, the metronome click, the drone, the transport clock and the pattern
queue. The audio device calls `render` with an output buffer and the
renderer fills it.

Order of work for every chunk (at most MAX_BLOCK_SIZE frames):

    1. Drain the command ring. Cancellations land here, before any
       scheduled event of this chunk can fire. A completion report that
       found the event ring full is retried here too.
    2. Walk the chunk in segments. At the start of each segment fire every
       event due at the current clock position (pattern notes, metronome
       beats, pattern completion), then render up to the next due event.
    3. Advance the clock by the segment length (only while running).

Because events fire on their exact frame, a pattern note offset of 500 ms
lands on frame 24 000 at 48 kHz regardless of the device buffer size.

Lanes
-----

    pattern    one active pattern; PlayPattern clears the queue first and
               sends the replaced note buffer back to be freed
    metronome  one loop; StartMetronome replaces it
    drone      one voice; StartDrone hard-stops the old one

The clock starts with whichever lane needs it and stops (rewinding to zero)
when the last lane goes idle. Beats fall on multiples of the beat interval
measured from clock position zero.
*/

use crate::{
    config::EngineConfig,
    engine::{
        clock::{ClockState, TransportClock},
        event_queue::EventQueue,
        message::{AudioLink, Command, PatternId, PlaybackEvent},
    },
    graph::GraphNode,
    sequencing::{Bpm, ScheduledNote},
    synth::{factory::boxed, PolySynth, Voice},
    voices, MAX_BLOCK_SIZE,
};

const CLICK_VOICES: usize = 4;

struct MetronomeLoop {
    interval: f64,
    /// Beat number of the next click; it lands on `beat * interval`.
    beat: u64,
}

impl MetronomeLoop {
    fn next_at(&self) -> u64 {
        (self.beat as f64 * self.interval).round() as u64
    }
}

struct ActivePattern {
    id: PatternId,
    end_at: u64,
}

pub struct Renderer {
    sample_rate: f32,
    link: AudioLink,

    bells: PolySynth<Box<dyn GraphNode>>,
    clicks: PolySynth<Box<dyn GraphNode>>,
    drone: Voice<Box<dyn GraphNode>>,
    drone_strikes: u64,

    clock: TransportClock,
    queue: EventQueue,
    metronome: Option<MetronomeLoop>,
    pattern: Option<ActivePattern>,
    /// Finished pattern whose report did not fit in the event ring.
    unreported_finish: Option<PatternId>,
    beats_per_bar: u64,

    master_gain: f32,
    click_buffer: Vec<f32>,
    drone_buffer: Vec<f32>,
}

impl Renderer {
    pub fn new(sample_rate: f32, config: &EngineConfig, master_gain: f32, link: AudioLink) -> Self {
        let config = config.sanitized();
        let drone_level = config.drone_level;

        Self {
            sample_rate,
            link,

            bells: PolySynth::new(&boxed(voices::handpan), config.polyphony, sample_rate),
            clicks: PolySynth::new(&boxed(voices::click), CLICK_VOICES, sample_rate),
            drone: Voice::new(Box::new(voices::drone(drone_level)), sample_rate),
            drone_strikes: 0,

            clock: TransportClock::default(),
            queue: EventQueue::new(sample_rate),
            metronome: None,
            pattern: None,
            unreported_finish: None,
            beats_per_bar: config.beats_per_bar as u64,

            master_gain,
            click_buffer: vec![0.0; MAX_BLOCK_SIZE],
            drone_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Fill `out` with mono audio.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.apply_commands();
            self.retry_finish_report();
            self.render_chunk(chunk);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn position(&self) -> u64 {
        self.clock.position()
    }

    /// Bell voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.bells.active_voices()
    }

    pub fn drone_active(&self) -> bool {
        self.drone.is_active()
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.link.commands.pop() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::NoteOn {
                frequency,
                velocity,
                hold_frames,
            } => self.bells.note_on(frequency, velocity, Some(hold_frames)),
            Command::SetMasterGain(gain) => self.master_gain = gain.max(0.0),
            Command::StartClock => self.clock.start(),
            Command::PauseClock => self.clock.pause(),
            Command::ResumeClock => self.clock.resume(),
            Command::StartMetronome { bpm } => self.start_metronome(bpm),
            Command::StopMetronome => {
                self.metronome = None;
                self.stop_clock_if_idle();
            }
            Command::PlayPattern { id, notes } => self.play_pattern(id, notes),
            Command::StopPattern => {
                let old = self.queue.clear();
                self.link.retire(old);
                self.pattern = None;
                self.stop_clock_if_idle();
            }
            Command::StartDrone { frequency } => {
                self.drone.hard_stop();
                self.drone_strikes += 1;
                self.drone.start(frequency, 1.0, None, self.drone_strikes);
            }
            Command::StopDrone => self.drone.release(),
        }
    }

    fn start_metronome(&mut self, bpm: Bpm) {
        if self.clock.state() == ClockState::Stopped {
            self.clock.start();
        }

        let interval = bpm.frames_per_beat(self.sample_rate);
        // Next quarter-note boundary at or after the current position.
        let beat = (self.clock.position() as f64 / interval).ceil() as u64;
        self.metronome = Some(MetronomeLoop { interval, beat });
    }

    fn play_pattern(&mut self, id: PatternId, notes: Vec<ScheduledNote>) {
        // The previous pattern's pending notes must never fire.
        self.pattern = None;

        if notes.is_empty() {
            let old = self.queue.clear();
            self.link.retire(old);
            self.link.retire(notes);
            self.stop_clock_if_idle();
            return;
        }

        if self.clock.state() == ClockState::Stopped {
            self.clock.start();
        }

        let old = self.queue.load(id, self.clock.position(), notes);
        self.link.retire(old);
        self.pattern = Some(ActivePattern {
            id,
            end_at: self.queue.end_at(),
        });
    }

    fn stop_clock_if_idle(&mut self) {
        if self.metronome.is_none() && self.pattern.is_none() {
            self.clock.stop();
        }
    }

    /// Push an event to the control side; false if the ring is full.
    fn report(&mut self, event: PlaybackEvent) -> bool {
        self.link.events.push(event).is_ok()
    }

    fn report_finish(&mut self, pattern: PatternId) {
        // Notes and beats are informational and may be dropped, but the
        // control side waits on this one to release its transport.
        if !self.report(PlaybackEvent::PatternFinished { pattern }) {
            self.unreported_finish = Some(pattern);
        }
    }

    fn retry_finish_report(&mut self) {
        if let Some(pattern) = self.unreported_finish.take() {
            self.report_finish(pattern);
        }
    }

    /// Fire everything scheduled at or before the current position.
    fn fire_due_events(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        let now = self.clock.position();

        while let Some(note) = self.queue.pop_due(now) {
            self.bells.note_on(note.frequency, 1.0, Some(note.hold_frames));
            let _ = self.report(PlaybackEvent::PatternNote {
                pattern: note.pattern,
                index: note.index,
                frequency: note.frequency,
                at: note.at,
            });
        }

        if let Some(pattern) = &self.pattern {
            if pattern.end_at <= now {
                let id = pattern.id;
                self.pattern = None;
                self.report_finish(id);
                self.stop_clock_if_idle();
                // Stopping rewinds the clock: nothing else is due this frame.
                if !self.clock.is_running() {
                    return;
                }
            }
        }

        loop {
            let Some(metronome) = self.metronome.as_mut() else {
                break;
            };
            let at = metronome.next_at();
            if at > now {
                break;
            }
            let index = metronome.beat;
            metronome.beat += 1;

            let accent = index % self.beats_per_bar == 0;
            self.click(accent);
            let _ = self.report(PlaybackEvent::Beat { index, accent, at });
        }
    }

    fn click(&mut self, accent: bool) {
        let frequency = if accent {
            voices::click::ACCENT_HZ
        } else {
            voices::click::BEAT_HZ
        };
        self.clicks.note_on(frequency, 1.0, None);
    }

    /// Frames until the next scheduled event, if the clock is running.
    fn frames_until_next_event(&self) -> Option<u64> {
        if !self.clock.is_running() {
            return None;
        }

        let now = self.clock.position();
        [
            self.queue.next_at(),
            self.pattern.as_ref().map(|p| p.end_at),
            self.metronome.as_ref().map(MetronomeLoop::next_at),
        ]
        .into_iter()
        .flatten()
        .min()
        .map(|at| at.saturating_sub(now))
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let mut done = 0;
        while done < out.len() {
            self.fire_due_events();

            let remaining = out.len() - done;
            let segment = match self.frames_until_next_event() {
                Some(frames) => (frames as usize).clamp(1, remaining),
                None => remaining,
            };

            self.render_sources(&mut out[done..done + segment]);
            self.clock.advance(segment);
            done += segment;
        }
    }

    fn render_sources(&mut self, out: &mut [f32]) {
        let len = out.len();
        self.bells.render_block(out);

        let clicks = &mut self.click_buffer[..len];
        self.clicks.render_block(clicks);
        for (o, c) in out.iter_mut().zip(clicks.iter()) {
            *o += c;
        }

        if self.drone.is_active() {
            let drone = &mut self.drone_buffer[..len];
            self.drone.render(drone);
            for (o, d) in out.iter_mut().zip(drone.iter()) {
                *o += d;
            }
        }

        for sample in out.iter_mut() {
            *sample *= self.master_gain;
        }
    }
}
