//! Transport bar: engine state, tempo, beat, drone and volume.

use handpan_dsp::engine::EngineState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::View;

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let block = Block::default().title(" handpan ").borders(Borders::ALL);

    let engine = view.engine;
    let transport = engine.transport_state();
    let drone = engine.drone_state();

    let (state_str, state_color) = if view.hidden {
        ("Hidden", Color::DarkGray)
    } else {
        match engine.engine_state() {
            EngineState::Ready if engine.is_ready() => ("Ready", Color::Green),
            EngineState::Disposed => ("Disposed", Color::Red),
            _ => ("Locked", Color::Yellow),
        }
    };

    let metronome = if transport.active_loop.is_some() { "▶" } else { "■" };
    let beat = match view.beat {
        Some((_, true)) => Span::styled(
            "● ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some((_, false)) => Span::styled("● ", Style::default().fg(Color::Yellow)),
        None => Span::styled("○ ", Style::default().fg(Color::DarkGray)),
    };

    let drone_str = match drone.frequency_hz {
        Some(hz) if drone.active => format!("Drone {hz:.1}Hz  "),
        _ => "Drone off  ".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {state_str}  "), Style::default().fg(state_color)),
        Span::styled(
            format!("{metronome} {} BPM  ", view.bpm),
            Style::default().fg(Color::Cyan),
        ),
        beat,
        Span::styled(
            if transport.active_pattern.is_some() { "Pattern  " } else { "" },
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(drone_str, Style::default().fg(Color::White)),
        Span::styled(
            format!("Vol {:.0}dB", engine.volume_db()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
