//! Screen layout for the handpan TUI.

mod pads;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::View;

use pads::{render_chords, render_notes};
use transport::render_transport;

pub fn render(frame: &mut Frame, view: &View<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(7),    // Tone fields
            Constraint::Length(3), // Chord pads
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], view);
    render_notes(frame, chunks[1], view);
    render_chords(frame, chunks[2], view);

    let status = Paragraph::new(format!(" {}", view.status)).style(Style::default().fg(Color::Gray));
    frame.render_widget(status, chunks[3]);

    let help = Paragraph::new(
        " [1-9/Space] Notes  [Z-N] Chords  [M] Metronome  [ [ ] ] BPM  [P] Pattern  [D] Drone  [+/-] Volume  [H] Hide  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
