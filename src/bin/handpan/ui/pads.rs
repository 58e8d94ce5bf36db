//! Tone fields and chord pads.

use handpan_dsp::tuning::NotePosition;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::View;

const CHORD_KEYS: &str = "ZXCVBN";

fn pad_style(lit: bool, color: Color) -> Style {
    if lit {
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

/// The ding in the middle row, the ring split above and below it.
pub fn render_notes(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let block = Block::default().title(" D Kurd 432 ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let mut upper = Vec::new();
    let mut lower = Vec::new();
    let mut center = None;

    for (i, note) in view.engine.table().iter().enumerate() {
        let lit = view.lit_notes.get(i).copied().unwrap_or(false);
        match note.position {
            NotePosition::Center => {
                let label = format!(" [Space] {} {:.1}Hz ", note.name, note.frequency_hz);
                center = Some((label, lit));
            }
            NotePosition::Ring { index } => {
                let label = format!(" [{}] {:<3} ", index + 1, note.name);
                // Alternate sides, the way tone fields zig-zag around the shell.
                if index % 2 == 0 {
                    upper.push((label, lit));
                } else {
                    lower.push((label, lit));
                }
            }
        }
    }

    let spans = |fields: Vec<(String, bool)>| {
        Line::from(
            fields
                .into_iter()
                .map(|(label, lit)| ratatui::text::Span::styled(label, pad_style(lit, Color::Cyan)))
                .collect::<Vec<_>>(),
        )
        .centered()
    };

    frame.render_widget(Paragraph::new(spans(upper)), rows[1]);
    if let Some((label, lit)) = center {
        let ding = Line::styled(label, pad_style(lit, Color::LightYellow)).centered();
        frame.render_widget(Paragraph::new(ding), rows[2]);
    }
    frame.render_widget(Paragraph::new(spans(lower)), rows[3]);
}

pub fn render_chords(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let block = Block::default().title(" Chords ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let spans: Vec<_> = view
        .chords
        .iter()
        .zip(CHORD_KEYS.chars())
        .enumerate()
        .map(|(i, (chord, key))| {
            let color = Color::Rgb(chord.color.r, chord.color.g, chord.color.b);
            ratatui::text::Span::styled(
                format!(" [{key}] {:<3}", chord.key),
                pad_style(view.lit_chord == Some(i), color),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans).centered()), inner);
}
