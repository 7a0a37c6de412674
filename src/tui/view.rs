use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};
use ratatui::Frame;

use super::grid::draw_pad_row;
use super::mode::HitAreas;
use super::spectrum::Spectrum;
use crate::shared::{DisplayState, Panel};

const ACCENT: Color = Color::Rgb(76, 175, 80);

// draws one frame and reports where the clickable parts ended up
pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) -> HitAreas {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title bar
            Constraint::Min(10),   // active panel
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_title(frame, sections[0], state);
    let hits = match state.panel {
        Panel::NameEntry => draw_name_entry(frame, sections[1], state, blink_on),
        Panel::Recording => draw_recording(frame, sections[1], state),
        Panel::Message => draw_message(frame, sections[1], state),
        Panel::Playback => draw_playback(frame, sections[1], state),
    };
    draw_help(frame, sections[2], state.panel);
    hits
}

fn draw_title(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let title = Line::from(vec![
        Span::styled("beatcircle", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("   students this round: {}", state.roster_len)),
    ]);
    frame.render_widget(Paragraph::new(title).block(Block::bordered()), area);
}

fn draw_name_entry(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) -> HitAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let cursor = if blink_on { "_" } else { " " };
    let input = Paragraph::new(format!("{}{}", state.name_draft, cursor))
        .block(Block::bordered().title(" Enter your name "));
    frame.render_widget(input, rows[0]);

    let submit = button_area(rows[1], "[ Submit ]");
    frame.render_widget(button("[ Submit ]"), submit);

    HitAreas {
        submit_button: Some(submit),
        ..HitAreas::default()
    }
}

fn draw_recording(frame: &mut Frame, area: Rect, state: &DisplayState) -> HitAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // countdown
            Constraint::Length(3), // pads
            Constraint::Length(3), // pitch
            Constraint::Length(3), // reverb
            Constraint::Min(4),    // spectrum
        ])
        .split(area);

    let countdown = Paragraph::new(format!("Time remaining: {}s", state.seconds_left))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(countdown, rows[0]);

    draw_pad_row(frame, rows[1], &state.pads_lit);

    let pitch = slider(" Pitch ↑↓ ", state.pitch, state.pitch_fraction);
    frame.render_widget(pitch, rows[2]);
    let reverb = slider(" Reverb ←→ ", state.reverb_wet, state.reverb_fraction);
    frame.render_widget(reverb, rows[3]);

    let block = Block::bordered().title(" Spectrum ");
    let inner = block.inner(rows[4]);
    frame.render_widget(block, rows[4]);
    frame.render_widget(Spectrum::new(&state.spectrum), inner);

    // clicks count on the bar itself, not its border
    HitAreas {
        pitch_slider: Some(Block::bordered().inner(rows[2])),
        reverb_slider: Some(Block::bordered().inner(rows[3])),
        ..HitAreas::default()
    }
}

fn draw_message(frame: &mut Frame, area: Rect, state: &DisplayState) -> HitAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let text = Paragraph::new(state.message_text.as_str())
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(text, rows[0]);

    let next = button_area(rows[1], "[ Next ]");
    frame.render_widget(button("[ Next ]"), next);

    HitAreas {
        next_button: Some(next),
        ..HitAreas::default()
    }
}

fn draw_playback(frame: &mut Frame, area: Rect, state: &DisplayState) -> HitAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let now_playing = Paragraph::new(state.now_playing.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .block(Block::bordered().title(" Playback "));
    frame.render_widget(now_playing, rows[0]);
    HitAreas::default()
}

fn draw_help(frame: &mut Frame, area: Rect, panel: Panel) {
    let help = match panel {
        Panel::NameEntry => "type a name, Enter to start · Esc quits",
        Panel::Recording => "A S D F G H J K play · ↑↓ pitch · ←→ reverb · click the bars",
        Panel::Message => "Enter for the next student · Esc quits",
        Panel::Playback => "listening… · Esc quits",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn slider(title: &str, value: f32, fraction: f32) -> Gauge<'_> {
    Gauge::default()
        .block(Block::bordered().title(title))
        .gauge_style(Style::default().fg(ACCENT).bg(Color::Gray))
        .ratio(fraction.clamp(0.0, 1.0) as f64)
        .label(format!("{:.2}", value))
}

fn button(label: &str) -> Paragraph<'_> {
    Paragraph::new(label).style(Style::default().fg(Color::Black).bg(ACCENT))
}

// a label-sized rect centered in `row`
fn button_area(row: Rect, label: &str) -> Rect {
    let width = (label.chars().count() as u16).min(row.width);
    Rect {
        x: row.x + (row.width - width) / 2,
        width,
        ..row
    }
}
