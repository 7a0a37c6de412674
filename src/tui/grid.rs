use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::shared::{NUM_PADS, PAD_KEYS};

// one row of eight pads, labelled with their keys
pub fn draw_pad_row(frame: &mut Frame, area: Rect, pads_lit: &[bool; NUM_PADS]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, NUM_PADS as u32); NUM_PADS])
        .split(area);

    for (pad_idx, cell_area) in cols.iter().enumerate() {
        let style = if pads_lit[pad_idx] {
            Style::default()
                .fg(Color::LightMagenta)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let label = PAD_KEYS[pad_idx].to_ascii_uppercase().to_string();
        let pad = Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(style))
            .style(style);
        frame.render_widget(pad, *cell_area);
    }
}
