use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::audio::MIN_DB;

// bar heights are worked out on a canvas this tall, then scaled to the widget
const CANVAS_HEIGHT: f32 = 200.0;

/// Height (0.0-1.0 of the widget) and colour of one bar for a bin magnitude in dB.
pub fn bar_level(db: f32) -> (f32, Color) {
    let height = ((db - MIN_DB) * 1.5).clamp(0.0, CANVAS_HEIGHT);
    let red = (height + 50.0).min(255.0) as u8;
    (height / CANVAS_HEIGHT, Color::Rgb(red, 50, 200))
}

pub struct Spectrum<'a> {
    values: &'a [f32],
}

impl<'a> Spectrum<'a> {
    pub fn new(values: &'a [f32]) -> Self {
        Self { values }
    }
}

impl Widget for Spectrum<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bins = self.values.len();
        if area.is_empty() || bins == 0 {
            return;
        }
        let width = area.width as usize;
        let bar_width = (width / bins).max(1);

        for x in 0..width {
            // leave a one-column gap between bars when there is room
            if bar_width > 1 && x % bar_width == bar_width - 1 {
                continue;
            }
            let bin = (x * bins / width).min(bins - 1);
            let (level, color) = bar_level(self.values[bin]);
            let filled = (level * area.height as f32).round() as u16;
            for dy in 0..filled.min(area.height) {
                let pos = (area.x + x as u16, area.bottom() - 1 - dy);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_symbol("█").set_fg(color);
                }
            }
        }
    }
}
