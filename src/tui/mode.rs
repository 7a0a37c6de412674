use std::time::{Duration, Instant};

use ratatui::layout::{Position, Rect};

use crate::shared::{Arrow, InputEvent, Panel, Slider};

// without release reporting, a held arrow counts as released once the
// terminal's auto-repeat has gone quiet for this long
const STALE_ARROW: Duration = Duration::from_millis(600);

/// Clickable regions from the last rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitAreas {
    pub pitch_slider: Option<Rect>,
    pub reverb_slider: Option<Rect>,
    pub submit_button: Option<Rect>,
    pub next_button: Option<Rect>,
}

impl HitAreas {
    // which slider was hit, and how far along it, unclamped
    pub fn slider_at(&self, column: u16, row: u16) -> Option<(Slider, f32)> {
        let pos = Position::new(column, row);
        [(Slider::Pitch, self.pitch_slider), (Slider::Reverb, self.reverb_slider)]
            .into_iter()
            .find_map(|(slider, rect)| {
                let rect = rect.filter(|r| r.contains(pos))?;
                let span = rect.width.saturating_sub(1).max(1) as f32;
                Some((slider, (column - rect.x) as f32 / span))
            })
    }

    pub fn hits(rect: Option<Rect>, column: u16, row: u16) -> bool {
        rect.is_some_and(|r| r.contains(Position::new(column, row)))
    }
}

// state local to the tui; the panel is synced from DisplayState every frame
#[derive(Clone, Debug)]
pub struct TuiState {
    pub panel: Panel,
    pub hits: HitAreas,
    // terminal reports key releases (kitty keyboard protocol)
    pub release_events: bool,
    arrows_seen: Vec<(Arrow, Instant)>,
}

impl TuiState {
    pub fn new(release_events: bool) -> Self {
        Self {
            panel: Panel::NameEntry,
            hits: HitAreas::default(),
            release_events,
            arrows_seen: Vec::new(),
        }
    }

    pub fn arrow_seen(&mut self, arrow: Arrow, now: Instant) {
        if self.release_events {
            return;
        }
        match self.arrows_seen.iter_mut().find(|(a, _)| *a == arrow) {
            Some((_, at)) => *at = now,
            None => self.arrows_seen.push((arrow, now)),
        }
    }

    pub fn arrow_released(&mut self, arrow: Arrow) {
        self.arrows_seen.retain(|(a, _)| *a != arrow);
    }

    // synthesize releases for arrows whose auto-repeat stopped
    pub fn expire_stale_arrows(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut released = Vec::new();
        self.arrows_seen.retain(|&(arrow, at)| {
            let stale = now.duration_since(at) >= STALE_ARROW;
            if stale {
                released.push(InputEvent::ArrowRelease(arrow));
            }
            !stale
        });
        released
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new(false)
    }
}
