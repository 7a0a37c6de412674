use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use super::mode::{HitAreas, TuiState};
use crate::shared::{Arrow, InputEvent, Panel, pad_for_key};

// poll for input from the terminal and resolve it into semantic input events
// for the current panel; drains everything already queued after the first wait
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    let mut events = ts.expire_stale_arrows(Instant::now());
    let mut wait = timeout;
    while event::poll(wait)? {
        match event::read()? {
            Event::Key(key) => events.extend(handle_key(key, ts, Instant::now())),
            Event::Mouse(mouse) => events.extend(handle_mouse(mouse, ts)),
            _ => {}
        }
        wait = Duration::ZERO;
    }
    Ok(events)
}

fn handle_key(key: KeyEvent, ts: &mut TuiState, now: Instant) -> Vec<InputEvent> {
    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    if key.kind != KeyEventKind::Release && (key.code == KeyCode::Esc || ctrl_c) {
        return vec![InputEvent::Quit];
    }

    if key.kind == KeyEventKind::Release {
        return match key_to_arrow(key.code) {
            Some(arrow) => {
                ts.arrow_released(arrow);
                vec![InputEvent::ArrowRelease(arrow)]
            }
            None => vec![],
        };
    }

    match ts.panel {
        Panel::NameEntry => match key.code {
            KeyCode::Enter => vec![InputEvent::SubmitName],
            KeyCode::Backspace => vec![InputEvent::NameBackspace],
            KeyCode::Char(c) if !c.is_control() => vec![InputEvent::NameChar(c)],
            _ => vec![],
        },
        Panel::Recording => {
            if let Some(arrow) = key_to_arrow(key.code) {
                ts.arrow_seen(arrow, now);
                return vec![InputEvent::ArrowPress(arrow)];
            }
            match key.code {
                KeyCode::Char(c) => pad_for_key(c).map(InputEvent::PadDown).into_iter().collect(),
                _ => vec![],
            }
        }
        Panel::Message => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => vec![InputEvent::Acknowledge],
            _ => vec![],
        },
        Panel::Playback => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent, ts: &TuiState) -> Vec<InputEvent> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        // dragging along a slider keeps setting it
        MouseEventKind::Drag(MouseButton::Left) if ts.panel == Panel::Recording => ts
            .hits
            .slider_at(col, row)
            .map(|(slider, fraction)| InputEvent::SliderClick { slider, fraction })
            .into_iter()
            .collect(),
        MouseEventKind::Down(MouseButton::Left) => match ts.panel {
            Panel::Recording => ts
                .hits
                .slider_at(col, row)
                .map(|(slider, fraction)| InputEvent::SliderClick { slider, fraction })
                .into_iter()
                .collect(),
            Panel::NameEntry if HitAreas::hits(ts.hits.submit_button, col, row) => {
                vec![InputEvent::SubmitName]
            }
            Panel::Message if HitAreas::hits(ts.hits.next_button, col, row) => {
                vec![InputEvent::Acknowledge]
            }
            _ => vec![],
        },
        _ => vec![],
    }
}

fn key_to_arrow(code: KeyCode) -> Option<Arrow> {
    match code {
        KeyCode::Up => Some(Arrow::Up),
        KeyCode::Down => Some(Arrow::Down),
        KeyCode::Left => Some(Arrow::Left),
        KeyCode::Right => Some(Arrow::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Slider;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(ts: &mut TuiState, code: KeyCode) -> Vec<InputEvent> {
        handle_key(key(code, KeyEventKind::Press), ts, Instant::now())
    }

    fn click(ts: &TuiState, column: u16, row: u16) -> Vec<InputEvent> {
        handle_mouse(
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
            ts,
        )
    }

    #[test]
    fn letters_type_names_during_name_entry() {
        let mut ts = TuiState::new(true);
        assert_eq!(press(&mut ts, KeyCode::Char('a')), vec![InputEvent::NameChar('a')]);
        assert_eq!(press(&mut ts, KeyCode::Enter), vec![InputEvent::SubmitName]);
        assert_eq!(press(&mut ts, KeyCode::Backspace), vec![InputEvent::NameBackspace]);
    }

    #[test]
    fn letters_hit_pads_while_recording() {
        let mut ts = TuiState::new(true);
        ts.panel = Panel::Recording;
        assert_eq!(press(&mut ts, KeyCode::Char('a')), vec![InputEvent::PadDown(0)]);
        assert_eq!(press(&mut ts, KeyCode::Char('k')), vec![InputEvent::PadDown(7)]);
        assert!(press(&mut ts, KeyCode::Char('z')).is_empty());
        assert_eq!(
            handle_key(key(KeyCode::Char('d'), KeyEventKind::Repeat), &mut ts, Instant::now()),
            vec![InputEvent::PadDown(2)]
        );
    }

    #[test]
    fn arrows_press_and_release() {
        let mut ts = TuiState::new(true);
        ts.panel = Panel::Recording;
        assert_eq!(press(&mut ts, KeyCode::Up), vec![InputEvent::ArrowPress(Arrow::Up)]);
        assert_eq!(
            handle_key(key(KeyCode::Up, KeyEventKind::Release), &mut ts, Instant::now()),
            vec![InputEvent::ArrowRelease(Arrow::Up)]
        );
    }

    #[test]
    fn release_is_reported_on_any_panel() {
        let mut ts = TuiState::new(true);
        ts.panel = Panel::Message;
        assert_eq!(
            handle_key(key(KeyCode::Left, KeyEventKind::Release), &mut ts, Instant::now()),
            vec![InputEvent::ArrowRelease(Arrow::Left)]
        );
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut ts = TuiState::new(true);
        assert_eq!(press(&mut ts, KeyCode::Esc), vec![InputEvent::Quit]);
        let mut ctrl_c = key(KeyCode::Char('c'), KeyEventKind::Press);
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(handle_key(ctrl_c, &mut ts, Instant::now()), vec![InputEvent::Quit]);
    }

    #[test]
    fn enter_acknowledges_the_message() {
        let mut ts = TuiState::new(true);
        ts.panel = Panel::Message;
        assert_eq!(press(&mut ts, KeyCode::Enter), vec![InputEvent::Acknowledge]);
    }

    #[test]
    fn clicks_resolve_against_rendered_areas() {
        let mut ts = TuiState::new(true);
        ts.hits = HitAreas {
            reverb_slider: Some(Rect::new(0, 2, 5, 1)),
            submit_button: Some(Rect::new(0, 8, 10, 1)),
            next_button: Some(Rect::new(0, 9, 10, 1)),
            ..HitAreas::default()
        };

        assert_eq!(click(&ts, 3, 8), vec![InputEvent::SubmitName]);
        assert!(click(&ts, 3, 9).is_empty());

        ts.panel = Panel::Recording;
        assert_eq!(
            click(&ts, 4, 2),
            vec![InputEvent::SliderClick { slider: Slider::Reverb, fraction: 1.0 }]
        );

        ts.panel = Panel::Message;
        assert_eq!(click(&ts, 3, 9), vec![InputEvent::Acknowledge]);
    }
}
