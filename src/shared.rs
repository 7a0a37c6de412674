// Types shared between the tui and the session controller.
//
// Input plan:
//   name entry   //  typed chars → NameChar, Backspace → NameBackspace, Enter → SubmitName
//   a s d f      //  PadDown(0..=3)
//   g h j k      //  PadDown(4..=7)
//   ↑ / ↓        //  ArrowPress/ArrowRelease(Up/Down), pitch while held
//   → / ←        //  ArrowPress/ArrowRelease(Right/Left), reverb while held
//   mouse        //  SliderClick on the pitch/reverb bars, buttons map to SubmitName/Acknowledge
//   Enter        //  Acknowledge on the message panel
//   Esc, Ctrl-C  //  Quit
//
// The tui never decides anything about the activity; it turns keys into these
// events, and each frame renders whatever `DisplayState` the session hands back.

pub const NUM_PADS: usize = 8;
pub const PAD_KEYS: [char; NUM_PADS] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k'];

pub fn pad_for_key(c: char) -> Option<u8> {
    PAD_KEYS
        .iter()
        .position(|&k| k == c.to_ascii_lowercase())
        .map(|i| i as u8)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slider {
    Pitch,
    Reverb,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // name entry
    NameChar(char),
    NameBackspace,
    SubmitName,

    // recording
    PadDown(u8), // index 0-7
    ArrowPress(Arrow),
    ArrowRelease(Arrow),
    SliderClick { slider: Slider, fraction: f32 }, // fraction of the bar width, unclamped

    // message panel
    Acknowledge,

    Quit,
}

/// Which panel the tui shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    NameEntry,
    Recording,
    Message,
    Playback,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub panel: Panel,
    pub name_draft: String,
    pub roster_len: usize,
    pub seconds_left: u32,
    pub pitch: f32,
    pub reverb_wet: f32,
    pub pitch_fraction: f32, // slider fill, 0.0-1.0
    pub reverb_fraction: f32,
    pub pads_lit: [bool; NUM_PADS],
    pub message_text: String,
    pub now_playing: String,
    pub spectrum: Vec<f32>, // dB per bin, only filled while recording
}
