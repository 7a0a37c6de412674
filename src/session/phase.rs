use super::countdown::Countdown;
use crate::shared::Panel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipState {
    Waiting, // the clip's recording hasn't been finalised yet
    Playing,
}

/// Where the activity is. Indices point into the roster.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    NameEntry,
    Recording { student: usize, countdown: Countdown },
    Message { student: usize },
    Playback { cursor: usize, clip: ClipState },
    Idle { remaining: f64 }, // seconds until reset
}

impl Phase {
    pub fn panel(&self) -> Panel {
        match self {
            Phase::NameEntry => Panel::NameEntry,
            Phase::Recording { .. } => Panel::Recording,
            Phase::Message { .. } => Panel::Message,
            // the playback panel stays up until the reset
            Phase::Playback { .. } | Phase::Idle { .. } => Panel::Playback,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::NameEntry => "name entry",
            Phase::Recording { .. } => "recording",
            Phase::Message { .. } => "message",
            Phase::Playback { .. } => "playback",
            Phase::Idle { .. } => "idle",
        }
    }
}
