//! Activity configuration.
//!
//! Stored as JSON in the user's config directory.
//! Default location: ~/.config/beatcircle/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::NUM_PADS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the pad samples and the background loop
    pub sound_dir: PathBuf,
    /// One WAV file name per pad, in key order a s d f g h j k
    pub pad_samples: [String; NUM_PADS],
    /// Looped under every recording; empty disables the loop
    pub background_loop: String,
    /// Length of each student's turn
    pub countdown_secs: u32,
    /// Roster size at which the round moves on to playback
    pub min_students_for_playback: usize,
    /// Pause after the last clip before the activity resets
    pub reset_delay_ms: u64,
    /// Cadence of held arrow-key adjustments
    pub repeat_interval_ms: u64,
    /// Amount each held-arrow tick moves pitch or reverb
    pub adjust_step: f32,
    pub initial_pitch: f32,
    pub initial_reverb_wet: f32,
    pub reverb_room_size: f32,
    pub loop_gain: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sound_dir: PathBuf::from("sound"),
            pad_samples: [
                "soundOne.wav",
                "soundTwo.wav",
                "soundThree.wav",
                "soundFour.wav",
                "soundFive.wav",
                "soundSix.wav",
                "soundSeven.wav",
                "soundEight.wav",
            ]
            .map(String::from),
            background_loop: String::from("backGround.wav"),
            countdown_secs: 15,
            min_students_for_playback: 2,
            reset_delay_ms: 1000,
            repeat_interval_ms: 50,
            adjust_step: 0.01,
            initial_pitch: 1.0,
            initial_reverb_wet: 0.5,
            reverb_room_size: 0.7,
            loop_gain: 0.5,
        }
    }
}

impl Config {
    pub fn pad_path(&self, pad: usize) -> Option<PathBuf> {
        self.pad_samples
            .get(pad)
            .filter(|name| !name.is_empty())
            .map(|name| self.sound_dir.join(name))
    }

    pub fn background_path(&self) -> Option<PathBuf> {
        if self.background_loop.is_empty() {
            None
        } else {
            Some(self.sound_dir.join(&self.background_loop))
        }
    }
}

/// ~/.config/beatcircle/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("beatcircle")
        .join("config.json")
}

/// Load configuration from a JSON file.
///
/// A missing file gives the defaults. An unreadable or invalid file logs a
/// warning and also gives the defaults.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Config>(&contents) {
            Ok(config) => {
                log::info!("load_config: loaded {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("load_config: failed to parse {:?}: {}, using defaults", path, e);
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: failed to read {:?}: {}, using defaults", path, e);
            Config::default()
        }
    }
}
