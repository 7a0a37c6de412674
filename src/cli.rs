//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, Config};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "beatcircle")]
#[command(about = "Take turns recording a beat, then hear everyone's back to back", long_about = None)]
pub struct Args {
    /// Directory holding the pad samples and the background loop
    #[arg(long, value_name = "DIR")]
    pub sounds: Option<PathBuf>,

    /// Config file (default: ~/.config/beatcircle/config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Length of each student's turn
    #[arg(long, value_name = "SECONDS")]
    pub countdown: Option<u32>,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_config_path)
    }

    /// Flags given on the command line win over the config file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.sounds {
            config.sound_dir = dir.clone();
        }
        if let Some(secs) = self.countdown {
            config.countdown_secs = secs.max(1);
        }
    }
}
