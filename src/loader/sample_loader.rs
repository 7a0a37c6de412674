use std::path::Path;

use crate::audio::{SampleBuffer, SampleId};
use crate::audio_api::AudioCommand;
use crate::config::Config;
use crate::shared::NUM_PADS;

// Load a WAV from disk, prepare for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<(SampleId, SampleBuffer)> {
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    Ok((SampleId::next(), buffer))
}

/// Which engine sample each pad and the background loop play. `None` = silent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoundBank {
    pub pads: [Option<SampleId>; NUM_PADS],
    pub background: Option<SampleId>,
}

impl SoundBank {
    pub fn loaded_pads(&self) -> usize {
        self.pads.iter().filter(|p| p.is_some()).count()
    }
}

// Load every configured sound. Failures are logged and leave that slot silent;
// the returned commands register whatever did load.
pub fn load_bank(config: &Config, target_rate: u32) -> (SoundBank, Vec<AudioCommand>) {
    let mut bank = SoundBank::default();
    let mut cmds = Vec::new();

    let mut load_one = |path: &Path| match load(path, target_rate) {
        Ok((id, buffer)) => {
            cmds.push(AudioCommand::RegisterSample { id, buffer });
            Some(id)
        }
        Err(e) => {
            log::warn!("sound {:?} not loaded: {:#}", path, e);
            None
        }
    };

    for (pad, slot) in bank.pads.iter_mut().enumerate() {
        *slot = config.pad_path(pad).and_then(|p| load_one(&p));
    }
    bank.background = config.background_path().and_then(|p| load_one(&p));

    log::info!(
        "loaded {}/{} pad samples from {:?}, background loop {}",
        bank.loaded_pads(),
        NUM_PADS,
        config.sound_dir,
        if bank.background.is_some() { "on" } else { "off" }
    );
    (bank, cmds)
}
