use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, EngineEvent};
use engine::Engine;

mod analyser;
mod engine;
mod error;
mod frame;
mod ids;
mod reverb;
mod sample_buffer;
mod voice;

use analyser::{Analyser, SpectrumTap};
pub use analyser::{MIN_DB, NUM_BINS};
pub use engine::EngineSettings;
pub use error::AudioError;
pub use frame::StereoFrame;
pub use ids::{ClipId, SampleId};
pub use sample_buffer::SampleBuffer;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    events_rx: Receiver<EngineEvent>,
    analyser: Analyser,
    sample_rate: u32,
    dropped_events: Arc<AtomicU64>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    pub fn poll_event(&self) -> Option<EngineEvent> {
        self.events_rx.try_recv().ok()
    }

    pub fn spectrum(&mut self) -> Vec<f32> {
        self.analyser.spectrum()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // engine events lost to a full queue since startup
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

pub fn start_audio(settings: EngineSettings) -> Result<AudioHandle, AudioError> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (events_tx, events_rx) = crossbeam_channel::bounded::<EngineEvent>(16);

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
    let supported = device.default_output_config()?;

    let format = supported.sample_format();
    if format != cpal::SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(format));
    }
    let sample_rate: u32 = supported.sample_rate();
    let config: cpal::StreamConfig = supported.into();
    log::info!(
        "audio output: {} Hz, {} channels",
        sample_rate,
        config.channels
    );

    let tap = SpectrumTap::new();
    let mut engine = Engine::new(sample_rate, settings);
    engine.set_spectrum_tap(tap.clone());
    engine.set_events_tx(events_tx);
    let dropped_events = engine.dropped_events();

    let output_stream = build_output_stream_f32(&device, &config, rx, engine)?;
    output_stream.play()?;

    Ok(AudioHandle {
        tx,
        events_rx,
        analyser: Analyser::new(tap),
        sample_rate,
        dropped_events,
        _output_stream: output_stream,
    })
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
) -> Result<cpal::Stream, AudioError> {
    let channels = config.channels as usize;
    let mut scratch: Vec<StereoFrame> = Vec::with_capacity(4096);

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            // spread the stereo mix across however many channels the device has
            for (out, frame) in data.chunks_exact_mut(channels.max(1)).zip(scratch.iter()) {
                match out {
                    [mono] => *mono = frame.mono(),
                    [left, right, rest @ ..] => {
                        *left = frame.left;
                        *right = frame.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
