use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, EngineEvent, TriggerParams};

use super::analyser::SpectrumTap;
use super::frame::StereoFrame;
use super::ids::{ClipId, SampleId};
use super::reverb::Reverb;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so triggering never allocates
const PAD_GAIN: f32 = 0.8;

#[derive(Clone, Copy, Debug)]
pub struct EngineSettings {
    pub reverb_room_size: f32,
    pub reverb_wet: f32,
    pub loop_gain: f32,
    // capture space reserved up front so a whole turn never reallocates
    pub capture_reserve_secs: u32,
}

struct PlayingClip {
    id: ClipId,
    voice: Voice,
    buffer: SampleBuffer,
}

pub struct Engine {
    sample_rate: u32,
    samples: HashMap<SampleId, SampleBuffer>,
    voices: [Voice; MAX_VOICES], // fixed pool of one-shots
    triggered: u64,
    loop_voice: Option<Voice>,
    loop_gain: f32,
    capture_reserve_secs: u32,
    clip: Option<PlayingClip>,
    reverb: Reverb,
    capture: Option<Vec<StereoFrame>>,
    bus: Vec<StereoFrame>, // scratch for the reverb send
    tap: Option<SpectrumTap>,
    events_tx: Option<Sender<EngineEvent>>,
    dropped_events: Arc<AtomicU64>,
}

impl Engine {
    pub fn new(sample_rate: u32, settings: EngineSettings) -> Self {
        Self {
            sample_rate,
            samples: HashMap::new(),
            voices: [Voice::idle(); MAX_VOICES],
            triggered: 0,
            loop_voice: None,
            loop_gain: settings.loop_gain,
            capture_reserve_secs: settings.capture_reserve_secs,
            clip: None,
            reverb: Reverb::new(sample_rate, settings.reverb_room_size, settings.reverb_wet),
            capture: None,
            bus: Vec::with_capacity(4096),
            tap: None,
            events_tx: None,
            dropped_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set_spectrum_tap(&mut self, tap: SpectrumTap) {
        self.tap = Some(tap);
    }

    pub fn set_events_tx(&mut self, tx: Sender<EngineEvent>) {
        self.events_tx = Some(tx);
    }

    /// Count of events the ui never received because the queue was full.
    pub fn dropped_events(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped_events)
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Trigger(t) => self.trigger_voice(t),
            AudioCommand::StartLoop { sample_id } => {
                if self.samples.contains_key(&sample_id) {
                    self.loop_voice = Some(Voice::looped(sample_id, self.loop_gain));
                }
            }
            AudioCommand::StopLoop => self.loop_voice = None,
            AudioCommand::SetReverbWet(wet) => self.reverb.set_wet(wet),
            AudioCommand::StartCapture => {
                // a second start discards whatever was being captured
                self.capture = Some(Vec::with_capacity(
                    self.sample_rate as usize * self.capture_reserve_secs as usize,
                ));
            }
            AudioCommand::StopCapture => {
                if let Some(frames) = self.capture.take() {
                    self.emit(EngineEvent::CaptureFinished(SampleBuffer::from_frames(frames)));
                }
            }
            AudioCommand::PlayClip { clip, buffer } => {
                if buffer.is_empty() {
                    self.clip = None;
                    self.emit(EngineEvent::ClipEnded(clip));
                } else {
                    self.clip = Some(PlayingClip {
                        id: clip,
                        voice: Voice::one_shot(SampleId(u64::MAX), 1.0, 1.0, 0),
                        buffer,
                    });
                }
            }
        }
    }

    fn trigger_voice(&mut self, t: TriggerParams) {
        if !self.samples.contains_key(&t.sample_id) {
            return;
        }
        // free slot first, otherwise steal the oldest
        let slot = self
            .voices
            .iter()
            .position(|v| !v.active)
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.started)
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);

        self.triggered += 1;
        self.voices[slot] = Voice::one_shot(t.sample_id, t.pitch, PAD_GAIN, self.triggered);
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    #[cfg(test)]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        let n = out.len();
        if self.bus.len() < n {
            self.bus.resize(n, StereoFrame::zero());
        }
        let bus = &mut self.bus[..n];
        bus.fill(StereoFrame::zero());

        // pads → reverb
        for voice in self.voices.iter_mut().filter(|v| v.active) {
            match self.samples.get(&voice.sample_id) {
                Some(buffer) => voice.render_into(buffer, bus),
                None => voice.active = false,
            }
        }
        self.reverb.process_block(bus);
        if let Some(tap) = &self.tap {
            tap.push(bus);
        }

        // reverb + loop → master
        out.copy_from_slice(bus);
        if let Some(voice) = &mut self.loop_voice {
            match self.samples.get(&voice.sample_id) {
                Some(buffer) => voice.render_into(buffer, out),
                None => voice.active = false,
            }
        }

        // master → capture
        if let Some(capture) = &mut self.capture {
            capture.extend_from_slice(out);
        }

        // clips go straight to the device
        let mut ended = None;
        if let Some(clip) = &mut self.clip {
            clip.voice.render_into(&clip.buffer, out);
            if !clip.voice.active {
                ended = Some(clip.id);
            }
        }
        if let Some(id) = ended {
            self.clip = None;
            self.emit(EngineEvent::ClipEnded(id));
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.events_tx {
            if tx.try_send(event).is_err() {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
