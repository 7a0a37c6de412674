pub use crate::audio::{ClipId, SampleBuffer, SampleId};

#[derive(Clone, Debug, PartialEq)]
pub struct TriggerParams {
    pub sample_id: SampleId,
    pub pitch: f32, // playback rate, 1.0 = as recorded
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    // The engine can't load files (interrupts thread), so buffers are loaded
    // on the ui side (see sample_loader.rs) and registered here by id
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // one-shot pad hit, routed through the reverb bus
    Trigger(TriggerParams),

    // background bed, dry into the master
    StartLoop { sample_id: SampleId },
    StopLoop,

    SetReverbWet(f32),

    // record the master mix; stopping hands the buffer back as an EngineEvent
    StartCapture,
    StopCapture,

    // finished recordings bypass the master so they are never re-captured
    PlayClip { clip: ClipId, buffer: SampleBuffer },
}

// Engine → ui, drained once per frame
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    CaptureFinished(SampleBuffer),
    ClipEnded(ClipId),
}
