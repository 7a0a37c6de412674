//! The turn-taking controller.
//!
//! `Session` owns all activity state. Every handler returns the
//! `AudioCommand`s the caller must forward to the engine; the session itself
//! never touches audio.

mod controls;
mod countdown;
mod phase;
mod roster;

use std::collections::VecDeque;

use crate::audio_api::{AudioCommand, ClipId, EngineEvent, SampleBuffer, TriggerParams};
use crate::config::Config;
use crate::loader::sample_loader::SoundBank;
use crate::shared::{DisplayState, InputEvent, NUM_PADS, Slider};

pub use controls::Controls;
use controls::{HeldArrows, Param, RepeatClock};
use countdown::Countdown;
pub use phase::{ClipState, Phase};
pub use roster::Roster;

const PAD_FLASH_SECS: f32 = 0.15;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub countdown_secs: u32,
    pub min_students_for_playback: usize,
    pub reset_delay_secs: f64,
    pub repeat_interval_secs: f64,
    pub adjust_step: f32,
    pub initial_pitch: f32,
    pub initial_reverb_wet: f32,
}

impl From<&Config> for SessionSettings {
    fn from(c: &Config) -> Self {
        Self {
            countdown_secs: c.countdown_secs,
            min_students_for_playback: c.min_students_for_playback,
            reset_delay_secs: c.reset_delay_ms as f64 / 1000.0,
            repeat_interval_secs: c.repeat_interval_ms as f64 / 1000.0,
            adjust_step: c.adjust_step,
            initial_pitch: c.initial_pitch,
            initial_reverb_wet: c.initial_reverb_wet,
        }
    }
}

pub struct Session {
    settings: SessionSettings,
    bank: SoundBank,
    phase: Phase,
    roster: Roster,
    controls: Controls,
    held: HeldArrows,
    repeat: RepeatClock,
    name_draft: String,
    // set by the first student of the session and never cleared
    loop_started: bool,
    // students whose capture was stopped but not yet handed back, oldest first
    pending_captures: VecDeque<usize>,
    pad_flash: [f32; NUM_PADS],
}

impl Session {
    pub fn new(settings: SessionSettings, bank: SoundBank) -> Self {
        Self {
            controls: Controls::new(settings.initial_pitch, settings.initial_reverb_wet),
            repeat: RepeatClock::new(settings.repeat_interval_secs),
            settings,
            bank,
            phase: Phase::NameEntry,
            roster: Roster::default(),
            held: HeldArrows::default(),
            name_draft: String::new(),
            loop_started: false,
            pending_captures: VecDeque::new(),
            pad_flash: [0.0; NUM_PADS],
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[cfg(test)]
    pub fn controls(&self) -> Controls {
        self.controls
    }

    // 1-based, equal to the roster length while a turn is running
    pub fn current_student_number(&self) -> Option<usize> {
        match self.phase {
            Phase::Recording { student, .. } => Some(student + 1),
            _ => None,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        let recording = matches!(self.phase, Phase::Recording { .. });
        match event {
            InputEvent::NameChar(c) if self.phase == Phase::NameEntry => {
                self.name_draft.push(c);
                vec![]
            }
            InputEvent::NameBackspace if self.phase == Phase::NameEntry => {
                self.name_draft.pop();
                vec![]
            }
            InputEvent::SubmitName => self.submit_name(),
            InputEvent::PadDown(pad) if recording => self.trigger_pad(pad),
            InputEvent::ArrowPress(arrow) if recording => {
                let was_idle = self.held.is_empty();
                if self.held.press(arrow) && was_idle {
                    self.repeat.reset();
                }
                vec![]
            }
            // releases always count, even after the turn ended
            InputEvent::ArrowRelease(arrow) => {
                self.held.release(arrow);
                vec![]
            }
            InputEvent::SliderClick { slider, fraction } if recording => {
                self.click_slider(slider, fraction)
            }
            InputEvent::Acknowledge => self.acknowledge(),
            InputEvent::Quit => vec![],
            other => {
                log::debug!("ignoring {:?} during {}", other, self.phase.label());
                vec![]
            }
        }
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Vec<AudioCommand> {
        match event {
            EngineEvent::CaptureFinished(buffer) => self.capture_finished(buffer),
            EngineEvent::ClipEnded(clip) => self.clip_ended(clip),
        }
    }

    /// Advance timers by `dt` seconds: pad flashes, held-arrow repeats,
    /// the turn countdown and the post-playback reset delay.
    pub fn tick(&mut self, dt: f64) -> Vec<AudioCommand> {
        for flash in &mut self.pad_flash {
            *flash = (*flash - dt as f32).max(0.0);
        }

        match &mut self.phase {
            Phase::Recording { student, countdown } => {
                let (student, expired) = (*student, countdown.advance(dt));
                let mut cmds = self.apply_held(dt);
                if expired {
                    cmds.extend(self.finish_turn(student));
                }
                cmds
            }
            Phase::Idle { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.reset();
                }
                vec![]
            }
            _ => vec![],
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let (seconds_left, message_text, now_playing) = match &self.phase {
            Phase::Recording { countdown, .. } => (countdown.remaining(), String::new(), String::new()),
            Phase::Message { student } => (
                0,
                format!("{} has added their sounds.", self.roster.name(*student)),
                String::new(),
            ),
            Phase::Playback { cursor, .. } => (
                0,
                String::new(),
                format!("Now Playing: {}", self.roster.name(*cursor)),
            ),
            Phase::Idle { .. } => (
                0,
                String::new(),
                format!("Now Playing: {}", self.roster.name(self.roster.len().saturating_sub(1))),
            ),
            Phase::NameEntry => (0, String::new(), String::new()),
        };

        DisplayState {
            panel: self.phase.panel(),
            name_draft: self.name_draft.clone(),
            roster_len: self.roster.len(),
            seconds_left,
            pitch: self.controls.pitch,
            reverb_wet: self.controls.reverb_wet,
            pitch_fraction: self.controls.pitch_fraction(),
            reverb_fraction: self.controls.reverb_fraction(),
            pads_lit: self.pad_flash.map(|f| f > 0.0),
            message_text,
            now_playing,
            spectrum: Vec::new(),
        }
    }

    fn submit_name(&mut self) -> Vec<AudioCommand> {
        if self.phase != Phase::NameEntry {
            return vec![];
        }
        let name = self.name_draft.trim();
        if name.is_empty() {
            return vec![];
        }
        let name = name.to_string();
        self.name_draft.clear();

        let student = self.roster.push(name);
        let mut cmds = Vec::new();
        if !self.loop_started {
            if let Some(sample_id) = self.bank.background {
                cmds.push(AudioCommand::StartLoop { sample_id });
            }
            self.loop_started = true;
        }
        cmds.push(AudioCommand::StartCapture);

        log::info!(
            "student {} ({}) recording for {}s",
            student + 1,
            self.roster.name(student),
            self.settings.countdown_secs
        );
        self.phase = Phase::Recording {
            student,
            countdown: Countdown::new(self.settings.countdown_secs),
        };
        cmds
    }

    fn trigger_pad(&mut self, pad: u8) -> Vec<AudioCommand> {
        let Some(slot) = self.bank.pads.get(pad as usize) else {
            return vec![];
        };
        self.pad_flash[pad as usize] = PAD_FLASH_SECS;
        match slot {
            Some(sample_id) => vec![AudioCommand::Trigger(TriggerParams {
                sample_id: *sample_id,
                pitch: self.controls.pitch,
            })],
            None => vec![],
        }
    }

    fn click_slider(&mut self, slider: Slider, fraction: f32) -> Vec<AudioCommand> {
        match self.controls.set_from_slider(slider, fraction) {
            Some(Param::Reverb) => vec![AudioCommand::SetReverbWet(self.controls.reverb_wet)],
            _ => vec![],
        }
    }

    fn apply_held(&mut self, dt: f64) -> Vec<AudioCommand> {
        if self.held.is_empty() {
            return vec![];
        }
        let ticks = self.repeat.advance(dt);
        let mut reverb_changed = false;
        for _ in 0..ticks {
            for arrow in self.held.iter() {
                if self.controls.nudge(arrow, self.settings.adjust_step) == Param::Reverb {
                    reverb_changed = true;
                }
            }
        }
        if reverb_changed {
            vec![AudioCommand::SetReverbWet(self.controls.reverb_wet)]
        } else {
            vec![]
        }
    }

    fn finish_turn(&mut self, student: usize) -> Vec<AudioCommand> {
        log::info!("student {} ({}) finished", student + 1, self.roster.name(student));
        self.held.clear();
        self.pending_captures.push_back(student);
        self.phase = Phase::Message { student };
        vec![AudioCommand::StopCapture]
    }

    fn acknowledge(&mut self) -> Vec<AudioCommand> {
        if !matches!(self.phase, Phase::Message { .. }) {
            return vec![];
        }
        if self.roster.len() < self.settings.min_students_for_playback {
            self.phase = Phase::NameEntry;
            return vec![];
        }

        log::info!("playing back {} recordings", self.roster.len());
        self.phase = Phase::Playback {
            cursor: 0,
            clip: ClipState::Waiting,
        };
        let mut cmds = vec![AudioCommand::StopLoop];
        cmds.extend(self.start_clip());
        cmds
    }

    // start the clip under the cursor if its recording has arrived
    fn start_clip(&mut self) -> Vec<AudioCommand> {
        let Phase::Playback { cursor, clip } = &mut self.phase else {
            return vec![];
        };
        if *clip == ClipState::Playing {
            return vec![];
        }
        let cursor = *cursor;
        if cursor >= self.roster.len() {
            self.phase = Phase::Idle {
                remaining: self.settings.reset_delay_secs,
            };
            return vec![];
        }
        match self.roster.get(cursor).and_then(|s| s.recording.as_ref()) {
            Some(buffer) => {
                *clip = ClipState::Playing;
                log::info!("now playing {}", self.roster.name(cursor));
                vec![AudioCommand::PlayClip {
                    clip: ClipId(cursor),
                    buffer: buffer.clone(),
                }]
            }
            None => {
                log::debug!("waiting for {}'s recording", self.roster.name(cursor));
                vec![]
            }
        }
    }

    fn capture_finished(&mut self, buffer: SampleBuffer) -> Vec<AudioCommand> {
        let Some(student) = self.pending_captures.pop_front() else {
            log::warn!("finished capture arrived with no turn waiting for it");
            return vec![];
        };
        if !self.roster.attach_recording(student, buffer) {
            log::warn!("could not attach recording to student {}", student + 1);
        }
        self.start_clip()
    }

    fn clip_ended(&mut self, ended: ClipId) -> Vec<AudioCommand> {
        let current = matches!(
            self.phase,
            Phase::Playback { cursor, clip: ClipState::Playing } if cursor == ended.0
        );
        if !current {
            log::debug!("stale clip end {:?} during {}", ended, self.phase.label());
            return vec![];
        }
        if let Phase::Playback { cursor, clip } = &mut self.phase {
            *cursor += 1;
            *clip = ClipState::Waiting;
        }
        self.start_clip()
    }

    fn reset(&mut self) {
        log::info!("round over, resetting");
        self.roster.clear();
        self.pending_captures.clear();
        self.held.clear();
        self.phase = Phase::NameEntry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SampleId, StereoFrame};
    use crate::shared::{Arrow, Panel};

    const BG: SampleId = SampleId(900);

    fn bank() -> SoundBank {
        SoundBank {
            pads: std::array::from_fn(|i| Some(SampleId(100 + i as u64))),
            background: Some(BG),
        }
    }

    fn session() -> Session {
        Session::new(SessionSettings::from(&Config::default()), bank())
    }

    fn type_name(s: &mut Session, name: &str) -> Vec<AudioCommand> {
        for c in name.chars() {
            s.handle_input(InputEvent::NameChar(c));
        }
        s.handle_input(InputEvent::SubmitName)
    }

    fn run_countdown(s: &mut Session) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        for _ in 0..15 {
            cmds.extend(s.tick(1.0));
        }
        cmds
    }

    fn take(s: &mut Session, value: f32) -> Vec<AudioCommand> {
        let buf = SampleBuffer::from_frames(vec![StereoFrame::splat(value); 8]);
        s.handle_engine_event(EngineEvent::CaptureFinished(buf))
    }

    fn clips(cmds: &[AudioCommand]) -> Vec<usize> {
        cmds.iter()
            .filter_map(|c| match c {
                AudioCommand::PlayClip { clip, .. } => Some(clip.0),
                _ => None,
            })
            .collect()
    }

    // one full turn: name, countdown, finalised capture
    fn full_turn(s: &mut Session, name: &str) {
        type_name(s, name);
        run_countdown(s);
        take(s, 0.1);
    }

    #[test]
    fn submit_starts_loop_capture_and_countdown() {
        let mut s = session();
        let cmds = type_name(&mut s, "  Ava ");
        assert_eq!(
            cmds,
            vec![AudioCommand::StartLoop { sample_id: BG }, AudioCommand::StartCapture]
        );
        assert_eq!(s.roster().name(0), "Ava");
        assert_eq!(s.current_student_number(), Some(s.roster().len()));
        let ds = s.display_state();
        assert_eq!(ds.panel, Panel::Recording);
        assert_eq!(ds.seconds_left, 15);
        assert!(ds.name_draft.is_empty());
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut s = session();
        assert!(type_name(&mut s, "").is_empty());
        assert!(type_name(&mut s, "   \t").is_empty());
        assert!(s.roster().is_empty());
        assert_eq!(s.phase(), &Phase::NameEntry);
    }

    #[test]
    fn backspace_edits_the_draft() {
        let mut s = session();
        for c in "Avx".chars() {
            s.handle_input(InputEvent::NameChar(c));
        }
        s.handle_input(InputEvent::NameBackspace);
        s.handle_input(InputEvent::NameChar('a'));
        assert_eq!(s.display_state().name_draft, "Ava");
    }

    #[test]
    fn loop_starts_once_per_round() {
        let mut s = session();
        full_turn(&mut s, "Ava");
        s.handle_input(InputEvent::Acknowledge);
        let cmds = type_name(&mut s, "Ben");
        assert_eq!(cmds, vec![AudioCommand::StartCapture]);
    }

    #[test]
    fn one_student_returns_to_name_entry() {
        let mut s = session();
        type_name(&mut s, "Ava");
        let cmds = run_countdown(&mut s);
        assert!(cmds.contains(&AudioCommand::StopCapture));

        let ds = s.display_state();
        assert_eq!(ds.panel, Panel::Message);
        assert_eq!(ds.message_text, "Ava has added their sounds.");

        let cmds = s.handle_input(InputEvent::Acknowledge);
        assert!(cmds.is_empty());
        assert_eq!(s.phase(), &Phase::NameEntry);
        assert_eq!(s.roster().len(), 1);
    }

    #[test]
    fn two_students_go_to_playback_in_order() {
        let mut s = session();
        full_turn(&mut s, "Ava");
        s.handle_input(InputEvent::Acknowledge);

        type_name(&mut s, "Ben");
        run_countdown(&mut s);
        assert_eq!(s.display_state().message_text, "Ben has added their sounds.");

        // Ben's capture hasn't been finalised yet, but Ava's has
        let cmds = s.handle_input(InputEvent::Acknowledge);
        assert_eq!(cmds[0], AudioCommand::StopLoop);
        assert_eq!(clips(&cmds), vec![0]);
        assert_eq!(s.display_state().panel, Panel::Playback);
        assert_eq!(s.display_state().now_playing, "Now Playing: Ava");

        // nothing overlaps: Ben's arrival doesn't start him while Ava plays
        assert!(clips(&take(&mut s, 0.2)).is_empty());

        let cmds = s.handle_engine_event(EngineEvent::ClipEnded(ClipId(0)));
        assert_eq!(clips(&cmds), vec![1]);
        assert_eq!(s.display_state().now_playing, "Now Playing: Ben");

        let cmds = s.handle_engine_event(EngineEvent::ClipEnded(ClipId(1)));
        assert!(cmds.is_empty());
        assert!(matches!(s.phase(), Phase::Idle { .. }));
        assert_eq!(s.display_state().panel, Panel::Playback);

        s.tick(0.5);
        assert!(matches!(s.phase(), Phase::Idle { .. }));
        s.tick(0.6);
        assert_eq!(s.phase(), &Phase::NameEntry);
        assert!(s.roster().is_empty());
    }

    #[test]
    fn playback_waits_for_a_late_recording() {
        let mut s = session();
        type_name(&mut s, "Ava");
        run_countdown(&mut s);
        s.handle_input(InputEvent::Acknowledge);
        type_name(&mut s, "Ben");
        run_countdown(&mut s);

        let cmds = s.handle_input(InputEvent::Acknowledge);
        assert!(clips(&cmds).is_empty());
        assert_eq!(s.display_state().now_playing, "Now Playing: Ava");

        // captures come back in the order the turns ended
        let cmds = take(&mut s, 0.3);
        match &cmds[..] {
            [AudioCommand::PlayClip { clip, buffer }] => {
                assert_eq!(*clip, ClipId(0));
                assert_eq!(buffer.data[0], StereoFrame::splat(0.3));
            }
            other => panic!("expected Ava's clip, got {other:?}"),
        }
    }

    #[test]
    fn stale_clip_end_is_ignored() {
        let mut s = session();
        full_turn(&mut s, "Ava");
        s.handle_input(InputEvent::Acknowledge);
        full_turn(&mut s, "Ben");
        s.handle_input(InputEvent::Acknowledge);

        assert!(s.handle_engine_event(EngineEvent::ClipEnded(ClipId(1))).is_empty());
        assert_eq!(s.display_state().now_playing, "Now Playing: Ava");
    }

    #[test]
    fn pads_trigger_at_current_pitch_only_while_recording() {
        let mut s = session();
        assert!(s.handle_input(InputEvent::PadDown(0)).is_empty());

        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::SliderClick { slider: Slider::Pitch, fraction: 0.25 });
        let cmds = s.handle_input(InputEvent::PadDown(3));
        assert_eq!(
            cmds,
            vec![AudioCommand::Trigger(TriggerParams { sample_id: SampleId(103), pitch: 1.0 })]
        );
        assert!(s.display_state().pads_lit[3]);
        s.tick(0.2);
        assert!(!s.display_state().pads_lit[3]);
        assert!(s.handle_input(InputEvent::PadDown(8)).is_empty());
    }

    #[test]
    fn full_width_pitch_click_plays_at_two_and_a_half() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::SliderClick { slider: Slider::Pitch, fraction: 1.0 });
        let cmds = s.handle_input(InputEvent::PadDown(0));
        assert_eq!(
            cmds,
            vec![AudioCommand::Trigger(TriggerParams { sample_id: SampleId(100), pitch: 2.5 })]
        );
        assert_eq!(s.display_state().pitch_fraction, 1.0);
    }

    #[test]
    fn silent_pad_still_flashes() {
        let mut bank = bank();
        bank.pads[5] = None;
        let mut s = Session::new(SessionSettings::from(&Config::default()), bank);
        type_name(&mut s, "Ava");
        assert!(s.handle_input(InputEvent::PadDown(5)).is_empty());
        assert!(s.display_state().pads_lit[5]);
    }

    #[test]
    fn held_arrow_adjusts_every_interval() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::ArrowPress(Arrow::Up));
        for _ in 0..10 {
            s.tick(0.05);
        }
        assert!((s.controls().pitch - 1.10).abs() < 1e-4);
    }

    #[test]
    fn repeated_keydown_does_not_speed_up_adjustment() {
        let mut s = session();
        type_name(&mut s, "Ava");
        for _ in 0..10 {
            s.handle_input(InputEvent::ArrowPress(Arrow::Right));
            s.tick(0.05);
        }
        assert!((s.controls().reverb_wet - 0.60).abs() < 1e-4);
    }

    #[test]
    fn release_stops_adjustment() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::ArrowPress(Arrow::Left));
        let cmds = s.tick(0.1);
        assert_eq!(cmds, vec![AudioCommand::SetReverbWet(s.controls().reverb_wet)]);

        s.handle_input(InputEvent::ArrowRelease(Arrow::Left));
        let before = s.controls();
        for _ in 0..20 {
            assert!(s.tick(0.05).is_empty());
        }
        assert_eq!(s.controls(), before);
    }

    #[test]
    fn long_holds_stay_in_bounds() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::ArrowPress(Arrow::Up));
        s.handle_input(InputEvent::ArrowPress(Arrow::Right));
        for _ in 0..14 {
            s.tick(1.0);
        }
        assert_eq!(s.controls().pitch, controls::PITCH_MAX);
        assert_eq!(s.controls().reverb_wet, controls::REVERB_MAX);

        s.handle_input(InputEvent::ArrowRelease(Arrow::Up));
        s.handle_input(InputEvent::ArrowRelease(Arrow::Right));
        s.handle_input(InputEvent::ArrowPress(Arrow::Down));
        s.handle_input(InputEvent::ArrowPress(Arrow::Left));
        s.tick(0.9);
        s.tick(0.09);
        assert!(s.controls().pitch >= controls::PITCH_MIN);
        assert!(s.controls().reverb_wet >= controls::REVERB_MIN);
    }

    #[test]
    fn turn_end_drops_held_arrows() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::ArrowPress(Arrow::Down));
        run_countdown(&mut s);
        s.handle_input(InputEvent::Acknowledge);
        type_name(&mut s, "Ben");

        let before = s.controls();
        s.tick(0.5);
        assert_eq!(s.controls(), before);
    }

    #[test]
    fn reverb_slider_emits_wetness() {
        let mut s = session();
        type_name(&mut s, "Ava");
        let cmds = s.handle_input(InputEvent::SliderClick {
            slider: Slider::Reverb,
            fraction: 1.02,
        });
        assert_eq!(cmds, vec![AudioCommand::SetReverbWet(1.0)]);
        assert_eq!(s.display_state().reverb_fraction, 1.0);
    }

    #[test]
    fn controls_ignored_outside_recording() {
        let mut s = session();
        s.handle_input(InputEvent::SliderClick { slider: Slider::Reverb, fraction: 0.9 });
        s.handle_input(InputEvent::ArrowPress(Arrow::Up));
        s.tick(1.0);
        assert_eq!(s.controls(), Controls::new(1.0, 0.5));
    }

    #[test]
    fn acknowledge_outside_message_does_nothing() {
        let mut s = session();
        assert!(s.handle_input(InputEvent::Acknowledge).is_empty());
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::Acknowledge);
        assert!(matches!(s.phase(), Phase::Recording { .. }));
    }

    #[test]
    fn typing_during_a_turn_is_not_a_name() {
        let mut s = session();
        type_name(&mut s, "Ava");
        s.handle_input(InputEvent::NameChar('z'));
        assert!(s.handle_input(InputEvent::SubmitName).is_empty());
        assert_eq!(s.roster().len(), 1);
    }

    #[test]
    fn later_rounds_do_not_restart_the_loop() {
        let mut s = session();
        full_turn(&mut s, "Ava");
        s.handle_input(InputEvent::Acknowledge);
        full_turn(&mut s, "Ben");
        s.handle_input(InputEvent::Acknowledge);
        s.handle_engine_event(EngineEvent::ClipEnded(ClipId(0)));
        s.handle_engine_event(EngineEvent::ClipEnded(ClipId(1)));
        s.tick(2.0);

        assert_eq!(s.phase(), &Phase::NameEntry);
        let cmds = type_name(&mut s, "Cy");
        assert_eq!(cmds, vec![AudioCommand::StartCapture]);
        assert_eq!(s.roster().len(), 1);
    }
}
