use crate::shared::{Arrow, Slider};

pub const PITCH_MIN: f32 = 0.5;
pub const PITCH_MAX: f32 = 3.0;
pub const REVERB_MIN: f32 = 0.0;
pub const REVERB_MAX: f32 = 1.0;
// a full-width slider click reaches 2.5; only held arrows go up to PITCH_MAX
const PITCH_SLIDER_SPAN: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    Pitch,
    Reverb,
}

/// Live pitch and reverb settings. Shared by every student; never reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub pitch: f32,
    pub reverb_wet: f32,
}

impl Controls {
    pub fn new(pitch: f32, reverb_wet: f32) -> Self {
        Self {
            pitch: pitch.clamp(PITCH_MIN, PITCH_MAX),
            reverb_wet: reverb_wet.clamp(REVERB_MIN, REVERB_MAX),
        }
    }

    // one held-arrow step
    pub fn nudge(&mut self, arrow: Arrow, step: f32) -> Param {
        match arrow {
            Arrow::Up => {
                self.pitch = (self.pitch + step).min(PITCH_MAX);
                Param::Pitch
            }
            Arrow::Down => {
                self.pitch = (self.pitch - step).max(PITCH_MIN);
                Param::Pitch
            }
            Arrow::Right => {
                self.reverb_wet = (self.reverb_wet + step).min(REVERB_MAX);
                Param::Reverb
            }
            Arrow::Left => {
                self.reverb_wet = (self.reverb_wet - step).max(REVERB_MIN);
                Param::Reverb
            }
        }
    }

    /// Set a value from a click `fraction` of the way along its slider.
    /// Returns `None` for a non-finite fraction.
    pub fn set_from_slider(&mut self, slider: Slider, fraction: f32) -> Option<Param> {
        if !fraction.is_finite() {
            return None;
        }
        let f = fraction.clamp(0.0, 1.0);
        match slider {
            Slider::Pitch => {
                self.pitch = PITCH_MIN + f * PITCH_SLIDER_SPAN;
                Some(Param::Pitch)
            }
            Slider::Reverb => {
                self.reverb_wet = REVERB_MIN + f * (REVERB_MAX - REVERB_MIN);
                Some(Param::Reverb)
            }
        }
    }

    // inverse of the slider mapping; above 1.0 once arrows push past the slider's reach
    pub fn pitch_fraction(&self) -> f32 {
        (self.pitch - PITCH_MIN) / PITCH_SLIDER_SPAN
    }

    pub fn reverb_fraction(&self) -> f32 {
        (self.reverb_wet - REVERB_MIN) / (REVERB_MAX - REVERB_MIN)
    }
}

/// Arrow keys currently held. One periodic tick reads this set, so a held key
/// never owns a timer of its own.
#[derive(Clone, Debug, Default)]
pub struct HeldArrows {
    held: Vec<Arrow>,
}

impl HeldArrows {
    // true only on the first press of a key that wasn't already held
    pub fn press(&mut self, arrow: Arrow) -> bool {
        if self.held.contains(&arrow) {
            return false;
        }
        self.held.push(arrow);
        true
    }

    pub fn release(&mut self, arrow: Arrow) {
        self.held.retain(|&a| a != arrow);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Arrow> + '_ {
        self.held.iter().copied()
    }
}

/// Fixed-cadence clock driving held-arrow repeats.
#[derive(Clone, Debug)]
pub struct RepeatClock {
    interval: f64,
    acc: f64,
}

impl RepeatClock {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval: interval_secs.max(1e-3),
            acc: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.acc = 0.0;
    }

    // number of whole intervals elapsed
    pub fn advance(&mut self, dt: f64) -> u32 {
        self.acc += dt.max(0.0);
        let ticks = (self.acc / self.interval + 1e-9).floor();
        self.acc = (self.acc - ticks * self.interval).max(0.0);
        ticks as u32
    }
}
