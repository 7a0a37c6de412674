//! Freeverb-style stereo reverb: eight damped feedback combs in parallel,
//! then four allpasses in series, per channel.

use super::frame::StereoFrame;

// delay lengths in samples at 44.1 kHz
const COMB_TUNING: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNING: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;
const INPUT_GAIN: f32 = 0.015;
const ALLPASS_FEEDBACK: f32 = 0.5;
const DAMPING: f32 = 0.2;

struct Comb {
    line: Vec<f32>,
    idx: usize,
    feedback: f32,
    lowpass: f32,
}

impl Comb {
    fn new(len: usize) -> Self {
        Self {
            line: vec![0.0; len.max(1)],
            idx: 0,
            feedback: 0.84,
            lowpass: 0.0,
        }
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let out = self.line[self.idx];
        self.lowpass = out * (1.0 - DAMPING) + self.lowpass * DAMPING;
        self.line[self.idx] = input + self.lowpass * self.feedback;
        self.idx = (self.idx + 1) % self.line.len();
        out
    }
}

struct Allpass {
    line: Vec<f32>,
    idx: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self {
            line: vec![0.0; len.max(1)],
            idx: 0,
        }
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let delayed = self.line[self.idx];
        self.line[self.idx] = input + delayed * ALLPASS_FEEDBACK;
        self.idx = (self.idx + 1) % self.line.len();
        delayed - input
    }
}

struct Channel {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl Channel {
    fn new(scale: f64, spread: usize) -> Self {
        let len = |tuning: usize| ((tuning + spread) as f64 * scale) as usize;
        Self {
            combs: COMB_TUNING.iter().map(|&t| Comb::new(len(t))).collect(),
            allpasses: ALLPASS_TUNING.iter().map(|&t| Allpass::new(len(t))).collect(),
        }
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let mut acc: f32 = self.combs.iter_mut().map(|c| c.tick(input)).sum();
        for ap in &mut self.allpasses {
            acc = ap.tick(acc);
        }
        acc
    }
}

pub struct Reverb {
    left: Channel,
    right: Channel,
    wet: f32,
}

impl Reverb {
    pub fn new(sample_rate: u32, room_size: f32, wet: f32) -> Self {
        let scale = sample_rate as f64 / 44100.0;
        let mut reverb = Self {
            left: Channel::new(scale, 0),
            right: Channel::new(scale, STEREO_SPREAD),
            wet: 0.0,
        };
        reverb.set_room_size(room_size);
        reverb.set_wet(wet);
        reverb
    }

    /// 0.0 gives a short tail, 1.0 the longest.
    pub fn set_room_size(&mut self, room_size: f32) {
        let feedback = room_size.clamp(0.0, 1.0) * 0.28 + 0.7;
        for comb in self.left.combs.iter_mut().chain(self.right.combs.iter_mut()) {
            comb.feedback = feedback;
        }
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    #[cfg(test)]
    pub fn wet(&self) -> f32 {
        self.wet
    }

    pub fn process_block(&mut self, buf: &mut [StereoFrame]) {
        let wet = self.wet;
        for f in buf.iter_mut() {
            let input = (f.left + f.right) * INPUT_GAIN;
            let l = self.left.tick(input);
            let r = self.right.tick(input);
            f.left = f.left * (1.0 - wet) + l * wet;
            f.right = f.right * (1.0 - wet) + r * wet;
        }
    }
}
