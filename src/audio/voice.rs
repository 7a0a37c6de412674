use super::frame::StereoFrame;
use super::ids::SampleId;
use super::sample_buffer::SampleBuffer;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// One playing instance of a buffer. `rate` is the playback rate, so 2.0 plays
/// an octave up and twice as fast.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub sample_id: SampleId,
    pub pos: f32,
    pub rate: f32,
    pub gain: f32,
    pub active: bool,
    pub looping: bool,
    // trigger order, used to steal the oldest voice when the pool is full
    pub started: u64,
}

impl Voice {
    pub fn one_shot(sample_id: SampleId, rate: f32, gain: f32, started: u64) -> Self {
        Self {
            sample_id,
            pos: 0.0,
            rate: rate.max(0.0),
            gain,
            active: true,
            looping: false,
            started,
        }
    }

    pub fn looped(sample_id: SampleId, gain: f32) -> Self {
        Self {
            looping: true,
            ..Self::one_shot(sample_id, 1.0, gain, 0)
        }
    }

    pub fn idle() -> Self {
        Self {
            active: false,
            ..Self::one_shot(SampleId(u64::MAX), 1.0, 0.0, 0)
        }
    }

    // mix this voice into `out`, deactivating it once it runs off the end
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        let data = &buffer.data;
        let len = data.len();
        if len == 0 || self.rate <= 0.0 {
            self.active = false;
            return;
        }

        for frame in out.iter_mut() {
            if self.pos >= len as f32 {
                if self.looping {
                    self.pos %= len as f32;
                } else {
                    self.active = false;
                    return;
                }
            }

            let i = self.pos as usize;
            let frac = self.pos - i as f32;
            let s0 = data[i];
            // loops wrap around for interpolation, one-shots hold the last frame
            let s1 = match data.get(i + 1) {
                Some(s) => *s,
                None if self.looping => data[0],
                None => s0,
            };
            let sample = StereoFrame {
                left: lerp(s0.left, s1.left, frac),
                right: lerp(s0.right, s1.right, frac),
            };
            frame.add_scaled(sample, self.gain);

            self.pos += self.rate;
        }
    }
}
