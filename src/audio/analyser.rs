//! Spectrum analysis of the reverb bus for the visualizer.
//!
//! The audio thread writes mono samples into a [`SpectrumTap`]; the ui thread
//! owns an [`Analyser`] that snapshots the tap each frame and runs an FFT.

use std::sync::{Arc, Mutex};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::frame::StereoFrame;

pub const FFT_SIZE: usize = 128;
pub const NUM_BINS: usize = FFT_SIZE / 2;
pub const MIN_DB: f32 = -140.0;
const SMOOTHING: f32 = 0.8;

struct Ring {
    samples: [f32; FFT_SIZE],
    write: usize,
}

impl Ring {
    // oldest sample first
    fn ordered(&self) -> [f32; FFT_SIZE] {
        std::array::from_fn(|i| self.samples[(self.write + i) % FFT_SIZE])
    }
}

/// Writer half, owned by the engine. Never blocks the audio thread.
#[derive(Clone)]
pub struct SpectrumTap {
    ring: Arc<Mutex<Ring>>,
}

impl SpectrumTap {
    pub fn new() -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                samples: [0.0; FFT_SIZE],
                write: 0,
            })),
        }
    }

    pub fn push(&self, frames: &[StereoFrame]) {
        // skip the block rather than wait on the ui thread
        let Ok(mut ring) = self.ring.try_lock() else {
            return;
        };
        let start = frames.len().saturating_sub(FFT_SIZE);
        for f in &frames[start..] {
            let w = ring.write;
            ring.samples[w] = f.mono();
            ring.write = (w + 1) % FFT_SIZE;
        }
    }
}

impl Default for SpectrumTap {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Analyser {
    tap: SpectrumTap,
    fft: Arc<dyn Fft<f32>>,
    window: [f32; FFT_SIZE],
    smoothed: [f32; NUM_BINS],
}

impl Analyser {
    pub fn new(tap: SpectrumTap) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
        Self {
            tap,
            fft,
            window: std::array::from_fn(|i| blackman(i, FFT_SIZE)),
            smoothed: [0.0; NUM_BINS],
        }
    }

    /// Magnitudes in dB for each of the [`NUM_BINS`] bins, floored at [`MIN_DB`].
    pub fn spectrum(&mut self) -> Vec<f32> {
        let samples = match self.tap.ring.lock() {
            Ok(ring) => ring.ordered(),
            Err(poisoned) => poisoned.into_inner().ordered(),
        };

        let mut bins: Vec<Complex<f32>> = samples
            .iter()
            .zip(self.window.iter())
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut bins);

        self.smoothed
            .iter_mut()
            .zip(bins.iter())
            .map(|(avg, bin)| {
                let mag = bin.norm() / FFT_SIZE as f32;
                *avg = SMOOTHING * *avg + (1.0 - SMOOTHING) * mag;
                to_db(*avg)
            })
            .collect()
    }
}

fn to_db(mag: f32) -> f32 {
    let db = 20.0 * mag.log10();
    if db.is_finite() { db.max(MIN_DB) } else { MIN_DB }
}

fn blackman(i: usize, size: usize) -> f32 {
    let x = std::f32::consts::TAU * i as f32 / size as f32;
    0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
}
