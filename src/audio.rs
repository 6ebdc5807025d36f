pub mod decode;
pub mod window;

/// Fixed analysis sample rate. All audio is resampled to this on load.
pub const SAMPLE_RATE: u32 = 16_000;

/// Fixed analysis window length in samples (one second of context per frame).
pub const WINDOW_SIZE: usize = 16_000;

/// Mono PCM at [`SAMPLE_RATE`], immutable once loaded.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}
