use crate::{
    audio::{AudioBuffer, WINDOW_SIZE},
    error::{VoxfaceError, VoxfaceResult},
};

/// One fixed-length audio slice feeding the speech stage to produce one
/// frame. Always exactly [`WINDOW_SIZE`] samples; the tail past the buffer
/// end is zero-padded.
#[derive(Clone, Debug)]
pub struct AnalysisWindow {
    index: u64,
    samples: Vec<f32>,
    real_samples: usize,
}

impl AnalysisWindow {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample count taken from the source buffer (the rest is padding).
    pub fn real_samples(&self) -> usize {
        self.real_samples
    }
}

/// Slices an [`AudioBuffer`] into one analysis window per output frame.
///
/// Window *i* starts at `i * samples_per_frame` and spans [`WINDOW_SIZE`]
/// samples regardless of the frame step, so windows overlap whenever
/// `samples_per_frame < WINDOW_SIZE` and every frame sees a full second of
/// context.
pub struct AudioWindower<'a> {
    samples: &'a [f32],
    samples_per_frame: usize,
    total_frames: u64,
    next: u64,
}

impl<'a> AudioWindower<'a> {
    pub fn new(buffer: &'a AudioBuffer, fps: u32) -> VoxfaceResult<Self> {
        if fps == 0 {
            return Err(VoxfaceError::input("fps must be non-zero"));
        }
        let samples_per_frame = (buffer.sample_rate() / fps) as usize;
        if samples_per_frame == 0 {
            return Err(VoxfaceError::input(format!(
                "fps {fps} exceeds the {} Hz sample rate",
                buffer.sample_rate()
            )));
        }

        let total_frames = (buffer.duration_seconds() * f64::from(fps)).floor() as u64;
        if total_frames == 0 {
            // A zero-frame container is not a useful deliverable.
            return Err(VoxfaceError::input(format!(
                "audio too short to produce any frames ({} samples at {} fps)",
                buffer.len(),
                fps
            )));
        }

        Ok(Self {
            samples: buffer.samples(),
            samples_per_frame,
            total_frames,
            next: 0,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// Extract window `index`, right-zero-padded to exact length.
    pub fn window(&self, index: u64) -> VoxfaceResult<AnalysisWindow> {
        if index >= self.total_frames {
            return Err(VoxfaceError::input(format!(
                "window index {index} out of range (total {})",
                self.total_frames
            )));
        }

        let start = index as usize * self.samples_per_frame;
        let end = (start + WINDOW_SIZE).min(self.samples.len());
        let real = end.saturating_sub(start);

        let mut samples = vec![0.0f32; WINDOW_SIZE];
        samples[..real].copy_from_slice(&self.samples[start..end]);

        Ok(AnalysisWindow {
            index,
            samples,
            real_samples: real,
        })
    }
}

impl Iterator for AudioWindower<'_> {
    type Item = AnalysisWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total_frames {
            return None;
        }
        // In range by construction, so this cannot fail.
        let w = self.window(self.next).ok()?;
        self.next += 1;
        Some(w)
    }
}
