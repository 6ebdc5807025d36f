use crate::{
    audio::WINDOW_SIZE,
    error::VoxfaceResult,
    model::{EXPRESSION_DIM, EYE_DIM, FEATURE_DIM, HEAD_DIM},
};

/// Speech stage: `[16000]` window samples -> `[256]` features.
///
/// Stages are stateless mappings from a fixed-shape input to a fixed-shape
/// output; they return raw vectors so the executor can enforce the shape
/// contract uniformly for any implementation.
pub trait SpeechStage: Send + Sync {
    fn forward(&self, window: &[f32]) -> VoxfaceResult<Vec<f32>>;
}

/// Expression stage: `[256]` features -> `[64]` expression parameters in
/// [-1, 1].
pub trait ExpressionStage: Send + Sync {
    fn forward(&self, features: &[f32]) -> VoxfaceResult<Vec<f32>>;
}

/// Motion stage: `[64]` expression -> (`[3]` head pitch/yaw/roll, `[2]` eye).
pub trait MotionStage: Send + Sync {
    fn forward(&self, expression: &[f32]) -> VoxfaceResult<(Vec<f32>, Vec<f32>)>;
}

/// Reference speech encoder: per-band RMS energy over 256 equal slices of
/// the window. Deterministic and weight-free; a learned encoder drops in via
/// [`SpeechStage`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BandEnergyEncoder;

impl SpeechStage for BandEnergyEncoder {
    fn forward(&self, window: &[f32]) -> VoxfaceResult<Vec<f32>> {
        let n = window.len().max(1);
        let mut features = Vec::with_capacity(FEATURE_DIM);
        for band in 0..FEATURE_DIM {
            let start = band * n / FEATURE_DIM;
            let end = ((band + 1) * n / FEATURE_DIM).max(start + 1).min(n);
            let slice = &window[start..end];
            let energy: f32 =
                slice.iter().map(|s| s * s).sum::<f32>() / slice.len() as f32;
            features.push(energy.sqrt());
        }
        Ok(features)
    }
}

impl BandEnergyEncoder {
    /// Window sample count this encoder is calibrated for.
    pub const WINDOW: usize = WINDOW_SIZE;
}

/// Reference expression mapper: pools groups of four features and squashes
/// with `tanh`, keeping every parameter in [-1, 1].
#[derive(Clone, Copy, Debug, Default)]
pub struct PooledExpressionMapper;

impl ExpressionStage for PooledExpressionMapper {
    fn forward(&self, features: &[f32]) -> VoxfaceResult<Vec<f32>> {
        const GROUP: usize = FEATURE_DIM / EXPRESSION_DIM;
        let mut expression = Vec::with_capacity(EXPRESSION_DIM);
        for j in 0..EXPRESSION_DIM {
            let start = (j * GROUP).min(features.len());
            let end = ((j + 1) * GROUP).min(features.len());
            let mean = if start < end {
                features[start..end].iter().sum::<f32>() / (end - start) as f32
            } else {
                0.0
            };
            expression.push((mean * 4.0).tanh());
        }
        Ok(expression)
    }
}

/// Reference motion mapper: pooled `tanh` heads with the small-movement
/// scaling of the reference behavior (0.3 for head, 0.5 for eyes).
#[derive(Clone, Copy, Debug, Default)]
pub struct PooledMotionMapper;

impl MotionStage for PooledMotionMapper {
    fn forward(&self, expression: &[f32]) -> VoxfaceResult<(Vec<f32>, Vec<f32>)> {
        let head = (0..HEAD_DIM)
            .map(|i| {
                let start = i * EXPRESSION_DIM / HEAD_DIM;
                let end = (i + 1) * EXPRESSION_DIM / HEAD_DIM;
                (pool(expression, start, end) * 2.0).tanh() * 0.3
            })
            .collect();
        let eye = (0..EYE_DIM)
            .map(|i| {
                let start = i * EXPRESSION_DIM / EYE_DIM;
                let end = (i + 1) * EXPRESSION_DIM / EYE_DIM;
                (pool(expression, start, end) * 2.0).tanh() * 0.5
            })
            .collect();
        Ok((head, eye))
    }
}

fn pool(values: &[f32], start: usize, end: usize) -> f32 {
    let start = start.min(values.len());
    let end = end.min(values.len());
    if start >= end {
        return 0.0;
    }
    values[start..end].iter().sum::<f32>() / (end - start) as f32
}
