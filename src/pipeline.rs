//! The frame-synchronized pipeline: analysis windows in, rendered frames
//! out, plus the full audio→video orchestration.

use std::path::{Path, PathBuf};

use crate::{
    audio::{WINDOW_SIZE, decode::decode_audio, window::AnalysisWindow, window::AudioWindower},
    draw::FrameRgb,
    error::VoxfaceResult,
    face::{FRAME_HEIGHT, FRAME_WIDTH},
    model::{ExpressionVector, FeatureVector, MotionVector, context::ModelContext},
    mux_ffmpeg::{FfmpegMuxer, MuxOutcome, MuxerTool, mux_audio},
    sink::{CodecFactory, FrameSink, SinkConfig, VideoCodec},
};

/// Optional smoothing stage between the motion stage and the renderer.
///
/// The pipeline itself retains no memory of prior windows; any temporal
/// state lives in the filter, which is why `apply` takes `&mut self`.
pub trait TemporalFilter {
    fn apply(
        &mut self,
        expression: ExpressionVector,
        motion: MotionVector,
    ) -> (ExpressionVector, MotionVector);
}

/// The default smoothing stage: passes parameters through unchanged.
///
/// This is a deliberate no-op, not a missing feature — the extension point
/// exists so a real filter can be substituted without reshaping the
/// pipeline. With the identity filter, output frames may show visible
/// inter-frame jitter.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityFilter;

impl TemporalFilter for IdentityFilter {
    fn apply(
        &mut self,
        expression: ExpressionVector,
        motion: MotionVector,
    ) -> (ExpressionVector, MotionVector) {
        (expression, motion)
    }
}

/// Drives one analysis window through the fixed four-stage chain:
/// speech → expression → motion → renderer, with the temporal filter
/// applied just before rendering.
pub struct PipelineExecutor<'a> {
    ctx: &'a ModelContext,
    filter: Box<dyn TemporalFilter>,
}

impl<'a> PipelineExecutor<'a> {
    pub fn new(ctx: &'a ModelContext) -> Self {
        Self::with_filter(ctx, Box::new(IdentityFilter))
    }

    pub fn with_filter(ctx: &'a ModelContext, filter: Box<dyn TemporalFilter>) -> Self {
        Self { ctx, filter }
    }

    pub fn run(&mut self, window: &AnalysisWindow) -> VoxfaceResult<FrameRgb> {
        self.run_samples(window.samples())
    }

    /// Run arbitrary-length samples: normalized to the speech stage's
    /// expected shape (zero-padded or truncated to [`WINDOW_SIZE`]), then
    /// passed through the chain in fixed order with no branching.
    pub fn run_samples(&mut self, samples: &[f32]) -> VoxfaceResult<FrameRgb> {
        if samples.len() == WINDOW_SIZE {
            return self.run_exact(samples);
        }
        let mut normalized = vec![0.0f32; WINDOW_SIZE];
        let n = samples.len().min(WINDOW_SIZE);
        normalized[..n].copy_from_slice(&samples[..n]);
        self.run_exact(&normalized)
    }

    fn run_exact(&mut self, window: &[f32]) -> VoxfaceResult<FrameRgb> {
        let features = FeatureVector::from_raw(self.ctx.speech().forward(window)?)?;
        let expression =
            ExpressionVector::from_raw(self.ctx.expression().forward(features.values())?)?;
        let (head, eye) = self.ctx.motion().forward(expression.values())?;
        let motion = MotionVector::from_raw(head, eye)?;

        let (expression, motion) = self.filter.apply(expression, motion);
        Ok(self.ctx.renderer().render(&expression, &motion))
    }
}

/// Single-frame path: decode the audio, normalize it to one window, render
/// one raster.
pub fn render_frame(ctx: &ModelContext, audio_path: &Path) -> VoxfaceResult<FrameRgb> {
    let buffer = decode_audio(audio_path)?;
    PipelineExecutor::new(ctx).run_samples(buffer.samples())
}

#[derive(Clone, Debug)]
pub struct RenderOpts {
    pub fps: u32,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct RenderSummary {
    pub frames: u64,
    pub codec: VideoCodec,
    pub out_path: PathBuf,
    /// False when the run degraded to a silent video.
    pub audio_muxed: bool,
    /// Diagnostic detail for a degraded run.
    pub degradation: Option<String>,
}

/// Render a full avatar video with the production ffmpeg backends.
pub fn render_to_video(
    ctx: &ModelContext,
    audio_path: &Path,
    out_path: &Path,
    opts: &RenderOpts,
) -> VoxfaceResult<RenderSummary> {
    render_to_video_with(
        ctx,
        audio_path,
        out_path,
        opts,
        &crate::encode_ffmpeg::FfmpegWriterFactory,
        &FfmpegMuxer,
    )
}

/// Render a full avatar video: decode → window → negotiate a codec → render
/// and append every frame in window-index order → finalize → mux the source
/// audio back in.
///
/// Muxer unavailability or failure degrades to a silent video and still
/// returns `Ok` (see [`mux_audio`]); only input, shape, and writer-open
/// failures are errors.
pub fn render_to_video_with(
    ctx: &ModelContext,
    audio_path: &Path,
    out_path: &Path,
    opts: &RenderOpts,
    factory: &dyn CodecFactory,
    muxer: &dyn MuxerTool,
) -> VoxfaceResult<RenderSummary> {
    let buffer = decode_audio(audio_path)?;
    let windower = AudioWindower::new(&buffer, opts.fps)?;
    let total = windower.total_frames();
    tracing::info!(
        "audio duration {:.2}s, generating {total} frames at {} fps",
        buffer.duration_seconds(),
        opts.fps
    );

    let silent_path = silent_video_path(out_path);
    let mut silent_guard = TempFileGuard(Some(silent_path.clone()));

    let mut sink = FrameSink::open(
        factory,
        SinkConfig {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            fps: opts.fps,
            out_path: silent_path.clone(),
        },
    )?;

    let mut executor = PipelineExecutor::new(ctx);
    for window in windower {
        let frame = executor.run(&window)?;
        sink.append(&frame)?;
        let done = window.index() + 1;
        if done.is_multiple_of(30) {
            tracing::info!("generated {done}/{total} frames");
        }
    }
    sink.finish()?;

    let outcome = mux_audio(muxer, &silent_path, audio_path, out_path)?;
    // The muxer has consumed (or repurposed) the silent file.
    silent_guard.0 = None;

    let (audio_muxed, degradation) = match &outcome {
        MuxOutcome::Muxed { .. } => (true, None),
        MuxOutcome::Silent { detail, .. } => (false, Some(detail.clone())),
    };

    Ok(RenderSummary {
        frames: sink.frames_written(),
        codec: sink.codec(),
        out_path: outcome.path().to_path_buf(),
        audio_muxed,
        degradation,
    })
}

/// Sibling path the silent intermediate video is written to before muxing.
fn silent_video_path(out_path: &Path) -> PathBuf {
    let stem = out_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = out_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    out_path.with_file_name(format!("{stem}_temp.{ext}"))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            std::fs::remove_file(path).ok();
        }
    }
}
