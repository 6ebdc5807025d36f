//! Voxface turns speech audio into a talking-head avatar video.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: audio file -> mono PCM at 16 kHz ([`decode_audio`])
//! 2. **Window**: fixed 16000-sample analysis windows, one per output frame
//!    ([`AudioWindower`])
//! 3. **Transform**: speech → expression → motion → renderer, a fixed
//!    four-stage chain ([`PipelineExecutor`] over a [`ModelContext`])
//! 4. **Sink**: codec negotiation and strictly ordered frame writes
//!    ([`FrameSink`], production backend [`FfmpegWriterFactory`])
//! 5. **Mux**: combine the silent video with the source audio, degrading
//!    gracefully when ffmpeg is unavailable ([`mux_audio`])
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic rendering**: the face compositor is byte-reproducible
//!   for identical (expression, motion) inputs.
//! - **Order-preserving output**: frames are appended in window-index order;
//!   the container never sees reordered or dropped frames.
//! - **Degradation over failure**: a missing mux tool yields a silent video
//!   and a qualified success, never an error.
#![forbid(unsafe_code)]

pub mod audio;
pub mod config;
pub mod draw;
pub mod encode_ffmpeg;
pub mod error;
pub mod face;
pub mod model;
pub mod mux_ffmpeg;
pub mod pipeline;
pub mod sink;

pub use audio::{AudioBuffer, SAMPLE_RATE, WINDOW_SIZE};
pub use audio::decode::{SUPPORTED_EXTENSIONS, decode_audio, validate_audio_extension};
pub use audio::window::{AnalysisWindow, AudioWindower};
pub use config::{PipelineConfig, StageShapes};
pub use draw::{BBox, FrameRgb, Rgb8};
pub use encode_ffmpeg::{FfmpegFrameWriter, FfmpegWriterFactory, ensure_parent_dir, is_ffmpeg_on_path};
pub use error::{VoxfaceError, VoxfaceResult};
pub use face::{FRAME_HEIGHT, FRAME_WIDTH, FaceRenderer};
pub use model::context::ModelContext;
pub use model::stages::{
    BandEnergyEncoder, ExpressionStage, MotionStage, PooledExpressionMapper, PooledMotionMapper,
    SpeechStage,
};
pub use model::{
    EXPRESSION_DIM, EYE_DIM, ExpressionVector, FEATURE_DIM, FeatureVector, HEAD_DIM, MotionVector,
};
pub use mux_ffmpeg::{FfmpegMuxer, MuxOutcome, MuxRun, MuxerTool, mux_audio};
pub use pipeline::{
    IdentityFilter, PipelineExecutor, RenderOpts, RenderSummary, TemporalFilter, render_frame,
    render_to_video, render_to_video_with,
};
pub use sink::{CodecFactory, FrameSink, FrameWriter, SinkConfig, VideoCodec};
