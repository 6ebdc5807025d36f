use std::{
    io::Write as _,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use voxface::{
    CodecFactory, ExpressionStage, ExpressionVector, FaceRenderer, FrameWriter, ModelContext,
    MotionStage, MotionVector, MuxRun, MuxerTool, RenderOpts, SinkConfig, SpeechStage,
    VideoCodec, VoxfaceResult, render_to_video_with,
};

/// Stub stages returning fixed zero vectors: neutral expression, no head or
/// eye motion.
struct ZeroSpeech;
impl SpeechStage for ZeroSpeech {
    fn forward(&self, _window: &[f32]) -> VoxfaceResult<Vec<f32>> {
        Ok(vec![0.0; 256])
    }
}

struct ZeroExpression;
impl ExpressionStage for ZeroExpression {
    fn forward(&self, _features: &[f32]) -> VoxfaceResult<Vec<f32>> {
        Ok(vec![0.0; 64])
    }
}

struct ZeroMotion;
impl MotionStage for ZeroMotion {
    fn forward(&self, _expression: &[f32]) -> VoxfaceResult<(Vec<f32>, Vec<f32>)> {
        Ok((vec![0.0; 3], vec![0.0; 2]))
    }
}

fn zero_context() -> ModelContext {
    ModelContext::new(
        Box::new(ZeroSpeech),
        Box::new(ZeroExpression),
        Box::new(ZeroMotion),
        FaceRenderer::new(),
    )
}

/// Writer that captures frames in memory and also streams them to the sink's
/// output path, so the silent-video file exists for the mux step.
struct FileCaptureWriter {
    file: std::fs::File,
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FrameWriter for FileCaptureWriter {
    fn write_bgr(&mut self, data: &[u8]) -> VoxfaceResult<()> {
        self.frames.lock().unwrap().push(data.to_vec());
        self.file.write_all(data).unwrap();
        Ok(())
    }

    fn finish(&mut self) -> VoxfaceResult<()> {
        self.file.flush().unwrap();
        Ok(())
    }
}

#[derive(Default)]
struct FileCaptureFactory {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl CodecFactory for FileCaptureFactory {
    fn open(
        &self,
        _codec: VideoCodec,
        cfg: &SinkConfig,
    ) -> VoxfaceResult<Box<dyn FrameWriter>> {
        Ok(Box::new(FileCaptureWriter {
            file: std::fs::File::create(&cfg.out_path).unwrap(),
            frames: Arc::clone(&self.frames),
        }))
    }
}

struct AbsentTool;
impl MuxerTool for AbsentTool {
    fn probe(&self) -> bool {
        false
    }
    fn run(&self, _video: &Path, _audio: &Path, _out: &Path) -> VoxfaceResult<MuxRun> {
        unreachable!("probe fails, run must not be invoked")
    }
}

/// 16 kHz 16-bit PCM mono WAV of silence.
fn write_silent_wav(path: &Path, seconds: u32) {
    let samples = 16_000 * seconds;
    let data_len = samples * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&16_000u32.to_le_bytes());
    wav.extend_from_slice(&32_000u32.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(&vec![0u8; data_len as usize]);
    std::fs::write(path, wav).unwrap();
}

fn scratch_dir(case: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("voxface_e2e_{}_{case}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn neutral_reference_bgr() -> Vec<u8> {
    let frame = FaceRenderer::new().render(&ExpressionVector::zeros(), &MotionVector::default());
    let mut bgr = frame.data.clone();
    for px in bgr.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    bgr
}

#[test]
fn three_seconds_of_silence_produces_ninety_neutral_frames() {
    let dir = scratch_dir("silence");
    let audio = dir.join("silence.wav");
    write_silent_wav(&audio, 3);
    let out = dir.join("avatar.mp4");

    let ctx = zero_context();
    let factory = FileCaptureFactory::default();
    let summary = render_to_video_with(
        &ctx,
        &audio,
        &out,
        &RenderOpts { fps: 30 },
        &factory,
        &AbsentTool,
    )
    .unwrap();

    assert_eq!(summary.frames, 90);
    assert_eq!(summary.codec, VideoCodec::H264);
    // The muxer was absent, so this is a degraded success with a silent
    // artifact at the requested path.
    assert!(!summary.audio_muxed);
    assert_eq!(summary.out_path, out);
    assert!(out.exists());

    let reference = neutral_reference_bgr();
    let frames = factory.frames.lock().unwrap();
    assert_eq!(frames.len(), 90);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame, &reference, "frame {i} deviates from the reference");
    }

    // The on-disk silent video is exactly the appended frames, in order.
    let on_disk = std::fs::read(&out).unwrap();
    assert_eq!(on_disk.len(), reference.len() * 90);
    assert_eq!(&on_disk[..reference.len()], reference.as_slice());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_audio_file_is_an_input_error() {
    let ctx = zero_context();
    let factory = FileCaptureFactory::default();
    let err = render_to_video_with(
        &ctx,
        Path::new("nope/missing.wav"),
        Path::new("out.mp4"),
        &RenderOpts::default(),
        &factory,
        &AbsentTool,
    )
    .unwrap_err();
    assert!(matches!(err, voxface::VoxfaceError::Input(_)));
}

#[test]
fn unsupported_extension_is_rejected_before_the_pipeline() {
    let dir = scratch_dir("badext");
    let audio = dir.join("clip.ogg");
    std::fs::write(&audio, b"not really ogg").unwrap();

    let ctx = zero_context();
    let factory = FileCaptureFactory::default();
    let err = render_to_video_with(
        &ctx,
        &audio,
        &dir.join("out.mp4"),
        &RenderOpts::default(),
        &factory,
        &AbsentTool,
    )
    .unwrap_err();
    assert!(matches!(err, voxface::VoxfaceError::Input(_)));
    // Nothing was attempted against the sink.
    assert!(factory.frames.lock().unwrap().is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
