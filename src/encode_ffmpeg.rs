//! Production writer backend: streams raw BGR frames to the system `ffmpeg`
//! binary over a pipe, one process per negotiated codec.
//!
//! We intentionally use the system `ffmpeg` rather than linked FFmpeg
//! bindings to avoid native dev header/lib requirements.

use std::{
    io::Read as _,
    path::Path,
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    error::{VoxfaceError, VoxfaceResult},
    sink::{CodecFactory, FrameWriter, SinkConfig, VideoCodec},
};

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> VoxfaceResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn encoder_available(encoder: &str) -> bool {
    let Ok(out) = Command::new("ffmpeg")
        .args(["-hide_banner", "-h", &format!("encoder={encoder}")])
        .output()
    else {
        return false;
    };
    // ffmpeg exits 0 for unknown encoders too; a real one prints an
    // "Encoder <name>" header.
    out.status.success() && String::from_utf8_lossy(&out.stdout).contains("Encoder ")
}

/// [`CodecFactory`] backed by the system `ffmpeg` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegWriterFactory;

impl CodecFactory for FfmpegWriterFactory {
    fn open(
        &self,
        codec: VideoCodec,
        cfg: &SinkConfig,
    ) -> VoxfaceResult<Box<dyn FrameWriter>> {
        Ok(Box::new(FfmpegFrameWriter::spawn(codec, cfg)?))
    }
}

pub struct FfmpegFrameWriter {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegFrameWriter {
    pub fn spawn(codec: VideoCodec, cfg: &SinkConfig) -> VoxfaceResult<Self> {
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            // We target yuv420p output for player compatibility.
            return Err(VoxfaceError::resource(
                "video width/height must be even for yuv420p output",
            ));
        }
        ensure_parent_dir(&cfg.out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(VoxfaceError::resource(
                "ffmpeg was not found on PATH",
            ));
        }
        if !encoder_available(codec.encoder()) {
            return Err(VoxfaceError::resource(format!(
                "this ffmpeg build has no '{}' encoder",
                codec.encoder()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgr24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            codec.encoder(),
        ]);

        match codec {
            VideoCodec::H264 => {
                cmd.args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
            }
            VideoCodec::Mjpeg => {
                cmd.args(["-pix_fmt", "yuvj420p", "-q:v", "3"]);
            }
            VideoCodec::Xvid | VideoCodec::Mpeg4 => {
                cmd.args(["-pix_fmt", "yuv420p"]);
            }
        }
        cmd.arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            VoxfaceError::resource(format!("failed to spawn ffmpeg: {e}"))
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            VoxfaceError::resource("failed to open ffmpeg stdin (unexpected)")
        })?;

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
        })
    }
}

impl FrameWriter for FfmpegFrameWriter {
    fn write_bgr(&mut self, data: &[u8]) -> VoxfaceResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(VoxfaceError::resource("ffmpeg writer is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(data).map_err(|e| {
            VoxfaceError::resource(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn finish(&mut self) -> VoxfaceResult<()> {
        // Closing stdin signals end of stream.
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr).ok();
        }
        let status = child.wait().map_err(|e| {
            VoxfaceError::resource(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !status.success() {
            return Err(VoxfaceError::resource(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameWriter {
    fn drop(&mut self) {
        // Abandoned writer: close the pipe and reap the child so no zombie
        // process outlives the sink.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            child.wait().ok();
        }
    }
}
