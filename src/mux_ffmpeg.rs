//! Audio muxing: combine the finalized silent video with the source audio
//! track via the system `ffmpeg` binary, degrading to the silent video when
//! the tool is unavailable or fails.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::error::{VoxfaceError, VoxfaceResult};

/// Outcome of a mux attempt. Degradation is a qualified success, never an
/// error: the caller always has a usable artifact at `path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MuxOutcome {
    /// Video and audio were combined into `path`.
    Muxed { path: PathBuf },
    /// The output at `path` is the silent video; `detail` says why.
    Silent { path: PathBuf, detail: String },
}

impl MuxOutcome {
    pub fn path(&self) -> &Path {
        match self {
            MuxOutcome::Muxed { path } | MuxOutcome::Silent { path, .. } => path,
        }
    }

    pub fn has_audio(&self) -> bool {
        matches!(self, MuxOutcome::Muxed { .. })
    }
}

/// Result of one external mux invocation.
#[derive(Clone, Debug)]
pub struct MuxRun {
    pub success: bool,
    pub diagnostic: String,
}

/// The external encoding tool behind the muxer, as a seam so degradation
/// paths are testable without uninstalling ffmpeg.
pub trait MuxerTool {
    /// Lightweight health probe (`ffmpeg -version`).
    fn probe(&self) -> bool;

    /// Copy the video stream, encode the audio stream, truncate to the
    /// shorter of the two inputs.
    fn run(&self, video: &Path, audio: &Path, out: &Path) -> VoxfaceResult<MuxRun>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegMuxer;

impl MuxerTool for FfmpegMuxer {
    fn probe(&self) -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run(&self, video: &Path, audio: &Path, out: &Path) -> VoxfaceResult<MuxRun> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
            .arg(out)
            .output()
            .map_err(|e| {
                VoxfaceError::external_tool(format!("failed to run ffmpeg: {e}"))
            })?;

        Ok(MuxRun {
            success: output.status.success(),
            diagnostic: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Combine `silent_video` and `audio` into `out_path`.
///
/// Degradation rules:
/// - tool absent → silent video is copied to `out_path`, outcome `Silent`;
/// - tool exits non-zero (or cannot be invoked) → same, with the tool's
///   diagnostic text as the detail;
/// - success → the muxed output is confirmed on disk, and only then is the
///   silent temp file deleted.
///
/// Re-running with identical inputs overwrites `out_path` deterministically.
pub fn mux_audio(
    tool: &dyn MuxerTool,
    silent_video: &Path,
    audio: &Path,
    out_path: &Path,
) -> VoxfaceResult<MuxOutcome> {
    if !tool.probe() {
        tracing::warn!(
            "ffmpeg not found; output will not have an audio track: {}",
            out_path.display()
        );
        keep_silent(silent_video, out_path)?;
        return Ok(MuxOutcome::Silent {
            path: out_path.to_path_buf(),
            detail: "mux tool not available".to_string(),
        });
    }

    let run = match tool.run(silent_video, audio, out_path) {
        Ok(run) => run,
        Err(VoxfaceError::ExternalTool(detail)) => MuxRun {
            success: false,
            diagnostic: detail,
        },
        Err(e) => return Err(e),
    };

    if !run.success {
        tracing::warn!("mux failed, keeping silent video: {}", run.diagnostic);
        keep_silent(silent_video, out_path)?;
        return Ok(MuxOutcome::Silent {
            path: out_path.to_path_buf(),
            detail: run.diagnostic,
        });
    }

    if !out_path.exists() {
        // Tool claimed success but wrote nothing; treat as a failed run.
        tracing::warn!(
            "mux reported success but '{}' is missing; keeping silent video",
            out_path.display()
        );
        keep_silent(silent_video, out_path)?;
        return Ok(MuxOutcome::Silent {
            path: out_path.to_path_buf(),
            detail: "mux output missing after successful exit".to_string(),
        });
    }

    // The silent intermediate is deleted only once the muxed output is
    // confirmed written.
    if silent_video != out_path {
        std::fs::remove_file(silent_video).ok();
    }
    Ok(MuxOutcome::Muxed {
        path: out_path.to_path_buf(),
    })
}

fn keep_silent(silent_video: &Path, out_path: &Path) -> VoxfaceResult<()> {
    use anyhow::Context as _;
    if silent_video != out_path {
        std::fs::copy(silent_video, out_path).with_context(|| {
            format!(
                "failed to place silent video at '{}'",
                out_path.display()
            )
        })?;
        std::fs::remove_file(silent_video).ok();
    }
    Ok(())
}
