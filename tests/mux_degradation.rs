use std::path::{Path, PathBuf};

use voxface::{MuxOutcome, MuxRun, MuxerTool, VoxfaceResult, mux_audio};

struct AbsentTool;

impl MuxerTool for AbsentTool {
    fn probe(&self) -> bool {
        false
    }

    fn run(&self, _video: &Path, _audio: &Path, _out: &Path) -> VoxfaceResult<MuxRun> {
        panic!("run must not be called when the probe fails");
    }
}

struct FailingTool;

impl MuxerTool for FailingTool {
    fn probe(&self) -> bool {
        true
    }

    fn run(&self, _video: &Path, _audio: &Path, _out: &Path) -> VoxfaceResult<MuxRun> {
        Ok(MuxRun {
            success: false,
            diagnostic: "Unknown encoder 'aac'".to_string(),
        })
    }
}

/// Stands in for a working ffmpeg: copies the video to the output.
struct CopyTool;

impl MuxerTool for CopyTool {
    fn probe(&self) -> bool {
        true
    }

    fn run(&self, video: &Path, _audio: &Path, out: &Path) -> VoxfaceResult<MuxRun> {
        std::fs::copy(video, out).unwrap();
        Ok(MuxRun {
            success: true,
            diagnostic: String::new(),
        })
    }
}

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(case: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("voxface_mux_{}_{case}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

#[test]
fn absent_tool_degrades_to_a_byte_identical_silent_video() {
    let scratch = Scratch::new("absent");
    let silent_bytes = b"silent-video-payload".to_vec();
    let silent = scratch.file("talk_temp.mp4", &silent_bytes);
    let audio = scratch.file("talk.wav", b"pcm");
    let out = scratch.path("talk.mp4");

    let outcome = mux_audio(&AbsentTool, &silent, &audio, &out).unwrap();

    // Degraded success, not failure; output is exactly the silent video.
    assert!(matches!(outcome, MuxOutcome::Silent { .. }));
    assert!(!outcome.has_audio());
    assert_eq!(std::fs::read(&out).unwrap(), silent_bytes);
    // The temp file was folded into the final artifact.
    assert!(!silent.exists());
}

#[test]
fn non_zero_exit_keeps_the_silent_video_and_surfaces_the_diagnostic() {
    let scratch = Scratch::new("failing");
    let silent = scratch.file("talk_temp.mp4", b"frames");
    let audio = scratch.file("talk.wav", b"pcm");
    let out = scratch.path("talk.mp4");

    let outcome = mux_audio(&FailingTool, &silent, &audio, &out).unwrap();

    match outcome {
        MuxOutcome::Silent { ref detail, .. } => {
            assert!(detail.contains("Unknown encoder"), "detail = {detail}");
        }
        MuxOutcome::Muxed { .. } => panic!("expected degradation"),
    }
    assert_eq!(std::fs::read(&out).unwrap(), b"frames");
}

#[test]
fn successful_mux_deletes_the_silent_intermediate_only_after_output_exists() {
    let scratch = Scratch::new("success");
    let silent = scratch.file("talk_temp.mp4", b"frames");
    let audio = scratch.file("talk.wav", b"pcm");
    let out = scratch.path("talk.mp4");

    let outcome = mux_audio(&CopyTool, &silent, &audio, &out).unwrap();

    assert!(outcome.has_audio());
    assert_eq!(outcome.path(), out.as_path());
    assert!(out.exists());
    assert!(!silent.exists());
}

#[test]
fn rerunning_with_identical_inputs_overwrites_the_output() {
    let scratch = Scratch::new("idempotent");
    let audio = scratch.file("talk.wav", b"pcm");
    let out = scratch.path("talk.mp4");

    for _ in 0..2 {
        let silent = scratch.file("talk_temp.mp4", b"frames-v1");
        let outcome = mux_audio(&CopyTool, &silent, &audio, &out).unwrap();
        assert!(outcome.has_audio());
        assert_eq!(std::fs::read(&out).unwrap(), b"frames-v1");
    }
}
