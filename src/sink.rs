use std::path::PathBuf;

use crate::{
    draw::FrameRgb,
    error::{VoxfaceError, VoxfaceResult},
};

/// Codec preference order, most-compatible first. The final fallback retries
/// the writer once with [`VideoCodec::DEFAULT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
    Xvid,
    Mjpeg,
    Mpeg4,
}

impl VideoCodec {
    pub const PREFERENCE: [VideoCodec; 4] = [
        VideoCodec::H264,
        VideoCodec::Xvid,
        VideoCodec::Mjpeg,
        VideoCodec::Mpeg4,
    ];

    pub const DEFAULT: VideoCodec = VideoCodec::Mpeg4;

    /// ffmpeg encoder name.
    pub fn encoder(self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::Xvid => "libxvid",
            VideoCodec::Mjpeg => "mjpeg",
            VideoCodec::Mpeg4 => "mpeg4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VideoCodec::H264 => "H.264 (best compatibility)",
            VideoCodec::Xvid => "Xvid",
            VideoCodec::Mjpeg => "Motion JPEG",
            VideoCodec::Mpeg4 => "MPEG-4",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
}

impl SinkConfig {
    pub fn validate(&self) -> VoxfaceResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VoxfaceError::input("sink width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(VoxfaceError::input("sink fps must be non-zero"));
        }
        Ok(())
    }
}

/// One opened video-writing resource, bound to a single codec for its
/// lifetime. Receives frames as packed BGR8.
pub trait FrameWriter {
    fn write_bgr(&mut self, data: &[u8]) -> VoxfaceResult<()>;
    fn finish(&mut self) -> VoxfaceResult<()>;
}

/// Result-returning writer factory: opening a codec either yields a writer
/// or a `Resource` error that the negotiation loop treats as data.
pub trait CodecFactory {
    fn open(&self, codec: VideoCodec, cfg: &SinkConfig)
    -> VoxfaceResult<Box<dyn FrameWriter>>;
}

/// Append-only ordered frame sink over a negotiated codec.
///
/// Opening walks [`VideoCodec::PREFERENCE`] and keeps the first writer that
/// initializes; if all preferred codecs fail, one final attempt is made with
/// [`VideoCodec::DEFAULT`], and that failure is `Fatal`. The codec never
/// changes after open.
pub struct FrameSink {
    writer: Box<dyn FrameWriter>,
    codec: VideoCodec,
    cfg: SinkConfig,
    frames_written: u64,
    finished: bool,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for FrameSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSink")
            .field("codec", &self.codec)
            .field("cfg", &self.cfg)
            .field("frames_written", &self.frames_written)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl FrameSink {
    pub fn open(factory: &dyn CodecFactory, cfg: SinkConfig) -> VoxfaceResult<Self> {
        cfg.validate()?;

        let mut writer = None;
        let mut chosen = VideoCodec::DEFAULT;
        for codec in VideoCodec::PREFERENCE {
            match factory.open(codec, &cfg) {
                Ok(w) => {
                    tracing::info!("using codec: {}", codec.label());
                    writer = Some(w);
                    chosen = codec;
                    break;
                }
                Err(e) => {
                    tracing::warn!("codec {} unavailable: {e}", codec.label());
                }
            }
        }

        let writer = match writer {
            Some(w) => w,
            // Last resort: one attempt with the fixed default. No further
            // fallback exists past this point.
            None => match factory.open(VideoCodec::DEFAULT, &cfg) {
                Ok(w) => {
                    tracing::info!("using default codec: {}", VideoCodec::DEFAULT.label());
                    w
                }
                Err(e) => {
                    return Err(VoxfaceError::fatal(format!(
                        "failed to open a video writer with any codec for '{}': {e}",
                        cfg.out_path.display()
                    )));
                }
            },
        };

        let scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 3];
        Ok(Self {
            writer,
            codec: chosen,
            cfg,
            frames_written: 0,
            finished: false,
            scratch,
        })
    }

    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append one frame in strict arrival order.
    ///
    /// Performs the mandatory RGB→BGR channel-order conversion before
    /// handing bytes to the writer.
    pub fn append(&mut self, frame: &FrameRgb) -> VoxfaceResult<()> {
        if self.finished {
            return Err(VoxfaceError::resource(
                "frame sink is already finalized",
            ));
        }
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(VoxfaceError::shape(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(VoxfaceError::shape(
                "frame data size mismatch with width*height*3",
            ));
        }

        for (dst, src) in self.scratch.chunks_exact_mut(3).zip(frame.data.chunks_exact(3)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }

        self.writer.write_bgr(&self.scratch)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Finalize the writer. Finalizes exactly once; calling `finish` again
    /// is a no-op returning `Ok`.
    pub fn finish(&mut self) -> VoxfaceResult<()> {
        if self.finished {
            return Ok(());
        }
        self.writer.finish()?;
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_order_and_default_match_the_contract() {
        assert_eq!(
            VideoCodec::PREFERENCE,
            [
                VideoCodec::H264,
                VideoCodec::Xvid,
                VideoCodec::Mjpeg,
                VideoCodec::Mpeg4
            ]
        );
        assert_eq!(VideoCodec::DEFAULT, VideoCodec::Mpeg4);
        assert_eq!(VideoCodec::H264.encoder(), "libx264");
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let bad = SinkConfig {
            width: 0,
            height: 256,
            fps: 30,
            out_path: PathBuf::from("out.mp4"),
        };
        assert!(bad.validate().is_err());

        let bad = SinkConfig {
            width: 256,
            height: 256,
            fps: 0,
            out_path: PathBuf::from("out.mp4"),
        };
        assert!(bad.validate().is_err());
    }
}
