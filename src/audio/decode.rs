use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::{
    audio::{AudioBuffer, SAMPLE_RATE},
    error::{VoxfaceError, VoxfaceResult},
};

/// Extensions accepted at the upload boundary. Anything else is rejected
/// before it reaches the pipeline.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "flac"];

/// Upload-boundary contract: accept `.wav`, `.mp3`, `.flac` only.
pub fn validate_audio_extension(path: &Path) -> VoxfaceResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => Ok(()),
        _ => Err(VoxfaceError::input(format!(
            "unsupported audio format for '{}': use WAV, MP3, or FLAC",
            path.display()
        ))),
    }
}

/// Load an audio file as mono PCM at [`SAMPLE_RATE`], peak-normalized to
/// [-1, 1].
///
/// Errors are all `Input`: missing file, unsupported extension, undecodable
/// container, or zero decoded samples.
pub fn decode_audio(path: &Path) -> VoxfaceResult<AudioBuffer> {
    validate_audio_extension(path)?;

    if !path.exists() {
        return Err(VoxfaceError::input(format!(
            "audio file not found: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|e| {
        VoxfaceError::input(format!("failed to open '{}': {e}", path.display()))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            VoxfaceError::input(format!(
                "unrecognized audio container '{}': {e}",
                path.display()
            ))
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            VoxfaceError::input(format!("no decodable audio track in '{}'", path.display()))
        })?;
    let track_id = track.id;

    let src_rate = track.codec_params.sample_rate.ok_or_else(|| {
        VoxfaceError::input(format!("audio track missing sample rate: {}", path.display()))
    })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| {
            VoxfaceError::input(format!("unsupported audio codec in '{}': {e}", path.display()))
        })?;

    let mut mono = Vec::<f32>::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(VoxfaceError::input(format!(
                    "failed to read audio packet from '{}': {e}",
                    path.display()
                )));
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("skipping undecodable packet in '{}': {e}", path.display());
                continue;
            }
            Err(e) => {
                return Err(VoxfaceError::input(format!(
                    "failed to decode '{}': {e}",
                    path.display()
                )));
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        // Packet sizes can vary within a stream, so size the buffer per
        // packet.
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels <= 1 {
            mono.extend_from_slice(buf.samples());
        } else {
            for frame in buf.samples().chunks_exact(channels) {
                mono.push(frame.iter().sum::<f32>() / channels as f32);
            }
        }
    }

    if mono.is_empty() {
        return Err(VoxfaceError::input(format!(
            "audio file contains no samples: {}",
            path.display()
        )));
    }

    let resampled = resample_linear(&mono, src_rate, SAMPLE_RATE);
    Ok(AudioBuffer::new(peak_normalize(resampled), SAMPLE_RATE))
}

/// Linear-interpolation resample. Adequate for a 1-D speech signal feeding a
/// band-energy encoder; identity when the rates already match.
fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = ((input.len() as f64) / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = input[idx];
        let b = input[(idx + 1).min(input.len() - 1)];
        out.push(a + (b - a) * frac);
    }
    out
}

/// Normalize to [-1, 1] by peak: `s / (max|s| + 1e-6)`. An all-zero signal
/// stays all-zero.
fn peak_normalize(mut samples: Vec<f32>) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let scale = 1.0 / (peak + 1e-6);
    for s in &mut samples {
        *s *= scale;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_gate_accepts_supported_formats() {
        for name in ["a.wav", "b.mp3", "c.flac", "d.WAV"] {
            assert!(validate_audio_extension(&PathBuf::from(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn extension_gate_rejects_everything_else() {
        for name in ["a.ogg", "b.txt", "noext", "e.mp4"] {
            assert!(
                matches!(
                    validate_audio_extension(&PathBuf::from(name)),
                    Err(crate::VoxfaceError::Input(_))
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = decode_audio(&PathBuf::from("definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, crate::VoxfaceError::Input(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let input = vec![0.0, 0.5, -0.5, 1.0];
        assert_eq!(resample_linear(&input, 16_000, 16_000), input);
    }

    #[test]
    fn resample_halves_length_for_double_rate() {
        let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let out = resample_linear(&input, 32_000, 16_000);
        assert_eq!(out.len(), 50);
        // Even source positions land exactly on input samples.
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.0);
    }

    #[test]
    fn peak_normalize_bounds_and_preserves_zero() {
        let out = peak_normalize(vec![0.5, -2.0, 1.0]);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
        assert!((out[1] + 1.0).abs() < 1e-3);

        let zeros = peak_normalize(vec![0.0; 8]);
        assert!(zeros.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn decodes_a_minimal_wav_file() {
        // 16-bit PCM mono 16 kHz, 160 samples of silence.
        let samples: u32 = 160;
        let data_len = samples * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&32_000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.extend_from_slice(&vec![0u8; data_len as usize]);

        let path = std::env::temp_dir().join(format!(
            "voxface_decode_test_{}.wav",
            std::process::id()
        ));
        std::fs::write(&path, &wav).unwrap();

        let buf = decode_audio(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(buf.sample_rate(), SAMPLE_RATE);
        assert_eq!(buf.len(), samples as usize);
        assert!(buf.samples().iter().all(|s| *s == 0.0));
    }
}
