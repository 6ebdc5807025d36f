use std::path::Path;

use crate::{
    audio::{SAMPLE_RATE, WINDOW_SIZE},
    error::{VoxfaceError, VoxfaceResult},
    face::{FRAME_HEIGHT, FRAME_WIDTH},
    model::{EXPRESSION_DIM, EYE_DIM, FEATURE_DIM, HEAD_DIM},
};

/// Persisted pipeline configuration: target frame rate plus the stage
/// shape-contract table. The shapes are recorded so a config written by one
/// build can be rejected (rather than silently misread) by a build whose
/// compiled-in contracts differ.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub shapes: StageShapes,
}

fn default_fps() -> u32 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            shapes: StageShapes::default(),
        }
    }
}

/// Shape-contract table: one entry per fixed dimension in the chain.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageShapes {
    pub window_samples: usize,
    pub sample_rate: u32,
    pub feature_dim: usize,
    pub expression_dim: usize,
    pub head_dim: usize,
    pub eye_dim: usize,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for StageShapes {
    fn default() -> Self {
        Self {
            window_samples: WINDOW_SIZE,
            sample_rate: SAMPLE_RATE,
            feature_dim: FEATURE_DIM,
            expression_dim: EXPRESSION_DIM,
            head_dim: HEAD_DIM,
            eye_dim: EYE_DIM,
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> VoxfaceResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| VoxfaceError::input(format!("malformed config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> VoxfaceResult<()> {
        if self.fps == 0 {
            return Err(VoxfaceError::input("config fps must be non-zero"));
        }
        if self.shapes != StageShapes::default() {
            return Err(VoxfaceError::input(format!(
                "config shape table does not match this build's stage contracts: {:?}",
                self.shapes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = PipelineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.shapes, StageShapes::default());
    }

    #[test]
    fn mismatched_shape_table_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.shapes.feature_dim = 512;
        assert!(matches!(
            cfg.validate(),
            Err(crate::VoxfaceError::Input(_))
        ));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let cfg = PipelineConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
