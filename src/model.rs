pub mod context;
pub mod stages;

use crate::error::{VoxfaceError, VoxfaceResult};

/// Speech feature dimension (speech stage output).
pub const FEATURE_DIM: usize = 256;
/// Expression parameter dimension, range [-1, 1].
pub const EXPRESSION_DIM: usize = 64;
/// Head motion dimension: pitch, yaw, roll.
pub const HEAD_DIM: usize = 3;
/// Eye motion dimension: x, y.
pub const EYE_DIM: usize = 2;

/// 256-d speech feature vector, shape-checked on construction.
#[derive(Clone, Debug)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn from_raw(values: Vec<f32>) -> VoxfaceResult<Self> {
        if values.len() != FEATURE_DIM {
            return Err(VoxfaceError::shape(format!(
                "speech stage produced {} values, expected {FEATURE_DIM}",
                values.len()
            )));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }
}

/// 64-d expression vector, range [-1, 1], shape-checked on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionVector(Vec<f32>);

impl ExpressionVector {
    pub fn from_raw(values: Vec<f32>) -> VoxfaceResult<Self> {
        if values.len() != EXPRESSION_DIM {
            return Err(VoxfaceError::shape(format!(
                "expression stage produced {} values, expected {EXPRESSION_DIM}",
                values.len()
            )));
        }
        Ok(Self(values))
    }

    pub fn zeros() -> Self {
        Self(vec![0.0; EXPRESSION_DIM])
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// `expression[0]` drives mouth opening, `expression[1]` the eyebrows.
    pub fn mouth_signal(&self) -> f32 {
        self.0[0]
    }

    pub fn eyebrow_signal(&self) -> f32 {
        self.0[1]
    }
}

/// Structured motion record: one fixed layout instead of the pair-or-flat
/// ambiguity at the renderer boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionVector {
    /// pitch, yaw, roll
    pub head: [f32; HEAD_DIM],
    /// x, y
    pub eye: [f32; EYE_DIM],
}

impl MotionVector {
    pub fn from_raw(head: Vec<f32>, eye: Vec<f32>) -> VoxfaceResult<Self> {
        let head: [f32; HEAD_DIM] = head.try_into().map_err(|v: Vec<f32>| {
            VoxfaceError::shape(format!(
                "motion stage produced {} head values, expected {HEAD_DIM}",
                v.len()
            ))
        })?;
        let eye: [f32; EYE_DIM] = eye.try_into().map_err(|v: Vec<f32>| {
            VoxfaceError::shape(format!(
                "motion stage produced {} eye values, expected {EYE_DIM}",
                v.len()
            ))
        })?;
        Ok(Self { head, eye })
    }

    pub fn pitch(&self) -> f32 {
        self.head[0]
    }

    pub fn yaw(&self) -> f32 {
        self.head[1]
    }

    pub fn eye_x(&self) -> f32 {
        self.eye[0]
    }

    pub fn eye_y(&self) -> f32 {
        self.eye[1]
    }
}
