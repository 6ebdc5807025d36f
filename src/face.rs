//! Procedural face compositor.
//!
//! Deterministic, non-learned geometry: for a given (expression, motion)
//! input the output raster is byte-identical across calls and across
//! processes. This is the reproducibility contract for the renderer; nothing
//! here may depend on time, randomness, or platform float quirks.
//!
//! The compositor emits RGB. The channel-order conversion the video writer
//! needs happens at the sink boundary, never here.

use crate::{
    draw::{BBox, FrameRgb, Rgb8, arc_lower_half, fill_ellipse, stroke_ellipse},
    model::{ExpressionVector, MotionVector},
};

pub const FRAME_WIDTH: u32 = 256;
pub const FRAME_HEIGHT: u32 = 256;

const BACKGROUND: Rgb8 = [240, 220, 200];
const FACE_FILL: Rgb8 = [255, 220, 180];
const FACE_OUTLINE: Rgb8 = [200, 160, 120];
const SCLERA: Rgb8 = [255, 255, 255];
const EYE_OUTLINE: Rgb8 = [0, 0, 0];
const PUPIL: Rgb8 = [50, 50, 200];
const NOSE: Rgb8 = [220, 180, 140];
const MOUTH_FILL: Rgb8 = [180, 80, 80];
const MOUTH_OUTLINE: Rgb8 = [150, 50, 50];
const EYEBROW: Rgb8 = [100, 70, 50];

const FACE_RADIUS: i32 = 80;

/// Mouth opens strictly above this; `mouth_open == 0.3` exactly renders the
/// closed-mouth arc.
const MOUTH_OPEN_THRESHOLD: f32 = 0.3;

#[derive(Clone, Copy, Debug, Default)]
pub struct FaceRenderer;

impl FaceRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Composite one avatar frame from expression and motion parameters.
    pub fn render(&self, expression: &ExpressionVector, motion: &MotionVector) -> FrameRgb {
        let mut frame = FrameRgb::filled(FRAME_WIDTH, FRAME_HEIGHT, BACKGROUND);

        // Head motion shifts the whole face.
        let cx = 128 + (motion.yaw() * 20.0).round() as i32;
        let cy = 128 + (motion.pitch() * 20.0).round() as i32;

        stroke_and_fill(
            &mut frame,
            BBox::new(cx - FACE_RADIUS, cy - FACE_RADIUS, cx + FACE_RADIUS, cy + FACE_RADIUS),
            FACE_FILL,
            FACE_OUTLINE,
            3,
        );

        // Truncated toward zero, like the mouth and eyebrow quantization;
        // only the face center rounds.
        let eye_dx = (motion.eye_x() * 10.0) as i32;
        let eye_dy = (motion.eye_y() * 10.0) as i32;
        let left_eye = (cx - 30 + eye_dx, cy - 20 + eye_dy);
        let right_eye = (cx + 30 + eye_dx, cy - 20 + eye_dy);
        for (ex, ey) in [left_eye, right_eye] {
            stroke_and_fill(
                &mut frame,
                BBox::new(ex - 10, ey - 8, ex + 10, ey + 8),
                SCLERA,
                EYE_OUTLINE,
                2,
            );
            fill_ellipse(&mut frame, BBox::new(ex - 5, ey - 5, ex + 5, ey + 5), PUPIL);
        }

        let nose_y = cy + 10;
        fill_ellipse(
            &mut frame,
            BBox::new(cx - 8, nose_y - 5, cx + 8, nose_y + 15),
            NOSE,
        );

        // The one branch in the algorithm: talking mouth vs. smile.
        let mouth_open = expression.mouth_signal().abs() * 30.0;
        let mouth_y = cy + 40;
        if mouth_open > MOUTH_OPEN_THRESHOLD {
            stroke_and_fill(
                &mut frame,
                BBox::new(cx - 25, mouth_y - 10, cx + 25, mouth_y + mouth_open as i32),
                MOUTH_FILL,
                MOUTH_OUTLINE,
                2,
            );
        } else {
            arc_lower_half(
                &mut frame,
                BBox::new(cx - 25, mouth_y - 10, cx + 25, mouth_y + 10),
                MOUTH_OUTLINE,
                3,
            );
        }

        let eyebrow_raise = (expression.eyebrow_signal() * 10.0) as i32;
        for (ex, ey) in [left_eye, right_eye] {
            arc_lower_half(
                &mut frame,
                BBox::new(
                    ex - 15,
                    ey - 20 - eyebrow_raise,
                    ex + 15,
                    ey - 10 - eyebrow_raise,
                ),
                EYEBROW,
                3,
            );
        }

        frame
    }
}

fn stroke_and_fill(frame: &mut FrameRgb, bbox: BBox, fill: Rgb8, outline: Rgb8, width: u32) {
    fill_ellipse(frame, bbox, fill);
    stroke_ellipse(frame, bbox, outline, width);
}
