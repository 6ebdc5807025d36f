use std::sync::OnceLock;

use crate::{
    face::FaceRenderer,
    model::stages::{
        BandEnergyEncoder, ExpressionStage, MotionStage, PooledExpressionMapper,
        PooledMotionMapper, SpeechStage,
    },
};

/// The four cached stage transforms.
///
/// Constructed once by the top-level caller and passed by reference into the
/// pipeline; read-only after construction, so sharing it across threads needs
/// no locking beyond the one-time initialization in [`ModelContext::shared`].
pub struct ModelContext {
    speech: Box<dyn SpeechStage>,
    expression: Box<dyn ExpressionStage>,
    motion: Box<dyn MotionStage>,
    renderer: FaceRenderer,
}

impl ModelContext {
    pub fn new(
        speech: Box<dyn SpeechStage>,
        expression: Box<dyn ExpressionStage>,
        motion: Box<dyn MotionStage>,
        renderer: FaceRenderer,
    ) -> Self {
        Self {
            speech,
            expression,
            motion,
            renderer,
        }
    }

    /// Context wired with the deterministic reference stages.
    pub fn with_reference_stages() -> Self {
        Self::new(
            Box::new(BandEnergyEncoder),
            Box::new(PooledExpressionMapper),
            Box::new(PooledMotionMapper),
            FaceRenderer::new(),
        )
    }

    /// Process-wide shared context with the reference stages.
    ///
    /// First call constructs the stages; every subsequent call returns the
    /// identical instance. Concurrent first access is guarded by `OnceLock`,
    /// so construction happens exactly once.
    pub fn shared() -> &'static ModelContext {
        static SHARED: OnceLock<ModelContext> = OnceLock::new();
        SHARED.get_or_init(ModelContext::with_reference_stages)
    }

    pub fn speech(&self) -> &dyn SpeechStage {
        self.speech.as_ref()
    }

    pub fn expression(&self) -> &dyn ExpressionStage {
        self.expression.as_ref()
    }

    pub fn motion(&self) -> &dyn MotionStage {
        self.motion.as_ref()
    }

    pub fn renderer(&self) -> &FaceRenderer {
        &self.renderer
    }
}
