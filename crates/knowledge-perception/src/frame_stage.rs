//! Frame Transform Stage.
//!
//! Re-expresses a perceived point in the canonical, world-stable frame.  The
//! actual frame math lives behind [`TransformLookup`], so the stage works the
//! same against the in-process [`TfEngine`][crate::transform::TfEngine] and
//! against an external transform service.

use knowledge_types::{KnowledgeError, StampedPoint};
use tracing::warn;

/// Frame the poke pipeline works in unless configured otherwise.
pub const DEFAULT_TARGET_FRAME: &str = "/odom_combined";

/// A transform-tree service keyed by (source frame, target frame, stamp).
///
/// Implementations should report disconnected frames, unknown frames and
/// stamps outside the buffered history as
/// [`KnowledgeError::TransformUnavailable`].  Any other error is folded into
/// that variant by [`FrameTransformStage`].
pub trait TransformLookup: Send + Sync {
    /// Map `point` from its own header frame into `target_frame`.
    fn transform_point(
        &self,
        target_frame: &str,
        point: &StampedPoint,
    ) -> Result<StampedPoint, KnowledgeError>;
}

/// Maps stamped points into one fixed target frame.
pub struct FrameTransformStage {
    lookup: Box<dyn TransformLookup>,
    target_frame: String,
}

impl FrameTransformStage {
    pub fn new(lookup: Box<dyn TransformLookup>, target_frame: impl Into<String>) -> Self {
        Self {
            lookup,
            target_frame: target_frame.into(),
        }
    }

    /// The canonical frame every output is expressed in.
    pub fn target_frame(&self) -> &str {
        &self.target_frame
    }

    /// Transform `point` into the configured target frame.
    ///
    /// Fails once with [`KnowledgeError::TransformUnavailable`]; there is no
    /// retry.
    pub fn transform(&self, point: &StampedPoint) -> Result<StampedPoint, KnowledgeError> {
        self.transform_to(point, &self.target_frame)
    }

    /// Transform `point` into an explicit `target_frame`.
    pub fn transform_to(
        &self,
        point: &StampedPoint,
        target_frame: &str,
    ) -> Result<StampedPoint, KnowledgeError> {
        let mut transformed = self
            .lookup
            .transform_point(target_frame, point)
            .map_err(|e| {
                warn!(
                    source = %point.header.frame_id,
                    target = target_frame,
                    error = %e,
                    "transform lookup failed"
                );
                match e {
                    KnowledgeError::TransformUnavailable { .. } => e,
                    other => KnowledgeError::TransformUnavailable {
                        source_frame: point.header.frame_id.clone(),
                        target_frame: target_frame.to_string(),
                        reason: other.to_string(),
                    },
                }
            })?;
        // Downstream consumers key on the frame we asked for, not on however
        // the lookup spelled it.
        transformed.header.frame_id = target_frame.to_string();
        Ok(transformed)
    }
}
