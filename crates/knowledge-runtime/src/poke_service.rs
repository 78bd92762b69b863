//! [`PokePositionService`] – where should the gripper poke?
//!
//! One call runs the pipeline
//!
//! ```text
//! detection point ──► Vision ──► transform ──► Transformed ──► offset ──► Knowledge
//! ```
//!
//! recording a checkpoint at each arrow head.  A transform failure is not an
//! `Err`: the caller gets a response whose `error_message` is set and whose
//! `poke_position` is the default, and the Transformed and Knowledge
//! checkpoints keep their previous values.

use std::sync::Arc;

use knowledge_middleware::{EventBus, Topic};
use knowledge_perception::{FrameTransformStage, apply_offset};
use knowledge_types::{
    CheckpointKind, Event, EventPayload, PokePositionRequest, PokePositionResponse, StampedPoint,
};
use tracing::{info, instrument, warn};

use crate::checkpoints::CheckpointBoard;

/// Name under which the service reports faults.
pub const SERVICE_NAME: &str = "calculate_poke_position";

/// `error_message` of a response whose transform failed.
pub const TRANSFORM_FAILED_MESSAGE: &str =
    "Failed to call service 'calculate_poke_position'. Transformation failed!";

const EVENT_SOURCE: &str = "knowledge-runtime::poke_service";

pub struct PokePositionService {
    stage: FrameTransformStage,
    board: CheckpointBoard,
    diagnostics: Option<Arc<EventBus>>,
}

impl PokePositionService {
    pub fn new(stage: FrameTransformStage, board: CheckpointBoard) -> Self {
        Self {
            stage,
            board,
            diagnostics: None,
        }
    }

    /// Also publish a [`EventPayload::ServiceFault`] on
    /// [`Topic::Diagnostics`] whenever a transform fails.
    pub fn with_diagnostics(mut self, bus: Arc<EventBus>) -> Self {
        self.diagnostics = Some(bus);
        self
    }

    pub fn board(&self) -> &CheckpointBoard {
        &self.board
    }

    pub fn target_frame(&self) -> &str {
        self.stage.target_frame()
    }

    #[instrument(
        skip(self, request),
        fields(
            frame_id = %request.detection_point.header.frame_id,
            direction = %request.direction,
        )
    )]
    pub fn calculate_poke_position(&self, request: &PokePositionRequest) -> PokePositionResponse {
        let detection = &request.detection_point;
        info!(
            x = detection.point.x,
            y = detection.point.y,
            z = detection.point.z,
            "poke position requested"
        );
        self.board.record(CheckpointKind::Vision, detection.clone());

        let transformed = match self.stage.transform(detection) {
            Ok(point) => point,
            Err(e) => {
                warn!(error = %e, "poke position unavailable");
                self.report_fault(&e.to_string());
                return PokePositionResponse {
                    poke_position: StampedPoint::default(),
                    error_message: TRANSFORM_FAILED_MESSAGE.to_string(),
                };
            }
        };
        self.board.record(CheckpointKind::Transformed, transformed.clone());

        let poke_position = StampedPoint {
            header: transformed.header,
            point: apply_offset(transformed.point, request.direction),
        };
        self.board.record(CheckpointKind::Knowledge, poke_position.clone());

        info!(
            frame_id = %poke_position.header.frame_id,
            x = poke_position.point.x,
            y = poke_position.point.y,
            z = poke_position.point.z,
            "poke position computed"
        );
        PokePositionResponse {
            poke_position,
            error_message: String::new(),
        }
    }

    fn report_fault(&self, message: &str) {
        let Some(bus) = &self.diagnostics else {
            return;
        };
        let event = Event::new(
            EVENT_SOURCE,
            EventPayload::ServiceFault {
                service: SERVICE_NAME.to_string(),
                message: message.to_string(),
            },
        );
        // Nobody listening is fine.
        let _ = bus.publish_to(Topic::Diagnostics, event);
    }
}
