//! `knowledge-types` – shared message types for the kitchen knowledge layer.
//!
//! Geometry messages mirror their ROS `geometry_msgs` counterparts so that
//! poses and points travel unchanged between the reasoning services, the
//! perception pipeline and external consumers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// The position of a point in free space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A vector in free space, always anchored at the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An orientation in quaternion form (x, y, z, w wire order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    /// The identity rotation.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// A pose in free space, composed of position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3,
    pub orientation: Quaternion,
}

/// Axis-aligned extents of a fixed object, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl From<BoundingBox> for Vector3 {
    /// Transport encoding: `x = width`, `y = height`, `z = depth`.
    fn from(bb: BoundingBox) -> Self {
        Vector3::new(bb.width, bb.height, bb.depth)
    }
}

/// Frame and time metadata attached to stamped messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Coordinate frame the payload is expressed in, e.g. `"/odom_combined"`.
    pub frame_id: String,
    pub stamp: DateTime<Utc>,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp: DateTime<Utc>) -> Self {
        Self {
            frame_id: frame_id.into(),
            stamp,
        }
    }
}

/// A point tagged with the frame it lives in and the time it was observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StampedPoint {
    pub header: Header,
    pub point: Point3,
}

impl StampedPoint {
    pub fn new(frame_id: impl Into<String>, stamp: DateTime<Utc>, point: Point3) -> Self {
        Self {
            header: Header::new(frame_id, stamp),
            point,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed kitchen objects
// ─────────────────────────────────────────────────────────────────────────────

/// One solution of the fixed-object query: a labelled pose and its extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedObjectResult {
    pub name: String,
    pub pose: Pose,
    pub bounding_box: BoundingBox,
}

/// Response of the fixed-object call.
///
/// The three lists are parallel: entry `i` of each describes the same object.
/// Every pose is expressed in `frame_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedObjectsResponse {
    pub frame_id: String,
    pub names: Vec<String>,
    pub poses: Vec<Pose>,
    pub bounding_boxes: Vec<Vector3>,
}

impl FixedObjectsResponse {
    /// Flatten `results` into parallel arrays, all tagged with `frame_id`.
    pub fn from_results(frame_id: impl Into<String>, results: Vec<FixedObjectResult>) -> Self {
        let mut response = Self {
            frame_id: frame_id.into(),
            names: Vec::with_capacity(results.len()),
            poses: Vec::with_capacity(results.len()),
            bounding_boxes: Vec::with_capacity(results.len()),
        };
        for result in results {
            response.names.push(result.name);
            response.poses.push(result.pose);
            response.bounding_boxes.push(result.bounding_box.into());
        }
        response
    }

    /// Number of objects in the response.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Poke position
// ─────────────────────────────────────────────────────────────────────────────

/// Approach direction for a poke.
///
/// Serialised as `"LEFT"` / `"RIGHT"`.  Any other token is accepted and maps
/// to [`Direction::Unspecified`], which the offset policy treats like `Left`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    Left,
    Right,
    #[default]
    Unspecified,
}

impl From<&str> for Direction {
    fn from(token: &str) -> Self {
        match token.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Direction::Left,
            "RIGHT" => Direction::Right,
            _ => Direction::Unspecified,
        }
    }
}

impl From<String> for Direction {
    fn from(token: String) -> Self {
        Direction::from(token.as_str())
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.to_string()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "LEFT"),
            Direction::Right => write!(f, "RIGHT"),
            Direction::Unspecified => write!(f, "UNSPECIFIED"),
        }
    }
}

/// Request of the poke-position call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokePositionRequest {
    /// Detected point, in whatever frame the sensor reported it.
    pub detection_point: StampedPoint,
    pub direction: Direction,
}

/// Response of the poke-position call.
///
/// An empty `error_message` signals success.  On failure `poke_position` is
/// left at its default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PokePositionResponse {
    pub poke_position: StampedPoint,
    pub error_message: String,
}

impl PokePositionResponse {
    pub fn is_success(&self) -> bool {
        self.error_message.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkpoints
// ─────────────────────────────────────────────────────────────────────────────

/// The three observable stages of the poke pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckpointKind {
    /// The point as received from vision.
    Vision,
    /// The point after the frame transform.
    Transformed,
    /// The final poke position.
    Knowledge,
}

impl CheckpointKind {
    /// All kinds, in pipeline order.
    pub const ALL: [CheckpointKind; 3] = [
        CheckpointKind::Vision,
        CheckpointKind::Transformed,
        CheckpointKind::Knowledge,
    ];

    /// Marker namespace used by visualisation consumers.
    pub fn namespace(self) -> &'static str {
        match self {
            CheckpointKind::Vision => "vision",
            CheckpointKind::Transformed => "transform",
            CheckpointKind::Knowledge => "knowledge",
        }
    }

    /// Marker colour used by visualisation consumers.
    pub fn color(self) -> MarkerColor {
        match self {
            CheckpointKind::Vision => MarkerColor::BLUE,
            CheckpointKind::Transformed => MarkerColor::WHITE,
            CheckpointKind::Knowledge => MarkerColor::PURPLE,
        }
    }
}

/// RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl MarkerColor {
    pub const BLUE: MarkerColor = MarkerColor { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const WHITE: MarkerColor = MarkerColor { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const PURPLE: MarkerColor = MarkerColor { r: 0.5, g: 0.0, b: 0.5, a: 1.0 };
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the checkpoint bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "knowledge-runtime::publisher"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` with a fresh id and the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// Latest value of one pipeline checkpoint.
    Checkpoint {
        kind: CheckpointKind,
        namespace: String,
        color: MarkerColor,
        point: StampedPoint,
    },
    /// A service call failed; diagnostic only.
    ServiceFault { service: String, message: String },
}

impl EventPayload {
    /// Build a checkpoint payload carrying the marker style for `kind`.
    pub fn checkpoint(kind: CheckpointKind, point: StampedPoint) -> Self {
        EventPayload::Checkpoint {
            kind,
            namespace: kind.namespace().to_string(),
            color: kind.color(),
            point,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error type shared by every crate in the knowledge layer.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KnowledgeError {
    #[error("Decode Type Mismatch: variable '{variable}' is {found}")]
    DecodeTypeMismatch { variable: String, found: String },

    #[error("No Results: query '{predicate}' returned no solutions")]
    NoResults { predicate: String },

    #[error("Transform Unavailable from '{source_frame}' to '{target_frame}': {reason}")]
    TransformUnavailable {
        source_frame: String,
        target_frame: String,
        reason: String,
    },

    #[error("Logic Engine Error: {0}")]
    Engine(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_maps_onto_vector3_in_order() {
        let bb = BoundingBox {
            width: 0.6,
            height: 0.9,
            depth: 0.58,
        };
        let v: Vector3 = bb.into();
        assert_eq!(v, Vector3::new(0.6, 0.9, 0.58));
    }

    #[test]
    fn fixed_objects_response_keeps_parallel_arrays() {
        let results = vec![
            FixedObjectResult {
                name: "IAIFridge".to_string(),
                pose: Pose::default(),
                bounding_box: BoundingBox {
                    width: 1.0,
                    height: 2.0,
                    depth: 3.0,
                },
            },
            FixedObjectResult {
                name: "IAIOven".to_string(),
                pose: Pose {
                    position: Point3::new(1.0, 0.0, 0.0),
                    orientation: Quaternion::default(),
                },
                bounding_box: BoundingBox::default(),
            },
        ];
        let response = FixedObjectsResponse::from_results("/map", results);
        assert_eq!(response.frame_id, "/map");
        assert_eq!(response.len(), 2);
        assert!(!response.is_empty());
        assert_eq!(response.names, vec!["IAIFridge", "IAIOven"]);
        assert_eq!(response.bounding_boxes[0], Vector3::new(1.0, 2.0, 3.0));
        assert!((response.poses[1].position.x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn response_without_results_is_empty() {
        let response = FixedObjectsResponse::from_results("/map", Vec::new());
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert_eq!(response.frame_id, "/map");
    }

    #[test]
    fn direction_parses_known_tokens_case_insensitively() {
        assert_eq!(Direction::from("left"), Direction::Left);
        assert_eq!(Direction::from("RIGHT"), Direction::Right);
        assert_eq!(Direction::from(" Right "), Direction::Right);
        assert_eq!(Direction::from("up"), Direction::Unspecified);
        assert_eq!(Direction::from(""), Direction::Unspecified);
    }

    #[test]
    fn direction_unknown_token_deserialises_to_unspecified() {
        let d: Direction = serde_json::from_str("\"DIAGONAL\"").unwrap();
        assert_eq!(d, Direction::Unspecified);
        let d: Direction = serde_json::from_str("\"LEFT\"").unwrap();
        assert_eq!(d, Direction::Left);
        assert_eq!(serde_json::to_string(&Direction::Right).unwrap(), "\"RIGHT\"");
    }

    #[test]
    fn response_success_tracks_error_message() {
        let ok = PokePositionResponse::default();
        assert!(ok.is_success());
        let failed = PokePositionResponse {
            error_message: "boom".to_string(),
            ..Default::default()
        };
        assert!(!failed.is_success());
    }

    #[test]
    fn default_stamped_point_is_empty() {
        let p = StampedPoint::default();
        assert!(p.header.frame_id.is_empty());
        assert_eq!(p.point, Point3::default());
    }

    #[test]
    fn checkpoint_payload_carries_marker_style() {
        let payload = EventPayload::checkpoint(CheckpointKind::Knowledge, StampedPoint::default());
        match payload {
            EventPayload::Checkpoint {
                kind,
                namespace,
                color,
                ..
            } => {
                assert_eq!(kind, CheckpointKind::Knowledge);
                assert_eq!(namespace, "knowledge");
                assert_eq!(color, MarkerColor::PURPLE);
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn event_roundtrip() {
        let event = Event::new(
            "knowledge-runtime::publisher",
            EventPayload::checkpoint(
                CheckpointKind::Vision,
                StampedPoint::new("/camera", Utc::now(), Point3::new(1.0, 2.0, 0.0)),
            ),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn knowledge_error_display() {
        let err = KnowledgeError::DecodeTypeMismatch {
            variable: "M00".to_string(),
            found: "missing".to_string(),
        };
        assert!(err.to_string().contains("M00"));

        let err = KnowledgeError::TransformUnavailable {
            source_frame: "/camera".to_string(),
            target_frame: "/odom_combined".to_string(),
            reason: "no path".to_string(),
        };
        assert!(err.to_string().contains("/odom_combined"));
    }
}
