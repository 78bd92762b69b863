//! `knowledge-perception` – from sensor frames to action points.
//!
//! # Modules
//!
//! - [`transform`] – [`TfEngine`][transform::TfEngine]: directed graph of
//!   named reference frames plus the quaternion math used to compose and
//!   invert rigid-body transforms, and to recover a rotation from a 3x3
//!   matrix.
//! - [`frame_stage`] – [`FrameTransformStage`][frame_stage::FrameTransformStage]:
//!   re-expresses a stamped point in the canonical frame through any
//!   [`TransformLookup`][frame_stage::TransformLookup] implementation.
//! - [`offset`] – [`apply_offset`][offset::apply_offset]: the fixed,
//!   direction-keyed displacement from a perceived point to a poke point.

pub mod frame_stage;
pub mod offset;
pub mod transform;

pub use frame_stage::{FrameTransformStage, TransformLookup};
pub use offset::apply_offset;
pub use transform::{Quaternion, TfEngine, Transform3D, Vec3};
