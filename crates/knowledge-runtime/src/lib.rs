//! `knowledge-runtime` – the poke pipeline and its observers.
//!
//! # Modules
//!
//! - [`checkpoints`] – [`CheckpointBoard`][checkpoints::CheckpointBoard]:
//!   the latest Vision / Transformed / Knowledge points, shared between the
//!   request handler and the publisher through a `watch` channel.
//! - [`poke_service`] – [`PokePositionService`][poke_service::PokePositionService]:
//!   transform → offset → response, recording a checkpoint at each stage.
//! - [`publisher`] – [`CheckpointPublisher`][publisher::CheckpointPublisher]:
//!   fixed-rate task re-publishing the checkpoints on the event bus.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with an optional OTLP span exporter.

pub mod checkpoints;
pub mod poke_service;
pub mod publisher;
pub mod telemetry;

pub use checkpoints::{CheckpointBoard, Checkpoints};
pub use poke_service::{PokePositionService, TRANSFORM_FAILED_MESSAGE};
pub use publisher::CheckpointPublisher;
pub use telemetry::{TracerProviderGuard, init_tracing};
