//! `knowledge-middleware` – checkpoint routing.
//!
//! Carries checkpoint and diagnostic events from the poke pipeline to
//! whoever is watching, without interpreting them.
//!
//! # Modules
//!
//! - [`bus`] – topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.
//! - [`feed`] – WebSocket endpoint streaming checkpoint events to external
//!   visualisers as JSON.

pub mod bus;
pub mod feed;

pub use bus::{EventBus, Topic, TopicReceiver};
pub use feed::CheckpointFeed;
