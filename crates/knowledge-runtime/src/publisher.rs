//! Fixed-rate checkpoint publisher.
//!
//! Every tick the [`CheckpointPublisher`] takes a snapshot of the
//! [`CheckpointBoard`] and publishes one [`EventPayload::Checkpoint`] per
//! kind on [`Topic::Checkpoints`].  Stages that have not produced a value yet
//! are published as a default stamped point so consumers always see all
//! three markers.
//!
//! The publisher only ever reads the board, so request handling never waits
//! on it.

use std::sync::Arc;
use std::time::Duration;

use knowledge_middleware::{EventBus, Topic};
use knowledge_types::{CheckpointKind, Event, EventPayload, KnowledgeError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::checkpoints::CheckpointBoard;

/// Default publication rate.
pub const DEFAULT_RATE_HZ: f64 = 10.0;

const EVENT_SOURCE: &str = "knowledge-runtime::publisher";

pub struct CheckpointPublisher {
    board: CheckpointBoard,
    bus: Arc<EventBus>,
    period: Duration,
}

impl CheckpointPublisher {
    /// Publisher ticking `rate_hz` times per second.
    ///
    /// # Errors
    ///
    /// [`KnowledgeError::Config`] if `rate_hz` is not a positive finite
    /// number, or is so small that its period does not fit a [`Duration`].
    pub fn new(board: CheckpointBoard, bus: Arc<EventBus>, rate_hz: f64) -> Result<Self, KnowledgeError> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(KnowledgeError::Config(format!(
                "publish rate must be a positive number of Hz, got {rate_hz}"
            )));
        }
        let period = Duration::try_from_secs_f64(1.0 / rate_hz).map_err(|e| {
            KnowledgeError::Config(format!("publish rate {rate_hz} Hz gives no usable period: {e}"))
        })?;
        Ok(Self { board, bus, period })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Publish the current checkpoints once.  Returns how many events
    /// reached at least one subscriber.
    pub fn publish_once(&self) -> usize {
        let snapshot = self.board.snapshot();
        let mut delivered = 0;
        for kind in CheckpointKind::ALL {
            let event = Event::new(EVENT_SOURCE, EventPayload::checkpoint(kind, snapshot.published(kind)));
            // No subscribers is the normal idle state.
            if self.bus.publish_to(Topic::Checkpoints, event).is_ok() {
                delivered += 1;
            }
        }
        debug!(delivered, "checkpoints published");
        delivered
    }

    /// Publish every period until `shutdown` becomes `true` or its sender
    /// is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(period_ms = self.period.as_millis() as u64, "checkpoint publisher started");
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.publish_once();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("checkpoint publisher stopped");
    }
}
