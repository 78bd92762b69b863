//! Checkpoint board.
//!
//! The poke pipeline records the latest point seen at each stage boundary.
//! [`CheckpointBoard`] wraps a [`tokio::sync::watch`] channel holding an
//! immutable [`Checkpoints`] snapshot: the request handler replaces one slot
//! at a time and readers clone the whole snapshot, so neither side ever waits
//! on the other for longer than a copy.

use std::sync::Arc;

use knowledge_types::{CheckpointKind, StampedPoint};
use tokio::sync::watch;

/// Latest point per stage.  `None` until the stage first produces a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoints {
    pub vision: Option<StampedPoint>,
    pub transformed: Option<StampedPoint>,
    pub knowledge: Option<StampedPoint>,
}

impl Checkpoints {
    pub fn get(&self, kind: CheckpointKind) -> Option<&StampedPoint> {
        match kind {
            CheckpointKind::Vision => self.vision.as_ref(),
            CheckpointKind::Transformed => self.transformed.as_ref(),
            CheckpointKind::Knowledge => self.knowledge.as_ref(),
        }
    }

    /// The value to publish for `kind`: the stored point, or a default
    /// stamped point if the stage has not run yet.
    pub fn published(&self, kind: CheckpointKind) -> StampedPoint {
        self.get(kind).cloned().unwrap_or_default()
    }

    fn slot_mut(&mut self, kind: CheckpointKind) -> &mut Option<StampedPoint> {
        match kind {
            CheckpointKind::Vision => &mut self.vision,
            CheckpointKind::Transformed => &mut self.transformed,
            CheckpointKind::Knowledge => &mut self.knowledge,
        }
    }
}

/// Shared holder of the current [`Checkpoints`].  Clones share state.
#[derive(Clone, Debug)]
pub struct CheckpointBoard {
    tx: Arc<watch::Sender<Checkpoints>>,
}

impl CheckpointBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Checkpoints::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the `kind` slot with `point`.
    pub fn record(&self, kind: CheckpointKind, point: StampedPoint) {
        // send_modify updates the value even with no receivers alive.
        self.tx.send_modify(|checkpoints| {
            *checkpoints.slot_mut(kind) = Some(point);
        });
    }

    /// A copy of the current checkpoints.
    pub fn snapshot(&self) -> Checkpoints {
        self.tx.borrow().clone()
    }
}

impl Default for CheckpointBoard {
    fn default() -> Self {
        Self::new()
    }
}
