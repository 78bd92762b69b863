//! Topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels so that every subscriber receives
//! every message and a slow subscriber never blocks the others (it lags
//! instead).
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Checkpoints`] | Periodic re-publication of the three pipeline checkpoints |
//! | [`Topic::Diagnostics`] | Poke faults (failed transforms) |

use knowledge_types::{Event, KnowledgeError};
use tokio::sync::broadcast;

/// Default channel capacity (buffered events before slow subscribers lag).
const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Latest vision / transformed / knowledge checkpoint points.
    Checkpoints,
    /// Service faults worth surfacing to an operator.
    Diagnostics,
}

/// Shared event bus.  Clones share the same underlying channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    checkpoints: broadcast::Sender<Event>,
    diagnostics: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus whose topic channels each buffer `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (a [`broadcast`] requirement).
    pub fn new(capacity: usize) -> Self {
        let (checkpoints, _) = broadcast::channel(capacity);
        let (diagnostics, _) = broadcast::channel(capacity);
        Self {
            checkpoints,
            diagnostics,
        }
    }

    /// Publish `event` on `topic`.
    ///
    /// Returns the number of receivers handed the event, or
    /// [`KnowledgeError::Channel`] when nobody is subscribed to the topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, KnowledgeError> {
        self.sender(topic)
            .send(event)
            .map_err(|_| KnowledgeError::Channel(format!("No subscribers for topic {topic:?}")))
    }

    /// Subscribe to `topic`.  Only events published after this call are seen.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.sender(topic).subscribe(),
        }
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Checkpoints => &self.checkpoints,
            Topic::Diagnostics => &self.diagnostics,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Topic`].
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// * `Err(RecvError::Lagged(n))` – `n` events were dropped because this
    ///   receiver fell behind.  Receiving again continues from the oldest
    ///   retained event.
    /// * `Err(RecvError::Closed)` – every sender has been dropped.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }
}
