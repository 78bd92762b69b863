//! WebSocket checkpoint feed.
//!
//! [`CheckpointFeed`] serves a WebSocket endpoint where visualisers receive
//! every event published on [`Topic::Checkpoints`] and
//! [`Topic::Diagnostics`], one JSON text frame per event.  Incoming frames
//! are ignored apart from `Close`.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use knowledge_types::{Event, KnowledgeError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::bus::{EventBus, Topic, TopicReceiver};

/// Serialise `event` the way it goes over the wire.
pub fn encode_event(event: &Event) -> Result<String, KnowledgeError> {
    serde_json::to_string(event).map_err(|e| KnowledgeError::Serialization(e.to_string()))
}

/// WebSocket endpoint streaming bus events to external clients.
#[derive(Clone)]
pub struct CheckpointFeed {
    bus: Arc<EventBus>,
}

impl CheckpointFeed {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Bind `addr` and serve clients until the task is dropped.
    ///
    /// # Errors
    ///
    /// [`KnowledgeError::Channel`] if the listener cannot be bound.
    pub async fn run(self, addr: SocketAddr) -> Result<(), KnowledgeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| KnowledgeError::Channel(format!("feed bind error on {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve clients on an already-bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), KnowledgeError> {
        if let Ok(local) = listener.local_addr() {
            info!(addr = %local, "checkpoint feed listening");
        }

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    // Subscribe before the handshake so no event published
                    // after the client connects is missed.
                    let checkpoints = self.bus.subscribe_to(Topic::Checkpoints);
                    let diagnostics = self.bus.subscribe_to(Topic::Diagnostics);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, peer, checkpoints, diagnostics).await {
                            error!(peer = %peer, error = %e, "feed client error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "feed accept error");
                }
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    mut checkpoints: TopicReceiver,
    mut diagnostics: TopicReceiver,
) -> Result<(), KnowledgeError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| KnowledgeError::Channel(format!("ws handshake from {peer}: {e}")))?;
    debug!(peer = %peer, "feed client connected");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        let received = tokio::select! {
            result = checkpoints.recv() => result,
            result = diagnostics.recv() => result,
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => continue,
                }
            }
        };

        match received {
            Ok(event) => {
                let json = encode_event(&event)?;
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(n)) => {
                warn!(peer = %peer, lagged_by = n, "feed client lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }

    debug!(peer = %peer, "feed client disconnected");
    Ok(())
}
