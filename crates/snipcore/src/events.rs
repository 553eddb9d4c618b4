//! Execution event bus: the reporting surface toward the shell/backend.
//!
//! The host guarantees it emits well-formed events; delivery and display
//! are the subscriber's concern. Lagging subscribers drop events rather
//! than block execution.

use crate::{GraphId, NodeId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// Events emitted during node and graph execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    GraphStarted {
        execution_id: ExecutionId,
        graph_id: GraphId,
        timestamp: DateTime<Utc>,
    },
    GraphCompleted {
        execution_id: ExecutionId,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeStarted {
        execution_id: ExecutionId,
        node_id: NodeId,
        snippet_id: String,
        timestamp: DateTime<Utc>,
    },
    NodeSucceeded {
        execution_id: ExecutionId,
        node_id: NodeId,
        outputs: HashMap<String, Value>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeFailed {
        execution_id: ExecutionId,
        node_id: NodeId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    NodeLog {
        execution_id: ExecutionId,
        node_id: NodeId,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus carrying execution events to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    /// Fire-and-forget; a bus with no subscribers is not an error.
    pub fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }
}
