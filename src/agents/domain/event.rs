//! Stream events and the per-turn event channel
//!
//! A turn is reported to the client as an append-only sequence of
//! newline-delimited JSON events: any number of `step` and `text` events
//! followed by exactly one terminal event (`done`, `error`, or
//! `pending_tool_calls`).

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::ToolCall;

/// Lifecycle of a progress step.
///
/// A step id is emitted twice, once `active` and once `done`; consumers key
/// on the id to update a single row rather than appending two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Active,
    Done,
}

/// One unit of the streaming protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Progress indicator for a logical unit of work
    Step {
        id: String,
        label: String,
        status: StepStatus,
    },
    /// Incremental output fragment; concatenation in emission order
    /// reconstructs the final answer
    Text { content: String },
    /// Terminal: turn finished, carries the complete trimmed text
    Done { text: String },
    /// Terminal: turn failed
    Error { message: String },
    /// Terminal for this request: tool calls await user approval
    PendingToolCalls {
        calls: Vec<ToolCall>,
        continuation: String,
    },
}

impl StreamEvent {
    pub fn step(id: impl Into<String>, label: impl Into<String>, status: StepStatus) -> Self {
        Self::Step {
            id: id.into(),
            label: label.into(),
            status,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn done(text: impl Into<String>) -> Self {
        Self::Done { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn pending(calls: Vec<ToolCall>, continuation: impl Into<String>) -> Self {
        Self::PendingToolCalls {
            calls,
            continuation: continuation.into(),
        }
    }

    /// Whether this event ends the request's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Error { .. } | Self::PendingToolCalls { .. }
        )
    }

    /// Serialize as one NDJSON line (JSON object plus trailing newline).
    pub fn to_ndjson(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"type":"error","message":"event serialization failed"}"#.to_string()
        });
        line.push('\n');
        line
    }
}

/// Streaming side of a turn, consumed by the HTTP layer.
pub struct EventStream {
    inner: ReceiverStream<StreamEvent>,
}

impl EventStream {
    /// Create a channel pair for building an event stream
    pub fn channel(buffer: usize) -> (EventSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            EventSender { sender: tx },
            Self {
                inner: ReceiverStream::new(rx),
            },
        )
    }

    /// Drain the stream into a vector. Used by tests and by callers that
    /// don't care about incremental delivery.
    pub async fn collect_all(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.inner.next().await {
            events.push(event);
        }
        events
    }
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Sender half for building an event stream
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<StreamEvent>,
}

impl EventSender {
    /// Send an event. An error means the receiver hung up, in which case
    /// the producing task should stop quietly.
    pub async fn send(&self, event: StreamEvent) -> Result<(), mpsc::error::SendError<StreamEvent>> {
        self.sender.send(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let step = StreamEvent::step("s1", "Thinking", StepStatus::Active);
        let v: serde_json::Value = serde_json::from_str(step.to_ndjson().trim()).unwrap();
        assert_eq!(v["type"], "step");
        assert_eq!(v["id"], "s1");
        assert_eq!(v["status"], "active");

        let done = StreamEvent::done("final answer");
        let v: serde_json::Value = serde_json::from_str(done.to_ndjson().trim()).unwrap();
        assert_eq!(v["type"], "done");
        assert_eq!(v["text"], "final answer");
    }

    #[test]
    fn test_terminal_classification() {
        assert!(StreamEvent::done("x").is_terminal());
        assert!(StreamEvent::error("x").is_terminal());
        assert!(StreamEvent::pending(vec![], "tok").is_terminal());
        assert!(!StreamEvent::text("x").is_terminal());
        assert!(!StreamEvent::step("a", "b", StepStatus::Done).is_terminal());
    }
}
