//! Mock gateway and notifier for testing.
//!
//! Provides a scripted implementation of the QueryGateway trait so the
//! orchestrator and render surfaces can be exercised without a backend.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ChatError, ChatResult};
use crate::gateway::{normalize_response, QueryGateway};
use crate::orchestrator::{Notification, Notifier};
use crate::types::NewMessage;

/// Predefined outcome of one `send` call.
#[derive(Debug, Clone)]
pub struct MockReply {
    outcome: MockOutcome,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    /// Raw body, run through the real normalization.
    Body(String),
    /// Transport failure.
    Network(String),
}

impl MockReply {
    /// Reply with a raw JSON body.
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Body(body.into()),
            delay: None,
        }
    }

    /// Reply with a JSON value.
    pub fn json(value: serde_json::Value) -> Self {
        Self::body(value.to_string())
    }

    /// Fail as if the connection dropped.
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Network(message.into()),
            delay: None,
        }
    }

    /// Resolve only after `delay` has elapsed.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Scripted gateway for tests.
///
/// Replies are handed out in call order. Calls beyond the script fail with
/// a network error. Every query is captured for verification.
#[derive(Clone, Default)]
pub struct MockGateway {
    replies: Arc<RwLock<VecDeque<MockReply>>>,
    captured_queries: Arc<RwLock<Vec<String>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reply for the next unanswered call.
    pub fn add_reply(self, reply: MockReply) -> Self {
        self.replies.write().push_back(reply);
        self
    }

    /// Queries received so far, in call order.
    pub fn captured_queries(&self) -> Vec<String> {
        self.captured_queries.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_queries.read().len()
    }
}

#[async_trait]
impl QueryGateway for MockGateway {
    async fn send(&self, query: &str) -> ChatResult<NewMessage> {
        self.captured_queries.write().push(query.to_string());
        let reply = self.replies.write().pop_front();

        let Some(reply) = reply else {
            return Err(ChatError::NetworkFailure(
                "No mock reply configured".to_string(),
            ));
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        match reply.outcome {
            MockOutcome::Body(body) => normalize_response(&body),
            MockOutcome::Network(message) => Err(ChatError::NetworkFailure(message)),
        }
    }
}

/// Notifier that keeps every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.read().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.write().push(notification);
    }
}
