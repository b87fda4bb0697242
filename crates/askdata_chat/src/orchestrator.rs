//! Request/response orchestration.
//!
//! This module provides the main entry point for asking questions,
//! coordinating between the store, the gateway and the notifier.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::StaleResponsePolicy;
use crate::error::ChatError;
use crate::gateway::QueryGateway;
use crate::store::StoreHandle;
use crate::types::{Message, NewMessage};

/// Title of the notification shown when a query fails.
pub const FAILURE_TITLE: &str = "Query failed";
/// Description of the notification shown when a query fails.
pub const FAILURE_DESCRIPTION: &str = "The request could not be completed. Please try again.";

/// A user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    /// The generic failure notice. Backend error text is never shown.
    pub fn query_failed() -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            description: FAILURE_DESCRIPTION.to_string(),
        }
    }
}

/// Receiver of user-visible notices, implemented by the render surface.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Result of one submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The answer was recorded.
    Answered(Message),
    /// The query failed; nothing but the question was recorded.
    Failed(ChatError),
    /// Blank input, nothing happened.
    Skipped,
    /// A newer submission or a clear superseded this one.
    Discarded,
}

impl SubmitOutcome {
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Answered(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Sequences one question through the gateway and into the history.
pub struct Orchestrator {
    store: StoreHandle,
    gateway: Arc<dyn QueryGateway>,
    notifier: Arc<dyn Notifier>,
    policy: StaleResponsePolicy,
    /// Token of the most recent submission.
    latest: AtomicU64,
    /// Tokens at or below this were issued before the last clear.
    cleared_at: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        store: StoreHandle,
        gateway: Arc<dyn QueryGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            policy: StaleResponsePolicy::default(),
            latest: AtomicU64::new(0),
            cleared_at: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: StaleResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Handle to the store this orchestrator writes to
    pub fn store(&self) -> StoreHandle {
        Arc::clone(&self.store)
    }

    pub fn policy(&self) -> StaleResponsePolicy {
        self.policy
    }

    pub fn is_loading(&self) -> bool {
        self.store.read().is_loading()
    }

    /// Ask a question.
    ///
    /// The question is recorded before the request starts. On success the
    /// answer is appended; on failure a generic notification is raised and
    /// nothing else is recorded. Loading is cleared either way.
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        let query = input.trim();
        if query.is_empty() {
            return SubmitOutcome::Skipped;
        }

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut store = self.store.write();
            store.append(NewMessage::user(query));
            store.set_loading(true);
        }
        info!(token, "Submitting query");

        let result = self.gateway.send(query).await;

        let is_latest = token == self.latest.load(Ordering::SeqCst);
        let stale = self.policy == StaleResponsePolicy::DropStale
            && (!is_latest || token <= self.cleared_at.load(Ordering::SeqCst));

        let outcome = {
            let mut store = self.store.write();

            let outcome = if stale {
                warn!(token, "Discarding response of a superseded query");
                SubmitOutcome::Discarded
            } else {
                match result {
                    Ok(answer) => SubmitOutcome::Answered(store.append(answer)),
                    Err(err) => {
                        warn!(token, kind = err.kind(), error = %err, "Query failed");
                        SubmitOutcome::Failed(err)
                    }
                }
            };

            if self.policy == StaleResponsePolicy::Append || is_latest {
                store.set_loading(false);
            }
            outcome
        };

        if outcome.is_failure() {
            self.notifier.notify(Notification::query_failed());
        }
        outcome
    }

    /// Clear the history. Under [`StaleResponsePolicy::DropStale`] queries
    /// still in flight will not append afterwards.
    pub fn clear(&self) {
        self.cleared_at
            .store(self.latest.load(Ordering::SeqCst), Ordering::SeqCst);
        self.store.write().clear();
    }
}
