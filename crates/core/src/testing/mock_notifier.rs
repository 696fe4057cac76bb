//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::{NotificationError, Notifier, SendReceipt, SendResult};

/// A recorded notification for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub movie_name: String,
    pub theatre_label: String,
    pub date: String,
}

/// Mock implementation of the Notifier trait.
///
/// Records every call, including ones configured to fail.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<SentAlert>>>,
    failure: Arc<RwLock<Option<NotificationError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail all subsequent sends with `error`, or succeed again with `None`.
    pub async fn set_failure(&self, error: Option<NotificationError>) {
        *self.failure.write().await = error;
    }

    pub async fn sent(&self) -> Vec<SentAlert> {
        self.sent.read().await.clone()
    }

    pub async fn send_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn notify(&self, movie_name: &str, theatre_label: &str, date: &str) -> SendResult {
        let mut sent = self.sent.write().await;
        sent.push(SentAlert {
            movie_name: movie_name.to_string(),
            theatre_label: theatre_label.to_string(),
            date: date.to_string(),
        });

        if let Some(error) = self.failure.read().await.clone() {
            return Err(error);
        }
        Ok(SendReceipt {
            message_id: format!("SM-mock-{}", sent.len()),
        })
    }
}
