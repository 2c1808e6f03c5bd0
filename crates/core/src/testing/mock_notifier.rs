//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notify::{NotificationPayload, Notifier, NotifyError};

/// Mock implementation of the Notifier trait.
///
/// Records every delivered payload. `set_next_error` makes the next
/// delivery fail once.
#[derive(Debug)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<NotificationPayload>>>,
    next_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Payloads delivered so far.
    pub async fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.read().await.clone()
    }

    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    pub async fn clear_recorded(&self) {
        self.sent.write().await.clear();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        if let Some(message) = self.next_error.write().await.take() {
            return Err(NotifyError::Delivery(message));
        }
        self.sent.write().await.push(payload.clone());
        Ok(())
    }
}
