//! Outbound notification seam between the core and the dispatcher.
//!
//! Domain operations emit notifications through the [`Notifier`] trait so
//! they never couple to a transport. Delivery failure (a user who blocked
//! the bot, a closed session) is reported to the caller, which logs and
//! swallows it; a failed notification never fails the triggering action.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Mutex;
use thiserror::Error;

use crate::UserId;

/// Asynchronous notice pushed to a user outside a request/reply exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Someone replied to the user's topic.
    ReplyReceived {
        /// Topic that received the reply.
        topic_id: i32,
        /// Leading characters of the reply body.
        preview: String,
    },
    /// The user was banned.
    Banned {
        /// Reason recorded by the admin.
        reason: String,
        /// Expiry; `None` means indefinite.
        until: Option<NaiveDateTime>,
    },
    /// The user's topic was removed by the admin.
    TopicDeleted {
        /// Removed topic.
        topic_id: i32,
        /// Reason recorded by the admin.
        reason: String,
    },
}

impl Notification {
    /// Action token a dispatcher may attach to the notice, linking back to
    /// the relevant entity.
    #[must_use]
    pub fn link_token(&self) -> Option<String> {
        match self {
            Self::ReplyReceived { topic_id, .. } => Some(format!("topic:{topic_id}:0")),
            Self::Banned { .. } | Self::TopicDeleted { .. } => None,
        }
    }
}

/// Errors an adapter may report when pushing a notice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// No live session is known for the target user.
    #[error("no session for user")]
    Unreachable,
    /// The target session's queue has been closed.
    #[error("session closed")]
    Closed,
}

/// Adapter that delivers notifications to users.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Push a notice to `user`.
    ///
    /// # Errors
    /// Returns a [`NotifyError`] when the notice cannot be delivered.
    async fn notify(&self, user: UserId, note: Notification) -> Result<(), NotifyError>;
}

/// Notifier that drops every notice; used when no outbound path exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _user: UserId, _note: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that records every notice for inspection in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, Notification)>>,
    /// When set, every push fails with [`NotifyError::Unreachable`].
    pub fail: bool,
}

impl RecordingNotifier {
    /// Create a recorder that accepts every notice.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a recorder whose pushes all fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of the notices accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(UserId, Notification)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user: UserId, note: Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Unreachable);
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((user, note));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recorder_captures_notices() {
        let recorder = RecordingNotifier::new();
        recorder
            .notify(
                5,
                Notification::ReplyReceived {
                    topic_id: 3,
                    preview: "hi".into(),
                },
            )
            .await
            .expect("accepts notice");
        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 5);
    }

    #[tokio::test]
    async fn failing_recorder_reports_unreachable() {
        let recorder = RecordingNotifier::failing();
        let err = recorder
            .notify(
                5,
                Notification::Banned {
                    reason: "spam".into(),
                    until: None,
                },
            )
            .await
            .expect_err("push should fail");
        assert_eq!(err, NotifyError::Unreachable);
        assert!(recorder.sent().is_empty());
    }

    #[test]
    fn reply_notice_links_back_to_the_topic() {
        let note = Notification::ReplyReceived {
            topic_id: 42,
            preview: String::new(),
        };
        assert_eq!(note.link_token().as_deref(), Some("topic:42:0"));
    }
}
