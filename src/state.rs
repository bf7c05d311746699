//! Per-user conversation-state tracker.
//!
//! Menu actions that require a free-text follow-up arm a pending-input
//! state here; the next text message from that user consumes it. The map
//! lives only in process memory: a restart drops every in-flight
//! conversation and the affected user's next message is treated as a fresh
//! topic submission.

use dashmap::DashMap;

use crate::UserId;

/// What the next free-text message from a user will be interpreted as.
///
/// Each variant carries only the context its flow needs, so handler match
/// arms stay exhaustive under compiler control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingInput {
    /// Awaiting the body of a new topic.
    NewTopic,
    /// Awaiting a reply body for the given topic.
    Reply {
        /// Target topic.
        topic_id: i32,
    },
    /// Awaiting a new display name.
    ChangeUsername,
    /// Awaiting a report reason for the given topic.
    ReportTopic {
        /// Reported topic.
        topic_id: i32,
    },
    /// Awaiting a ban reason from the admin.
    BanReason {
        /// User the ban targets.
        target: UserId,
        /// Report that prompted the ban, if any.
        report_id: Option<i32>,
        /// Ban length in days; `None` bans indefinitely.
        days: Option<i64>,
    },
    /// Awaiting a deletion reason from the admin.
    DeleteReason {
        /// Topic to delete.
        topic_id: i32,
        /// Report that prompted the deletion, if any.
        report_id: Option<i32>,
    },
}

/// Concurrency-safe map of users to their pending input.
///
/// At most one state is kept per user; arming a new one silently replaces
/// the old. Two near-simultaneous events for the same user (a double-tap)
/// are serialised by the map, so a pending input is consumed exactly once.
#[derive(Debug, Default)]
pub struct ConversationMap {
    entries: DashMap<UserId, PendingInput>,
}

impl ConversationMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Arm a pending input for `user`, replacing any previous one.
    pub fn arm(&self, user: UserId, pending: PendingInput) {
        self.entries.insert(user, pending);
    }

    /// Remove and return the pending input for `user`, if any.
    pub fn take(&self, user: UserId) -> Option<PendingInput> {
        self.entries.remove(&user).map(|(_, pending)| pending)
    }

    /// Drop any pending input for `user`.
    pub fn clear(&self, user: UserId) {
        self.entries.remove(&user);
    }

    /// Number of users with an armed pending input.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether no pending input is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
