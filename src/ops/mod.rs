//! Domain rules engine.
//!
//! These operations compose the pure rules in [`crate::validate`] and
//! [`crate::ranks`] with the store access layer, returning closed outcome
//! enums instead of stringly-typed results so callers must handle every
//! case. Expected business refusals (banned, over quota, too short) are
//! outcomes, not errors; the error channel carries store failures only.

mod moderation;
mod profile;
mod replies;
mod topics;

#[cfg(test)]
mod tests;

pub use self::{
    moderation::{
        DeleteOutcome,
        ReportOutcome,
        ban_user,
        delete_topic_admin,
        file_report,
        is_banned,
        resolve_report,
        unban_user,
    },
    profile::{ProfileView, RenameOutcome, change_username, profile, toggle_notifications},
    replies::{ReplyOutcome, add_reply},
    topics::{
        CloseOutcome,
        TopicOutcome,
        close_topic,
        create_topic,
        delete_own_topic,
        remaining_topics_today,
    },
};
