//! Reply creation and the author notification hook.

use chrono::NaiveDateTime;
use tracing::warn;

use super::moderation::is_banned;
use crate::{
    UserId,
    db::{self, DbConnection},
    error::{BoardResult, ValidationError},
    models::NewReply,
    notify::{Notification, Notifier},
    validate::{REPLY_MAX, REPLY_MIN, check_length, normalise},
};

/// Leading characters of a reply body included in the author's notice.
const PREVIEW_CHARS: usize = 200;

/// Result of a reply submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Reply stored under the returned id.
    Created(i32),
    /// The replier has a ban in force.
    Banned,
    /// Normalized body fell below the minimum length.
    TooShort,
    /// Normalized body exceeded the maximum length.
    TooLong,
    /// No topic with that id exists.
    NotFound,
    /// The topic exists but was closed by its author.
    Closed,
}

/// Add a reply to a topic, updating both parties' counters.
///
/// On success the topic's `updated_at` is touched, the replier's
/// `replies_written` and the author's `replies_received` are bumped. When
/// the replier is not the author and the author keeps notifications on, a
/// [`Notification::ReplyReceived`] is pushed; a notification that cannot
/// be delivered is logged and dropped, never failing the reply.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn add_reply(
    conn: &mut DbConnection,
    notifier: &dyn Notifier,
    topic_id: i32,
    user: UserId,
    text: &str,
    now: NaiveDateTime,
) -> BoardResult<ReplyOutcome> {
    if is_banned(conn, user, now).await? {
        return Ok(ReplyOutcome::Banned);
    }
    let Some(topic) = db::get_topic_any(conn, topic_id).await? else {
        return Ok(ReplyOutcome::NotFound);
    };
    if !topic.is_active {
        return Ok(ReplyOutcome::Closed);
    }
    let body = normalise(text);
    match check_length(&body, REPLY_MIN, REPLY_MAX) {
        Err(ValidationError::TooShort { .. }) => return Ok(ReplyOutcome::TooShort),
        Err(_) => return Ok(ReplyOutcome::TooLong),
        Ok(()) => {}
    }

    let reply = NewReply {
        topic_id,
        user_id: user,
        body: &body,
        created_at: now,
    };
    let id = db::create_reply(conn, &reply).await?;
    db::touch_topic(conn, topic_id, now).await?;
    db::record_reply_written(conn, user, now).await?;
    db::record_reply_received(conn, topic.user_id, now).await?;

    if topic.user_id != user && db::reply_notifications_enabled(conn, topic.user_id).await? {
        let note = Notification::ReplyReceived {
            topic_id,
            preview: body.chars().take(PREVIEW_CHARS).collect(),
        };
        if let Err(err) = notifier.notify(topic.user_id, note).await {
            warn!(%err, author = topic.user_id, topic_id, "reply notification dropped");
        }
    }
    Ok(ReplyOutcome::Created(id))
}
