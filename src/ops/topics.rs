//! Topic creation, quota accounting, and author-side lifecycle.

use chrono::{NaiveDate, NaiveDateTime};

use super::moderation::is_banned;
use crate::{
    UserId,
    db::{self, DbConnection},
    error::{BoardResult, ValidationError},
    models::NewTopic,
    validate::{DAILY_TOPIC_LIMIT, TOPIC_MAX, TOPIC_MIN, check_length, normalise},
};

/// Result of a topic submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOutcome {
    /// Topic stored under the returned id.
    Created(i32),
    /// The author has a ban in force.
    Banned,
    /// The author exhausted today's quota.
    LimitReached,
    /// Normalized body fell below the minimum length.
    TooShort,
    /// Normalized body exceeded the maximum length.
    TooLong,
}

/// Result of an author closing or deleting their own topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The topic was closed or removed.
    Done,
    /// No such active topic.
    NotFound,
    /// The acting user does not own the topic.
    NotAuthor,
}

/// Quota snapshot for `user` on `day`: `(remaining, used)`.
///
/// Side-effect free; an absent daily row counts as zero used.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn remaining_topics_today(
    conn: &mut DbConnection,
    user: UserId,
    day: NaiveDate,
) -> BoardResult<(i32, i32)> {
    let used = db::topics_created_on(conn, user, day).await?;
    Ok(((DAILY_TOPIC_LIMIT - used).max(0), used))
}

/// Create a topic for `user`, enforcing ban, quota, and length rules.
///
/// Checks run in that order, so a banned user is told so even when also
/// over quota. On success the daily counter and `topics_created` are both
/// bumped; on any refusal nothing is written.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn create_topic(
    conn: &mut DbConnection,
    user: UserId,
    text: &str,
    now: NaiveDateTime,
) -> BoardResult<TopicOutcome> {
    if is_banned(conn, user, now).await? {
        return Ok(TopicOutcome::Banned);
    }
    let (remaining, _) = remaining_topics_today(conn, user, now.date()).await?;
    if remaining <= 0 {
        return Ok(TopicOutcome::LimitReached);
    }
    let body = normalise(text);
    match check_length(&body, TOPIC_MIN, TOPIC_MAX) {
        Err(ValidationError::TooShort { .. }) => return Ok(TopicOutcome::TooShort),
        Err(_) => return Ok(TopicOutcome::TooLong),
        Ok(()) => {}
    }

    let topic = NewTopic {
        user_id: user,
        body: &body,
        created_at: now,
        updated_at: now,
    };
    let id = db::create_topic(conn, &topic).await?;
    db::increment_daily(conn, user, now.date()).await?;
    db::record_topic_created(conn, user, now).await?;
    Ok(TopicOutcome::Created(id))
}

/// Soft-close `topic_id` on behalf of its author.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn close_topic(
    conn: &mut DbConnection,
    topic_id: i32,
    user: UserId,
) -> BoardResult<CloseOutcome> {
    let Some(topic) = db::get_topic(conn, topic_id).await? else {
        return Ok(CloseOutcome::NotFound);
    };
    if topic.user_id != user {
        return Ok(CloseOutcome::NotAuthor);
    }
    db::close_topic(conn, topic_id, user).await?;
    Ok(CloseOutcome::Done)
}

/// Hard-delete `topic_id` on behalf of its author, cascading to replies
/// and reports.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn delete_own_topic(
    conn: &mut DbConnection,
    topic_id: i32,
    user: UserId,
) -> BoardResult<CloseOutcome> {
    let Some(topic) = db::get_topic_any(conn, topic_id).await? else {
        return Ok(CloseOutcome::NotFound);
    };
    if topic.user_id != user {
        return Ok(CloseOutcome::NotAuthor);
    }
    db::delete_topic(conn, topic_id).await?;
    Ok(CloseOutcome::Done)
}
