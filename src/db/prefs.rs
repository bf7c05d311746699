//! Reply-notification preferences.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::UserId;

/// Whether `user` wants reply notifications. Absent rows default to on.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn reply_notifications_enabled(
    conn: &mut DbConnection,
    user: UserId,
) -> QueryResult<bool> {
    use crate::schema::notification_prefs::dsl as p;
    let stored: Option<bool> = p::notification_prefs
        .filter(p::user_id.eq(user))
        .select(p::reply_notifications)
        .first::<bool>(conn)
        .await
        .optional()?;
    Ok(stored.unwrap_or(true))
}

/// Set the reply-notification opt-in for `user`.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn set_reply_notifications(
    conn: &mut DbConnection,
    user: UserId,
    enabled: bool,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::notification_prefs::dsl as p;
    diesel::insert_into(p::notification_prefs)
        .values((
            p::user_id.eq(user),
            p::reply_notifications.eq(enabled),
            p::updated_at.eq(now),
        ))
        .on_conflict(p::user_id)
        .do_update()
        .set((p::reply_notifications.eq(enabled), p::updated_at.eq(now)))
        .execute(conn)
        .await
}
