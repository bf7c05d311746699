//! Per-user activity counters.
//!
//! Counter bumps are single atomic upserts (`SET col = col + 1`) so
//! concurrent events for the same user cannot lose updates.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::{UserId, models::UserStats};

/// Fetch the stats row for `user`, materialising it on first touch.
///
/// # Errors
/// Returns any error produced by the underlying database queries.
#[must_use = "handle the result"]
pub async fn get_stats(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> QueryResult<UserStats> {
    use crate::schema::user_stats::dsl as s;
    diesel::insert_into(s::user_stats)
        .values((s::user_id.eq(user), s::last_active.eq(now)))
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    s::user_stats
        .filter(s::user_id.eq(user))
        .first::<UserStats>(conn)
        .await
}

/// Bump `topics_created` for `user`.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn record_topic_created(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::user_stats::dsl as s;
    diesel::insert_into(s::user_stats)
        .values((
            s::user_id.eq(user),
            s::topics_created.eq(1),
            s::last_active.eq(now),
        ))
        .on_conflict(s::user_id)
        .do_update()
        .set((
            s::topics_created.eq(s::topics_created + 1),
            s::last_active.eq(now),
        ))
        .execute(conn)
        .await
}

/// Bump `replies_written` for `user`.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn record_reply_written(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::user_stats::dsl as s;
    diesel::insert_into(s::user_stats)
        .values((
            s::user_id.eq(user),
            s::replies_written.eq(1),
            s::last_active.eq(now),
        ))
        .on_conflict(s::user_id)
        .do_update()
        .set((
            s::replies_written.eq(s::replies_written + 1),
            s::last_active.eq(now),
        ))
        .execute(conn)
        .await
}

/// Bump `replies_received` for `user`.
///
/// The author's `last_active` is left alone; receiving a reply is not
/// activity of their own.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn record_reply_received(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::user_stats::dsl as s;
    diesel::insert_into(s::user_stats)
        .values((
            s::user_id.eq(user),
            s::replies_received.eq(1),
            s::last_active.eq(now),
        ))
        .on_conflict(s::user_id)
        .do_update()
        .set(s::replies_received.eq(s::replies_received + 1))
        .execute(conn)
        .await
}
