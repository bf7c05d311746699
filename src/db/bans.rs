//! Ban queries: one row per user, overwritten on re-ban.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::{UserId, models::Ban};

/// Insert or replace the ban record for `user`.
///
/// Any pre-existing ban for the user is overwritten rather than
/// accumulated; `unban_at = None` bans indefinitely.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn upsert_ban(
    conn: &mut DbConnection,
    user: UserId,
    reason: &str,
    admin: UserId,
    unban_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::bans::dsl as b;
    diesel::insert_into(b::bans)
        .values((
            b::user_id.eq(user),
            b::reason.eq(reason),
            b::admin_id.eq(admin),
            b::banned_at.eq(now),
            b::unban_at.eq(unban_at),
            b::is_active.eq(true),
        ))
        .on_conflict(b::user_id)
        .do_update()
        .set((
            b::reason.eq(reason),
            b::admin_id.eq(admin),
            b::banned_at.eq(now),
            b::unban_at.eq(unban_at),
            b::is_active.eq(true),
        ))
        .execute(conn)
        .await
}

/// Fetch the ban record for `user`, in force or not.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_ban(conn: &mut DbConnection, user: UserId) -> QueryResult<Option<Ban>> {
    use crate::schema::bans::dsl as b;
    b::bans
        .filter(b::user_id.eq(user))
        .first::<Ban>(conn)
        .await
        .optional()
}

/// Deactivate the ban record for `user`, keeping the history row.
///
/// Repeating the call is a no-op, so unban is idempotent.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn deactivate_ban(conn: &mut DbConnection, user: UserId) -> QueryResult<usize> {
    use crate::schema::bans::dsl as b;
    diesel::update(b::bans.filter(b::user_id.eq(user)))
        .set(b::is_active.eq(false))
        .execute(conn)
        .await
}

/// List ban records still flagged active, most recent first.
///
/// Expiry is evaluated by the caller against its own clock; the store only
/// filters the explicit flag.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn active_bans(conn: &mut DbConnection) -> QueryResult<Vec<Ban>> {
    use crate::schema::bans::dsl as b;
    b::bans
        .filter(b::is_active.eq(true))
        .order(b::banned_at.desc())
        .load::<Ban>(conn)
        .await
}
