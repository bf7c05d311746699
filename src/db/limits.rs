//! Per-day topic counters.
//!
//! The daily quota resets implicitly at date rollover: each calendar day
//! gets its own row and old rows are simply never read again.

use chrono::NaiveDate;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::UserId;

/// Topics created by `user` on `day`; an absent row counts as zero.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn topics_created_on(
    conn: &mut DbConnection,
    user: UserId,
    day: NaiveDate,
) -> QueryResult<i32> {
    use crate::schema::daily_limits::dsl as dl;
    let used: Option<i32> = dl::daily_limits
        .filter(dl::user_id.eq(user))
        .filter(dl::day.eq(day))
        .select(dl::topics_created)
        .first::<i32>(conn)
        .await
        .optional()?;
    Ok(used.unwrap_or(0))
}

/// Bump the day's counter for `user` with a single atomic upsert.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn increment_daily(
    conn: &mut DbConnection,
    user: UserId,
    day: NaiveDate,
) -> QueryResult<usize> {
    use crate::schema::daily_limits::dsl as dl;
    diesel::insert_into(dl::daily_limits)
        .values((dl::user_id.eq(user), dl::day.eq(day), dl::topics_created.eq(1)))
        .on_conflict((dl::user_id, dl::day))
        .do_update()
        .set(dl::topics_created.eq(dl::topics_created + 1))
        .execute(conn)
        .await
}
