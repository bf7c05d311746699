//! Display-name storage with lazy assignment.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;
use rand::Rng;

use super::connection::DbConnection;
use crate::UserId;

/// Look up the display name assigned to `user`, if any.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_username(conn: &mut DbConnection, user: UserId) -> QueryResult<Option<String>> {
    use crate::schema::user_names::dsl as n;
    n::user_names
        .filter(n::user_id.eq(user))
        .select(n::username)
        .first::<String>(conn)
        .await
        .optional()
}

/// Fetch the display name for `user`, generating one on first interaction.
///
/// Generated names take the form `anon_<4 digits>`; collisions retry with a
/// fresh number.
///
/// # Errors
/// Returns any error produced by the underlying database queries.
#[must_use = "handle the result"]
pub async fn get_or_assign_username(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> QueryResult<String> {
    if let Some(existing) = get_username(conn, user).await? {
        return Ok(existing);
    }
    loop {
        let candidate = {
            let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
            format!("anon_{suffix}")
        };
        if is_username_taken(conn, &candidate, user).await? {
            continue;
        }
        upsert_username(conn, user, &candidate, now).await?;
        return Ok(candidate);
    }
}

/// Whether `name` is already assigned to someone other than `user`.
///
/// The match is case-sensitive; the requester's own current name never
/// counts as taken.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn is_username_taken(
    conn: &mut DbConnection,
    name: &str,
    user: UserId,
) -> QueryResult<bool> {
    use crate::schema::user_names::dsl as n;
    let holder: Option<UserId> = n::user_names
        .filter(n::username.eq(name))
        .filter(n::user_id.ne(user))
        .select(n::user_id)
        .first::<UserId>(conn)
        .await
        .optional()?;
    Ok(holder.is_some())
}

/// Insert or replace the display name for `user`.
///
/// # Errors
/// Returns any error produced by the upsert query.
#[must_use = "handle the result"]
pub async fn upsert_username(
    conn: &mut DbConnection,
    user: UserId,
    name: &str,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::user_names::dsl as n;
    diesel::insert_into(n::user_names)
        .values((n::user_id.eq(user), n::username.eq(name), n::updated_at.eq(now)))
        .on_conflict(n::user_id)
        .do_update()
        .set((n::username.eq(name), n::updated_at.eq(now)))
        .execute(conn)
        .await
}
