//! Reply queries.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{NewReply, Reply};

/// Insert a new reply and return its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_reply(conn: &mut DbConnection, reply: &NewReply<'_>) -> QueryResult<i32> {
    use crate::schema::replies::dsl as r;
    diesel::insert_into(r::replies)
        .values(reply)
        .returning(r::id)
        .get_result(conn)
        .await
}

/// List active replies for a topic, oldest first, with offset paging.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_replies(
    conn: &mut DbConnection,
    topic_id: i32,
    offset: i64,
    limit: i64,
) -> QueryResult<Vec<Reply>> {
    use crate::schema::replies::dsl as r;
    r::replies
        .filter(r::topic_id.eq(topic_id))
        .filter(r::is_active.eq(true))
        .order(r::created_at.asc())
        .offset(offset)
        .limit(limit)
        .load::<Reply>(conn)
        .await
}

/// Count the active replies attached to a topic.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn count_replies(conn: &mut DbConnection, topic_id: i32) -> QueryResult<i64> {
    use diesel::dsl::count_star;

    use crate::schema::replies::dsl as r;
    r::replies
        .filter(r::topic_id.eq(topic_id))
        .filter(r::is_active.eq(true))
        .select(count_star())
        .first::<i64>(conn)
        .await
}
