//! Topic queries: creation, lookup, feeds, and deletion.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::connection::DbConnection;
use crate::{
    UserId,
    models::{NewTopic, Topic},
};

/// Insert a new topic and return its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_topic(conn: &mut DbConnection, topic: &NewTopic<'_>) -> QueryResult<i32> {
    use crate::schema::topics::dsl as t;
    diesel::insert_into(t::topics)
        .values(topic)
        .returning(t::id)
        .get_result(conn)
        .await
}

/// Look up an active topic by id.
///
/// Soft-closed topics are invisible here; callers that need them gone for
/// good use [`delete_topic`].
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_topic(conn: &mut DbConnection, topic_id: i32) -> QueryResult<Option<Topic>> {
    use crate::schema::topics::dsl as t;
    t::topics
        .filter(t::id.eq(topic_id))
        .filter(t::is_active.eq(true))
        .first::<Topic>(conn)
        .await
        .optional()
}

/// Look up a topic by id regardless of its active flag.
///
/// Reply and moderation flows need to tell a soft-closed topic apart from
/// a missing one.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_topic_any(conn: &mut DbConnection, topic_id: i32) -> QueryResult<Option<Topic>> {
    use crate::schema::topics::dsl as t;
    t::topics
        .filter(t::id.eq(topic_id))
        .first::<Topic>(conn)
        .await
        .optional()
}

/// Bump a topic's `updated_at`, keeping the feed ordering honest.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn touch_topic(
    conn: &mut DbConnection,
    topic_id: i32,
    now: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::topics::dsl as t;
    diesel::update(t::topics.filter(t::id.eq(topic_id)))
        .set(t::updated_at.eq(now))
        .execute(conn)
        .await
}

/// Soft-close a topic on behalf of its author.
///
/// Returns `true` when an active topic owned by `author` was closed.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn close_topic(
    conn: &mut DbConnection,
    topic_id: i32,
    author: UserId,
) -> QueryResult<bool> {
    use crate::schema::topics::dsl as t;
    let changed = diesel::update(
        t::topics
            .filter(t::id.eq(topic_id))
            .filter(t::user_id.eq(author))
            .filter(t::is_active.eq(true)),
    )
    .set(t::is_active.eq(false))
    .execute(conn)
    .await?;
    Ok(changed > 0)
}

/// Hard-delete a topic together with its replies and reports.
///
/// The three deletes run in one transaction so a crash cannot strand
/// orphaned replies or reports.
///
/// # Errors
/// Returns any error produced inside the transaction.
#[must_use = "handle the result"]
pub async fn delete_topic(conn: &mut DbConnection, topic_id: i32) -> QueryResult<bool> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        Box::pin(async move {
            use crate::schema::{replies::dsl as r, reports::dsl as rp, topics::dsl as t};
            diesel::delete(r::replies.filter(r::topic_id.eq(topic_id)))
                .execute(conn)
                .await?;
            diesel::delete(rp::reports.filter(rp::topic_id.eq(topic_id)))
                .execute(conn)
                .await?;
            let removed = diesel::delete(t::topics.filter(t::id.eq(topic_id)))
                .execute(conn)
                .await?;
            Ok(removed > 0)
        })
    })
    .await
}

/// List active topics, newest first, with offset paging.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn latest_topics(
    conn: &mut DbConnection,
    offset: i64,
    limit: i64,
) -> QueryResult<Vec<Topic>> {
    use crate::schema::topics::dsl as t;
    t::topics
        .filter(t::is_active.eq(true))
        .order(t::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Topic>(conn)
        .await
}

/// Pick a uniformly random active topic id, if any topic exists.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn random_topic(conn: &mut DbConnection) -> QueryResult<Option<i32>> {
    use crate::schema::topics::dsl as t;
    t::topics
        .filter(t::is_active.eq(true))
        .order(diesel::dsl::sql::<diesel::sql_types::Integer>("RANDOM()"))
        .select(t::id)
        .first::<i32>(conn)
        .await
        .optional()
}

/// List active topics ranked by active-reply count, busiest first.
///
/// Topics with no replies fill the tail so a quiet board still yields a
/// full page.
///
/// # Errors
/// Returns any error produced by the underlying database queries.
#[must_use = "handle the result"]
pub async fn popular_topics(
    conn: &mut DbConnection,
    limit: usize,
) -> QueryResult<Vec<(Topic, i64)>> {
    use diesel::dsl::count_star;

    use crate::schema::{replies::dsl as r, topics::dsl as t};

    let counts: Vec<(i32, i64)> = r::replies
        .filter(r::is_active.eq(true))
        .group_by(r::topic_id)
        .select((r::topic_id, count_star()))
        .load::<(i32, i64)>(conn)
        .await?;

    let busy_ids: Vec<i32> = counts.iter().map(|(id, _)| *id).collect();
    let mut ranked: Vec<(Topic, i64)> = t::topics
        .filter(t::is_active.eq(true))
        .filter(t::id.eq_any(&busy_ids))
        .load::<Topic>(conn)
        .await?
        .into_iter()
        .map(|topic| {
            let replies = counts
                .iter()
                .find(|(id, _)| *id == topic.id)
                .map_or(0, |(_, n)| *n);
            (topic, replies)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.created_at.cmp(&a.0.created_at)));
    ranked.truncate(limit);

    if ranked.len() < limit {
        let missing = i64::try_from(limit - ranked.len()).unwrap_or(0);
        let quiet: Vec<Topic> = t::topics
            .filter(t::is_active.eq(true))
            .filter(t::id.ne_all(&busy_ids))
            .order(t::created_at.desc())
            .limit(missing)
            .load::<Topic>(conn)
            .await?;
        ranked.extend(quiet.into_iter().map(|topic| (topic, 0)));
    }
    Ok(ranked)
}
