//! Report queries and the duplicate-report guard.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::{
    UserId,
    models::{NewReport, Report, ReportStatus},
};

/// Whether `reporter` already has a pending report against `topic_id`.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn has_pending_report(
    conn: &mut DbConnection,
    topic_id: i32,
    reporter: UserId,
) -> QueryResult<bool> {
    use crate::schema::reports::dsl as rp;
    let existing: Option<i32> = rp::reports
        .filter(rp::topic_id.eq(topic_id))
        .filter(rp::reporter_id.eq(reporter))
        .filter(rp::status.eq(ReportStatus::Pending.as_str()))
        .select(rp::id)
        .first::<i32>(conn)
        .await
        .optional()?;
    Ok(existing.is_some())
}

/// Insert a report and return its id.
///
/// Callers run the duplicate guard first; the store itself accepts any row.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn insert_report(conn: &mut DbConnection, report: &NewReport<'_>) -> QueryResult<i32> {
    use crate::schema::reports::dsl as rp;
    diesel::insert_into(rp::reports)
        .values(report)
        .returning(rp::id)
        .get_result(conn)
        .await
}

/// Look up a report by id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_report(conn: &mut DbConnection, report_id: i32) -> QueryResult<Option<Report>> {
    use crate::schema::reports::dsl as rp;
    rp::reports
        .filter(rp::id.eq(report_id))
        .first::<Report>(conn)
        .await
        .optional()
}

/// List pending reports, oldest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn pending_reports(conn: &mut DbConnection) -> QueryResult<Vec<Report>> {
    use crate::schema::reports::dsl as rp;
    rp::reports
        .filter(rp::status.eq(ReportStatus::Pending.as_str()))
        .order(rp::created_at.asc())
        .load::<Report>(conn)
        .await
}

/// Move a pending report to a terminal status, recording the admin.
///
/// The `status = pending` filter makes both transitions terminal: a report
/// already resolved or rejected is left untouched and `false` is returned.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn resolve_report(
    conn: &mut DbConnection,
    report_id: i32,
    status: ReportStatus,
    resolution: &str,
    admin: UserId,
    now: NaiveDateTime,
) -> QueryResult<bool> {
    use crate::schema::reports::dsl as rp;
    let changed = diesel::update(
        rp::reports
            .filter(rp::id.eq(report_id))
            .filter(rp::status.eq(ReportStatus::Pending.as_str())),
    )
    .set((
        rp::status.eq(status.as_str()),
        rp::resolution.eq(resolution),
        rp::admin_id.eq(admin),
        rp::resolved_at.eq(now),
    ))
    .execute(conn)
    .await?;
    Ok(changed > 0)
}
