//! Bans, reports, and admin-side topic removal.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use crate::{
    UserId,
    db::{self, DbConnection},
    error::BoardResult,
    models::{NewReport, ReportStatus},
    notify::{Notification, Notifier},
    validate::normalise,
};

/// Result of filing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Report stored under the returned id.
    Filed(i32),
    /// The reporter already has a pending report against this topic.
    Duplicate,
    /// No active topic with that id exists.
    TopicNotFound,
}

/// Result of an admin deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Topic, replies, and reports are gone.
    Deleted,
    /// No topic with that id exists.
    NotFound,
}

/// Whether `user` has a ban in force at `now`.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn is_banned(conn: &mut DbConnection, user: UserId, now: NaiveDateTime) -> BoardResult<bool> {
    let ban = db::get_ban(conn, user).await?;
    Ok(ban.is_some_and(|b| b.in_force(now)))
}

/// Ban `user`, replacing any earlier ban record.
///
/// `days = None` bans indefinitely; otherwise the ban lapses `days` days
/// from `now`. The target is notified on a best-effort basis. Returns the
/// computed expiry.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn ban_user(
    conn: &mut DbConnection,
    notifier: &dyn Notifier,
    target: UserId,
    reason: &str,
    admin: UserId,
    days: Option<i64>,
    now: NaiveDateTime,
) -> BoardResult<Option<NaiveDateTime>> {
    let unban_at = days.map(|d| now + Duration::days(d));
    db::upsert_ban(conn, target, reason, admin, unban_at, now).await?;

    let note = Notification::Banned {
        reason: reason.to_owned(),
        until: unban_at,
    };
    if let Err(err) = notifier.notify(target, note).await {
        warn!(%err, target, "ban notification dropped");
    }
    Ok(unban_at)
}

/// Lift the ban on `user`. Calling it again is a no-op.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn unban_user(conn: &mut DbConnection, user: UserId) -> BoardResult<()> {
    db::deactivate_ban(conn, user).await?;
    Ok(())
}

/// File a report from `reporter` against `topic_id`.
///
/// A reporter gets one pending report per topic; duplicates are refused
/// before anything is written. An empty reason is stored as "unspecified".
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn file_report(
    conn: &mut DbConnection,
    topic_id: i32,
    reporter: UserId,
    reason: &str,
    now: NaiveDateTime,
) -> BoardResult<ReportOutcome> {
    if db::get_topic(conn, topic_id).await?.is_none() {
        return Ok(ReportOutcome::TopicNotFound);
    }
    if db::has_pending_report(conn, topic_id, reporter).await? {
        return Ok(ReportOutcome::Duplicate);
    }
    let reason = normalise(reason);
    let reason = if reason.is_empty() { "unspecified" } else { &reason };
    let report = NewReport {
        topic_id,
        reporter_id: reporter,
        reason,
        status: ReportStatus::Pending.as_str(),
        created_at: now,
    };
    let id = db::insert_report(conn, &report).await?;
    Ok(ReportOutcome::Filed(id))
}

/// Move a pending report to a terminal status on behalf of `admin`.
///
/// Returns `false` when the report was already resolved or rejected (or no
/// longer exists); terminal states never transition again.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn resolve_report(
    conn: &mut DbConnection,
    report_id: i32,
    status: ReportStatus,
    resolution: &str,
    admin: UserId,
    now: NaiveDateTime,
) -> BoardResult<bool> {
    Ok(db::resolve_report(conn, report_id, status, resolution, admin, now).await?)
}

/// Hard-delete a topic as the admin, recording the resolution and
/// notifying the author.
///
/// The delete removes the topic's replies and reports in one transaction.
/// When the deletion was prompted by a report on a *different* topic the
/// surviving report is resolved afterwards; a report on the deleted topic
/// is already gone, which is the recorded outcome the cascade intends.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn delete_topic_admin(
    conn: &mut DbConnection,
    notifier: &dyn Notifier,
    topic_id: i32,
    reason: &str,
    admin: UserId,
    report_id: Option<i32>,
    now: NaiveDateTime,
) -> BoardResult<DeleteOutcome> {
    let Some(topic) = db::get_topic_any(conn, topic_id).await? else {
        return Ok(DeleteOutcome::NotFound);
    };
    db::delete_topic(conn, topic_id).await?;
    if let Some(report_id) = report_id {
        let _ = db::resolve_report(conn, report_id, ReportStatus::Resolved, "deleted", admin, now)
            .await?;
    }

    let note = Notification::TopicDeleted {
        topic_id,
        reason: reason.to_owned(),
    };
    if let Err(err) = notifier.notify(topic.user_id, note).await {
        warn!(%err, author = topic.user_id, topic_id, "deletion notification dropped");
    }
    Ok(DeleteOutcome::Deleted)
}
