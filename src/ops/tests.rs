#![cfg(feature = "sqlite")]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel_async::AsyncConnection;
use rstest::{fixture, rstest};

use super::*;
use crate::{
    db::{self, DbConnection, apply_migrations},
    models::ReportStatus,
    notify::{Notification, NullNotifier, RecordingNotifier},
    validate::DAILY_TOPIC_LIMIT,
};

#[fixture]
async fn migrated_conn() -> DbConnection {
    let mut conn = DbConnection::establish(":memory:")
        .await
        .expect("failed to create in-memory connection");
    apply_migrations(&mut conn, "")
        .await
        .expect("failed to apply migrations");
    conn
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 7)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

const ALICE: i64 = 1001;
const BOB: i64 = 1002;
const ADMIN: i64 = 9000;

async fn topic_by(conn: &mut DbConnection, author: i64, body: &str) -> i32 {
    match create_topic(conn, author, body, noon()).await.expect("create") {
        TopicOutcome::Created(id) => id,
        other => panic!("expected Created, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn quota_is_full_before_any_creation(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (remaining, used) = remaining_topics_today(&mut conn, ALICE, noon().date())
        .await
        .expect("quota");
    assert_eq!(remaining, DAILY_TOPIC_LIMIT);
    assert_eq!(used, 0);
}

#[rstest]
#[tokio::test]
async fn quota_arithmetic_holds_after_creations(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    for i in 0..3 {
        let _ = topic_by(&mut conn, ALICE, &format!("thought number {i}")).await;
    }
    let (remaining, used) = remaining_topics_today(&mut conn, ALICE, noon().date())
        .await
        .expect("quota");
    assert_eq!(used, 3);
    assert_eq!(remaining + used, DAILY_TOPIC_LIMIT);
}

#[rstest]
#[tokio::test]
async fn exhausted_quota_refuses_without_writing(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    for i in 0..DAILY_TOPIC_LIMIT {
        let _ = topic_by(&mut conn, ALICE, &format!("thought number {i}")).await;
    }
    let refused = create_topic(&mut conn, ALICE, "one more", noon())
        .await
        .expect("create");
    assert_eq!(refused, TopicOutcome::LimitReached);

    let stats = db::get_stats(&mut conn, ALICE, noon()).await.expect("stats");
    assert_eq!(stats.topics_created, DAILY_TOPIC_LIMIT);
    let used = db::topics_created_on(&mut conn, ALICE, noon().date())
        .await
        .expect("limits");
    assert_eq!(used, DAILY_TOPIC_LIMIT);
}

#[rstest]
#[tokio::test]
async fn short_and_long_topics_are_refused(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let short = create_topic(&mut conn, ALICE, "  x  ", noon()).await.expect("create");
    assert_eq!(short, TopicOutcome::TooShort);
    let long_body = "a".repeat(2001);
    let long = create_topic(&mut conn, ALICE, &long_body, noon()).await.expect("create");
    assert_eq!(long, TopicOutcome::TooLong);
    let (remaining, _) = remaining_topics_today(&mut conn, ALICE, noon().date())
        .await
        .expect("quota");
    assert_eq!(remaining, DAILY_TOPIC_LIMIT);
}

#[rstest]
#[tokio::test]
async fn ban_blocks_topics_until_lifted_or_lapsed(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = NullNotifier;
    let until = ban_user(&mut conn, &notifier, ALICE, "spam", ADMIN, Some(1), noon())
        .await
        .expect("ban");
    assert_eq!(until, Some(noon() + Duration::days(1)));
    assert!(is_banned(&mut conn, ALICE, noon()).await.expect("check"));
    assert_eq!(
        create_topic(&mut conn, ALICE, "while banned", noon()).await.expect("create"),
        TopicOutcome::Banned
    );

    // The ban lapses on its own once the expiry passes.
    let later = noon() + Duration::days(2);
    assert!(!is_banned(&mut conn, ALICE, later).await.expect("check"));

    // Unban is explicit and idempotent.
    unban_user(&mut conn, ALICE).await.expect("unban");
    unban_user(&mut conn, ALICE).await.expect("unban twice");
    assert!(!is_banned(&mut conn, ALICE, noon()).await.expect("check"));
}

#[rstest]
#[tokio::test]
async fn indefinite_ban_has_no_expiry(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = NullNotifier;
    let until = ban_user(&mut conn, &notifier, ALICE, "abuse", ADMIN, None, noon())
        .await
        .expect("ban");
    assert_eq!(until, None);
    let far_future = noon() + Duration::days(3650);
    assert!(is_banned(&mut conn, ALICE, far_future).await.expect("check"));
}

#[rstest]
#[tokio::test]
async fn reban_replaces_the_previous_record(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = NullNotifier;
    let _ = ban_user(&mut conn, &notifier, ALICE, "first", ADMIN, Some(7), noon())
        .await
        .expect("ban");
    let _ = ban_user(&mut conn, &notifier, ALICE, "second", ADMIN, Some(30), noon())
        .await
        .expect("ban");
    let ban = db::get_ban(&mut conn, ALICE).await.expect("get").expect("row");
    assert_eq!(ban.reason, "second");
    assert_eq!(ban.unban_at, Some(noon() + Duration::days(30)));
    assert_eq!(db::active_bans(&mut conn).await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test]
async fn reply_to_missing_topic_writes_nothing(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = RecordingNotifier::new();
    let outcome = add_reply(&mut conn, &notifier, 404, BOB, "anyone here?", noon())
        .await
        .expect("reply");
    assert_eq!(outcome, ReplyOutcome::NotFound);
    let stats = db::get_stats(&mut conn, BOB, noon()).await.expect("stats");
    assert_eq!(stats.replies_written, 0);
    assert!(notifier.sent().is_empty());
}

#[rstest]
#[tokio::test]
async fn reply_to_closed_topic_is_refused(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let topic_id = topic_by(&mut conn, ALICE, "short lived").await;
    assert_eq!(
        close_topic(&mut conn, topic_id, ALICE).await.expect("close"),
        CloseOutcome::Done
    );
    let outcome = add_reply(&mut conn, &NullNotifier, topic_id, BOB, "too late", noon())
        .await
        .expect("reply");
    assert_eq!(outcome, ReplyOutcome::Closed);
}

#[rstest]
#[tokio::test]
async fn reply_updates_both_counters_and_notifies(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = RecordingNotifier::new();
    let topic_id = topic_by(&mut conn, ALICE, "Hello world").await;

    let outcome = add_reply(&mut conn, &notifier, topic_id, BOB, "Hi there!", noon())
        .await
        .expect("reply");
    assert!(matches!(outcome, ReplyOutcome::Created(_)));

    let bob = db::get_stats(&mut conn, BOB, noon()).await.expect("stats");
    assert_eq!(bob.replies_written, 1);
    let alice = db::get_stats(&mut conn, ALICE, noon()).await.expect("stats");
    assert_eq!(alice.replies_received, 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ALICE);
    assert!(matches!(
        &sent[0].1,
        Notification::ReplyReceived { topic_id: t, preview } if *t == topic_id && preview == "Hi there!"
    ));
}

#[rstest]
#[tokio::test]
async fn self_reply_and_muted_author_skip_the_notice(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = RecordingNotifier::new();
    let topic_id = topic_by(&mut conn, ALICE, "talking to myself").await;

    let _ = add_reply(&mut conn, &notifier, topic_id, ALICE, "me again", noon())
        .await
        .expect("reply");
    assert!(notifier.sent().is_empty());

    let _ = toggle_notifications(&mut conn, ALICE, noon()).await.expect("toggle");
    let _ = add_reply(&mut conn, &notifier, topic_id, BOB, "hello author", noon())
        .await
        .expect("reply");
    assert!(notifier.sent().is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_notification_never_fails_the_reply(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = RecordingNotifier::failing();
    let topic_id = topic_by(&mut conn, ALICE, "blocked bot").await;
    let outcome = add_reply(&mut conn, &notifier, topic_id, BOB, "still works", noon())
        .await
        .expect("reply");
    assert!(matches!(outcome, ReplyOutcome::Created(_)));
}

#[rstest]
#[tokio::test]
async fn duplicate_pending_report_is_refused(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let topic_id = topic_by(&mut conn, ALICE, "report me").await;
    let first = file_report(&mut conn, topic_id, BOB, "offensive", noon())
        .await
        .expect("report");
    assert!(matches!(first, ReportOutcome::Filed(_)));
    let second = file_report(&mut conn, topic_id, BOB, "still offensive", noon())
        .await
        .expect("report");
    assert_eq!(second, ReportOutcome::Duplicate);
    assert_eq!(db::pending_reports(&mut conn).await.expect("pending").len(), 1);

    // A resolved report frees the reporter to file again.
    let ReportOutcome::Filed(report_id) = first else {
        unreachable!()
    };
    let done = resolve_report(&mut conn, report_id, ReportStatus::Rejected, "none", ADMIN, noon())
        .await
        .expect("resolve");
    assert!(done);
    let third = file_report(&mut conn, topic_id, BOB, "third time", noon())
        .await
        .expect("report");
    assert!(matches!(third, ReportOutcome::Filed(_)));
}

#[rstest]
#[tokio::test]
async fn username_round_trip_and_conflict(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let renamed = change_username(&mut conn, ALICE, "valid_Name1", noon())
        .await
        .expect("rename");
    assert_eq!(renamed, RenameOutcome::Renamed);
    assert_eq!(
        db::get_username(&mut conn, ALICE).await.expect("get"),
        Some("valid_Name1".to_owned())
    );

    let conflict = change_username(&mut conn, BOB, "valid_Name1", noon())
        .await
        .expect("rename");
    assert_eq!(conflict, RenameOutcome::Taken);

    // Re-asserting one's own name is not a conflict.
    let same = change_username(&mut conn, ALICE, "valid_Name1", noon())
        .await
        .expect("rename");
    assert_eq!(same, RenameOutcome::Renamed);

    let invalid = change_username(&mut conn, BOB, "no spaces!", noon())
        .await
        .expect("rename");
    assert!(matches!(invalid, RenameOutcome::Invalid(_)));
}

#[rstest]
#[tokio::test]
async fn profile_reports_rank_from_counters(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let _ = topic_by(&mut conn, ALICE, "first thought").await;
    let view = profile(&mut conn, ALICE, noon()).await.expect("profile");
    assert_eq!(view.rank.name, "Newcomer");
    assert_eq!(view.stats.topics_created, 1);
    assert!(view.notifications);
    assert!(view.username.starts_with("anon_"));
}

#[rstest]
#[tokio::test]
async fn admin_deletion_cascades_and_notifies_the_author(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let notifier = RecordingNotifier::new();
    let topic_id = topic_by(&mut conn, ALICE, "Hello world").await;
    let _ = add_reply(&mut conn, &NullNotifier, topic_id, BOB, "Hi there!", noon())
        .await
        .expect("reply");
    let report = file_report(&mut conn, topic_id, BOB, "test", noon())
        .await
        .expect("report");
    let ReportOutcome::Filed(report_id) = report else {
        unreachable!()
    };

    let outcome = delete_topic_admin(
        &mut conn,
        &notifier,
        topic_id,
        "test",
        ADMIN,
        Some(report_id),
        noon(),
    )
    .await
    .expect("delete");
    assert_eq!(outcome, DeleteOutcome::Deleted);

    assert!(db::get_topic_any(&mut conn, topic_id).await.expect("get").is_none());
    assert_eq!(db::count_replies(&mut conn, topic_id).await.expect("count"), 0);
    assert!(db::pending_reports(&mut conn).await.expect("pending").is_empty());

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ALICE);
    assert!(matches!(
        &sent[0].1,
        Notification::TopicDeleted { topic_id: t, reason } if *t == topic_id && reason == "test"
    ));
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_topic_reports_not_found(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let outcome = delete_topic_admin(&mut conn, &NullNotifier, 404, "gone", ADMIN, None, noon())
        .await
        .expect("delete");
    assert_eq!(outcome, DeleteOutcome::NotFound);
}
