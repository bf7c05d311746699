//! Tests for token parsing and end-to-end event dispatch.
#![cfg(feature = "sqlite")]

use std::sync::Arc;

use diesel_async::pooled_connection::{AsyncDieselConnectionManager, bb8::Pool};
use rstest::rstest;

use super::*;
use crate::{
    db::{DbConnection, apply_migrations},
    handler::handle_event,
    notify::{Notification, Notifier, RecordingNotifier},
};

const ALICE: i64 = 1001;
const BOB: i64 = 1002;
const ADMIN: i64 = 9000;

/// Single-connection pool over one in-memory database so every event in a
/// test sees the same store.
async fn test_context(notifier: Arc<dyn Notifier>) -> Context {
    let manager = AsyncDieselConnectionManager::<DbConnection>::new(":memory:");
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .await
        .expect("failed to build pool");
    {
        let mut conn = pool.get().await.expect("failed to get connection");
        apply_migrations(&mut conn, "")
            .await
            .expect("failed to apply migrations");
    }
    Context::new(pool, notifier, ADMIN)
}

fn msg(sender: i64, text: &str) -> Event {
    Event::Message {
        sender,
        text: text.to_owned(),
    }
}

fn act(sender: i64, token: &str) -> Event {
    Event::Action {
        sender,
        token: token.to_owned(),
    }
}

#[rstest]
#[case("start", Command::Start)]
#[case("feed", Command::Feed { offset: 0 })]
#[case("feed:10", Command::Feed { offset: 10 })]
#[case("topic:42:3", Command::ViewTopic { topic_id: 42, page: 3 })]
#[case("reply:7", Command::Reply { topic_id: 7 })]
#[case("admin_ban:1001:7:3", Command::AdminBan { target: 1001, days: Some(7), report_id: Some(3) })]
#[case("admin_ban:1001:perm", Command::AdminBan { target: 1001, days: None, report_id: None })]
#[case("admin_reject:5", Command::AdminReject { report_id: 5 })]
fn parses_valid_tokens(#[case] token: &str, #[case] expected: Command) {
    assert_eq!(Command::parse(token).expect("should parse"), expected);
}

#[rstest]
#[case("frobnicate")]
#[case("feed:not_a_number")]
#[case("feed:-5")]
#[case("topic:42")]
#[case("admin_ban:1001:0")]
#[case("")]
fn rejects_bad_tokens(#[case] token: &str) {
    assert!(Command::parse(token).is_err());
}

#[rstest]
#[case(tokens::topic(42, 3), Command::ViewTopic { topic_id: 42, page: 3 })]
#[case(tokens::admin_ban(7, None, Some(2)), Command::AdminBan { target: 7, days: None, report_id: Some(2) })]
#[case(tokens::admin_delete(9, None), Command::AdminDelete { topic_id: 9, report_id: None })]
fn builders_round_trip_through_the_parser(#[case] token: String, #[case] expected: Command) {
    assert_eq!(Command::parse(&token).expect("should parse"), expected);
}

#[test]
fn admin_commands_are_flagged() {
    assert!(Command::AdminPanel.requires_admin());
    assert!(Command::AdminUnban { target: 1 }.requires_admin());
    assert!(!Command::Start.requires_admin());
    assert!(!Command::Report { topic_id: 1 }.requires_admin());
}

#[tokio::test]
async fn bare_message_becomes_a_topic() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let reply = handle_event(&ctx, msg(ALICE, "An idle thought about rain")).await;
    assert!(reply.text.contains("Topic #1 created"));
    assert!(reply.menu.iter().any(|b| b.token == tokens::topic(1, 0)));
}

#[tokio::test]
async fn reply_flow_arms_state_and_notifies_the_author() {
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = test_context(notifier.clone()).await;
    let _ = handle_event(&ctx, msg(ALICE, "Hello world")).await;

    let prompt = handle_event(&ctx, act(BOB, &tokens::reply(1))).await;
    assert!(prompt.text.contains("reply"));
    let done = handle_event(&ctx, msg(BOB, "Hi there!")).await;
    assert!(done.text.contains("Reply added"));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ALICE);
    assert!(matches!(
        &sent[0].1,
        Notification::ReplyReceived { topic_id: 1, .. }
    ));

    // The state was consumed: the next message is a fresh topic.
    let next = handle_event(&ctx, msg(BOB, "My own topic now")).await;
    assert!(next.text.contains("Topic #2 created"));
}

#[tokio::test]
async fn stale_tokens_get_a_neutral_answer() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let reply = handle_event(&ctx, act(ALICE, "no_such_action:1:2")).await;
    assert!(reply.text.contains("expired"));
}

#[tokio::test]
async fn admin_commands_are_denied_to_others() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let reply = handle_event(&ctx, act(ALICE, "admin_reports")).await;
    assert_eq!(reply.text, "Not allowed.");
}

#[tokio::test]
async fn bad_username_keeps_the_prompt_armed() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let _ = handle_event(&ctx, act(ALICE, "change_name")).await;

    let rejected = handle_event(&ctx, msg(ALICE, "x")).await;
    assert!(rejected.text.contains("Try another name"));

    // No button press needed: the retry goes straight through.
    let accepted = handle_event(&ctx, msg(ALICE, "valid_Name1")).await;
    assert!(accepted.text.contains("Name updated"));

    // And the flow is finished; the next message is a topic again.
    let after = handle_event(&ctx, msg(ALICE, "Back to posting")).await;
    assert!(after.text.contains("created"));
}

#[tokio::test]
async fn taken_username_also_allows_a_retry() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let _ = handle_event(&ctx, act(ALICE, "change_name")).await;
    let _ = handle_event(&ctx, msg(ALICE, "first_name")).await;

    let _ = handle_event(&ctx, act(BOB, "change_name")).await;
    let taken = handle_event(&ctx, msg(BOB, "first_name")).await;
    assert!(taken.text.contains("taken"));
    let accepted = handle_event(&ctx, msg(BOB, "second_name")).await;
    assert!(accepted.text.contains("Name updated"));
}

#[tokio::test]
async fn ban_flow_resolves_the_report_and_blocks_the_target() {
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = test_context(notifier.clone()).await;
    let _ = handle_event(&ctx, msg(ALICE, "Something objectionable")).await;
    let _ = handle_event(&ctx, act(BOB, &tokens::report(1))).await;
    let filed = handle_event(&ctx, msg(BOB, "rude")).await;
    assert!(filed.text.contains("Report filed"));

    let review = handle_event(&ctx, act(ADMIN, "admin_reports")).await;
    assert!(review.text.contains("Report #1"));
    assert!(
        review
            .menu
            .iter()
            .any(|b| b.token == tokens::admin_ban(ALICE, Some(7), Some(1)))
    );

    let prompt = handle_event(&ctx, act(ADMIN, &tokens::admin_ban(ALICE, Some(7), Some(1)))).await;
    assert!(prompt.text.contains("reason"));
    let banned = handle_event(&ctx, msg(ADMIN, "rule violation")).await;
    assert!(banned.text.contains("banned until"));

    // The target's notice went out and their next topic is refused.
    assert!(
        notifier
            .sent()
            .iter()
            .any(|(user, note)| *user == ALICE && matches!(note, Notification::Banned { .. }))
    );
    let refused = handle_event(&ctx, msg(ALICE, "Another thought")).await;
    assert_eq!(refused.text, "You are banned.");

    // The report left the pending queue.
    let empty = handle_event(&ctx, act(ADMIN, "admin_reports")).await;
    assert_eq!(empty.text, "No pending reports.");
}

#[tokio::test]
async fn delete_flow_removes_the_topic_and_notifies_the_author() {
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = test_context(notifier.clone()).await;
    let _ = handle_event(&ctx, msg(ALICE, "Hello world")).await;
    let _ = handle_event(&ctx, act(BOB, &tokens::reply(1))).await;
    let _ = handle_event(&ctx, msg(BOB, "Hi there!")).await;
    let _ = handle_event(&ctx, act(BOB, &tokens::report(1))).await;
    let _ = handle_event(&ctx, msg(BOB, "test")).await;

    let _ = handle_event(&ctx, act(ADMIN, &tokens::admin_delete(1, Some(1)))).await;
    let deleted = handle_event(&ctx, msg(ADMIN, "test")).await;
    assert!(deleted.text.contains("Topic #1 deleted"));

    assert!(
        notifier
            .sent()
            .iter()
            .any(|(user, note)| *user == ALICE
                && matches!(note, Notification::TopicDeleted { topic_id: 1, .. }))
    );
    let gone = handle_event(&ctx, act(BOB, &tokens::topic(1, 0))).await;
    assert!(gone.text.contains("no longer exists"));
}

#[tokio::test]
async fn admin_can_dismiss_a_report() {
    let ctx = test_context(Arc::new(RecordingNotifier::new())).await;
    let _ = handle_event(&ctx, msg(ALICE, "Perfectly fine topic")).await;
    let _ = handle_event(&ctx, act(BOB, &tokens::report(1))).await;
    let _ = handle_event(&ctx, msg(BOB, "disagreeable")).await;

    let dismissed = handle_event(&ctx, act(ADMIN, &tokens::admin_reject(1))).await;
    assert!(dismissed.text.contains("dismissed"));
    // Terminal: a second dismissal reports it as already handled.
    let again = handle_event(&ctx, act(ADMIN, &tokens::admin_reject(1))).await;
    assert!(again.text.contains("already handled"));
}
