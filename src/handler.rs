//! Top-level event processing.
//!
//! The handler owns the shared [`Context`] and interprets each inbound
//! event end-to-end: button actions are decoded into [`Command`]s, and
//! free-text messages are read against the sender's conversation state. The
//! whole dispatch is wrapped so a failing handler logs and answers a
//! generic apology instead of taking the process down.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use diesel_async::pooled_connection::bb8::PooledConnection;
use tracing::error;

use crate::{
    UserId,
    commands::{Button, Command, Event, Reply, tokens},
    db::{DbConnection, DbPool},
    error::{BoardError, BoardResult},
    notify::Notifier,
    ops,
    state::{ConversationMap, PendingInput},
};

/// Shared infrastructure handed to every command handler.
pub struct Context {
    /// Database connection pool.
    pub pool: DbPool,
    /// Per-user pending-input states.
    pub conversations: ConversationMap,
    /// Outbound notification adapter.
    pub notifier: Arc<dyn Notifier>,
    /// The one user allowed to moderate.
    pub admin_id: UserId,
}

impl Context {
    /// Assemble a context from its parts.
    #[must_use]
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>, admin_id: UserId) -> Self {
        Self {
            pool,
            conversations: ConversationMap::new(),
            notifier,
            admin_id,
        }
    }

    /// Borrow a pooled connection.
    ///
    /// # Errors
    /// Returns [`BoardError::Unavailable`] when the pool cannot supply one.
    pub async fn conn(&self) -> BoardResult<PooledConnection<'_, DbConnection>> {
        self.pool
            .get()
            .await
            .map_err(|err| BoardError::Unavailable(err.to_string()))
    }

    /// Current wall-clock time as stored timestamps use it.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime { Utc::now().naive_utc() }

    /// Whether `user` is the configured administrator.
    #[must_use]
    pub fn is_admin(&self, user: UserId) -> bool { user == self.admin_id }
}

/// Process one inbound event, never failing outward.
///
/// Errors from handlers are logged, the sender's conversation state is
/// dropped (unless the failure is a recoverable validation problem), and a
/// generic failure reply is returned so one bad event cannot wedge the
/// event loop.
pub async fn handle_event(ctx: &Context, event: Event) -> Reply {
    let sender = match &event {
        Event::Message { sender, .. } | Event::Action { sender, .. } => *sender,
    };
    match dispatch(ctx, event).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(%err, sender, "event handler failed");
            if !err.retains_state() {
                ctx.conversations.clear(sender);
            }
            Reply::text("Something went wrong. Please try again.")
        }
    }
}

async fn dispatch(ctx: &Context, event: Event) -> BoardResult<Reply> {
    match event {
        Event::Action { sender, token } => handle_action(ctx, sender, &token).await,
        Event::Message { sender, text } => handle_message(ctx, sender, &text).await,
    }
}

async fn handle_action(ctx: &Context, sender: UserId, token: &str) -> BoardResult<Reply> {
    let Ok(command) = Command::parse(token) else {
        // Stale or hand-crafted menus get a neutral answer, not an error.
        return Ok(Reply::text("That menu has expired. Send /start for a fresh one."));
    };
    if command.requires_admin() && !ctx.is_admin(sender) {
        return Ok(Reply::text("Not allowed."));
    }
    command.process(ctx, sender).await
}

/// Interpret a free-text message against the sender's pending input.
///
/// The pending state is consumed up front; flows that allow a retry
/// (display-name problems) re-arm it explicitly. A message with no state
/// armed is a fresh topic submission.
async fn handle_message(ctx: &Context, sender: UserId, text: &str) -> BoardResult<Reply> {
    match ctx.conversations.take(sender) {
        None | Some(PendingInput::NewTopic) => submit_topic(ctx, sender, text).await,
        Some(PendingInput::Reply { topic_id }) => submit_reply(ctx, sender, topic_id, text).await,
        Some(PendingInput::ChangeUsername) => submit_username(ctx, sender, text).await,
        Some(PendingInput::ReportTopic { topic_id }) => {
            submit_report(ctx, sender, topic_id, text).await
        }
        Some(PendingInput::BanReason {
            target,
            report_id,
            days,
        }) => submit_ban(ctx, sender, target, report_id, days, text).await,
        Some(PendingInput::DeleteReason {
            topic_id,
            report_id,
        }) => submit_delete(ctx, sender, topic_id, report_id, text).await,
    }
}

async fn submit_topic(ctx: &Context, sender: UserId, text: &str) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let outcome = ops::create_topic(&mut conn, sender, text, ctx.now()).await?;
    Ok(match outcome {
        ops::TopicOutcome::Created(id) => Reply::with_menu(
            format!("Topic #{id} created."),
            vec![
                Button::new("View", tokens::topic(id, 0)),
                Button::new("Close", tokens::close(id)),
            ],
        ),
        ops::TopicOutcome::Banned => Reply::text("You are banned."),
        ops::TopicOutcome::LimitReached => {
            Reply::text("Daily topic limit reached. Come back tomorrow.")
        }
        ops::TopicOutcome::TooShort => Reply::text("That topic is too short."),
        ops::TopicOutcome::TooLong => Reply::text("That topic is too long."),
    })
}

async fn submit_reply(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
    text: &str,
) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let outcome =
        ops::add_reply(&mut conn, ctx.notifier.as_ref(), topic_id, sender, text, ctx.now()).await?;
    Ok(match outcome {
        ops::ReplyOutcome::Created(_) => Reply::with_menu(
            "Reply added.".to_owned(),
            vec![Button::new("Back to topic", tokens::topic(topic_id, 0))],
        ),
        ops::ReplyOutcome::Banned => Reply::text("You are banned."),
        ops::ReplyOutcome::TooShort => Reply::text("That reply is too short."),
        ops::ReplyOutcome::TooLong => Reply::text("That reply is too long."),
        ops::ReplyOutcome::NotFound => Reply::text("That topic no longer exists."),
        ops::ReplyOutcome::Closed => Reply::text("That topic is closed."),
    })
}

async fn submit_username(ctx: &Context, sender: UserId, text: &str) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let outcome = ops::change_username(&mut conn, sender, text, ctx.now()).await?;
    Ok(match outcome {
        ops::RenameOutcome::Renamed => Reply::text(format!("Name updated to {}.", text.trim())),
        ops::RenameOutcome::Invalid(err) => {
            // Recoverable: keep waiting so the user can try another name.
            ctx.conversations.arm(sender, PendingInput::ChangeUsername);
            Reply::text(format!("{err}. Try another name."))
        }
        ops::RenameOutcome::Taken => {
            ctx.conversations.arm(sender, PendingInput::ChangeUsername);
            Reply::text("That name is taken. Try another one.")
        }
    })
}

async fn submit_report(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
    text: &str,
) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let outcome = ops::file_report(&mut conn, topic_id, sender, text, ctx.now()).await?;
    Ok(match outcome {
        ops::ReportOutcome::Filed(_) => Reply::text("Report filed. Thank you."),
        ops::ReportOutcome::Duplicate => {
            Reply::text("You already have a pending report on this topic.")
        }
        ops::ReportOutcome::TopicNotFound => Reply::text("That topic no longer exists."),
    })
}

async fn submit_ban(
    ctx: &Context,
    sender: UserId,
    target: UserId,
    report_id: Option<i32>,
    days: Option<i64>,
    text: &str,
) -> BoardResult<Reply> {
    if !ctx.is_admin(sender) {
        return Ok(Reply::text("Not allowed."));
    }
    let mut conn = ctx.conn().await?;
    let now = ctx.now();
    let until = ops::ban_user(
        &mut conn,
        ctx.notifier.as_ref(),
        target,
        text.trim(),
        sender,
        days,
        now,
    )
    .await?;
    if let Some(report_id) = report_id {
        let resolution = days.map_or_else(|| "ban_perm".to_owned(), |d| format!("ban_{d}"));
        let _ = ops::resolve_report(
            &mut conn,
            report_id,
            crate::models::ReportStatus::Resolved,
            &resolution,
            sender,
            now,
        )
        .await?;
    }
    Ok(Reply::text(until.map_or_else(
        || format!("User {target} banned indefinitely."),
        |when| format!("User {target} banned until {}.", when.format("%d.%m.%Y %H:%M")),
    )))
}

async fn submit_delete(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
    report_id: Option<i32>,
    text: &str,
) -> BoardResult<Reply> {
    if !ctx.is_admin(sender) {
        return Ok(Reply::text("Not allowed."));
    }
    let mut conn = ctx.conn().await?;
    let outcome = ops::delete_topic_admin(
        &mut conn,
        ctx.notifier.as_ref(),
        topic_id,
        text.trim(),
        sender,
        report_id,
        ctx.now(),
    )
    .await?;
    Ok(match outcome {
        ops::DeleteOutcome::Deleted => Reply::text(format!("Topic #{topic_id} deleted.")),
        ops::DeleteOutcome::NotFound => Reply::text("That topic no longer exists."),
    })
}
