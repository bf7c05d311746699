//! Feed, topic, and reply command handlers.

use chrono::NaiveDateTime;

use super::{Button, PAGE_SIZE, Reply, tokens};
use crate::{
    UserId,
    db,
    error::BoardResult,
    handler::Context,
    models::Topic,
    ops,
    state::PendingInput,
};

/// Characters of a topic body shown in list lines.
const LIST_PREVIEW: usize = 80;

fn stamp(ts: NaiveDateTime) -> String { ts.format("%d.%m.%Y %H:%M").to_string() }

fn preview(body: &str, max: usize) -> String {
    let mut cut: String = body.chars().take(max).collect();
    if cut.chars().count() < body.chars().count() {
        cut.push('…');
    }
    cut
}

fn main_menu(is_admin: bool) -> Vec<Button> {
    let mut menu = vec![
        Button::new("Feed", tokens::feed(0)),
        Button::new("Random", "random"),
        Button::new("Popular", "top"),
        Button::new("New topic", "new_topic"),
        Button::new("Profile", "profile"),
    ];
    if is_admin {
        menu.push(Button::new("Admin", "admin"));
    }
    menu
}

/// Greet the sender, assigning a display name on first contact.
pub(super) async fn start(ctx: &Context, sender: UserId) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let username = db::get_or_assign_username(&mut conn, sender, ctx.now()).await?;
    Ok(Reply::with_menu(
        format!(
            "Hello, {username}!\n\nAny message you send becomes an anonymous topic. \
             Use the menu to browse what others are thinking about."
        ),
        main_menu(ctx.is_admin(sender)),
    ))
}

/// Latest-topics page at `offset`.
pub(super) async fn feed(ctx: &Context, offset: i64) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let topics = db::latest_topics(&mut conn, offset, PAGE_SIZE).await?;
    if topics.is_empty() {
        return Ok(Reply::with_menu(
            "Nothing here yet. Start the first topic!",
            vec![Button::new("New topic", "new_topic")],
        ));
    }

    let mut lines = Vec::with_capacity(topics.len());
    let mut menu = Vec::new();
    for topic in &topics {
        let author = db::get_or_assign_username(&mut conn, topic.user_id, ctx.now()).await?;
        lines.push(format!(
            "#{} · {} · {}\n{}",
            topic.id,
            author,
            stamp(topic.created_at),
            preview(&topic.body, LIST_PREVIEW)
        ));
        menu.push(Button::new(
            format!("Topic #{}", topic.id),
            tokens::topic(topic.id, 0),
        ));
    }
    if offset > 0 {
        menu.push(Button::new("Newer", tokens::feed((offset - PAGE_SIZE).max(0))));
    }
    if topics.len() as i64 == PAGE_SIZE {
        menu.push(Button::new("Older", tokens::feed(offset + PAGE_SIZE)));
    }
    Ok(Reply::with_menu(lines.join("\n\n"), menu))
}

/// Show a uniformly random topic.
pub(super) async fn random(ctx: &Context, sender: UserId) -> BoardResult<Reply> {
    let picked = {
        let mut conn = ctx.conn().await?;
        db::random_topic(&mut conn).await?
    };
    match picked {
        Some(topic_id) => view_topic(ctx, sender, topic_id, 0).await,
        None => Ok(Reply::with_menu(
            "No topics yet.",
            vec![Button::new("New topic", "new_topic")],
        )),
    }
}

/// Topics ranked by reply count.
pub(super) async fn popular(ctx: &Context) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let ranked = db::popular_topics(&mut conn, PAGE_SIZE as usize).await?;
    if ranked.is_empty() {
        return Ok(Reply::with_menu(
            "No topics yet.",
            vec![Button::new("New topic", "new_topic")],
        ));
    }
    let mut lines = Vec::with_capacity(ranked.len());
    let mut menu = Vec::new();
    for (topic, replies) in &ranked {
        let author = db::get_or_assign_username(&mut conn, topic.user_id, ctx.now()).await?;
        lines.push(format!(
            "#{} · {} · {} replies\n{}",
            topic.id,
            author,
            replies,
            preview(&topic.body, LIST_PREVIEW)
        ));
        menu.push(Button::new(
            format!("Topic #{}", topic.id),
            tokens::topic(topic.id, 0),
        ));
    }
    Ok(Reply::with_menu(lines.join("\n\n"), menu))
}

fn topic_menu(topic: &Topic, sender: UserId, page: i64, has_more: bool) -> Vec<Button> {
    let mut menu = vec![Button::new("Reply", tokens::reply(topic.id))];
    if sender != topic.user_id {
        // Self-reports are kept out of the menu by convention; the rules
        // layer itself does not forbid them.
        menu.push(Button::new("Report", tokens::report(topic.id)));
    }
    if page > 0 {
        menu.push(Button::new("Earlier replies", tokens::topic(topic.id, page - 1)));
    }
    if has_more {
        menu.push(Button::new("Later replies", tokens::topic(topic.id, page + 1)));
    }
    if sender == topic.user_id {
        menu.push(Button::new("Close", tokens::close(topic.id)));
        menu.push(Button::new("Delete", tokens::delete(topic.id)));
    }
    menu
}

/// One topic with a page of its replies.
pub(super) async fn view_topic(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
    page: i64,
) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let Some(topic) = db::get_topic(&mut conn, topic_id).await? else {
        return Ok(Reply::text("That topic no longer exists."));
    };
    let author = db::get_or_assign_username(&mut conn, topic.user_id, ctx.now()).await?;
    let total = db::count_replies(&mut conn, topic_id).await?;
    let replies = db::list_replies(&mut conn, topic_id, page * PAGE_SIZE, PAGE_SIZE).await?;

    let mut text = format!(
        "Topic #{} · {} · {}\n\n{}",
        topic.id,
        author,
        stamp(topic.created_at),
        topic.body
    );
    if total > 0 {
        text.push_str(&format!("\n\nReplies ({total}):"));
        for reply in &replies {
            let name = db::get_or_assign_username(&mut conn, reply.user_id, ctx.now()).await?;
            text.push_str(&format!("\n{} · {}\n{}", name, stamp(reply.created_at), reply.body));
        }
    }

    let has_more = (page + 1) * PAGE_SIZE < total;
    Ok(Reply::with_menu(text, topic_menu(&topic, sender, page, has_more)))
}

/// Arm the new-topic prompt.
pub(super) fn prompt_new_topic(ctx: &Context, sender: UserId) -> Reply {
    ctx.conversations.arm(sender, PendingInput::NewTopic);
    Reply::text("Send the topic text.")
}

/// Arm the reply prompt for an existing topic.
pub(super) async fn prompt_reply(ctx: &Context, sender: UserId, topic_id: i32) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    if db::get_topic(&mut conn, topic_id).await?.is_none() {
        return Ok(Reply::text("That topic no longer exists."));
    }
    ctx.conversations.arm(sender, PendingInput::Reply { topic_id });
    Ok(Reply::text("Send your reply."))
}

/// Arm the report prompt for an existing topic.
pub(super) async fn prompt_report(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    if db::get_topic(&mut conn, topic_id).await?.is_none() {
        return Ok(Reply::text("That topic no longer exists."));
    }
    ctx.conversations
        .arm(sender, PendingInput::ReportTopic { topic_id });
    Ok(Reply::text("Why are you reporting this topic?"))
}

/// Author-side soft close.
pub(super) async fn close_topic(ctx: &Context, sender: UserId, topic_id: i32) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    Ok(match ops::close_topic(&mut conn, topic_id, sender).await? {
        ops::CloseOutcome::Done => Reply::text(format!("Topic #{topic_id} closed.")),
        ops::CloseOutcome::NotFound => Reply::text("That topic no longer exists."),
        ops::CloseOutcome::NotAuthor => Reply::text("Only the author can do that."),
    })
}

/// Author-side hard delete.
pub(super) async fn delete_own_topic(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    Ok(match ops::delete_own_topic(&mut conn, topic_id, sender).await? {
        ops::CloseOutcome::Done => Reply::text(format!("Topic #{topic_id} deleted.")),
        ops::CloseOutcome::NotFound => Reply::text("That topic no longer exists."),
        ops::CloseOutcome::NotAuthor => Reply::text("Only the author can do that."),
    })
}
