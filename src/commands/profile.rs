//! Profile command handlers.

use super::{Button, Reply};
use crate::{UserId, error::BoardResult, handler::Context, ops, state::PendingInput};

/// Profile view with name, rank, and counters.
pub(super) async fn show(ctx: &Context, sender: UserId) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let view = ops::profile(&mut conn, sender, ctx.now()).await?;
    let notifications = if view.notifications { "on" } else { "off" };
    Ok(Reply::with_menu(
        format!(
            "Profile\n\nName: {}\nRank: {}\n\nTopics: {}\nReplies written: {}\nReplies received: {}\nNotifications: {notifications}",
            view.username,
            view.rank.name,
            view.stats.topics_created,
            view.stats.replies_written,
            view.stats.replies_received,
        ),
        vec![
            Button::new("Change name", "change_name"),
            Button::new("Toggle notifications", "toggle_notify"),
            Button::new("Menu", "start"),
        ],
    ))
}

/// Arm the display-name prompt.
pub(super) fn prompt_change_name(ctx: &Context, sender: UserId) -> Reply {
    ctx.conversations.arm(sender, PendingInput::ChangeUsername);
    Reply::text("Send your new name (3-12 letters, digits or underscores).")
}

/// Flip reply notifications and report the new setting.
pub(super) async fn toggle_notifications(ctx: &Context, sender: UserId) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let enabled = ops::toggle_notifications(&mut conn, sender, ctx.now()).await?;
    Ok(Reply::text(if enabled {
        "Reply notifications are on."
    } else {
        "Reply notifications are off."
    }))
}
