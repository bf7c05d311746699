//! Admin command handlers: report review, bans, deletions.

use super::{Button, Reply, tokens};
use crate::{
    UserId,
    db,
    error::BoardResult,
    handler::Context,
    models::ReportStatus,
    ops,
    state::PendingInput,
};

/// Characters of a reported topic shown in the review line.
const REVIEW_PREVIEW: usize = 120;

/// Admin landing menu.
pub(super) fn panel() -> Reply {
    Reply::with_menu(
        "Admin panel",
        vec![
            Button::new("Reports", "admin_reports"),
            Button::new("Active bans", "admin_bans"),
        ],
    )
}

/// Pending reports, oldest first, each with its moderation buttons.
pub(super) async fn pending_reports(ctx: &Context) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let reports = db::pending_reports(&mut conn).await?;
    if reports.is_empty() {
        return Ok(Reply::text("No pending reports."));
    }

    let mut lines = Vec::with_capacity(reports.len());
    let mut menu = Vec::new();
    for report in &reports {
        let Some(topic) = db::get_topic_any(&mut conn, report.topic_id).await? else {
            // The topic vanished under the report; only dismissal is left.
            lines.push(format!("Report #{} · topic gone · {}", report.id, report.reason));
            menu.push(Button::new(
                format!("Dismiss #{}", report.id),
                tokens::admin_reject(report.id),
            ));
            continue;
        };
        let author = db::get_or_assign_username(&mut conn, topic.user_id, ctx.now()).await?;
        let body: String = topic.body.chars().take(REVIEW_PREVIEW).collect();
        lines.push(format!(
            "Report #{} · topic #{} by {}\nReason: {}\n{}",
            report.id, topic.id, author, report.reason, body
        ));
        menu.push(Button::new(
            format!("Delete topic #{}", topic.id),
            tokens::admin_delete(topic.id, Some(report.id)),
        ));
        menu.push(Button::new(
            "Ban 7d",
            tokens::admin_ban(topic.user_id, Some(7), Some(report.id)),
        ));
        menu.push(Button::new(
            "Ban 30d",
            tokens::admin_ban(topic.user_id, Some(30), Some(report.id)),
        ));
        menu.push(Button::new(
            "Ban forever",
            tokens::admin_ban(topic.user_id, None, Some(report.id)),
        ));
        menu.push(Button::new(
            format!("Dismiss #{}", report.id),
            tokens::admin_reject(report.id),
        ));
    }
    Ok(Reply::with_menu(lines.join("\n\n"), menu))
}

/// Active bans with unban buttons.
pub(super) async fn active_bans(ctx: &Context) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let bans = db::active_bans(&mut conn).await?;
    if bans.is_empty() {
        return Ok(Reply::text("No active bans."));
    }
    let mut lines = Vec::with_capacity(bans.len());
    let mut menu = Vec::new();
    for ban in &bans {
        let name = db::get_or_assign_username(&mut conn, ban.user_id, ctx.now()).await?;
        let until = ban.unban_at.map_or_else(
            || "forever".to_owned(),
            |when| when.format("%d.%m.%Y %H:%M").to_string(),
        );
        lines.push(format!("{} · {} · until {}", name, ban.reason, until));
        menu.push(Button::new(
            format!("Unban {name}"),
            tokens::admin_unban(ban.user_id),
        ));
    }
    Ok(Reply::with_menu(lines.join("\n"), menu))
}

/// Arm the deletion-reason prompt.
pub(super) fn prompt_delete(
    ctx: &Context,
    sender: UserId,
    topic_id: i32,
    report_id: Option<i32>,
) -> Reply {
    ctx.conversations.arm(
        sender,
        PendingInput::DeleteReason {
            topic_id,
            report_id,
        },
    );
    Reply::text(format!("Send the reason for deleting topic #{topic_id}."))
}

/// Arm the ban-reason prompt.
pub(super) fn prompt_ban(
    ctx: &Context,
    sender: UserId,
    target: UserId,
    days: Option<i64>,
    report_id: Option<i32>,
) -> Reply {
    ctx.conversations.arm(
        sender,
        PendingInput::BanReason {
            target,
            report_id,
            days,
        },
    );
    let length = days.map_or_else(|| "permanently".to_owned(), |d| format!("for {d} days"));
    Reply::text(format!("Send the reason for banning user {target} {length}."))
}

/// Dismiss a report without acting on the topic.
pub(super) async fn reject_report(ctx: &Context, sender: UserId, report_id: i32) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    let done = ops::resolve_report(
        &mut conn,
        report_id,
        ReportStatus::Rejected,
        "dismissed",
        sender,
        ctx.now(),
    )
    .await?;
    Ok(if done {
        Reply::text(format!("Report #{report_id} dismissed."))
    } else {
        Reply::text("That report was already handled.")
    })
}

/// Lift a ban immediately.
pub(super) async fn unban(ctx: &Context, target: UserId) -> BoardResult<Reply> {
    let mut conn = ctx.conn().await?;
    ops::unban_user(&mut conn, target).await?;
    Ok(Reply::text(format!("Ban lifted for user {target}.")))
}
