//! Parse and execute board actions.
//!
//! This module converts inbound action tokens into high level [`Command`]
//! variants and runs the appropriate handlers. The dispatcher delivers two
//! event kinds: free-text messages, interpreted against the sender's
//! conversation state, and button actions carrying a token such as
//! `topic:42:0`. Handlers return a [`Reply`] (display text plus the next
//! action menu) and never render transport UI themselves.

mod admin;
mod board;
mod profile;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{UserId, error::BoardResult, handler::Context};

/// Topics or replies shown per page.
pub const PAGE_SIZE: i64 = 5;

/// Inbound event delivered by the chat-platform dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Free-text message from a user.
    Message {
        /// Sending user.
        sender: UserId,
        /// Raw message text.
        text: String,
    },
    /// Structured button press carrying an action token.
    Action {
        /// Sending user.
        sender: UserId,
        /// Encoded action name plus positional arguments.
        token: String,
    },
}

/// A button offered in the reply menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Human-readable label.
    pub label: String,
    /// Action token sent back when pressed.
    pub token: String,
}

impl Button {
    /// Build a button from label and token.
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Display text plus the next action menu, rendered by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Text shown to the user.
    pub text: String,
    /// Buttons to offer next; may be empty.
    pub menu: Vec<Button>,
}

impl Reply {
    /// A bare text reply with no menu.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Vec::new(),
        }
    }

    /// A text reply with a menu attached.
    pub fn with_menu(text: impl Into<String>, menu: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            menu,
        }
    }
}

/// Errors produced while decoding an action token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The action name or argument count did not match any command.
    #[error("unknown action token")]
    Unknown,
    /// A positional argument failed to parse.
    #[error("malformed token argument")]
    BadArgument,
}

/// High-level command representation parsed from action tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting and main menu.
    Start,
    /// Latest-topics feed page.
    Feed {
        /// Paging offset in topics.
        offset: i64,
    },
    /// A uniformly random topic.
    Random,
    /// Topics ranked by reply count.
    Popular,
    /// One topic with a page of its replies.
    ViewTopic {
        /// Topic to show.
        topic_id: i32,
        /// Reply page number, zero-based.
        page: i64,
    },
    /// Prompt for a new topic body.
    NewTopic,
    /// Prompt for a reply body.
    Reply {
        /// Topic the reply targets.
        topic_id: i32,
    },
    /// Prompt for a report reason.
    Report {
        /// Topic the report targets.
        topic_id: i32,
    },
    /// Profile view with stats and rank.
    Profile,
    /// Prompt for a new display name.
    ChangeName,
    /// Flip reply notifications.
    ToggleNotifications,
    /// Author soft-closes their topic.
    CloseTopic {
        /// Topic to close.
        topic_id: i32,
    },
    /// Author hard-deletes their topic.
    DeleteTopic {
        /// Topic to delete.
        topic_id: i32,
    },
    /// Admin landing menu.
    AdminPanel,
    /// Pending reports for review.
    AdminReports,
    /// Active bans for review.
    AdminBans,
    /// Prompt for a deletion reason, then delete.
    AdminDelete {
        /// Topic to delete.
        topic_id: i32,
        /// Report that prompted the action, if any.
        report_id: Option<i32>,
    },
    /// Prompt for a ban reason, then ban.
    AdminBan {
        /// User to ban.
        target: UserId,
        /// Ban length in days; `None` bans indefinitely.
        days: Option<i64>,
        /// Report that prompted the action, if any.
        report_id: Option<i32>,
    },
    /// Dismiss a report without acting on the topic.
    AdminReject {
        /// Report to dismiss.
        report_id: i32,
    },
    /// Lift a ban.
    AdminUnban {
        /// User to unban.
        target: UserId,
    },
}

fn parse_id(raw: &str) -> Result<i32, TokenError> {
    raw.parse().map_err(|_| TokenError::BadArgument)
}

fn parse_user(raw: &str) -> Result<UserId, TokenError> {
    raw.parse().map_err(|_| TokenError::BadArgument)
}

fn parse_offset(raw: &str) -> Result<i64, TokenError> {
    let offset: i64 = raw.parse().map_err(|_| TokenError::BadArgument)?;
    if offset < 0 {
        return Err(TokenError::BadArgument);
    }
    Ok(offset)
}

/// Ban length argument: a day count or the literal `perm`.
fn parse_days(raw: &str) -> Result<Option<i64>, TokenError> {
    if raw == "perm" {
        return Ok(None);
    }
    let days: i64 = raw.parse().map_err(|_| TokenError::BadArgument)?;
    if days <= 0 {
        return Err(TokenError::BadArgument);
    }
    Ok(Some(days))
}

impl Command {
    /// Decode an action token of the form `name` or `name:arg:arg…`.
    ///
    /// # Errors
    /// Returns a [`TokenError`] for unknown names, wrong argument counts,
    /// or arguments that fail to parse. Callers answer these with a
    /// neutral stale-menu reply rather than an error surface.
    #[must_use = "handle the result"]
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        let mut parts = token.split(':');
        let name = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();
        match (name, args.as_slice()) {
            ("start", []) => Ok(Self::Start),
            ("feed", []) => Ok(Self::Feed { offset: 0 }),
            ("feed", [offset]) => Ok(Self::Feed {
                offset: parse_offset(offset)?,
            }),
            ("random", []) => Ok(Self::Random),
            ("top", []) => Ok(Self::Popular),
            ("topic", [id, page]) => Ok(Self::ViewTopic {
                topic_id: parse_id(id)?,
                page: parse_offset(page)?,
            }),
            ("new_topic", []) => Ok(Self::NewTopic),
            ("reply", [id]) => Ok(Self::Reply {
                topic_id: parse_id(id)?,
            }),
            ("report", [id]) => Ok(Self::Report {
                topic_id: parse_id(id)?,
            }),
            ("profile", []) => Ok(Self::Profile),
            ("change_name", []) => Ok(Self::ChangeName),
            ("toggle_notify", []) => Ok(Self::ToggleNotifications),
            ("close", [id]) => Ok(Self::CloseTopic {
                topic_id: parse_id(id)?,
            }),
            ("delete", [id]) => Ok(Self::DeleteTopic {
                topic_id: parse_id(id)?,
            }),
            ("admin", []) => Ok(Self::AdminPanel),
            ("admin_reports", []) => Ok(Self::AdminReports),
            ("admin_bans", []) => Ok(Self::AdminBans),
            ("admin_delete", [id]) => Ok(Self::AdminDelete {
                topic_id: parse_id(id)?,
                report_id: None,
            }),
            ("admin_delete", [id, report]) => Ok(Self::AdminDelete {
                topic_id: parse_id(id)?,
                report_id: Some(parse_id(report)?),
            }),
            ("admin_ban", [target, days]) => Ok(Self::AdminBan {
                target: parse_user(target)?,
                days: parse_days(days)?,
                report_id: None,
            }),
            ("admin_ban", [target, days, report]) => Ok(Self::AdminBan {
                target: parse_user(target)?,
                days: parse_days(days)?,
                report_id: Some(parse_id(report)?),
            }),
            ("admin_reject", [report]) => Ok(Self::AdminReject {
                report_id: parse_id(report)?,
            }),
            ("admin_unban", [target]) => Ok(Self::AdminUnban {
                target: parse_user(target)?,
            }),
            _ => Err(TokenError::Unknown),
        }
    }

    /// Whether the command is reserved for the configured administrator.
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminPanel
                | Self::AdminReports
                | Self::AdminBans
                | Self::AdminDelete { .. }
                | Self::AdminBan { .. }
                | Self::AdminReject { .. }
                | Self::AdminUnban { .. }
        )
    }

    /// Execute the command for `sender` using the shared context.
    ///
    /// # Errors
    /// Returns an error if database access fails; business refusals are
    /// expressed in the reply text instead.
    #[must_use = "handle the result"]
    pub async fn process(self, ctx: &Context, sender: UserId) -> BoardResult<Reply> {
        match self {
            Self::Start => board::start(ctx, sender).await,
            Self::Feed { offset } => board::feed(ctx, offset).await,
            Self::Random => board::random(ctx, sender).await,
            Self::Popular => board::popular(ctx).await,
            Self::ViewTopic { topic_id, page } => board::view_topic(ctx, sender, topic_id, page).await,
            Self::NewTopic => Ok(board::prompt_new_topic(ctx, sender)),
            Self::Reply { topic_id } => board::prompt_reply(ctx, sender, topic_id).await,
            Self::Report { topic_id } => board::prompt_report(ctx, sender, topic_id).await,
            Self::Profile => profile::show(ctx, sender).await,
            Self::ChangeName => Ok(profile::prompt_change_name(ctx, sender)),
            Self::ToggleNotifications => profile::toggle_notifications(ctx, sender).await,
            Self::CloseTopic { topic_id } => board::close_topic(ctx, sender, topic_id).await,
            Self::DeleteTopic { topic_id } => board::delete_own_topic(ctx, sender, topic_id).await,
            Self::AdminPanel => Ok(admin::panel()),
            Self::AdminReports => admin::pending_reports(ctx).await,
            Self::AdminBans => admin::active_bans(ctx).await,
            Self::AdminDelete { topic_id, report_id } => {
                Ok(admin::prompt_delete(ctx, sender, topic_id, report_id))
            }
            Self::AdminBan {
                target,
                days,
                report_id,
            } => Ok(admin::prompt_ban(ctx, sender, target, days, report_id)),
            Self::AdminReject { report_id } => admin::reject_report(ctx, sender, report_id).await,
            Self::AdminUnban { target } => admin::unban(ctx, target).await,
        }
    }
}

/// Token builders kept next to the parser so the two stay in sync.
pub mod tokens {
    use crate::UserId;

    /// Feed page at `offset`.
    #[must_use]
    pub fn feed(offset: i64) -> String { format!("feed:{offset}") }

    /// Topic view at reply page `page`.
    #[must_use]
    pub fn topic(topic_id: i32, page: i64) -> String { format!("topic:{topic_id}:{page}") }

    /// Reply prompt for a topic.
    #[must_use]
    pub fn reply(topic_id: i32) -> String { format!("reply:{topic_id}") }

    /// Report prompt for a topic.
    #[must_use]
    pub fn report(topic_id: i32) -> String { format!("report:{topic_id}") }

    /// Author-side close.
    #[must_use]
    pub fn close(topic_id: i32) -> String { format!("close:{topic_id}") }

    /// Author-side delete.
    #[must_use]
    pub fn delete(topic_id: i32) -> String { format!("delete:{topic_id}") }

    /// Admin delete, optionally tied to a report.
    #[must_use]
    pub fn admin_delete(topic_id: i32, report_id: Option<i32>) -> String {
        report_id.map_or_else(
            || format!("admin_delete:{topic_id}"),
            |report| format!("admin_delete:{topic_id}:{report}"),
        )
    }

    /// Admin ban; `days = None` encodes a permanent ban.
    #[must_use]
    pub fn admin_ban(target: UserId, days: Option<i64>, report_id: Option<i32>) -> String {
        let days = days.map_or_else(|| "perm".to_owned(), |d| d.to_string());
        report_id.map_or_else(
            || format!("admin_ban:{target}:{days}"),
            |report| format!("admin_ban:{target}:{days}:{report}"),
        )
    }

    /// Admin report dismissal.
    #[must_use]
    pub fn admin_reject(report_id: i32) -> String { format!("admin_reject:{report_id}") }

    /// Admin unban.
    #[must_use]
    pub fn admin_unban(target: UserId) -> String { format!("admin_unban:{target}") }
}
