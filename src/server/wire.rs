//! Frame types for the newline-delimited JSON front end.
//!
//! One JSON object per line in each direction. Inbound frames mirror the
//! two event kinds of the core; outbound frames are either the direct
//! reply to an event or an asynchronous notice pushed to a user.

use serde::{Deserialize, Serialize};

use crate::{
    UserId,
    commands::{Button, Event, Reply},
    notify::Notification,
};

/// A frame received from a dispatcher connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Free-text message.
    Message {
        /// Sending user.
        sender: UserId,
        /// Raw message text.
        text: String,
    },
    /// Button press carrying an action token.
    Action {
        /// Sending user.
        sender: UserId,
        /// Encoded action token.
        token: String,
    },
}

impl From<InboundFrame> for Event {
    fn from(frame: InboundFrame) -> Self {
        match frame {
            InboundFrame::Message { sender, text } => Self::Message { sender, text },
            InboundFrame::Action { sender, token } => Self::Action { sender, token },
        }
    }
}

/// A frame written back to a dispatcher connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Direct answer to the event just processed.
    Reply {
        /// Display text.
        text: String,
        /// Next action menu.
        menu: Vec<Button>,
    },
    /// Asynchronous notice for a user.
    Notice {
        /// Target user.
        user: UserId,
        /// Display text.
        text: String,
        /// Optional action token linking to the relevant entity.
        link: Option<String>,
    },
}

impl From<Reply> for OutboundFrame {
    fn from(reply: Reply) -> Self {
        Self::Reply {
            text: reply.text,
            menu: reply.menu,
        }
    }
}

/// Render a notification into its outbound frame.
#[must_use]
pub fn notice(user: UserId, note: &Notification) -> OutboundFrame {
    let link = note.link_token();
    let text = match note {
        Notification::ReplyReceived { topic_id, preview } => {
            format!("Your topic #{topic_id} received a reply:\n{preview}")
        }
        Notification::Banned { reason, until } => until.map_or_else(
            || format!("You have been banned: {reason}"),
            |when| {
                format!(
                    "You have been banned until {}: {reason}",
                    when.format("%d.%m.%Y %H:%M")
                )
            },
        ),
        Notification::TopicDeleted { topic_id, reason } => {
            format!("Your topic #{topic_id} was removed by the moderators: {reason}")
        }
    };
    OutboundFrame::Notice { user, text, link }
}
