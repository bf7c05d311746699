//! Row structs and closed enums shared by the store and rules layers.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// An anonymous topic posted to the board.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct Topic {
    pub id: i32,
    pub user_id: UserId,
    pub body: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::topics)]
pub struct NewTopic<'a> {
    pub user_id: UserId,
    pub body: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A reply attached to exactly one topic.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct Reply {
    pub id: i32,
    pub topic_id: i32,
    pub user_id: UserId,
    pub body: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::replies)]
pub struct NewReply<'a> {
    pub topic_id: i32,
    pub user_id: UserId,
    pub body: &'a str,
    pub created_at: NaiveDateTime,
}

/// Moderation state of a report.
///
/// `Pending` is the only non-terminal state; both transitions are performed
/// by admin action and record the resolving admin and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Resolved,
    Rejected,
}

impl ReportStatus {
    /// Stored text form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the stored text form; unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A user report filed against a topic.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    pub id: i32,
    pub topic_id: i32,
    pub reporter_id: UserId,
    pub reason: String,
    pub status: String,
    pub resolution: Option<String>,
    pub admin_id: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
}

impl Report {
    /// Decode the stored status column.
    #[must_use]
    pub fn status(&self) -> Option<ReportStatus> { ReportStatus::parse(&self.status) }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reports)]
pub struct NewReport<'a> {
    pub topic_id: i32,
    pub reporter_id: UserId,
    pub reason: &'a str,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
}

/// The single ban record kept per user. Re-banning overwrites it.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct Ban {
    pub user_id: UserId,
    pub reason: String,
    pub admin_id: UserId,
    pub banned_at: NaiveDateTime,
    pub unban_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

impl Ban {
    /// Whether the ban is in force at `now`.
    ///
    /// A `NULL` expiry means the ban is indefinite and stays in force until
    /// explicitly lifted.
    #[must_use]
    pub fn in_force(&self, now: NaiveDateTime) -> bool {
        self.is_active && self.unban_at.is_none_or(|until| until > now)
    }
}

/// Monotonic per-user activity counters.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct UserStats {
    pub user_id: UserId,
    pub topics_created: i32,
    pub replies_written: i32,
    pub replies_received: i32,
    pub last_active: NaiveDateTime,
}
