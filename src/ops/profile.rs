//! Profile view, display-name changes, and notification toggles.

use chrono::NaiveDateTime;

use crate::{
    UserId,
    db::{self, DbConnection},
    error::BoardResult,
    models::UserStats,
    ranks::{RankTier, rank_for},
    validate::validate_username,
};

/// Result of a display-name change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The name was stored.
    Renamed,
    /// The name failed format validation; the user may retry.
    Invalid(crate::error::ValidationError),
    /// Another user already holds the name.
    Taken,
}

/// Everything the profile screen shows.
#[derive(Debug, Clone)]
pub struct ProfileView {
    /// Current display name, generated on first interaction.
    pub username: String,
    /// Rank tier computed from the counters.
    pub rank: &'static RankTier,
    /// Cumulative activity counters.
    pub stats: UserStats,
    /// Reply-notification opt-in.
    pub notifications: bool,
}

/// Assemble the profile view for `user`, lazily materialising the name and
/// stats rows on first touch.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn profile(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> BoardResult<ProfileView> {
    let username = db::get_or_assign_username(conn, user, now).await?;
    let stats = db::get_stats(conn, user, now).await?;
    let notifications = db::reply_notifications_enabled(conn, user).await?;
    let rank = rank_for(stats.topics_created, stats.replies_written);
    Ok(ProfileView {
        username,
        rank,
        stats,
        notifications,
    })
}

/// Change the display name of `user`, enforcing format and uniqueness.
///
/// Format failures are recoverable: the caller keeps the conversation
/// state armed so the user can immediately try another name.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn change_username(
    conn: &mut DbConnection,
    user: UserId,
    name: &str,
    now: NaiveDateTime,
) -> BoardResult<RenameOutcome> {
    let name = name.trim();
    if let Err(err) = validate_username(name) {
        return Ok(RenameOutcome::Invalid(err));
    }
    if db::is_username_taken(conn, name, user).await? {
        return Ok(RenameOutcome::Taken);
    }
    db::upsert_username(conn, user, name, now).await?;
    Ok(RenameOutcome::Renamed)
}

/// Flip the reply-notification opt-in for `user`, returning the new value.
///
/// # Errors
/// Returns any store failure.
#[must_use = "handle the result"]
pub async fn toggle_notifications(
    conn: &mut DbConnection,
    user: UserId,
    now: NaiveDateTime,
) -> BoardResult<bool> {
    let current = db::reply_notifications_enabled(conn, user).await?;
    let next = !current;
    db::set_reply_notifications(conn, user, next, now).await?;
    Ok(next)
}
