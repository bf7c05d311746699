//! Administrative CLI commands that bypass the chat flow.

use anyhow::{Result, anyhow};
use chrono::Utc;
use tracing::info;

use super::setup_database;
use crate::{
    config::{AppConfig, Commands},
    notify::NullNotifier,
    ops,
};

/// Execute an administrative command against the configured database.
///
/// CLI bans use the [`NullNotifier`]: there is no live session to push the
/// notice through, and the ban itself must not depend on one.
///
/// # Errors
///
/// Propagates failures from database setup or the underlying operation.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    let pool = setup_database(&cfg.database).await?;
    let mut conn = pool
        .get()
        .await
        .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
    let now = Utc::now().naive_utc();

    match command {
        Commands::Ban {
            user_id,
            reason,
            days,
        } => {
            let until =
                ops::ban_user(&mut conn, &NullNotifier, user_id, &reason, cfg.admin_id, days, now)
                    .await?;
            match until {
                Some(when) => info!(user_id, %when, "user banned"),
                None => info!(user_id, "user banned indefinitely"),
            }
        }
        Commands::Unban { user_id } => {
            ops::unban_user(&mut conn, user_id).await?;
            info!(user_id, "ban lifted");
        }
    }
    Ok(())
}
