//! Runtime configuration and command-line interface.
//!
//! Configuration merges three layers, later ones winning: built-in
//! defaults, `SOTTO_`-prefixed environment variables, and explicit CLI
//! flags. Keeping the types in the library lets the binary stay a thin
//! wrapper around [`crate::server::run`].

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Resolved runtime configuration shared by daemon and admin commands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server bind address for the line-protocol front end.
    pub bind: String,
    /// Database connection string or path.
    pub database: String,
    /// User id of the single administrator; `0` disables admin actions.
    pub admin_id: UserId,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7070".to_owned(),
            database: "sotto.db".to_owned(),
            admin_id: 0,
        }
    }
}

impl AppConfig {
    /// Resolve the configuration from defaults, environment, and CLI.
    ///
    /// # Errors
    /// Returns any extraction error reported by the underlying providers,
    /// e.g. a non-numeric `SOTTO_ADMIN_ID`.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        let mut cfg: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("SOTTO_"))
            .extract()?;
        if let Some(bind) = &cli.bind {
            cfg.bind = bind.clone();
        }
        if let Some(database) = &cli.database {
            cfg.database = database.clone();
        }
        if let Some(admin_id) = cli.admin_id {
            cfg.admin_id = admin_id;
        }
        Ok(cfg)
    }
}

/// CLI subcommands exposed by `sotto`.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ban a user without going through the chat flow.
    Ban {
        /// User to ban.
        user_id: UserId,
        /// Reason recorded with the ban.
        reason: String,
        /// Ban length in days; omit to ban indefinitely.
        #[arg(long)]
        days: Option<i64>,
    },
    /// Lift a user's ban.
    Unban {
        /// User to unban.
        user_id: UserId,
    },
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Server bind address; overrides `SOTTO_BIND`.
    #[arg(long)]
    pub bind: Option<String>,
    /// Database connection string or path; overrides `SOTTO_DATABASE`.
    #[arg(long)]
    pub database: Option<String>,
    /// Administrator user id; overrides `SOTTO_ADMIN_ID`.
    #[arg(long)]
    pub admin_id: Option<UserId>,
    /// Optional subcommand; the daemon runs when absent.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use figment::Jail;
    use rstest::rstest;

    use super::*;

    fn bare_cli() -> Cli { Cli::parse_from(["sotto"]) }

    #[rstest]
    fn defaults_apply_without_env_or_flags() {
        Jail::expect_with(|_j| {
            let cfg = AppConfig::load(&bare_cli()).expect("load");
            assert_eq!(cfg, AppConfig::default());
            Ok(())
        });
    }

    #[rstest]
    fn env_config_loading() {
        Jail::expect_with(|j| {
            j.set_env("SOTTO_BIND", "127.0.0.1:8000");
            j.set_env("SOTTO_DATABASE", "env.db");
            j.set_env("SOTTO_ADMIN_ID", "9000");
            let cfg = AppConfig::load(&bare_cli()).expect("load");
            assert_eq!(cfg.bind, "127.0.0.1:8000");
            assert_eq!(cfg.database, "env.db");
            assert_eq!(cfg.admin_id, 9000);
            Ok(())
        });
    }

    #[rstest]
    fn cli_overrides_env() {
        Jail::expect_with(|j| {
            j.set_env("SOTTO_BIND", "127.0.0.1:8000");
            let cli = Cli::parse_from(["sotto", "--bind", "0.0.0.0:9000", "--admin-id", "7"]);
            let cfg = AppConfig::load(&cli).expect("load");
            assert_eq!(cfg.bind, "0.0.0.0:9000");
            assert_eq!(cfg.admin_id, 7);
            Ok(())
        });
    }

    #[rstest]
    fn subcommands_parse() {
        let cli = Cli::parse_from(["sotto", "ban", "42", "spam", "--days", "7"]);
        match cli.command {
            Some(Commands::Ban {
                user_id,
                ref reason,
                days,
            }) => {
                assert_eq!(user_id, 42);
                assert_eq!(reason, "spam");
                assert_eq!(days, Some(7));
            }
            ref other => panic!("unexpected command: {other:?}"),
        }
    }
}
