//! Manage database connections and board queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, and executing application queries grouped
//! by domain concern. Counter updates are expressed as atomic in-place
//! upserts so concurrent events for the same user cannot lose increments.

mod bans;
mod connection;
mod limits;
mod migrations;
mod names;
mod prefs;
mod replies;
mod reports;
mod stats;
mod topics;


pub use self::{
    bans::{active_bans, deactivate_ban, get_ban, upsert_ban},
    connection::{Backend, DbConnection, DbPool, MIGRATIONS, establish_pool},
    limits::{increment_daily, topics_created_on},
    migrations::{apply_migrations, run_migrations},
    names::{get_or_assign_username, get_username, is_username_taken, upsert_username},
    prefs::{reply_notifications_enabled, set_reply_notifications},
    replies::{count_replies, create_reply, list_replies},
    reports::{
        get_report,
        has_pending_report,
        insert_report,
        pending_reports,
        resolve_report,
    },
    stats::{get_stats, record_reply_received, record_reply_written, record_topic_created},
    topics::{
        close_topic,
        create_topic,
        delete_topic,
        get_topic,
        get_topic_any,
        latest_topics,
        popular_topics,
        random_topic,
        touch_topic,
    },
};
