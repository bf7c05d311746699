//! Core library for the sotto anonymous discussion-board daemon.
//!
//! This crate exposes the relational store access layer, the domain rules
//! engine, the per-user conversation-state tracker, and the event dispatch
//! used by the server binary. Only one database backend (either `sqlite` or
//! `postgres`) should be enabled at a time.
cfg_if::cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Choose either sqlite or postgres, not both");
    } else if #[cfg(feature = "sqlite")] {
        pub use diesel::sqlite::Sqlite as DbBackend;
    } else if #[cfg(feature = "postgres")] {
        pub use diesel::pg::Pg as DbBackend;
    } else {
        compile_error!("Either the 'sqlite' or 'postgres' feature must be enabled");
    }
}

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod models;
pub mod notify;
pub mod ops;
pub mod ranks;
pub mod schema;
pub mod server;
pub mod state;
pub mod validate;

/// Chat-platform sender identifier.
///
/// Platform user ids are 64-bit and opaque to the core; they key every
/// per-user table and the conversation-state map.
pub type UserId = i64;
