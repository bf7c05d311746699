//! Server orchestration for the line-protocol front end.
//!
//! This module exposes the daemon runtime and the administrative commands
//! so the binary stays a thin wrapper that only needs to call [`run`]. The
//! transport is deliberately plain: one JSON frame per line over TCP, with
//! asynchronous notices routed through a per-user session registry.

pub mod admin;
pub mod wire;

use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use clap::Parser;
use dashmap::DashMap;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tracing::{error, info, warn};

use crate::{
    UserId,
    commands::Event,
    config::{AppConfig, Cli},
    db::{DbPool, apply_migrations, establish_pool},
    handler::{Context, handle_event},
    notify::{Notification, Notifier, NotifyError},
    server::wire::{InboundFrame, OutboundFrame},
};

/// Live dispatcher sessions, keyed by the users seen on each connection.
///
/// A user reconnecting from a new session simply overwrites the old entry;
/// stale entries are dropped on the first failed push.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<UserId, mpsc::UnboundedSender<OutboundFrame>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Route outbound frames for `user` through `tx`.
    pub fn attach(&self, user: UserId, tx: mpsc::UnboundedSender<OutboundFrame>) {
        self.sessions.insert(user, tx);
    }

    /// Push a frame to `user`'s session, pruning the entry if it is gone.
    ///
    /// # Errors
    /// Returns [`NotifyError::Unreachable`] when no session is known and
    /// [`NotifyError::Closed`] when the session has disconnected.
    pub fn push(&self, user: UserId, frame: OutboundFrame) -> Result<(), NotifyError> {
        let Some(entry) = self.sessions.get(&user) else {
            return Err(NotifyError::Unreachable);
        };
        if entry.send(frame).is_err() {
            drop(entry);
            self.sessions.remove(&user);
            return Err(NotifyError::Closed);
        }
        Ok(())
    }
}

/// Notifier that delivers notices through the session registry.
pub struct ChannelNotifier {
    registry: Arc<SessionRegistry>,
}

impl ChannelNotifier {
    /// Build a notifier over the given registry.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>) -> Self { Self { registry } }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, user: UserId, note: Notification) -> Result<(), NotifyError> {
        self.registry.push(user, wire::notice(user, &note))
    }
}

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
///
/// Returns any error emitted while resolving configuration or starting the
/// runtime.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli).context("failed to resolve configuration")?;
    match cli.command {
        Some(command) => admin::run_command(command, &config).await,
        None => run_daemon(config).await,
    }
}

/// Sets up the database connection pool and runs migrations.
///
/// # Errors
/// Returns any failure reported while building the pool or applying
/// migrations.
pub async fn setup_database(database: &str) -> Result<DbPool> {
    let pool = establish_pool(database)
        .await
        .map_err(|err| anyhow!("failed to build database pool: {err}"))?;
    {
        let mut conn = pool
            .get()
            .await
            .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
        apply_migrations(&mut conn, database)
            .await
            .context("failed to apply migrations")?;
    }
    Ok(pool)
}

/// Run the daemon using the supplied configuration.
///
/// # Errors
///
/// Returns any failure reported while seeding the database pool or binding
/// the socket; per-connection failures are logged and absorbed.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    let pool = setup_database(&cfg.database).await?;
    let registry = Arc::new(SessionRegistry::new());
    let notifier = Arc::new(ChannelNotifier::new(Arc::clone(&registry)));
    let ctx = Arc::new(Context::new(pool, notifier, cfg.admin_id));

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    info!(bind = %cfg.bind, "sotto listening");

    loop {
        let (socket, peer) = listener.accept().await?;
        let ctx = Arc::clone(&ctx);
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(err) = handle_client(socket, ctx, registry).await {
                warn!(%err, %peer, "connection closed with error");
            }
        });
    }
}

/// Serve one dispatcher connection until it closes.
///
/// Each inbound line is decoded, dispatched through the core, and answered
/// with a reply frame on the same connection. Every sender seen on the
/// connection is attached to the registry so notices reach them here.
async fn handle_client(
    socket: TcpStream,
    ctx: Arc<Context>,
    registry: Arc<SessionRegistry>,
) -> Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(mut line) = serde_json::to_string(&frame) else {
                continue;
            };
            line.push('\n');
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(read_half).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let frame: InboundFrame = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "discarding malformed frame");
                continue;
            }
        };
        let event: Event = frame.into();
        let sender = match &event {
            Event::Message { sender, .. } | Event::Action { sender, .. } => *sender,
        };
        registry.attach(sender, tx.clone());

        let reply = handle_event(&ctx, event).await;
        if tx.send(reply.into()).is_err() {
            error!("reply channel closed mid-connection");
            break;
        }
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}
