pub mod connection;

use crate::models::MarketUpdate;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct FeedEvent {
    /// Which connection produced this event. Events from a replaced
    /// connection carry an older epoch and should be ignored.
    pub epoch: u64,
    pub kind: FeedEventKind,
}

#[derive(Debug, Clone)]
pub enum FeedEventKind {
    Connected,
    Disconnected,
    Update(Box<MarketUpdate>),
}

struct ActiveConnection {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Owns the single push-feed connection. Replacing it always finishes the
/// old connection task before the new one is spawned.
pub struct FeedManager {
    url: String,
    reconnect_delay: Duration,
    events: mpsc::Sender<FeedEvent>,
    epoch: u64,
    active: Option<ActiveConnection>,
}

impl FeedManager {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration, events: mpsc::Sender<FeedEvent>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            events,
            epoch: 0,
            active: None,
        }
    }

    /// Tears down the current connection (if any), waits for it to close,
    /// then opens a fresh one. Returns the new epoch.
    pub async fn replace(&mut self) -> u64 {
        self.shutdown().await;

        self.epoch += 1;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(connection::run(
            self.epoch,
            self.url.clone(),
            self.reconnect_delay,
            self.events.clone(),
            shutdown_rx,
        ));

        self.active = Some(ActiveConnection {
            shutdown: shutdown_tx,
            task,
        });
        self.epoch
    }

    pub async fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            // The task may already be gone if the event receiver was dropped
            let _ = active.shutdown.send(());
            if let Err(e) = active.task.await {
                tracing::error!("[feed] connection task {} ended abnormally: {e}", self.epoch);
            }
        }
    }
}
