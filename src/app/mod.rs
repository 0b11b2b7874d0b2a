pub mod event;
pub mod reducer;
pub mod state;

pub use event::*;
pub use state::*;

use crate::config::Config;
use crate::directory::SymbolDirectory;
use crate::feed::{FeedEvent, FeedManager};
use crate::input::Command;
use crate::models::Venue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const CHANNEL_CAPACITY: usize = 1024;

/// The controller: owns all state and the feed connection, applies events
/// in arrival order, and publishes a snapshot for the renderer on each tick
/// where something changed.
pub struct AppRuntime {
    state: AppState,
    directory: Arc<dyn SymbolDirectory>,
    feed: FeedManager,
    feed_rx: mpsc::Receiver<FeedEvent>,
    directory_tx: mpsc::Sender<DirectoryEvent>,
    directory_rx: mpsc::Receiver<DirectoryEvent>,
    frames: watch::Sender<AppState>,
    render_interval: Duration,
    dirty: bool,
}

impl AppRuntime {
    pub fn new(config: &Config, directory: Arc<dyn SymbolDirectory>) -> Self {
        let (feed_tx, feed_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (directory_tx, directory_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = AppState::new(config);
        let (frames, _) = watch::channel(state.clone());

        Self {
            state,
            directory,
            feed: FeedManager::new(config.feed_url.clone(), config.reconnect_delay, feed_tx),
            feed_rx,
            directory_tx,
            directory_rx,
            frames,
            render_interval: config.render_interval,
            dirty: true,
        }
    }

    /// Snapshots published for the renderer.
    pub fn frames(&self) -> watch::Receiver<AppState> {
        self.frames.subscribe()
    }

    #[cfg(test)]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> AppState {
        self.start().await;

        let mut render = tokio::time::interval(self.render_interval);
        render.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(ev) = self.feed_rx.recv() => self.dispatch(AppEvent::Feed(ev)).await,
                Some(ev) = self.directory_rx.recv() => self.dispatch(AppEvent::Directory(ev)).await,
                cmd = commands.recv() => match cmd {
                    Some(Command::Ui(ev)) => self.dispatch(AppEvent::Ui(ev)).await,
                    Some(Command::Help) => {
                        self.state.status_message = crate::input::HELP.to_string();
                        self.dirty = true;
                    }
                    Some(Command::Redraw) => self.dirty = true,
                    // Raw mode swallows SIGINT, so a dead key reader means no way to quit
                    Some(Command::Quit) | None => break,
                },
                _ = render.tick() => self.publish_if_dirty(),
                _ = &mut ctrl_c => break,
            }
        }

        tracing::info!("[app] shutting down");
        self.feed.shutdown().await;
        self.state
    }

    pub async fn start(&mut self) {
        let transition = reducer::startup(&mut self.state);
        self.apply(transition).await;
    }

    pub async fn dispatch(&mut self, ev: AppEvent) {
        let transition = reducer::reduce(&mut self.state, ev, chrono::Utc::now().timestamp_millis());
        self.apply(transition).await;
    }

    async fn apply(&mut self, transition: Transition) {
        self.dirty |= transition.changed;
        for effect in transition.effects {
            self.execute(effect).await;
        }
    }

    async fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::ReconnectFeed => {
                let epoch = self.feed.replace().await;
                let t = reducer::reduce(&mut self.state, AppEvent::FeedReplaced { epoch }, 0);
                self.dirty |= t.changed;
            }
            Effect::SetSymbol(symbol) => {
                let directory = Arc::clone(&self.directory);
                let tx = self.directory_tx.clone();
                tokio::spawn(async move {
                    let result = directory.set_symbol(&symbol).await.map_err(|e| e.to_string());
                    let _ = tx.send(DirectoryEvent::SymbolSet { symbol, result }).await;
                });
            }
            Effect::LoadSymbols => {
                let directory = Arc::clone(&self.directory);
                let tx = self.directory_tx.clone();
                tokio::spawn(async move {
                    let result = directory.list_symbols().await.map_err(|e| e.to_string());
                    let _ = tx.send(DirectoryEvent::SymbolsLoaded(result)).await;
                });
            }
            Effect::LoadCustomLists => {
                let directory = Arc::clone(&self.directory);
                let tx = self.directory_tx.clone();
                tokio::spawn(async move {
                    let (mx, lbank) = tokio::join!(
                        directory.list_exchange_symbols(Venue::Mx),
                        directory.list_exchange_symbols(Venue::Lbank)
                    );
                    let result = match (mx, lbank) {
                        (Ok(mx), Ok(lbank)) => Ok((mx, lbank)),
                        (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
                    };
                    let _ = tx.send(DirectoryEvent::CustomListsLoaded(result)).await;
                });
            }
        }
    }

    fn publish_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        // Never blocks; the renderer only ever sees the newest snapshot
        self.frames.send_replace(self.state.clone());
    }

    #[cfg(test)]
    async fn next_directory_event(&mut self) -> Option<DirectoryEvent> {
        self.directory_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDirectory {
        fail_set: bool,
        fail_lbank: bool,
        posted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SymbolDirectory for FakeDirectory {
        async fn list_symbols(&self) -> Result<Vec<String>, ClientError> {
            Ok(vec!["BTC/USDT".into(), "ETH/USDT".into()])
        }

        async fn list_exchange_symbols(&self, venue: Venue) -> Result<Vec<String>, ClientError> {
            match venue {
                Venue::Lbank if self.fail_lbank => Err(ClientError::Rejected { status: 502 }),
                Venue::Lbank => Ok(vec!["btc_usdt".into()]),
                Venue::Mx => Ok(vec!["BTCUSDT".into()]),
            }
        }

        async fn set_symbol(&self, symbol: &str) -> Result<(), ClientError> {
            self.posted.lock().unwrap().push(symbol.to_string());
            if self.fail_set {
                Err(ClientError::Rejected { status: 500 })
            } else {
                Ok(())
            }
        }
    }

    fn runtime(directory: FakeDirectory) -> AppRuntime {
        runtime_with(Arc::new(directory))
    }

    fn runtime_with(directory: Arc<FakeDirectory>) -> AppRuntime {
        let config = Config::from_lookup(|k| match k {
            "FEED_URL" => Some("ws://127.0.0.1:1/ws".to_string()),
            "RECONNECT_DELAY_MS" => Some("50".to_string()),
            _ => None,
        })
        .unwrap();
        AppRuntime::new(&config, directory)
    }

    async fn pump(rt: &mut AppRuntime) {
        let ev = rt.next_directory_event().await.unwrap();
        rt.dispatch(AppEvent::Directory(ev)).await;
    }

    #[tokio::test]
    async fn startup_loads_pairs_and_opens_feed() {
        let mut rt = runtime(FakeDirectory::default());
        rt.start().await;
        assert_eq!(rt.state().feed_epoch, 1);

        pump(&mut rt).await;
        assert_eq!(rt.state().available_symbols, vec!["BTC/USDT", "ETH/USDT"]);
        rt.feed.shutdown().await;
    }

    #[tokio::test]
    async fn confirmed_symbol_change_reconnects() {
        let mut rt = runtime(FakeDirectory::default());
        rt.start().await;
        pump(&mut rt).await;

        rt.dispatch(AppEvent::Ui(UiEvent::SymbolRequested { symbol: "ETH/USDT".into() })).await;
        pump(&mut rt).await;

        assert_eq!(rt.state().selection.symbol, "ETH/USDT");
        assert_eq!(rt.state().feed_epoch, 2);
        assert!(rt.state().chart.is_empty());
        rt.feed.shutdown().await;
    }

    #[tokio::test]
    async fn rejected_symbol_change_keeps_connection() {
        let directory = Arc::new(FakeDirectory {
            fail_set: true,
            ..Default::default()
        });
        let mut rt = runtime_with(Arc::clone(&directory));
        rt.start().await;
        pump(&mut rt).await;

        rt.dispatch(AppEvent::Ui(UiEvent::SymbolRequested { symbol: "ETH/USDT".into() })).await;
        pump(&mut rt).await;

        assert_eq!(*directory.posted.lock().unwrap(), vec!["ETH/USDT"]);
        assert_eq!(rt.state().selection.symbol, "BTC/USDT");
        assert_eq!(rt.state().feed_epoch, 1);
        rt.feed.shutdown().await;
    }

    #[tokio::test]
    async fn custom_lists_need_both_exchanges() {
        let mut rt = runtime(FakeDirectory {
            fail_lbank: true,
            ..Default::default()
        });
        rt.start().await;
        pump(&mut rt).await;

        rt.dispatch(AppEvent::Ui(UiEvent::PairSourceChanged {
            source: crate::models::PairSource::Custom,
        }))
        .await;
        pump(&mut rt).await;

        assert!(matches!(rt.state().custom.lists, CustomLists::Failed(_)));
        rt.feed.shutdown().await;
    }

    #[tokio::test]
    async fn publishes_snapshot_only_when_dirty() {
        let mut rt = runtime(FakeDirectory::default());
        let mut frames = rt.frames();
        rt.start().await;

        rt.publish_if_dirty();
        assert!(frames.has_changed().unwrap());
        assert_eq!(frames.borrow_and_update().feed_epoch, 1);

        rt.publish_if_dirty();
        assert!(!frames.has_changed().unwrap());
        rt.feed.shutdown().await;
    }

    #[tokio::test]
    async fn quit_command_stops_the_controller() {
        let rt = runtime(FakeDirectory::default());
        let (tx, rx) = mpsc::channel(4);
        tx.send(Command::Redraw).await.unwrap();
        tx.send(Command::Quit).await.unwrap();

        let state = tokio::time::timeout(Duration::from_secs(5), rt.run(rx))
            .await
            .expect("controller did not stop");
        assert_eq!(state.feed_epoch, 1);
    }
}
