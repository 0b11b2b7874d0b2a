use super::{FeedEvent, FeedEventKind};
use crate::errors::ClientError;
use crate::models::FeedMessage;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Outcome {
    /// The manager asked us to stop; the socket has been closed.
    Shutdown,
    /// The peer hung up cleanly.
    Closed,
    /// Connect or read failed.
    Failed(ClientError),
    /// Nobody is listening for events any more.
    Orphaned,
}

enum Sent {
    Delivered,
    /// Shutdown arrived while the channel was full.
    Stopped,
    Orphaned,
}

/// Connection loop for one epoch: connect, stream, and after any loss wait
/// the fixed delay and try again. There is never more than one socket or
/// one pending retry per loop. Ends only on shutdown.
pub(crate) async fn run(
    epoch: u64,
    url: String,
    reconnect_delay: Duration,
    events: mpsc::Sender<FeedEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        match stream_once(epoch, &url, &events, &mut shutdown).await {
            Outcome::Shutdown => {
                tracing::info!("[feed] connection {epoch} shut down");
                return;
            }
            Outcome::Orphaned => return,
            Outcome::Closed => tracing::warn!("[feed] {url} closed by peer"),
            Outcome::Failed(e) => tracing::warn!("[feed] {url} failed: {e}"),
        }

        match emit(&events, &mut shutdown, epoch, FeedEventKind::Disconnected).await {
            Sent::Delivered => {}
            Sent::Stopped => {
                tracing::info!("[feed] connection {epoch} shut down after disconnect");
                return;
            }
            Sent::Orphaned => return,
        }

        tracing::info!("[feed] reconnecting in {}ms", reconnect_delay.as_millis());

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("[feed] connection {epoch} shut down while waiting to reconnect");
                return;
            }
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

/// Every send races the shutdown signal: a full channel must never keep the
/// manager waiting on this task.
async fn emit(
    events: &mpsc::Sender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
    epoch: u64,
    kind: FeedEventKind,
) -> Sent {
    tokio::select! {
        _ = &mut *shutdown => Sent::Stopped,
        sent = events.send(FeedEvent { epoch, kind }) => match sent {
            Ok(()) => Sent::Delivered,
            Err(_) => Sent::Orphaned,
        },
    }
}

/// Opens the socket and forwards decoded envelopes until the socket ends
/// or shutdown is requested.
async fn stream_once(
    epoch: u64,
    url: &str,
    events: &mpsc::Sender<FeedEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Outcome {
    tracing::info!("[feed] connecting to {url}");

    let connect = tokio::select! {
        _ = &mut *shutdown => return Outcome::Shutdown,
        result = connect_async(url) => result,
    };

    let ws_stream = match connect {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => return Outcome::Failed(ClientError::WebSocket(e.to_string())),
    };

    tracing::info!("[feed] connected to {url}");
    let (mut write_stream, mut read_stream) = ws_stream.split();

    match emit(events, shutdown, epoch, FeedEventKind::Connected).await {
        Sent::Delivered => {}
        Sent::Stopped => {
            close(&mut write_stream, &mut read_stream).await;
            return Outcome::Shutdown;
        }
        Sent::Orphaned => return Outcome::Orphaned,
    }

    loop {
        let msg = tokio::select! {
            _ = &mut *shutdown => {
                close(&mut write_stream, &mut read_stream).await;
                return Outcome::Shutdown;
            }
            msg = read_stream.next() => msg,
        };

        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return Outcome::Failed(ClientError::WebSocket(e.to_string())),
            None => return Outcome::Closed,
        };

        // tungstenite answers pings on its own
        match msg {
            Message::Text(text) => match FeedMessage::decode(&text) {
                Ok(FeedMessage::MarketUpdate(update)) => {
                    tracing::debug!("[feed] {} {} update", update.symbol, update.mode);
                    let kind = FeedEventKind::Update(Box::new(update));
                    match emit(events, shutdown, epoch, kind).await {
                        Sent::Delivered => {}
                        Sent::Stopped => {
                            close(&mut write_stream, &mut read_stream).await;
                            return Outcome::Shutdown;
                        }
                        Sent::Orphaned => return Outcome::Orphaned,
                    }
                }
                Err(e) => {
                    tracing::warn!("[feed] dropping malformed message: {}", ClientError::Parse(e));
                }
            },
            Message::Close(frame) => {
                tracing::debug!("[feed] close frame: {frame:?}");
                return Outcome::Closed;
            }
            _ => {}
        }
    }
}

/// Sends Close and waits for the peer to finish closing, so a replacement
/// never overlaps with this socket.
async fn close(write_stream: &mut SplitSink<Socket, Message>, read_stream: &mut SplitStream<Socket>) {
    if let Err(e) = write_stream.close().await {
        tracing::debug!("[feed] close handshake failed: {e}");
    }
    let _ = tokio::time::timeout(CLOSE_DRAIN_TIMEOUT, async {
        while let Some(Ok(_)) = read_stream.next().await {}
    })
    .await;
}
