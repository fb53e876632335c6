use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::event::{EventSink, ServerEvent};
use crate::ledger::SharedHoldings;
use crate::model::tick::Tick;
use crate::wire::{self, Frame};

#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub pacing: Duration,
    pub recv_timeout: Duration,
    pub max_frame_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(10),
            recv_timeout: Duration::from_secs(500),
            max_frame_bytes: wire::DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerSettings {
    pub fn from_config(cfg: &ServerConfig) -> AppResult<Self> {
        let pacing = cfg
            .pacing()
            .map_err(|e| AppError::Config(format!("server.pacing: {:#}", e)))?;
        let recv_timeout = cfg
            .recv_timeout()
            .map_err(|e| AppError::Config(format!("server.recv_timeout: {:#}", e)))?;
        Ok(Self {
            pacing,
            recv_timeout,
            max_frame_bytes: cfg.max_frame_bytes,
        })
    }
}

/// Outcome of a connection's sender task.
#[derive(Debug)]
pub struct SenderReport {
    pub sent: usize,
    /// Set when a write failed, or the connection was closed, before the feed
    /// was exhausted.
    pub error: Option<AppError>,
}

/// Outcome of a connection's receiver task; it always ends on a terminal
/// condition, `AppError::Disconnected` for an orderly close.
#[derive(Debug)]
pub struct ReceiverReport {
    pub applied: usize,
    pub reason: AppError,
}

/// Shared by the two tasks of one connection. Whichever task ends on a
/// failure closes it, and the other stops at its next read, transmit or
/// pacing sleep with `AppError::ConnectionClosed`.
#[derive(Debug, Clone)]
struct CloseSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseSignal {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    fn close(&self) {
        self.tx.send_replace(true);
    }

    fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }

    async fn closed(&self) {
        let mut rx = self.tx.subscribe();
        // The sender half lives in `self`, so this only returns once closed.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

/// Tasks and state of one accepted connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub peer: SocketAddr,
    pub holdings: SharedHoldings,
    pub sender: JoinHandle<SenderReport>,
    pub receiver: JoinHandle<ReceiverReport>,
}

impl ConnectionHandle {
    /// Wait for both tasks.
    pub async fn join(self) -> AppResult<(SenderReport, ReceiverReport)> {
        let sender = self.sender.await?;
        let receiver = self.receiver.await?;
        Ok((sender, receiver))
    }
}

/// Replays one price feed to every accepted connection and keeps per
/// connection holdings from the orders sent back.
pub struct StreamServer {
    listener: TcpListener,
    feed: Arc<Vec<Tick>>,
    settings: ServerSettings,
    events: EventSink<ServerEvent>,
}

impl StreamServer {
    pub async fn bind(addr: &str, feed: Vec<Tick>, settings: ServerSettings) -> AppResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, rows = feed.len(), "Server established");
        Ok(Self {
            listener,
            feed: Arc::new(feed),
            settings,
            events: EventSink::disabled(),
        })
    }

    pub fn with_events(mut self, events: EventSink<ServerEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever. Failures stay with the connection that hit
    /// them.
    pub async fn listen(&self) -> AppResult<()> {
        loop {
            tracing::info!("Listening for client connection");
            match self.accept_one().await {
                Ok(handle) => {
                    tracing::debug!(peer = %handle.peer, "Connection tasks started");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Accept a single connection and start its sender and receiver tasks.
    pub async fn accept_one(&self) -> AppResult<ConnectionHandle> {
        let (stream, peer) = self.listener.accept().await?;
        Ok(self.spawn_connection(stream, peer))
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) -> ConnectionHandle {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
        }
        tracing::info!(peer = %peer, "Client connected");
        self.events.emit(ServerEvent::ClientConnected { peer });

        let (read_half, write_half) = stream.into_split();
        let holdings = SharedHoldings::new(0.0);
        let close = CloseSignal::new();

        let sender = tokio::spawn(stream_feed(
            write_half,
            peer,
            Arc::clone(&self.feed),
            holdings.clone(),
            self.settings.pacing,
            close.clone(),
            self.events.clone(),
        ));
        let receiver = tokio::spawn(receive_orders(
            read_half,
            peer,
            holdings.clone(),
            self.settings,
            close,
            self.events.clone(),
        ));

        ConnectionHandle {
            peer,
            holdings,
            sender,
            receiver,
        }
    }
}

async fn stream_feed(
    mut writer: OwnedWriteHalf,
    peer: SocketAddr,
    feed: Arc<Vec<Tick>>,
    holdings: SharedHoldings,
    pacing: Duration,
    close: CloseSignal,
    events: EventSink<ServerEvent>,
) -> SenderReport {
    tracing::debug!(peer = %peer, "Sending stream to client");
    let mut sent = 0usize;

    for record in feed.iter() {
        let snapshot = holdings.snapshot().await;
        let tick = record.clone().with_holdings(snapshot);

        let written = if close.is_closed() {
            Err(AppError::ConnectionClosed)
        } else {
            tokio::select! {
                res = wire::write_frame(&mut writer, &tick) => res,
                _ = close.closed() => Err(AppError::ConnectionClosed),
            }
        };
        if let Err(e) = written {
            tracing::error!(peer = %peer, error = %e, sent, "End of streaming due to error");
            close.close();
            events.emit(ServerEvent::StreamEnded {
                peer,
                sent,
                error: Some(e.to_string()),
            });
            return SenderReport {
                sent,
                error: Some(e),
            };
        }
        sent += 1;
        events.emit(ServerEvent::TickSent { peer, tick });

        tokio::select! {
            _ = tokio::time::sleep(pacing) => {}
            _ = close.closed() => {}
        }
    }

    tracing::info!(peer = %peer, sent, "Feed exhausted");
    if let Err(e) = writer.shutdown().await {
        tracing::debug!(peer = %peer, error = %e, "Shutdown after feed failed");
    }
    events.emit(ServerEvent::StreamEnded {
        peer,
        sent,
        error: None,
    });
    SenderReport { sent, error: None }
}

async fn receive_orders(
    read_half: OwnedReadHalf,
    peer: SocketAddr,
    holdings: SharedHoldings,
    settings: ServerSettings,
    close: CloseSignal,
    events: EventSink<ServerEvent>,
) -> ReceiverReport {
    tracing::debug!(peer = %peer, "Listening to client");
    let mut reader = BufReader::new(read_half);
    let mut applied = 0usize;

    let reason = loop {
        let read = tokio::time::timeout(
            settings.recv_timeout,
            wire::read_frame(&mut reader, settings.max_frame_bytes),
        );
        let frame = tokio::select! {
            res = read => match res {
                Ok(Ok(frame)) => frame,
                Ok(Err(e)) => break e,
                Err(_) => break AppError::Timeout(settings.recv_timeout),
            },
            _ = close.closed() => break AppError::ConnectionClosed,
        };

        let line = match frame {
            Frame::Line(line) => line,
            Frame::Blank => continue,
            Frame::Eof => break AppError::Disconnected,
        };

        let order = match wire::decode_order(&line) {
            Ok(order) => order,
            Err(e) => break e,
        };
        tracing::debug!(peer = %peer, %order, "Handling client answer");

        let change = holdings.apply(&order).await;
        applied += 1;
        tracing::info!(
            peer = %peer,
            before = change.before,
            after = change.after,
            "Holdings updated"
        );
        events.emit(ServerEvent::HoldingsChanged {
            peer,
            order,
            before: change.before,
            after: change.after,
        });
    };

    match &reason {
        AppError::Disconnected => tracing::info!(peer = %peer, applied, "Client disconnected"),
        AppError::ConnectionClosed => {
            tracing::info!(peer = %peer, applied, "Connection closed by sender")
        }
        e => tracing::error!(peer = %peer, error = %e, "Unexpected error with client"),
    }
    close.close();
    events.emit(ServerEvent::ReceiverClosed {
        peer,
        reason: reason.to_string(),
    });
    ReceiverReport { applied, reason }
}
