use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;

use crate::config::Config;
use crate::error::AppResult;
use crate::event::{ClientEvent, EventSink};
use crate::ledger;
use crate::model::order::Order;
use crate::model::tick::Tick;
use crate::strategy::TradingStrategy;
use crate::wire::{self, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientSummary {
    pub ticks: usize,
    pub orders: usize,
    pub capital: f64,
    pub last_price: Option<f64>,
}

/// Consumes the feed over one connection, runs the strategy on every tick
/// and keeps capital locally.
#[derive(Debug)]
pub struct TradingClient {
    addr: String,
    capital: f64,
    price: Option<f64>,
    strategy: TradingStrategy,
    max_frame_bytes: usize,
    ticks: usize,
    orders: usize,
    events: EventSink<ClientEvent>,
}

impl TradingClient {
    pub fn new(addr: impl Into<String>, initial_capital: f64, strategy: TradingStrategy) -> Self {
        let addr = addr.into();
        tracing::debug!(addr = %addr, strategy = %strategy.kind(), "Initializing trading client");
        Self {
            addr,
            capital: initial_capital,
            price: None,
            strategy,
            max_frame_bytes: wire::DEFAULT_MAX_FRAME_BYTES,
            ticks: 0,
            orders: 0,
            events: EventSink::disabled(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.client.addr(),
            cfg.client.initial_capital,
            TradingStrategy::from_config(&cfg.strategy),
        )
        .with_max_frame_bytes(cfg.client.max_frame_bytes)
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn with_events(mut self, events: EventSink<ClientEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    /// Last price seen; `None` before the first tick.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            ticks: self.ticks,
            orders: self.orders,
            capital: self.capital,
            last_price: self.price,
        }
    }

    /// Open the connection and trade until the server ends the feed.
    pub async fn connect(&mut self) -> AppResult<ClientSummary> {
        tracing::info!(addr = %self.addr, "Attempting to connect to server");
        let stream = TcpStream::connect(&self.addr).await?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }
        self.events.emit(ClientEvent::Connected {
            addr: self.addr.clone(),
        });
        self.run(stream).await
    }

    /// Session loop over an already established stream.
    ///
    /// Blank frames are retried immediately; end of stream finishes the
    /// session; an undecodable tick is fatal.
    pub async fn run<S>(&mut self, stream: S) -> AppResult<ClientSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);

        loop {
            let line = match wire::read_frame(&mut reader, self.max_frame_bytes).await {
                Ok(Frame::Line(line)) => line,
                Ok(Frame::Blank) => {
                    tracing::warn!("No data received, continuing");
                    self.events.emit(ClientEvent::NoData);
                    continue;
                }
                Ok(Frame::Eof) => {
                    tracing::info!(ticks = self.ticks, orders = self.orders, "Server closed the feed");
                    self.events.emit(ClientEvent::SessionEnded {
                        reason: "feed closed".to_string(),
                    });
                    return Ok(self.summary());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Connection error");
                    self.events.emit(ClientEvent::SessionEnded {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };
            tracing::info!(data = %line, "Received data");

            let tick = match wire::decode_tick(&line) {
                Ok(tick) => tick,
                Err(e) => {
                    tracing::error!(error = %e, data = %line, "JSON decoding error");
                    self.events.emit(ClientEvent::SessionEnded {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };

            self.on_tick(tick, &mut write_half).await?;
        }
    }

    async fn on_tick<W>(&mut self, tick: Tick, writer: &mut W) -> AppResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        self.ticks += 1;
        self.price = Some(tick.close);
        let cash_before = self.capital;

        let order = self.strategy.evaluate(&tick, self.capital);
        self.events.emit(ClientEvent::TickReceived(tick));

        if let Some(order) = order {
            self.send_order(writer, &order).await?;
            self.handle_order(&order);
        }

        tracing::info!(before = cash_before, after = self.capital, "Cash balance updated");
        self.events.emit(ClientEvent::CapitalChanged {
            before: cash_before,
            after: self.capital,
        });
        Ok(())
    }

    async fn send_order<W>(&mut self, writer: &mut W, order: &Order) -> AppResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        tracing::debug!(%order, "Sending order");
        wire::write_frame(writer, order).await?;
        self.orders += 1;
        tracing::info!(%order, "Order sent");
        self.events.emit(ClientEvent::OrderSent(*order));
        Ok(())
    }

    /// Apply an executed order to local capital at the last seen price.
    pub fn handle_order(&mut self, order: &Order) {
        let Some(price) = self.price else {
            tracing::error!(%order, "Price not available for handling order");
            self.events.emit(ClientEvent::PriceUnavailable(*order));
            return;
        };
        self.capital = ledger::apply_to_capital(self.capital, order, price);
        tracing::info!(capital = self.capital, "Order handled");
    }
}
