use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::model::order::Order;
use crate::model::tick::Tick;

#[derive(Debug, Clone)]
pub enum ServerEvent {
    ClientConnected {
        peer: SocketAddr,
    },
    TickSent {
        peer: SocketAddr,
        tick: Tick,
    },
    HoldingsChanged {
        peer: SocketAddr,
        order: Order,
        before: f64,
        after: f64,
    },
    StreamEnded {
        peer: SocketAddr,
        sent: usize,
        error: Option<String>,
    },
    ReceiverClosed {
        peer: SocketAddr,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected { addr: String },
    TickReceived(Tick),
    NoData,
    OrderSent(Order),
    CapitalChanged { before: f64, after: f64 },
    PriceUnavailable(Order),
    SessionEnded { reason: String },
}

/// Optional observer channel. Emitting never blocks and never fails the
/// caller; a sink without a receiver just drops events.
#[derive(Debug)]
pub struct EventSink<E> {
    tx: Option<mpsc::UnboundedSender<E>>,
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> Default for EventSink<E> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<E> EventSink<E> {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, event: E) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
