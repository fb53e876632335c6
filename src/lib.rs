//! Market-data replay over TCP with strategy-driven order flow.
//!
//! [`server::StreamServer`] streams price records and keeps per-connection
//! holdings; [`client::TradingClient`] runs a [`strategy::TradingStrategy`]
//! on each record and sends orders back.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod indicator;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod server;
pub mod strategy;
pub mod wire;
