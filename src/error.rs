use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("feed error: {0}")]
    Feed(String),

    #[error("peer disconnected")]
    Disconnected,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("no data received within {0:?}")]
    Timeout(Duration),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
