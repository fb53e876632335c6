//! Line-delimited JSON framing shared by both directions.
//!
//! Every message, tick or order, is one JSON object followed by `\n`.
//! Readers buffer across socket reads, so split or coalesced segments still
//! decode one message per line.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{AppError, AppResult};
use crate::model::order::Order;
use crate::model::tick::Tick;

pub const DEFAULT_MAX_FRAME_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-blank line, without its terminator.
    Line(String),
    /// A line holding only whitespace.
    Blank,
    /// The peer closed its write side.
    Eof,
}

/// Read the next frame, refusing lines longer than `max_bytes`.
///
/// Trailing bytes without a terminator before end of stream are returned as a
/// final line.
pub async fn read_frame<R>(reader: &mut R, max_bytes: usize) -> AppResult<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = max_bytes as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Frame::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > max_bytes {
        return Err(AppError::FrameTooLarge { limit: max_bytes });
    }

    let text = String::from_utf8(buf)
        .map_err(|e| AppError::Protocol(format!("frame is not valid UTF-8: {}", e)))?;
    if text.trim().is_empty() {
        Ok(Frame::Blank)
    } else {
        Ok(Frame::Line(text.trim_end().to_string()))
    }
}

/// Serialize `msg` as one frame and flush it.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let bytes = encode(msg)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

pub fn encode<T: Serialize>(msg: &T) -> AppResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec(msg)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Strict JSON first; on failure retry once with single quotes replaced by
/// double quotes.
pub fn decode<T: DeserializeOwned>(line: &str) -> AppResult<T> {
    let line = line.trim();
    match serde_json::from_str(line) {
        Ok(v) => Ok(v),
        Err(strict_err) => {
            if !line.contains('\'') {
                return Err(strict_err.into());
            }
            serde_json::from_str(&line.replace('\'', "\"")).map_err(|_| strict_err.into())
        }
    }
}

pub fn decode_tick(line: &str) -> AppResult<Tick> {
    decode(line)
}

pub fn decode_order(line: &str) -> AppResult<Order> {
    decode(line)
}
