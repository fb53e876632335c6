//! Tabular price source for the server.

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::model::tick::{price_from_value, Tick, CLOSE_COLUMN, HOLDINGS_COLUMN};

/// Load a headered CSV file into ticks, in file order.
pub fn load_feed(path: &Path) -> AppResult<Vec<Tick>> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Feed(format!("failed to open {}: {}", path.display(), e)))?;
    let ticks = read_feed(file)?;
    tracing::debug!(path = %path.display(), rows = ticks.len(), "Loaded price feed");
    Ok(ticks)
}

/// Every column is kept as text in header order. A source `Holdings` column
/// keeps its position but its value is reset; the server stamps it per tick.
pub fn read_feed<R: Read>(source: R) -> AppResult<Vec<Tick>> {
    let mut rdr = csv::Reader::from_reader(source);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let close_idx = headers
        .iter()
        .position(|h| h == CLOSE_COLUMN)
        .ok_or_else(|| AppError::Feed(format!("missing '{}' column", CLOSE_COLUMN)))?;

    let mut ticks = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let raw_close = record.get(close_idx).unwrap_or("").trim();
        let close = price_from_value(&Value::String(raw_close.to_string())).map_err(|e| {
            AppError::Feed(format!("row {}: invalid Close value '{}': {}", row + 1, raw_close, e))
        })?;

        let mut columns = Map::new();
        for (name, value) in headers.iter().zip(record.iter()) {
            let value = if name == HOLDINGS_COLUMN {
                Value::from(0.0)
            } else {
                Value::String(value.to_string())
            };
            columns.insert(name.clone(), value);
        }

        ticks.push(Tick {
            close,
            holdings: 0.0,
            columns,
        });
    }
    Ok(ticks)
}
