use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const CLOSE_COLUMN: &str = "Close";
pub const HOLDINGS_COLUMN: &str = "Holdings";

/// One replayed price record.
///
/// `close` and `holdings` are the only columns the trading side reads.
/// `columns` keeps every source column in source order, `Close` included as
/// it was read, and is re-emitted unchanged except for `Holdings`, which
/// always carries `holdings`. A tick without source columns is emitted as
/// `Close` then `Holdings`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub close: f64,
    pub holdings: f64,
    pub columns: Map<String, Value>,
}

impl Tick {
    /// Bare tick with no pass-through columns.
    pub fn from_price(close: f64, holdings: f64) -> Self {
        Self {
            close,
            holdings,
            columns: Map::new(),
        }
    }

    pub fn with_holdings(mut self, holdings: f64) -> Self {
        self.holdings = holdings;
        if let Some(slot) = self.columns.get_mut(HOLDINGS_COLUMN) {
            *slot = Value::from(holdings);
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }
}

impl Serialize for Tick {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_close = self.columns.contains_key(CLOSE_COLUMN);
        let has_holdings = self.columns.contains_key(HOLDINGS_COLUMN);
        let len = self.columns.len() + usize::from(!has_close) + usize::from(!has_holdings);

        let mut map = serializer.serialize_map(Some(len))?;
        if !has_close {
            map.serialize_entry(CLOSE_COLUMN, &self.close)?;
        }
        for (name, value) in &self.columns {
            if name == HOLDINGS_COLUMN {
                map.serialize_entry(name, &self.holdings)?;
            } else {
                map.serialize_entry(name, value)?;
            }
        }
        if !has_holdings {
            map.serialize_entry(HOLDINGS_COLUMN, &self.holdings)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tick {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let columns = Map::<String, Value>::deserialize(deserializer)?;
        let close = columns
            .get(CLOSE_COLUMN)
            .ok_or_else(|| D::Error::missing_field(CLOSE_COLUMN))
            .and_then(|v| price_from_value(v).map_err(D::Error::custom))?;
        let holdings = match columns.get(HOLDINGS_COLUMN) {
            Some(v) => finite_from_value(v).map_err(D::Error::custom)?,
            None => 0.0,
        };
        Ok(Self {
            close,
            holdings,
            columns,
        })
    }
}

/// Accepts `101.5` as well as `"101.5"`; CSV-sourced columns arrive as text.
pub(crate) fn finite_from_value(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {} is out of range", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", s, e))?,
        other => return Err(format!("expected a number, got {}", other)),
    };
    if !parsed.is_finite() {
        return Err("number must be finite".to_string());
    }
    Ok(parsed)
}

/// A price must be finite and strictly positive; sizing divides by it.
pub(crate) fn price_from_value(value: &Value) -> Result<f64, String> {
    let price = finite_from_value(value)?;
    if price <= 0.0 {
        return Err(format!("{} must be positive, got {}", CLOSE_COLUMN, price));
    }
    Ok(price)
}

pub(crate) fn de_finite_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    finite_from_value(&value).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_accepts_text_and_number() {
        let a: Tick = serde_json::from_str(r#"{"Close":"101.5","Holdings":0}"#).unwrap();
        let b: Tick = serde_json::from_str(r#"{"Close":101.5,"Holdings":0.0}"#).unwrap();
        assert!((a.close - 101.5).abs() < f64::EPSILON);
        assert_eq!(a.close, b.close);
        assert_eq!(a.holdings, b.holdings);
    }

    #[test]
    fn missing_holdings_defaults_to_zero() {
        let t: Tick = serde_json::from_str(r#"{"Close":"10","Date":"2024-01-02"}"#).unwrap();
        assert_eq!(t.holdings, 0.0);
        assert_eq!(t.column("Date"), Some(&Value::String("2024-01-02".to_string())));
    }

    #[test]
    fn rejects_non_numeric_close() {
        assert!(serde_json::from_str::<Tick>(r#"{"Close":"abc"}"#).is_err());
        assert!(serde_json::from_str::<Tick>(r#"{"Close":"NaN"}"#).is_err());
        assert!(serde_json::from_str::<Tick>(r#"{"Close":null}"#).is_err());
        assert!(serde_json::from_str::<Tick>(r#"{"Open":"1"}"#).is_err());
    }

    #[test]
    fn rejects_zero_and_negative_close() {
        assert!(serde_json::from_str::<Tick>(r#"{"Close":0}"#).is_err());
        assert!(serde_json::from_str::<Tick>(r#"{"Close":"0.0"}"#).is_err());
        assert!(serde_json::from_str::<Tick>(r#"{"Close":"-3"}"#).is_err());
    }

    #[test]
    fn source_columns_keep_order_and_text() {
        let t: Tick =
            serde_json::from_str(r#"{"Date":"2024-01-02","Close":"10.50","Volume":"500"}"#).unwrap();
        let out = serde_json::to_string(&t.with_holdings(2.5)).unwrap();
        assert_eq!(
            out,
            r#"{"Date":"2024-01-02","Close":"10.50","Volume":"500","Holdings":2.5}"#
        );
    }

    #[test]
    fn holdings_column_is_overwritten_in_place() {
        let t: Tick = serde_json::from_str(r#"{"Close":"7","Holdings":"99","Note":"x"}"#).unwrap();
        let t = t.with_holdings(1.0);
        assert_eq!(t.column(HOLDINGS_COLUMN), Some(&Value::from(1.0)));
        let out = serde_json::to_string(&t).unwrap();
        assert_eq!(out, r#"{"Close":"7","Holdings":1.0,"Note":"x"}"#);
    }

    #[test]
    fn bare_tick_emits_close_then_holdings() {
        let out = serde_json::to_string(&Tick::from_price(10.0, 0.0)).unwrap();
        assert_eq!(out, r#"{"Close":10.0,"Holdings":0.0}"#);
    }
}
