use std::fmt;

use serde::{Deserialize, Serialize};

use super::tick::de_finite_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "Buy"),
            OrderSide::Sell => write!(f, "Sell"),
        }
    }
}

/// Order emitted by a strategy and sent client -> server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "Direction")]
    pub direction: OrderSide,
    #[serde(rename = "Amount", deserialize_with = "de_finite_number")]
    pub amount: f64,
}

impl Order {
    /// Buy sized as a fraction of capital at the given price.
    pub fn buy_fraction(fraction: f64, capital: f64, price: f64) -> Self {
        Self {
            direction: OrderSide::Buy,
            amount: fraction * capital / price,
        }
    }

    /// Sell of everything currently held.
    pub fn liquidate(holdings: f64) -> Self {
        Self {
            direction: OrderSide::Sell,
            amount: holdings,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.amount)
    }
}
