use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::order::{Order, OrderSide};

/// Server-side rule: Buy adds to holdings, Sell removes.
pub fn apply_to_holdings(holdings: f64, order: &Order) -> f64 {
    match order.direction {
        OrderSide::Buy => holdings + order.amount,
        OrderSide::Sell => holdings - order.amount,
    }
}

/// Client-side rule: Buy spends `amount * price`, Sell receives it.
pub fn apply_to_capital(capital: f64, order: &Order, price: f64) -> f64 {
    match order.direction {
        OrderSide::Buy => capital - order.amount * price,
        OrderSide::Sell => capital + order.amount * price,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingsChange {
    pub before: f64,
    pub after: f64,
}

/// Holdings of one connection, shared by its sender and receiver tasks.
///
/// The lock is only held for the copy or the read-modify-write, never across
/// socket I/O.
#[derive(Debug, Clone, Default)]
pub struct SharedHoldings {
    inner: Arc<Mutex<f64>>,
}

impl SharedHoldings {
    pub fn new(initial: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    pub async fn snapshot(&self) -> f64 {
        *self.inner.lock().await
    }

    pub async fn apply(&self, order: &Order) -> HoldingsChange {
        let mut guard = self.inner.lock().await;
        let before = *guard;
        *guard = apply_to_holdings(before, order);
        HoldingsChange {
            before,
            after: *guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holdings_follow_direction() {
        let buy = Order::buy_fraction(0.5, 100.0, 10.0);
        assert_eq!(apply_to_holdings(1.0, &buy), 6.0);
        assert_eq!(apply_to_holdings(6.0, &Order::liquidate(6.0)), 0.0);
    }

    #[test]
    fn capital_moves_opposite_to_holdings() {
        let buy = Order::buy_fraction(0.1, 1_000_000.0, 100.0);
        assert_eq!(buy.amount, 1000.0);
        assert_eq!(apply_to_capital(1_000_000.0, &buy, 100.0), 900_000.0);
        assert_eq!(
            apply_to_capital(900_000.0, &Order::liquidate(1000.0), 110.0),
            1_010_000.0
        );
    }
}
