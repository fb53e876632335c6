use crate::indicator::window::RollingWindow;
use crate::model::order::Order;
use crate::model::tick::Tick;

/// Rate of change between the newest and oldest price of a full lookback
/// window, compared against fixed thresholds.
#[derive(Debug)]
pub struct Momentum {
    prices: RollingWindow,
    fraction: f64,
    buy_threshold: f64,
    sell_threshold: f64,
}

impl Momentum {
    pub fn new(lookback: usize, buy_threshold: f64, sell_threshold: f64, fraction: f64) -> Self {
        Self {
            prices: RollingWindow::new(lookback),
            fraction,
            buy_threshold,
            sell_threshold,
        }
    }

    pub fn on_tick(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        self.prices.push(tick.close);
        let change = self.price_change()?;

        if change >= self.buy_threshold {
            tracing::info!(change, "momentum buy signal");
            Some(Order::buy_fraction(self.fraction, capital, tick.close))
        } else if change <= self.sell_threshold {
            tracing::info!(change, "momentum sell signal");
            Some(Order::liquidate(tick.holdings))
        } else {
            None
        }
    }

    /// `(newest - oldest) / oldest` once the window is full and the oldest
    /// price is positive.
    pub fn price_change(&self) -> Option<f64> {
        if !self.prices.is_full() {
            return None;
        }
        let recent = self.prices.latest()?;
        let past = self.prices.oldest()?;
        if past <= 0.0 {
            return None;
        }
        Some((recent - past) / past)
    }
}
