use crate::indicator::window::RollingWindow;
use crate::model::order::Order;
use crate::model::tick::Tick;

/// Moving-average crossover.
///
/// The signal is `mean(long) < mean(short)`. An order fires only when the
/// signal flips between two consecutive ticks; the first tick with both
/// windows full just seeds it.
#[derive(Debug)]
pub struct CrossoverMa {
    short: RollingWindow,
    long: RollingWindow,
    fraction: f64,
    signal: Option<bool>,
}

impl CrossoverMa {
    pub fn new(short_window: usize, long_window: usize, fraction: f64) -> Self {
        Self {
            short: RollingWindow::new(short_window),
            long: RollingWindow::new(long_window),
            fraction,
            signal: None,
        }
    }

    /// Returns true when the signal changed on this tick.
    fn check_signal_shift(&mut self) -> bool {
        if !self.long.is_full() || !self.short.is_full() {
            return false;
        }
        let (Some(long_avg), Some(short_avg)) = (self.long.mean(), self.short.mean()) else {
            return false;
        };

        let current = long_avg < short_avg;
        match self.signal.replace(current) {
            None => false,
            Some(prev) => prev != current,
        }
    }

    pub fn on_tick(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        self.short.push(tick.close);
        self.long.push(tick.close);
        if !self.check_signal_shift() {
            return None;
        }

        if self.signal == Some(true) {
            tracing::info!(price = tick.close, "moving average signal changed: buy");
            Some(Order::buy_fraction(self.fraction, capital, tick.close))
        } else {
            tracing::info!(price = tick.close, "moving average signal changed: sell");
            Some(Order::liquidate(tick.holdings))
        }
    }

    /// Current signal; `None` until both windows have filled.
    pub fn signal(&self) -> Option<bool> {
        self.signal
    }

    pub fn short_average(&self) -> Option<f64> {
        self.short.mean()
    }

    pub fn long_average(&self) -> Option<f64> {
        self.long.mean()
    }
}
