use crate::indicator::ema::blended_ema;
use crate::indicator::window::RollingWindow;
use crate::model::order::Order;
use crate::model::tick::Tick;

/// MACD against its signal line.
///
/// Both "EMAs" are the single-step [`blended_ema`] over their price windows.
/// The MACD history is unbounded; the signal line is the mean of the last
/// `signal_window` MACD values and only starts once the history is longer
/// than that. Orders need a full signal-line window.
#[derive(Debug)]
pub struct MacdStrategy {
    short_window: usize,
    long_window: usize,
    signal_window: usize,
    fraction: f64,
    short_prices: RollingWindow,
    long_prices: RollingWindow,
    macd_line: Vec<f64>,
    signal_line: RollingWindow,
}

impl MacdStrategy {
    pub fn new(short_window: usize, long_window: usize, signal_window: usize, fraction: f64) -> Self {
        Self {
            short_window,
            long_window,
            signal_window,
            fraction,
            short_prices: RollingWindow::new(short_window),
            long_prices: RollingWindow::new(long_window),
            macd_line: Vec::new(),
            signal_line: RollingWindow::new(signal_window),
        }
    }

    fn update(&mut self, price: f64) {
        self.short_prices.push(price);
        self.long_prices.push(price);

        let short = blended_ema(&self.short_prices, self.short_window);
        let long = blended_ema(&self.long_prices, self.long_window);
        let (Some(short), Some(long)) = (short, long) else {
            return;
        };
        self.macd_line.push(short - long);

        if self.macd_line.len() > self.signal_window {
            let tail = &self.macd_line[self.macd_line.len() - self.signal_window..];
            let signal = tail.iter().sum::<f64>() / self.signal_window as f64;
            self.signal_line.push(signal);
        }
    }

    pub fn on_tick(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        self.update(tick.close);
        if !self.signal_line.is_full() {
            return None;
        }

        let macd = *self.macd_line.last()?;
        let signal = self.signal_line.latest()?;
        if macd > signal {
            tracing::info!(macd, signal, "macd buy signal");
            Some(Order::buy_fraction(self.fraction, capital, tick.close))
        } else if macd < signal {
            tracing::info!(macd, signal, "macd sell signal");
            Some(Order::liquidate(tick.holdings))
        } else {
            None
        }
    }

    pub fn macd_len(&self) -> usize {
        self.macd_line.len()
    }

    pub fn signal_len(&self) -> usize {
        self.signal_line.len()
    }

    pub fn latest_macd(&self) -> Option<f64> {
        self.macd_line.last().copied()
    }

    pub fn latest_signal(&self) -> Option<f64> {
        self.signal_line.latest()
    }
}
