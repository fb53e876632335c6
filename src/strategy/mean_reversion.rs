use crate::indicator::bands::Bands;
use crate::indicator::window::RollingWindow;
use crate::model::order::Order;
use crate::model::tick::Tick;

/// Same envelope as [`super::bollinger_bands::BollingerBands`], but the band
/// edges themselves trigger: `price <= lower` buys, `price >= upper` sells.
#[derive(Debug)]
pub struct MeanReversion {
    prices: RollingWindow,
    multiplier: f64,
    fraction: f64,
}

impl MeanReversion {
    pub fn new(window_size: usize, multiplier: f64, fraction: f64) -> Self {
        Self {
            prices: RollingWindow::new(window_size),
            multiplier,
            fraction,
        }
    }

    pub fn on_tick(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        self.prices.push(tick.close);
        let bands = Bands::from_window(&self.prices, self.multiplier)?;

        let price = tick.close;
        // Buy is checked first; on a flat window both edges equal the price.
        if price <= bands.lower {
            tracing::info!(price, lower = bands.lower, "mean reversion buy signal");
            Some(Order::buy_fraction(self.fraction, capital, price))
        } else if price >= bands.upper {
            tracing::info!(price, upper = bands.upper, "mean reversion sell signal");
            Some(Order::liquidate(tick.holdings))
        } else {
            None
        }
    }
}
