use crate::indicator::bands::Bands;
use crate::indicator::window::RollingWindow;
use crate::model::order::Order;
use crate::model::tick::Tick;

/// Sells strictly above the upper band, buys strictly below the lower band.
#[derive(Debug)]
pub struct BollingerBands {
    prices: RollingWindow,
    multiplier: f64,
    fraction: f64,
    bands: Option<Bands>,
}

impl BollingerBands {
    pub fn new(period: usize, multiplier: f64, fraction: f64) -> Self {
        Self {
            prices: RollingWindow::new(period),
            multiplier,
            fraction,
            bands: None,
        }
    }

    pub fn on_tick(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        self.prices.push(tick.close);
        let bands = Bands::from_window(&self.prices, self.multiplier)?;
        self.bands = Some(bands);

        let price = tick.close;
        if price > bands.upper {
            tracing::info!(price, upper = bands.upper, "bollinger bands sell signal");
            Some(Order::liquidate(tick.holdings))
        } else if price < bands.lower {
            tracing::info!(price, lower = bands.lower, "bollinger bands buy signal");
            Some(Order::buy_fraction(self.fraction, capital, price))
        } else {
            None
        }
    }

    pub fn bands(&self) -> Option<Bands> {
        self.bands
    }
}
