pub mod bollinger_bands;
pub mod crossover_ma;
pub mod macd;
pub mod mean_reversion;
pub mod momentum;

use crate::config::{StrategyConfig, StrategyKind};
use crate::model::order::Order;
use crate::model::tick::Tick;

use bollinger_bands::BollingerBands;
use crossover_ma::CrossoverMa;
use macd::MacdStrategy;
use mean_reversion::MeanReversion;
use momentum::Momentum;

/// The configured signal generator. Each case owns its rolling state.
#[derive(Debug)]
pub enum TradingStrategy {
    CrossoverMa(CrossoverMa),
    Momentum(Momentum),
    BollingerBands(BollingerBands),
    MeanReversion(MeanReversion),
    Macd(MacdStrategy),
}

impl TradingStrategy {
    pub fn from_config(cfg: &StrategyConfig) -> Self {
        let fraction = cfg.fraction;
        match cfg.kind {
            StrategyKind::CrossoverMa => Self::CrossoverMa(CrossoverMa::new(
                cfg.crossover_ma.short_window,
                cfg.crossover_ma.long_window,
                fraction,
            )),
            StrategyKind::Momentum => Self::Momentum(Momentum::new(
                cfg.momentum.lookback,
                cfg.momentum.buy_threshold,
                cfg.momentum.sell_threshold,
                fraction,
            )),
            StrategyKind::BollingerBands => Self::BollingerBands(BollingerBands::new(
                cfg.bollinger_bands.period,
                cfg.bollinger_bands.multiplier,
                fraction,
            )),
            StrategyKind::MeanReversion => Self::MeanReversion(MeanReversion::new(
                cfg.mean_reversion.period,
                cfg.mean_reversion.multiplier,
                fraction,
            )),
            StrategyKind::Macd => Self::Macd(MacdStrategy::new(
                cfg.macd.short_window,
                cfg.macd.long_window,
                cfg.macd.signal_window,
                fraction,
            )),
        }
    }

    /// Feed one tick; returns the order to send, if any.
    pub fn evaluate(&mut self, tick: &Tick, capital: f64) -> Option<Order> {
        match self {
            Self::CrossoverMa(s) => s.on_tick(tick, capital),
            Self::Momentum(s) => s.on_tick(tick, capital),
            Self::BollingerBands(s) => s.on_tick(tick, capital),
            Self::MeanReversion(s) => s.on_tick(tick, capital),
            Self::Macd(s) => s.on_tick(tick, capital),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::CrossoverMa(_) => StrategyKind::CrossoverMa,
            Self::Momentum(_) => StrategyKind::Momentum,
            Self::BollingerBands(_) => StrategyKind::BollingerBands,
            Self::MeanReversion(_) => StrategyKind::MeanReversion,
            Self::Macd(_) => StrategyKind::Macd,
        }
    }
}
