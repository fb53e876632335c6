use quant_stream::model::order::{Order, OrderSide};
use quant_stream::model::tick::Tick;
use quant_stream::strategy::bollinger_bands::BollingerBands;
use quant_stream::strategy::mean_reversion::MeanReversion;

const CAPITAL: f64 = 1_000_000.0;

fn feed_bollinger(prices: &[f64], holdings: f64) -> Vec<Option<Order>> {
    let mut strat = BollingerBands::new(20, 2.0, 0.1);
    prices
        .iter()
        .map(|&p| strat.on_tick(&Tick::from_price(p, holdings), CAPITAL))
        .collect()
}

fn feed_mean_reversion(prices: &[f64], holdings: f64) -> Vec<Option<Order>> {
    let mut strat = MeanReversion::new(20, 2.0, 0.1);
    prices
        .iter()
        .map(|&p| strat.on_tick(&Tick::from_price(p, holdings), CAPITAL))
        .collect()
}

fn flat_then(last: f64) -> Vec<f64> {
    let mut prices = vec![100.0; 19];
    prices.push(last);
    prices
}

#[test]
fn nothing_before_period_is_filled() {
    let wild: Vec<f64> = (0..19).map(|i| if i % 2 == 0 { 1.0 } else { 1_000.0 }).collect();
    assert!(feed_bollinger(&wild, 0.0).iter().all(Option::is_none));
    assert!(feed_mean_reversion(&wild, 0.0).iter().all(Option::is_none));
}

#[test]
fn spike_above_upper_band_sells_holdings() {
    let out = feed_bollinger(&flat_then(200.0), 42.0);
    assert_eq!(out[19], Some(Order::liquidate(42.0)));
    let out = feed_mean_reversion(&flat_then(200.0), 42.0);
    assert_eq!(out[19], Some(Order::liquidate(42.0)));
}

#[test]
fn drop_below_lower_band_buys() {
    let out = feed_bollinger(&flat_then(10.0), 0.0);
    assert_eq!(out[19], Some(Order::buy_fraction(0.1, CAPITAL, 10.0)));
    let out = feed_mean_reversion(&flat_then(10.0), 0.0);
    assert_eq!(out[19], Some(Order::buy_fraction(0.1, CAPITAL, 10.0)));
}

#[test]
fn price_inside_bands_holds() {
    // mean 100, std 1, bands [98, 102]
    let prices: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 99.0 } else { 101.0 }).collect();
    assert_eq!(feed_bollinger(&prices, 0.0)[19], None);
    assert_eq!(feed_mean_reversion(&prices, 0.0)[19], None);
}

#[test]
/// A flat window puts the price exactly on both bands: only the inclusive
/// mean-reversion comparison fires.
fn band_equality_triggers_mean_reversion_only() {
    let prices = vec![100.0; 20];
    assert_eq!(feed_bollinger(&prices, 5.0)[19], None);

    let order = feed_mean_reversion(&prices, 5.0)[19].expect("edge should trigger");
    assert_eq!(order.direction, OrderSide::Buy);
    assert_eq!(order.amount, 0.1 * CAPITAL / 100.0);
}

#[test]
fn bollinger_exposes_last_bands() {
    let mut strat = BollingerBands::new(20, 2.0, 0.1);
    assert!(strat.bands().is_none());
    for _ in 0..20 {
        strat.on_tick(&Tick::from_price(100.0, 0.0), CAPITAL);
    }
    let bands = strat.bands().unwrap();
    assert_eq!((bands.lower, bands.mean, bands.upper), (100.0, 100.0, 100.0));
}
