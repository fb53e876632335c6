use quant_stream::model::order::{Order, OrderSide};
use quant_stream::model::tick::Tick;
use quant_stream::strategy::macd::MacdStrategy;

const CAPITAL: f64 = 1_000_000.0;

#[test]
/// With windows 2/3/2 the MACD starts on tick 3, the signal line on tick 5
/// (history longer than the signal window) and orders on tick 6.
fn no_signal_line_until_history_exceeds_window() {
    let mut strat = MacdStrategy::new(2, 3, 2, 0.1);
    let expected = [(0, 0), (0, 0), (1, 0), (2, 0), (3, 1)];
    for (i, &(macd_len, signal_len)) in expected.iter().enumerate() {
        let order = strat.on_tick(&Tick::from_price(100.0 + i as f64, 0.0), CAPITAL);
        assert_eq!(order, None, "tick {}", i + 1);
        assert_eq!(strat.macd_len(), macd_len, "tick {}", i + 1);
        assert_eq!(strat.signal_len(), signal_len, "tick {}", i + 1);
    }
}

#[test]
fn default_windows_need_thirty_four_ticks() {
    let mut strat = MacdStrategy::new(12, 26, 9, 0.1);
    for i in 0..34 {
        let price = 100.0 + (i as f64 * 0.3).sin() * 5.0;
        assert_eq!(strat.on_tick(&Tick::from_price(price, 0.0), CAPITAL), None);
    }
    // MACD history: ticks 26..=34 -> 9 values, not yet longer than 9.
    assert_eq!(strat.macd_len(), 9);
    assert_eq!(strat.signal_len(), 0);
}

#[test]
fn jump_buys_then_drop_sells() {
    let mut strat = MacdStrategy::new(2, 3, 2, 0.1);
    for _ in 0..5 {
        assert_eq!(strat.on_tick(&Tick::from_price(100.0, 0.0), CAPITAL), None);
    }

    let buy = strat
        .on_tick(&Tick::from_price(200.0, 0.0), CAPITAL)
        .expect("MACD above signal should buy");
    assert_eq!(buy, Order::buy_fraction(0.1, CAPITAL, 200.0));
    assert!(strat.latest_macd().unwrap() > strat.latest_signal().unwrap());

    let sell = strat
        .on_tick(&Tick::from_price(50.0, 3.0), CAPITAL)
        .expect("MACD below signal should sell");
    assert_eq!(sell.direction, OrderSide::Sell);
    assert_eq!(sell.amount, 3.0);
}
