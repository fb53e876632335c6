use quant_stream::ledger::apply_to_capital;
use quant_stream::model::order::{Order, OrderSide};
use quant_stream::model::tick::Tick;
use quant_stream::strategy::crossover_ma::CrossoverMa;

const CAPITAL: f64 = 1_000_000.0;

fn tick(price: f64) -> Tick {
    Tick::from_price(price, 0.0)
}

#[test]
fn no_orders_while_windows_fill() {
    let mut strat = CrossoverMa::new(20, 50, 0.1);
    for i in 0..49 {
        let price = 100.0 + (i as f64 * 0.7).sin() * 10.0;
        assert_eq!(strat.on_tick(&tick(price), CAPITAL), None);
    }
    assert_eq!(strat.signal(), None);
}

#[test]
/// The first tick with both windows full only seeds the signal.
fn first_full_tick_initialises_signal_without_order() {
    let mut strat = CrossoverMa::new(2, 4, 0.1);
    assert_eq!(strat.short_average(), None);
    for p in [10.0, 20.0, 30.0] {
        assert_eq!(strat.on_tick(&tick(p), CAPITAL), None);
    }
    // short = 35, long = 25: signal is true but nothing fires yet.
    assert_eq!(strat.on_tick(&tick(40.0), CAPITAL), None);
    assert_eq!(strat.short_average(), Some(35.0));
    assert_eq!(strat.long_average(), Some(25.0));
    assert_eq!(strat.signal(), Some(true));
}

#[test]
fn default_windows_seed_on_fiftieth_tick() {
    let mut strat = CrossoverMa::new(20, 50, 0.1);
    for i in 0..50 {
        assert_eq!(strat.on_tick(&tick(100.0 + i as f64), CAPITAL), None);
    }
    assert_eq!(strat.signal(), Some(true));
}

#[test]
/// false -> true -> false yields exactly Buy then Sell.
fn signal_flips_emit_buy_then_sell() {
    let mut strat = CrossoverMa::new(2, 4, 0.1);
    let path = [100.0, 90.0, 80.0, 70.0, 120.0, 150.0, 60.0, 40.0];
    let holdings = 7.5;

    let orders: Vec<(usize, Order)> = path
        .iter()
        .enumerate()
        .filter_map(|(i, &p)| {
            strat
                .on_tick(&Tick::from_price(p, holdings), CAPITAL)
                .map(|o| (i, o))
        })
        .collect();

    assert_eq!(orders.len(), 2, "got {:?}", orders);
    assert_eq!(orders[0].0, 4);
    assert_eq!(orders[0].1, Order::buy_fraction(0.1, CAPITAL, 120.0));
    assert_eq!(orders[1].0, 7);
    assert_eq!(orders[1].1.direction, OrderSide::Sell);
    assert_eq!(orders[1].1.amount, holdings);
}

#[test]
fn steady_signal_emits_nothing() {
    let mut strat = CrossoverMa::new(2, 4, 0.1);
    for p in [100.0, 90.0, 80.0, 70.0, 120.0] {
        strat.on_tick(&tick(p), CAPITAL);
    }
    for p in [150.0, 160.0, 170.0, 180.0] {
        assert_eq!(strat.on_tick(&tick(p), CAPITAL), None);
    }
}

#[test]
/// Capital 1,000,000 with fraction 0.1 buys 1000 units at 100.
fn buy_at_one_hundred_spends_a_tenth_of_capital() {
    let mut strat = CrossoverMa::new(2, 4, 0.1);
    for p in [200.0, 50.0, 50.0, 90.0] {
        assert_eq!(strat.on_tick(&tick(p), CAPITAL), None);
    }
    let order = strat
        .on_tick(&tick(100.0), CAPITAL)
        .expect("signal flip should buy");
    assert_eq!(order.direction, OrderSide::Buy);
    assert_eq!(order.amount, 1000.0);
    assert_eq!(apply_to_capital(CAPITAL, &order, 100.0), 900_000.0);
}

#[test]
fn deterministic_output() {
    let prices: Vec<f64> = (0..300)
        .map(|i| 100.0 + 20.0 * (i as f64 * 0.1).sin())
        .collect();

    let run = |prices: &[f64]| -> Vec<Option<Order>> {
        let mut strat = CrossoverMa::new(5, 15, 0.1);
        prices
            .iter()
            .map(|&p| strat.on_tick(&tick(p), CAPITAL))
            .collect()
    };

    let run1 = run(&prices);
    assert!(run1.iter().any(|o| o.is_some()));
    assert_eq!(run1, run(&prices), "strategy must be deterministic");
}
