use anyhow::{Context, Result};

use quant_stream::client::TradingClient;
use quant_stream::config::Config;
use quant_stream::event::{ClientEvent, EventSink};
use quant_stream::logging::init_file_logging;

fn print_event(event: ClientEvent) {
    match event {
        ClientEvent::Connected { addr } => println!("Connected to {}", addr),
        ClientEvent::TickReceived(tick) => println!(
            "Received: {}",
            serde_json::to_string(&tick).unwrap_or_default()
        ),
        ClientEvent::NoData => println!("No data received"),
        ClientEvent::OrderSent(order) => println!("Order sent: {}", order),
        ClientEvent::CapitalChanged { before, after } => println!("Cash:{} -> {}\n", before, after),
        ClientEvent::PriceUnavailable(_) => println!("Price not available for handling order"),
        ClientEvent::SessionEnded { reason } => println!("Session ended: {}", reason),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    init_file_logging(&config.logging.client_file, &config.logging.level)?;
    tracing::info!(
        addr = %config.client.addr(),
        strategy = %config.strategy.kind,
        capital = config.client.initial_capital,
        "Starting trading client"
    );

    let (events, mut event_rx) = EventSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(event);
        }
    });

    let mut client = TradingClient::from_config(&config).with_events(events);
    let result = client.connect().await;
    drop(client);
    let _ = printer.await;

    let summary = result.with_context(|| format!("session with {} failed", config.client.addr()))?;
    tracing::info!(
        ticks = summary.ticks,
        orders = summary.orders,
        capital = summary.capital,
        "Session finished"
    );
    Ok(())
}
