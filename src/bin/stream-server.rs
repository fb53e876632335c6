use anyhow::{Context, Result};

use quant_stream::config::Config;
use quant_stream::event::{EventSink, ServerEvent};
use quant_stream::feed::load_feed;
use quant_stream::logging::init_file_logging;
use quant_stream::server::{ServerSettings, StreamServer};

fn print_event(event: ServerEvent) {
    match event {
        ServerEvent::ClientConnected { peer } => println!("Client connected: {}", peer),
        ServerEvent::TickSent { tick, .. } => {
            println!("{}", serde_json::to_string(&tick).unwrap_or_default())
        }
        ServerEvent::HoldingsChanged {
            order,
            before,
            after,
            ..
        } => println!("{}\nHoldings:|{} -> {}\n", order, before, after),
        ServerEvent::StreamEnded {
            peer,
            error: Some(e),
            ..
        } => println!("End of Streaming due to error ({}): {}", peer, e),
        ServerEvent::StreamEnded { peer, sent, .. } => {
            println!("Stream to {} finished after {} records", peer, sent)
        }
        ServerEvent::ReceiverClosed { peer, reason } => {
            println!("Receiver for {} closed: {}", peer, reason)
        }
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

    init_file_logging(&config.logging.server_file, &config.logging.level)?;

    let feed = load_feed(&config.server.data_file)
        .with_context(|| format!("failed to load {}", config.server.data_file.display()))?;
    let settings = ServerSettings::from_config(&config.server)?;

    let (events, mut event_rx) = EventSink::channel();
    let server = StreamServer::bind(&config.server.addr(), feed, settings)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr()))?
        .with_events(events);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(event);
        }
    });

    tokio::select! {
        res = server.listen() => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received"),
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
