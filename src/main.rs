use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use spike_watch::binance::rest::BinanceRestClient;
use spike_watch::config::{Config, LoggingConfig};
use spike_watch::monitor::{Monitor, MonitorSettings};
use spike_watch::notify::{Notifier, TelegramNotifier};
use spike_watch::strategy::volume_spike::VolumeSpikeStrategy;

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(&logging.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure .env file exists with TELEGRAM_TOKEN and TELEGRAM_CHAT_ID");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    tracing::info!(
        rest_url = %config.binance.rest_base_url,
        quote_asset = %config.binance.quote_asset,
        interval = %config.binance.kline_interval,
        "Starting spike-watch"
    );

    let timeout = config.binance.request_timeout();
    let rest_client = Arc::new(BinanceRestClient::new(
        &config.binance.rest_base_url,
        &config.binance.quote_asset.to_ascii_uppercase(),
        &config.binance.normalized_markers(),
        timeout,
    )?);
    let notifier = Arc::new(TelegramNotifier::from_config(&config.telegram, timeout)?);

    if let Err(e) = rest_client.ping().await {
        tracing::warn!(error = %format!("{:#}", e), "Binance ping failed; continuing");
    }

    let started = format!(
        "✅ spike-watch started at {} ({} quote, {} candles, every {}s)",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
        config.binance.quote_asset,
        config.binance.kline_interval,
        config.monitor.check_interval_secs
    );
    if let Err(e) = notifier.send(&started).await {
        tracing::error!(error = %format!("{:#}", e), "Startup message delivery failed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
        tracing::info!("Ctrl-C received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    let mut monitor = Monitor::new(
        rest_client,
        notifier,
        VolumeSpikeStrategy::from_config(&config.signal),
        MonitorSettings::from_config(&config),
        shutdown_rx,
    );
    monitor.run().await
}
