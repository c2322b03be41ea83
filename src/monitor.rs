use anyhow::Result;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::Config;
use crate::market_data::MarketData;
use crate::model::signal::SignalEvent;
use crate::notify::Notifier;
use crate::strategy::volume_spike::VolumeSpikeStrategy;

/// Loop cadence and candle request shape.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub kline_interval: String,
    pub kline_limit: usize,
    pub check_interval: Duration,
    pub alert_pause: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            kline_interval: config.binance.kline_interval.clone(),
            kline_limit: config.binance.kline_limit,
            check_interval: config.monitor.check_interval(),
            alert_pause: config.monitor.alert_pause(),
        }
    }
}

/// Counters for one pass over the symbol universe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evaluated: usize,
    pub no_data: usize,
    pub failed: usize,
    pub signals: usize,
    pub alerts_delivered: usize,
    pub alerts_failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolOutcome {
    NoData,
    Quiet,
    Alerted { delivered: bool },
}

pub struct Monitor {
    market: Arc<dyn MarketData>,
    notifier: Arc<dyn Notifier>,
    strategy: VolumeSpikeStrategy,
    settings: MonitorSettings,
    shutdown: watch::Receiver<bool>,
}

impl Monitor {
    pub fn new(
        market: Arc<dyn MarketData>,
        notifier: Arc<dyn Notifier>,
        strategy: VolumeSpikeStrategy,
        settings: MonitorSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            market,
            notifier,
            strategy,
            settings,
            shutdown,
        }
    }

    /// Discover the universe once, then sweep and sleep until shutdown.
    pub async fn run(&mut self) -> Result<()> {
        let symbols = self.discover().await;
        tracing::info!(
            symbols = symbols.len(),
            interval = %self.settings.kline_interval,
            check_interval_secs = self.settings.check_interval.as_secs(),
            "Monitoring started"
        );

        let mut sweep_no: u64 = 0;
        loop {
            if self.shutdown_requested() {
                break;
            }
            sweep_no += 1;
            let report = self.sweep(&symbols).await;
            tracing::info!(
                sweep = sweep_no,
                evaluated = report.evaluated,
                no_data = report.no_data,
                failed = report.failed,
                signals = report.signals,
                alerts_delivered = report.alerts_delivered,
                alerts_failed = report.alerts_failed,
                "Sweep complete"
            );

            let check_interval = self.settings.check_interval;
            if !self.pause(check_interval).await {
                break;
            }
        }
        tracing::info!("Monitor stopped");
        Ok(())
    }

    /// Fetch the symbol universe. Failures degrade to an empty universe.
    pub async fn discover(&self) -> Vec<String> {
        match self.market.list_tradable_symbols().await {
            Ok(symbols) if symbols.is_empty() => {
                tracing::warn!("Symbol discovery returned no symbols; running degraded");
                symbols
            }
            Ok(symbols) => symbols,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Symbol discovery failed; running degraded");
                Vec::new()
            }
        }
    }

    /// One pass over `symbols` in order. A failing symbol is logged and skipped.
    pub async fn sweep(&mut self, symbols: &[String]) -> SweepReport {
        let mut report = SweepReport::default();

        for symbol in symbols {
            if self.shutdown_requested() {
                tracing::info!(symbol = %symbol, "Shutdown requested mid-sweep");
                break;
            }

            let outcome = AssertUnwindSafe(self.process_symbol(symbol))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(SymbolOutcome::NoData)) => report.no_data += 1,
                Ok(Ok(SymbolOutcome::Quiet)) => report.evaluated += 1,
                Ok(Ok(SymbolOutcome::Alerted { delivered })) => {
                    report.evaluated += 1;
                    report.signals += 1;
                    if delivered {
                        report.alerts_delivered += 1;
                    } else {
                        report.alerts_failed += 1;
                    }
                    let alert_pause = self.settings.alert_pause;
                    if !self.pause(alert_pause).await {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(symbol = %symbol, error = %format!("{:#}", e), "Symbol processing failed");
                }
                Err(panic) => {
                    report.failed += 1;
                    tracing::error!(
                        symbol = %symbol,
                        panic = %panic_message(panic.as_ref()),
                        "Symbol processing panicked"
                    );
                }
            }
        }
        report
    }

    async fn process_symbol(&self, symbol: &str) -> Result<SymbolOutcome> {
        let candles = self
            .market
            .fetch_recent_candles(symbol, &self.settings.kline_interval, self.settings.kline_limit)
            .await?;
        if candles.is_empty() {
            return Ok(SymbolOutcome::NoData);
        }

        let Some(snapshot) = self.strategy.snapshot(&candles) else {
            tracing::debug!(symbol, candles = candles.len(), "Not enough candles");
            return Ok(SymbolOutcome::Quiet);
        };
        tracing::debug!(
            symbol,
            previous_volume = snapshot.previous_volume,
            current_volume = snapshot.current_volume,
            price = snapshot.latest_price,
            rsi = ?snapshot.rsi,
            "Snapshot"
        );

        if !self.strategy.is_spike(&snapshot) {
            return Ok(SymbolOutcome::Quiet);
        }
        let event = SignalEvent {
            symbol: symbol.to_string(),
            snapshot,
        };
        tracing::info!(
            symbol,
            candle = ?candles.last().and_then(|c| c.open_datetime()),
            previous_volume = event.snapshot.previous_volume,
            current_volume = event.snapshot.current_volume,
            ratio = ?event.snapshot.volume_ratio(),
            rsi = ?event.snapshot.rsi,
            "Volume spike detected"
        );

        let delivered = match self.notifier.send(&event.message()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(symbol, error = %format!("{:#}", e), "Alert delivery failed");
                false
            }
        };
        Ok(SymbolOutcome::Alerted { delivered })
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep for `duration` unless shutdown arrives first. Returns `false` on shutdown.
    async fn pause(&mut self, duration: Duration) -> bool {
        if self.shutdown_requested() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.shutdown.changed() => false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
