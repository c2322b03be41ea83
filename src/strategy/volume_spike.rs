use crate::config::SignalConfig;
use crate::indicator::rsi::compute_rsi;
use crate::model::candle::{closes, Candle};
use crate::model::signal::{IndicatorSnapshot, SignalEvent};

/// Volume spike with momentum headroom: the latest candle's volume jumps by
/// `volume_ratio` over the previous one, clears an absolute floor, and RSI is
/// still under the overbought ceiling.
#[derive(Debug, Clone)]
pub struct VolumeSpikeStrategy {
    rsi_period: usize,
    volume_ratio: f64,
    min_volume: f64,
    rsi_ceiling: f64,
    min_candles: usize,
}

impl VolumeSpikeStrategy {
    pub fn new(
        rsi_period: usize,
        volume_ratio: f64,
        min_volume: f64,
        rsi_ceiling: f64,
        min_candles: usize,
    ) -> Self {
        Self {
            rsi_period,
            volume_ratio,
            min_volume,
            rsi_ceiling,
            min_candles: min_candles.max(2),
        }
    }

    pub fn from_config(cfg: &SignalConfig) -> Self {
        Self::new(
            cfg.rsi_period,
            cfg.volume_ratio,
            cfg.min_volume,
            cfg.rsi_ceiling,
            cfg.min_candles,
        )
    }

    pub fn min_candles(&self) -> usize {
        self.min_candles
    }

    /// Indicator values for the latest candle, or `None` below `min_candles`.
    pub fn snapshot(&self, candles: &[Candle]) -> Option<IndicatorSnapshot> {
        if candles.len() < self.min_candles {
            return None;
        }
        let [.., previous, current] = candles else {
            return None;
        };
        Some(IndicatorSnapshot {
            previous_volume: previous.volume,
            current_volume: current.volume,
            latest_price: current.close,
            rsi: compute_rsi(&closes(candles), self.rsi_period),
        })
    }

    pub fn is_spike(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.current_volume > snapshot.previous_volume * self.volume_ratio
            && snapshot.current_volume > self.min_volume
            && snapshot.rsi.is_some_and(|rsi| rsi < self.rsi_ceiling)
    }

    pub fn evaluate(&self, symbol: &str, candles: &[Candle]) -> Option<SignalEvent> {
        let snapshot = self.snapshot(candles)?;
        if !self.is_spike(&snapshot) {
            return None;
        }
        Some(SignalEvent {
            symbol: symbol.to_string(),
            snapshot,
        })
    }
}

impl Default for VolumeSpikeStrategy {
    fn default() -> Self {
        Self::from_config(&SignalConfig::default())
    }
}
