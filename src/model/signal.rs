/// Per-sweep view of one symbol's latest candles.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub previous_volume: f64,
    pub current_volume: f64,
    pub latest_price: f64,
    /// `None` when the close series is too short for the RSI lookback.
    pub rsi: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn volume_ratio(&self) -> Option<f64> {
        if self.previous_volume > 0.0 {
            Some(self.current_volume / self.previous_volume)
        } else {
            None
        }
    }
}

/// A symbol that passed the spike rule this sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
}

impl SignalEvent {
    /// Alert text sent through the notifier.
    pub fn message(&self) -> String {
        let s = &self.snapshot;
        format!(
            "📈 Signal for {}!\nVolume: {:.0} → {:.0}\nPrice: {:.4}, RSI: {:.1}",
            self.symbol,
            s.previous_volume,
            s.current_volume,
            s.latest_price,
            s.rsi.unwrap_or_default(),
        )
    }
}
