pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Relative Strength Index over the last `period` price changes.
///
/// Gains and losses are averaged with a plain arithmetic mean (no Wilder
/// smoothing), so only the trailing `period + 1` closes matter. Returns `None`
/// when fewer closes are available or `period` is zero.
pub fn compute_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let (gain_sum, loss_sum) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gain, loss), change: f64| {
            (gain + change.max(0.0), loss + (-change).max(0.0))
        });

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
