use spike_watch::indicator::rsi::{compute_rsi, DEFAULT_RSI_PERIOD};

#[test]
fn insufficient_history_is_absent() {
    for len in 0..=DEFAULT_RSI_PERIOD {
        let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
        assert_eq!(compute_rsi(&closes, DEFAULT_RSI_PERIOD), None, "len={}", len);
    }
}

#[test]
fn strictly_increasing_is_exactly_100() {
    let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 0.5).collect();
    assert_eq!(compute_rsi(&closes, 14), Some(100.0));

    let minimal: Vec<f64> = (0..15).map(|i| 1.0 + i as f64).collect();
    assert_eq!(compute_rsi(&minimal, 14), Some(100.0));
}

#[test]
fn strictly_decreasing_is_zero() {
    let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    let rsi = compute_rsi(&closes, 14).unwrap();
    assert!(rsi.abs() < 1e-12, "rsi={}", rsi);
}

#[test]
fn balanced_moves_give_fifty() {
    let mut closes = vec![100.0, 105.0, 100.0];
    closes.extend(std::iter::repeat(100.0).take(12));
    let rsi = compute_rsi(&closes, 14).unwrap();
    assert!((rsi - 50.0).abs() < 1e-9, "rsi={}", rsi);
}

#[test]
fn uses_simple_mean_not_wilder_smoothing() {
    // Changes: +13, -7, then flat. Simple mean gives rs = 13/7 -> 65.
    let mut closes = vec![100.0, 113.0];
    closes.extend(std::iter::repeat(106.0).take(13));
    let rsi = compute_rsi(&closes, 14).unwrap();
    assert!((rsi - 65.0).abs() < 1e-9, "rsi={}", rsi);
}

#[test]
fn shorter_period_reads_fewer_points() {
    let closes = [1.0, 2.0, 1.0, 3.0];
    // Last two changes are -1 and +2, so rs = 1 / 0.5
    let rsi = compute_rsi(&closes, 2).unwrap();
    assert!((rsi - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    assert_eq!(compute_rsi(&closes, 4), None);
}

#[test]
fn result_stays_in_range() {
    let closes = [
        10.0, 12.0, 9.5, 11.0, 30.0, 2.0, 8.0, 8.5, 7.0, 15.0, 14.0, 13.0, 13.5, 20.0, 1.0,
    ];
    let rsi = compute_rsi(&closes, 14).unwrap();
    assert!((0.0..=100.0).contains(&rsi));
}
