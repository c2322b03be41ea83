use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::model::candle::Candle;

/// Binance exchange info response (GET /api/v3/exchangeInfo), trimmed to what
/// symbol discovery reads.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub quote_asset: String,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }
}

/// Binance API error response.
#[derive(Debug, Deserialize)]
pub struct BinanceApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

fn field_f64(row: &[Value], idx: usize) -> Option<f64> {
    match row.get(idx)? {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn field_u64(row: &[Value], idx: usize) -> Option<u64> {
    row.get(idx)?.as_u64()
}

/// Decode a kline payload:
/// `[[openTime, "open", "high", "low", "close", "volume", closeTime, ...], ...]`.
pub fn parse_klines(rows: &[Value]) -> Result<Vec<Candle>, AppError> {
    let mut candles = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let row = row.as_array().ok_or_else(|| AppError::MalformedKline {
            index,
            reason: "row is not an array".to_string(),
        })?;
        let malformed = |field: &str| AppError::MalformedKline {
            index,
            reason: format!("missing or invalid {}", field),
        };
        candles.push(Candle {
            open_time: field_u64(row, 0).ok_or_else(|| malformed("open time"))?,
            open: field_f64(row, 1).ok_or_else(|| malformed("open"))?,
            high: field_f64(row, 2).ok_or_else(|| malformed("high"))?,
            low: field_f64(row, 3).ok_or_else(|| malformed("low"))?,
            close: field_f64(row, 4).ok_or_else(|| malformed("close"))?,
            volume: field_f64(row, 5).ok_or_else(|| malformed("volume"))?,
            close_time: field_u64(row, 6).ok_or_else(|| malformed("close time"))?,
        });
    }
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_kline_rows() {
        let payload = json!([
            [1499040000000u64, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
             "148976.11427815", 1499644799999u64, "2434.19055334", 308, "1756.87402397",
             "28.46694368", "0"]
        ]);
        let candles = parse_klines(payload.as_array().unwrap()).unwrap();
        assert_eq!(candles.len(), 1);
        let c = &candles[0];
        assert_eq!(c.open_time, 1_499_040_000_000);
        assert_eq!(c.close_time, 1_499_644_799_999);
        assert!((c.close - 0.015771).abs() < 1e-12);
        assert!((c.volume - 148_976.114_278_15).abs() < 1e-6);
    }

    #[test]
    fn parse_kline_rejects_short_row() {
        let payload = json!([[1u64, "1.0", "1.0"]]);
        let err = parse_klines(payload.as_array().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::MalformedKline { index: 0, .. }));
    }

    #[test]
    fn parse_kline_rejects_non_numeric_volume() {
        let payload = json!([[1u64, "1", "1", "1", "1", "lots", 2u64]]);
        assert!(parse_klines(payload.as_array().unwrap()).is_err());
    }

    #[test]
    fn exchange_info_deserializes() {
        let body = r#"{"timezone":"UTC","symbols":[
            {"symbol":"ETHBTC","status":"TRADING","baseAsset":"ETH","quoteAsset":"BTC","filters":[]}
        ]}"#;
        let info: ExchangeInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.symbols.len(), 1);
        assert_eq!(info.symbols[0].quote_asset, "BTC");
        assert!(info.symbols[0].is_trading());
    }
}
