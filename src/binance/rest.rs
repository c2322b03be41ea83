use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::AppError;
use crate::market_data::MarketData;
use crate::model::candle::Candle;

use super::symbols::filter_tradable_symbols;
use super::types::{parse_klines, BinanceApiErrorResponse, ExchangeInfo};

/// Public request budget per minute on Binance spot REST.
const REQUEST_BUDGET_PER_MINUTE: u64 = 1200;

/// Read-only client for the public Binance spot endpoints.
pub struct BinanceRestClient {
    http: reqwest::Client,
    base_url: String,
    quote_asset: String,
    excluded_markers: Vec<String>,
    // Simple rate limiter: request count in current minute window
    request_count: AtomicU64,
    window_start: Mutex<Instant>,
}

impl BinanceRestClient {
    pub fn new(
        base_url: &str,
        quote_asset: &str,
        excluded_markers: &[String],
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Binance HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            quote_asset: quote_asset.to_string(),
            excluded_markers: excluded_markers.to_vec(),
            request_count: AtomicU64::new(0),
            window_start: Mutex::new(Instant::now()),
        })
    }

    fn check_rate_limit(&self) {
        let mut start = self
            .window_start
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if start.elapsed().as_secs() >= 60 {
            *start = Instant::now();
            self.request_count.store(0, Ordering::Relaxed);
        }
        let count = self.request_count.fetch_add(1, Ordering::Relaxed);
        if count > REQUEST_BUDGET_PER_MINUTE * 8 / 10 {
            tracing::warn!(count, "Approaching rate limit (80% of 1200/min)");
        }
    }

    /// Log a non-success response, decoding the Binance error body when present.
    async fn report_error_status(&self, endpoint: &str, resp: reqwest::Response) {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<BinanceApiErrorResponse>(&body) {
            Ok(err) => {
                let err = AppError::BinanceApi {
                    code: err.code,
                    msg: err.msg,
                };
                tracing::warn!(endpoint, status = %status, error = %err, "Binance request rejected");
            }
            Err(_) => {
                tracing::warn!(endpoint, status = %status, body = %body, "Binance request failed");
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/v3/ping", self.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .context("ping failed")?
            .error_for_status()
            .context("ping returned error status")?;
        Ok(())
    }

    pub async fn exchange_info(&self) -> Result<Option<ExchangeInfo>> {
        self.check_rate_limit();

        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("exchange_info HTTP failed")?;

        if !resp.status().is_success() {
            self.report_error_status("exchangeInfo", resp).await;
            return Ok(None);
        }

        let info: ExchangeInfo = resp
            .json()
            .await
            .context("exchange_info JSON parse failed")?;
        Ok(Some(info))
    }

    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        self.check_rate_limit();

        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.clamp(1, 1000).to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("get_klines HTTP failed for {}", symbol))?;

        if !resp.status().is_success() {
            self.report_error_status("klines", resp).await;
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .with_context(|| format!("get_klines JSON parse failed for {}", symbol))?;
        Ok(parse_klines(&rows)?)
    }
}

#[async_trait]
impl MarketData for BinanceRestClient {
    async fn list_tradable_symbols(&self) -> Result<Vec<String>> {
        let Some(info) = self.exchange_info().await? else {
            return Ok(Vec::new());
        };
        Ok(filter_tradable_symbols(
            &info.symbols,
            &self.quote_asset,
            &self.excluded_markers,
        ))
    }

    async fn fetch_recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        self.get_klines(symbol, interval, limit).await
    }
}
