use anyhow::Result;
use async_trait::async_trait;

use crate::model::candle::Candle;

/// Source of the symbol universe and candle history the monitor sweeps over.
///
/// "No data" is an `Ok` with an empty `Vec`; `Err` is reserved for transport
/// and decoding failures.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn list_tradable_symbols(&self) -> Result<Vec<String>>;

    async fn fetch_recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>>;
}
