use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("binance API error (code {code}): {msg}")]
    BinanceApi { code: i64, msg: String },

    #[error("malformed kline row {index}: {reason}")]
    MalformedKline { index: usize, reason: String },

    #[error("notify error: {0}")]
    Notify(String),
}
