use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;
use crate::indicator::rsi::DEFAULT_RSI_PERIOD;

pub const CONFIG_PATH_ENV: &str = "SPIKE_WATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub binance: BinanceConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub rest_base_url: String,
    pub quote_asset: String,
    /// Substrings that mark leveraged-token tickers (e.g. `BTCUPUSDT`).
    pub excluded_markers: Vec<String>,
    pub kline_interval: String,
    pub kline_limit: usize,
    pub request_timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com".to_string(),
            quote_asset: "USDT".to_string(),
            excluded_markers: vec!["UP".to_string(), "DOWN".to_string()],
            kline_interval: "1h".to_string(),
            kline_limit: 20,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_period: usize,
    pub volume_ratio: f64,
    pub min_volume: f64,
    pub rsi_ceiling: f64,
    pub min_candles: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            volume_ratio: 2.0,
            min_volume: 100_000.0,
            rsi_ceiling: 70.0,
            min_candles: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub check_interval_secs: u64,
    pub alert_pause_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 600,
            alert_pause_ms: 1_000,
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn alert_pause(&self) -> Duration {
        Duration::from_millis(self.alert_pause_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base_url: String,
    #[serde(skip)]
    pub bot_token: String,
    #[serde(skip)]
    pub chat_id: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Parse a Binance kline interval string (e.g. "1s", "1m", "1h", "1d", "1w", "1M") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let suffix_start = match s.char_indices().last() {
        Some((i, _)) if i > 0 => i,
        _ => bail!("invalid interval '{}': expected format like '1m'", s),
    };

    let (num_str, suffix) = s.split_at(suffix_start);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "M" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl BinanceConfig {
    pub fn kline_interval_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.kline_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Markers normalized to upper case with blanks dropped.
    pub fn normalized_markers(&self) -> Vec<String> {
        self.excluded_markers
            .iter()
            .map(|m| m.trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty())
            .collect()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::from_path(&config_path)?;

        config.telegram.bot_token = std::env::var("TELEGRAM_TOKEN")
            .context("TELEGRAM_TOKEN not set in .env or environment")?;
        config.telegram.chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .or_else(|_| std::env::var("CHAT_ID"))
            .context("TELEGRAM_CHAT_ID not set in .env or environment")?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: String| -> Result<(), AppError> { Err(AppError::Config(msg)) };

        if let Err(e) = self.binance.kline_interval_ms() {
            return invalid(format!("binance.kline_interval: {:#}", e));
        }
        for (key, value) in [
            ("binance.rest_base_url", &self.binance.rest_base_url),
            ("telegram.api_base_url", &self.telegram.api_base_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return invalid(format!("{} '{}': {}", key, value, e));
            }
        }
        if self.binance.quote_asset.trim().is_empty() {
            return invalid("binance.quote_asset must not be empty".to_string());
        }
        if self.signal.rsi_period == 0 {
            return invalid("signal.rsi_period must be > 0".to_string());
        }
        if self.binance.kline_limit < self.signal.rsi_period + 1 {
            return invalid(format!(
                "binance.kline_limit ({}) must cover the RSI lookback ({})",
                self.binance.kline_limit,
                self.signal.rsi_period + 1
            ));
        }
        if self.signal.min_candles < 2 {
            return invalid("signal.min_candles must be >= 2".to_string());
        }
        if self.signal.volume_ratio <= 0.0 {
            return invalid("signal.volume_ratio must be > 0".to_string());
        }
        if !(self.signal.rsi_ceiling > 0.0 && self.signal.rsi_ceiling <= 100.0) {
            return invalid("signal.rsi_ceiling must be in (0, 100]".to_string());
        }
        Ok(())
    }
}
