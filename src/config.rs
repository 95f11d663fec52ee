use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_TICKERS: [(&str, &str); 3] = [("QQQ", "651"), ("VOO", "38165"), ("SOXX", "45481")];

pub struct Config {
    pub data_dir: String,
    pub tickers: Vec<String>,
    pub source_ids: HashMap<String, String>, // 股票代码 -> Investing.com 编号
    pub history_start: NaiveDate,
    pub request_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            data_dir: "data".to_string(),
            tickers: DEFAULT_TICKERS.iter().map(|(t, _)| t.to_string()).collect(),
            source_ids: DEFAULT_TICKERS
                .iter()
                .map(|(t, id)| (t.to_string(), id.to_string()))
                .collect(),
            history_start: NaiveDate::from_ymd_opt(1975, 1, 1).unwrap_or_default(),
            request_interval_ms: 500,
            request_timeout_secs: 30,
        }
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_tickers(mut self, tickers: Vec<String>) -> Self {
        self.tickers = tickers;
        self
    }

    /// Adds or replaces the source id for a ticker, and tracks the ticker.
    pub fn with_source_id(mut self, ticker: &str, id: &str) -> Self {
        if !self.tickers.iter().any(|t| t == ticker) {
            self.tickers.push(ticker.to_string());
        }
        self.source_ids.insert(ticker.to_string(), id.to_string());
        self
    }

    pub fn with_history_start(mut self, start: NaiveDate) -> Self {
        self.history_start = start;
        self
    }

    pub fn with_request_interval_ms(mut self, interval: u64) -> Self {
        self.request_interval_ms = interval;
        self
    }

    pub fn with_request_timeout_secs(mut self, timeout: u64) -> Self {
        self.request_timeout_secs = timeout;
        self
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
