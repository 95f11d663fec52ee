use crate::errors::{GuideError, Result};
use crate::models::stock::DailyBar;
use crate::scrapers::base::PriceSource;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const HISTORY_URL: &str = "https://api.investing.com/api/financialdata/historical";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    data: Option<Vec<HistoryPoint>>,
}

#[derive(Debug, Deserialize)]
struct HistoryPoint {
    #[serde(rename = "rowDateTimestamp")]
    row_date_timestamp: String,
    #[serde(rename = "last_openRaw")]
    open: f64,
    #[serde(rename = "last_maxRaw")]
    high: f64,
    #[serde(rename = "last_minRaw")]
    low: f64,
    #[serde(rename = "last_closeRaw")]
    close: f64,
    #[serde(rename = "volumeRaw", default)]
    volume: u64,
}

/// Investing.com 日线历史数据抓取器
pub struct InvestingScraper {
    client: Client,
    instrument_ids: HashMap<String, String>,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl InvestingScraper {
    /// `instrument_ids` maps tickers to Investing.com instrument ids.
    pub fn new(instrument_ids: HashMap<String, String>, timeout: Duration, min_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GuideError::RequestError)?;

        Ok(Self {
            client,
            instrument_ids,
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = match self.last_request.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let should_wait = (*last)
                .and_then(|instant| self.min_interval.checked_sub(instant.elapsed()))
                .filter(|wait| !wait.is_zero());
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} before next request", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    fn instrument_id(&self, ticker: &str) -> Result<&str> {
        self.instrument_ids
            .get(ticker)
            .map(String::as_str)
            .ok_or_else(|| GuideError::UnknownTicker(ticker.to_string()))
    }
}

#[async_trait]
impl PriceSource for InvestingScraper {
    fn source_name(&self) -> &'static str {
        "investing.com"
    }

    async fn fetch_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let instrument_id = self.instrument_id(ticker)?;
        info!("Fetching data for {} from {} to {}", ticker, start, end);

        // 限制请求频率
        self.wait_for_rate_limit().await;

        let start_date = start.to_string();
        let end_date = end.to_string();
        let response = self
            .client
            .get(format!("{}/{}", HISTORY_URL, instrument_id))
            .query(&[
                ("start-date", start_date.as_str()),
                ("end-date", end_date.as_str()),
                ("time-frame", "Daily"),
                ("add-missing-rows", "false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GuideError::SourceError(format!(
                "{} returned HTTP status {} for {}",
                self.source_name(),
                response.status(),
                ticker
            )));
        }

        let text = response.text().await?;
        let bars = parse_history_response(&text)?;
        debug!("Received {} daily records for {}", bars.len(), ticker);
        Ok(bars)
    }
}

/// Parses the historical-data payload into ascending daily bars.
pub fn parse_history_response(body: &str) -> Result<Vec<DailyBar>> {
    let response: HistoryResponse = serde_json::from_str(body)?;

    let mut bars = response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(point_to_bar)
        .collect::<Result<Vec<_>>>()?;

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(bars)
}

fn point_to_bar(point: HistoryPoint) -> Result<DailyBar> {
    // "2025-11-14T00:00:00Z" -> "2025-11-14"
    let date_part = point.row_date_timestamp.get(..10).ok_or_else(|| {
        GuideError::DataError(format!("Invalid timestamp: {}", point.row_date_timestamp))
    })?;

    Ok(DailyBar {
        date: util::parse_iso_date(date_part)?,
        open: to_price(point.open)?,
        high: to_price(point.high)?,
        low: to_price(point.low)?,
        close: to_price(point.close)?,
        volume: point.volume,
    })
}

fn to_price(value: f64) -> Result<Decimal> {
    Decimal::try_from(value)
        .map(|price| util::round_half_up(price, 2))
        .map_err(|e| GuideError::DataError(format!("Invalid price {}: {}", value, e)))
}
