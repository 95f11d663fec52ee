use crate::errors::Result;
use crate::models::stock::DailyBar;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for daily price sources
#[async_trait]
pub trait PriceSource {
    /// Name used in log lines
    fn source_name(&self) -> &'static str;

    /// Fetch daily bars for `ticker` between `start` and `end`, both inclusive.
    /// Bars come back in ascending date order.
    async fn fetch_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>>;
}
