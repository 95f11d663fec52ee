use crate::analysis;
use crate::config::Config;
use crate::data_provider::{JsonSeriesStore, SeriesStore};
use crate::errors::{GuideError, Result};
use crate::models::{AnalysisReport, PriceSeries};
use crate::scrapers::base::PriceSource;
use crate::scrapers::csv_file;
use crate::scrapers::investing::InvestingScraper;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

/// 数据服务，负责数据的加载、更新和分析调度
pub struct DataService {
    config: Config,
    store: Arc<dyn SeriesStore + Send + Sync>,
    source: Arc<dyn PriceSource + Send + Sync>,
}

impl DataService {
    /// 创建新的数据服务实例
    pub fn new(
        config: Config,
        store: Arc<dyn SeriesStore + Send + Sync>,
        source: Arc<dyn PriceSource + Send + Sync>,
    ) -> Self {
        Self { config, store, source }
    }

    /// JSON files under `config.data_dir`, Investing.com as the price source.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(JsonSeriesStore::new(&config.data_dir));
        let source = Arc::new(InvestingScraper::new(
            config.source_ids.clone(),
            config.request_timeout(),
            config.request_interval(),
        )?);
        Ok(Self::new(config, store, source))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn load_series(&self, ticker: &str) -> Result<PriceSeries> {
        self.store.load_series(ticker)
    }

    /// 分析单个股票，失败时返回只带错误信息的报告
    pub fn analyze_ticker(&self, ticker: &str) -> AnalysisReport {
        analyze_from_store(self.store.as_ref(), ticker)
    }

    /// One blocking task per ticker, each loading its own copy of the series.
    /// Reports come back in the order the tickers were given.
    pub async fn analyze_all(&self, tickers: &[String]) -> Vec<(String, AnalysisReport)> {
        let handles: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let store = Arc::clone(&self.store);
                let task_ticker = ticker.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    analyze_from_store(store.as_ref(), &task_ticker)
                });
                (ticker.clone(), handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (ticker, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!("Analysis task for {} failed: {}", ticker, e);
                    AnalysisReport::message_only(format!("Error: {}", e))
                }
            };
            reports.push((ticker, report));
        }
        reports
    }

    /// 增量更新单个股票，返回新增记录数
    pub async fn refresh_ticker(&self, ticker: &str, today: NaiveDate) -> Result<usize> {
        let existing = self.store.load_series(ticker)?;
        let last_date = existing.last_date();

        // 已经是最新数据则跳过
        if let (Some(last), Some(yesterday)) = (last_date, today.pred_opt()) {
            if last >= yesterday {
                info!("Data for {} is already up to date. Last date: {}", ticker, last);
                return Ok(0);
            }
        }

        let start = last_date
            .and_then(|last| last.succ_opt())
            .unwrap_or(self.config.history_start);
        info!("Refreshing {} from {} via {}", ticker, start, self.source.source_name());

        let bars = self.source.fetch_history(ticker, start, today).await?;
        if bars.is_empty() {
            info!("No new data available for {}", ticker);
            return Ok(0);
        }

        self.store.append_bars(ticker, bars)
    }

    /// 更新所有配置的股票，单个失败不影响其他股票
    pub async fn refresh_all(&self, today: NaiveDate) -> Vec<(String, Result<usize>)> {
        info!("Starting data update for {} tickers", self.config.tickers.len());

        let mut results = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            let result = self.refresh_ticker(ticker, today).await;
            if let Err(e) = &result {
                error!("Failed to update data for ticker {}: {}", ticker, e);
            }
            results.push((ticker.clone(), result));
        }

        info!("Completed data update");
        results
    }

    /// 导入 CSV 导出文件并合并到存储中
    pub fn import_csv(&self, ticker: &str, path: &Path) -> Result<usize> {
        let bars = csv_file::read_csv_file(path)?;
        if bars.is_empty() {
            warn!("No usable rows in {}", path.display());
            return Err(GuideError::DataError(format!("No usable rows in {}", path.display())));
        }
        self.store.append_bars(ticker, bars)
    }
}

fn analyze_from_store(store: &dyn SeriesStore, ticker: &str) -> AnalysisReport {
    match store.load_series(ticker) {
        Ok(series) => analysis::analyze(ticker, &series),
        Err(e) => {
            error!("Error loading stock {}: {}", ticker, e);
            AnalysisReport::message_only(format!("Error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyBar;
    use async_trait::async_trait;
    use chrono::Days;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeSource {
        bars: Vec<DailyBar>,
        requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    }

    impl FakeSource {
        fn new(bars: Vec<DailyBar>) -> Self {
            Self {
                bars,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        fn source_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
            if ticker == "FAIL" {
                return Err(GuideError::SourceError("boom".to_string()));
            }
            self.requests.lock().unwrap().push((ticker.to_string(), start, end));
            Ok(self
                .bars
                .iter()
                .filter(|bar| bar.date >= start && bar.date <= end)
                .cloned()
                .collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_from(start: NaiveDate, count: u64) -> Vec<DailyBar> {
        (0..count)
            .map(|i| {
                let day = start.checked_add_days(Days::new(i)).unwrap();
                DailyBar::from_close(day, Decimal::from(100 + i))
            })
            .collect()
    }

    fn service(dir: &TempDir, source: Arc<FakeSource>, tickers: &[&str]) -> DataService {
        let config = Config::new()
            .with_data_dir(dir.path().to_str().unwrap())
            .with_tickers(tickers.iter().map(|t| t.to_string()).collect())
            .with_history_start(date(2024, 1, 1));
        let store = Arc::new(JsonSeriesStore::new(dir.path()));
        DataService::new(config, store, source)
    }

    #[tokio::test]
    async fn first_refresh_fetches_from_history_start() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::new(days_from(date(2024, 1, 1), 10)));
        let service = service(&dir, Arc::clone(&source), &["QQQ"]);

        let added = service.refresh_ticker("QQQ", date(2024, 1, 20)).await.unwrap();

        assert_eq!(added, 10);
        let requests = source.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![("QQQ".to_string(), date(2024, 1, 1), date(2024, 1, 20))]);
    }

    #[tokio::test]
    async fn later_refresh_starts_after_last_stored_day() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::new(days_from(date(2024, 1, 1), 15)));
        let service = service(&dir, Arc::clone(&source), &["QQQ"]);
        service.refresh_ticker("QQQ", date(2024, 1, 10)).await.unwrap();

        let added = service.refresh_ticker("QQQ", date(2024, 1, 15)).await.unwrap();

        assert_eq!(added, 5);
        let last = source.requests.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.1, date(2024, 1, 11));
        assert_eq!(service.load_series("QQQ").unwrap().len(), 15);
    }

    #[tokio::test]
    async fn up_to_date_series_is_not_refetched() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::new(days_from(date(2024, 1, 1), 5)));
        let service = service(&dir, Arc::clone(&source), &["VOO"]);
        service.refresh_ticker("VOO", date(2024, 1, 5)).await.unwrap();

        let added = service.refresh_ticker("VOO", date(2024, 1, 6)).await.unwrap();

        assert_eq!(added, 0);
        assert_eq!(source.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_all_survives_a_failing_ticker() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::new(days_from(date(2024, 1, 1), 3)));
        let service = service(&dir, source, &["FAIL", "SOXX"]);

        let results = service.refresh_all(date(2024, 1, 10)).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "SOXX");
        assert_eq!(*results[1].1.as_ref().unwrap(), 3);
    }

    #[tokio::test]
    async fn analyze_all_keeps_request_order() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::new(days_from(date(2024, 1, 1), 100)));
        let service = service(&dir, source, &["QQQ"]);
        service.refresh_ticker("QQQ", date(2024, 6, 1)).await.unwrap();

        let tickers = vec!["MISSING".to_string(), "QQQ".to_string()];
        let reports = service.analyze_all(&tickers).await;

        assert_eq!(reports[0].0, "MISSING");
        assert_eq!(reports[0].1.message, "No data available for MISSING");
        assert_eq!(reports[1].0, "QQQ");
        assert_eq!(reports[1].1.message, "Analysis completed successfully");
    }

    #[test]
    fn corrupt_store_becomes_error_report() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("BAD.json"), "{").unwrap();
        let service = service(&dir, Arc::new(FakeSource::new(Vec::new())), &[]);

        let report = service.analyze_ticker("BAD");
        assert!(report.message.starts_with("Error: JSON parsing error"));
        assert!(report.is_empty());
    }

    #[test]
    fn import_merges_csv_rows() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("QQQ_historical_data.csv");
        std::fs::write(
            &csv_path,
            "Date,Price,Open,High,Low,Vol.,Change %\n\
             2025-11-14,608.40,600.10,610.00,598.25,80.09M,0.52%\n\
             2025-11-13,605.00,601.00,606.50,597.00,70.00M,-0.10%\n",
        )
        .unwrap();
        let service = service(&dir, Arc::new(FakeSource::new(Vec::new())), &["QQQ"]);

        assert_eq!(service.import_csv("QQQ", &csv_path).unwrap(), 2);
        assert_eq!(service.import_csv("QQQ", &csv_path).unwrap(), 0);

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "Date,Price,Open,High,Low,Vol.,Change %\n").unwrap();
        assert!(service.import_csv("QQQ", &empty).is_err());
    }
}
