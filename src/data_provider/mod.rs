use log::{info, warn};

use crate::errors::Result;
use crate::models::stock::{DailyBar, PriceSeries};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 价格序列存储，按股票代码读写
pub trait SeriesStore {
    /// Missing tickers load as an empty series.
    fn load_series(&self, ticker: &str) -> Result<PriceSeries>;

    fn save_series(&self, series: &PriceSeries) -> Result<()>;

    fn has_series(&self, ticker: &str) -> bool;

    /// Merges `bars` into the stored series without duplicating dates.
    /// Returns how many bars were new.
    fn append_bars(&self, ticker: &str, bars: Vec<DailyBar>) -> Result<usize> {
        let existing = self.load_series(ticker)?;
        let before = existing.len();

        let mut merged: BTreeMap<_, DailyBar> = existing
            .into_bars()
            .into_iter()
            .map(|bar| (bar.date, bar))
            .collect();
        for bar in bars {
            merged.entry(bar.date).or_insert(bar);
        }

        let series = PriceSeries::from_unsorted(ticker, merged.into_values().collect());
        let added = series.len() - before;
        self.save_series(&series)?;

        info!("Appended {} new records to {} (total: {})", added, ticker, series.len());
        Ok(added)
    }
}

/// 每个股票代码一个 JSON 文件：`<data_dir>/<TICKER>.json`
pub struct JsonSeriesStore {
    data_dir: PathBuf,
}

impl JsonSeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn series_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", ticker))
    }
}

impl SeriesStore for JsonSeriesStore {
    fn load_series(&self, ticker: &str) -> Result<PriceSeries> {
        let path = self.series_path(ticker);
        if !path.exists() {
            warn!("No data file found for {}", ticker);
            return Ok(PriceSeries::empty(ticker));
        }

        let content = fs::read_to_string(&path)?;
        let bars: Vec<DailyBar> = serde_json::from_str(&content)?;
        let series = PriceSeries::from_unsorted(ticker, bars);

        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            info!("Loaded {} records for {} (from {} to {})", series.len(), ticker, first, last);
        }
        Ok(series)
    }

    fn save_series(&self, series: &PriceSeries) -> Result<()> {
        // 确保目录存在
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }

        let path = self.series_path(series.ticker());
        let content = serde_json::to_string_pretty(series.bars())?;
        fs::write(&path, content)?;

        info!("Saved {} records for {}", series.len(), series.ticker());
        Ok(())
    }

    fn has_series(&self, ticker: &str) -> bool {
        self.series_path(ticker).exists()
    }
}
