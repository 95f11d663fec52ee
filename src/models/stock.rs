use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{GuideError, Result};

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl DailyBar {
    /// Bar whose open/high/low all equal the close. Handy for close-only sources.
    pub fn from_close(date: NaiveDate, close: Decimal) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Date-ordered daily bars for one ticker.
///
/// Dates are strictly increasing; every constructor enforces it, so the
/// analysis code may rely on `bars()[i].date < bars()[i + 1].date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    /// Builds a series from bars that must already be in strictly increasing date order.
    pub fn new(ticker: &str, bars: Vec<DailyBar>) -> Result<Self> {
        if let Some(pair) = bars.windows(2).find(|pair| pair[1].date <= pair[0].date) {
            return Err(GuideError::UnorderedSeries {
                ticker: ticker.to_string(),
                date: pair[1].date,
            });
        }

        Ok(Self {
            ticker: ticker.to_string(),
            bars,
        })
    }

    /// Sorts by date and keeps the first bar seen for each date.
    pub fn from_unsorted(ticker: &str, mut bars: Vec<DailyBar>) -> Self {
        // 稳定排序，重复日期保留先出现的记录
        bars.sort_by(|a, b| a.date.cmp(&b.date));
        bars.dedup_by(|later, earlier| later.date == earlier.date);

        Self {
            ticker: ticker.to_string(),
            bars,
        }
    }

    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    /// Index of the all-time-high close. The earliest bar wins on ties.
    pub fn peak_index(&self) -> Option<usize> {
        let mut peak: Option<usize> = None;
        for (i, bar) in self.bars.iter().enumerate() {
            match peak {
                Some(p) if bar.close <= self.bars[p].close => {}
                _ => peak = Some(i),
            }
        }
        peak
    }

    pub fn into_bars(self) -> Vec<DailyBar> {
        self.bars
    }
}
