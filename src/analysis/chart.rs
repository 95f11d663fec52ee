use chrono::{Days, NaiveDate};

use crate::analysis::{CHART_MONTHS_AFTER_TROUGH, CHART_MONTHS_BEFORE_PEAK, TRAILING_WINDOW_DAYS};
use crate::models::{ChartWindow, DailyBar, PriceSeries};
use crate::util;

/// Window from three months before a peak to twelve months after its trough.
pub fn event_window(bars: &[DailyBar], peak_index: usize, trough_index: usize) -> Option<ChartWindow> {
    let peak = bars.get(peak_index)?;
    let trough = bars.get(trough_index)?;
    let from = util::sub_months(peak.date, CHART_MONTHS_BEFORE_PEAK)?;
    let to = util::add_months(trough.date, CHART_MONTHS_AFTER_TROUGH)?;
    build_window(slice_between(bars, from, to), peak)
}

/// The last 365 days of the series, referenced to the all-time high.
pub fn trailing_window(series: &PriceSeries) -> Option<ChartWindow> {
    let bars = series.bars();
    let latest = series.last_date()?;
    let from = latest.checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))?;
    let peak = &bars[series.peak_index()?];
    build_window(slice_between(bars, from, latest), peak)
}

// 日期区间 [from, to]，依赖序列按日期升序
fn slice_between(bars: &[DailyBar], from: NaiveDate, to: NaiveDate) -> &[DailyBar] {
    let start = bars.partition_point(|bar| bar.date < from);
    let end = bars.partition_point(|bar| bar.date <= to);
    if start >= end {
        return &[];
    }
    &bars[start..end]
}

fn build_window(window: &[DailyBar], peak: &DailyBar) -> Option<ChartWindow> {
    if window.is_empty() {
        return None;
    }

    Some(ChartWindow {
        labels: window.iter().map(|bar| bar.date.to_string()).collect(),
        prices: window.iter().map(|bar| bar.close).collect(),
        peak_price: peak.close,
        peak_date: peak.date.to_string(),
    })
}
