use log::debug;

use crate::errors::{GuideError, Result};
use crate::models::{CurrentDrawdown, PriceSeries};
use crate::util;

/// Present decline from the all-time-high close to the latest close.
pub fn current_drawdown(ticker: &str, series: &PriceSeries) -> Result<CurrentDrawdown> {
    let bars = series.bars();
    let (peak_index, latest) = match (series.peak_index(), bars.last()) {
        (Some(peak_index), Some(latest)) => (peak_index, latest),
        _ => return Err(GuideError::EmptySeries(ticker.to_string())),
    };
    let peak = &bars[peak_index];

    let drawdown_percent = util::percent_change(peak.close, latest.close).ok_or_else(|| {
        GuideError::ComputationFailure(format!("peak close of {} on {} is zero", ticker, peak.date))
    })?;

    debug!(
        "{}: peak {} on {}, latest {} on {}, drawdown {}%",
        ticker, peak.close, peak.date, latest.close, latest.date, drawdown_percent
    );

    Ok(CurrentDrawdown {
        ticker: ticker.to_string(),
        current_price: latest.close,
        peak_price: peak.close,
        peak_date: peak.date,
        drawdown_percent,
        days_since_peak: util::days_between(peak.date, latest.date),
    })
}
