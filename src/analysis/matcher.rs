use log::debug;
use rust_decimal::Decimal;

use crate::analysis::chart::event_window;
use crate::analysis::recovery::project_recovery;
use crate::analysis::scanner::{scan_episodes, Episode};
use crate::models::{DailyBar, DrawdownEvent, PriceSeries};
use crate::util;

/// Historical drawdowns whose depth is within `tolerance` points of `target_percent`.
///
/// Events are returned in scan order, oldest peak first. The tolerance bound is inclusive.
pub fn find_matching_drawdowns(
    series: &PriceSeries,
    target_percent: Decimal,
    tolerance: Decimal,
) -> Vec<DrawdownEvent> {
    let episodes: Vec<Episode> = scan_episodes(series.bars()).collect();
    let events = match_episodes(series.bars(), &episodes, target_percent, tolerance);

    debug!(
        "Found {} historical drawdowns for {} similar to {}%",
        events.len(),
        series.ticker(),
        target_percent
    );
    events
}

/// Matches pre-scanned episodes so several targets can share one scan.
pub(crate) fn match_episodes(
    bars: &[DailyBar],
    episodes: &[Episode],
    target_percent: Decimal,
    tolerance: Decimal,
) -> Vec<DrawdownEvent> {
    episodes
        .iter()
        .filter_map(|episode| {
            let drawdown_percent = util::percent_change(episode.peak_close, episode.trough_close)?;
            if (drawdown_percent - target_percent).abs() > tolerance {
                return None;
            }

            Some(DrawdownEvent {
                start_date: bars[episode.peak_index].date,
                bottom_date: bars[episode.trough_index].date,
                drawdown_percent,
                recovery_points: project_recovery(bars, episode.trough_index, episode.trough_close),
                chart_window: event_window(bars, episode.peak_index, episode.trough_index),
            })
        })
        .collect()
}
