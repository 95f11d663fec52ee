use rust_decimal::Decimal;

use crate::analysis::{PEAK_WINDOW, TROUGH_SEARCH_BARS};
use crate::models::DailyBar;

/// A structurally valid peak-to-trough pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub peak_index: usize,
    pub trough_index: usize,
    pub peak_close: Decimal,
    pub trough_close: Decimal,
}

/// Walks every index with a full peak window on both sides and yields the
/// episodes that pass the local-peak, trough and monotonic-decline checks.
///
/// Episodes come out in ascending peak order. Series shorter than
/// `2 * PEAK_WINDOW + 1` bars yield nothing.
pub fn scan_episodes(bars: &[DailyBar]) -> impl Iterator<Item = Episode> + '_ {
    let last_candidate = bars.len().saturating_sub(PEAK_WINDOW);
    (PEAK_WINDOW..last_candidate)
        .filter(move |&i| is_local_peak(bars, i))
        .filter_map(move |i| {
            let trough = find_trough(bars, i)?;
            if !declines_without_new_high(bars, i, trough) {
                return None;
            }
            Some(Episode {
                peak_index: i,
                trough_index: trough,
                peak_close: bars[i].close,
                trough_close: bars[trough].close,
            })
        })
}

fn is_local_peak(bars: &[DailyBar], i: usize) -> bool {
    let close = bars[i].close;
    bars[i - PEAK_WINDOW..=i + PEAK_WINDOW]
        .iter()
        .all(|bar| bar.close <= close)
}

// 峰值之后的最低收盘价，相同取最早
fn find_trough(bars: &[DailyBar], peak: usize) -> Option<usize> {
    let end = bars.len().min(peak + TROUGH_SEARCH_BARS);
    let mut trough: Option<usize> = None;
    for j in peak + 1..end {
        match trough {
            Some(t) if bars[j].close >= bars[t].close => {}
            _ => trough = Some(j),
        }
    }
    trough
}

/// A close above the peak before the trough means a later peak owns the decline.
fn declines_without_new_high(bars: &[DailyBar], peak: usize, trough: usize) -> bool {
    let peak_close = bars[peak].close;
    bars[peak + 1..trough].iter().all(|bar| bar.close <= peak_close)
}
