use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analysis::{MAX_HORIZON_DRIFT_DAYS, RECOVERY_HORIZONS};
use crate::models::{DailyBar, RecoveryPoint};
use crate::util;

/// Return from the trough close at each recovery horizon the series reaches.
///
/// Horizons are measured in calendar months from the trough date. Each one
/// uses the bar nearest to its target date; a horizon is left out when the
/// series ends more than `MAX_HORIZON_DRIFT_DAYS` before the target.
pub fn project_recovery(
    bars: &[DailyBar],
    trough_index: usize,
    trough_close: Decimal,
) -> Vec<RecoveryPoint> {
    let Some(trough) = bars.get(trough_index) else {
        return Vec::new();
    };

    RECOVERY_HORIZONS
        .iter()
        .filter_map(|&months| {
            let target = util::add_months(trough.date, months)?;
            let closest = nearest_bar(&bars[trough_index..], target)?;
            let return_percent = util::percent_change(trough_close, closest.close)?;
            Some(RecoveryPoint {
                months,
                return_percent,
            })
        })
        .collect()
}

fn nearest_bar(bars: &[DailyBar], target: NaiveDate) -> Option<&DailyBar> {
    // 序列在目标日期之前就结束了
    let last = bars.last()?;
    if util::days_between(last.date, target) > MAX_HORIZON_DRIFT_DAYS {
        return None;
    }

    let mut closest: Option<(&DailyBar, i64)> = None;

    for bar in bars {
        let offset = util::days_between(target, bar.date);
        let distance = offset.abs();
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((bar, distance));
        }
        if offset > MAX_HORIZON_DRIFT_DAYS {
            break;
        }
    }

    closest.map(|(bar, _)| bar)
}
