use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::analysis::matcher::match_episodes;
use crate::analysis::scanner::{scan_episodes, Episode};
use crate::analysis::{DRAWDOWN_LEVELS, LEVEL_TOLERANCE, RECOVERY_HORIZONS, SAMPLE_EVENT_LIMIT};
use crate::models::{AverageRecoveryStats, DrawdownEvent, HorizonAverage, LevelSummary, PriceSeries};
use crate::util;

/// One summary per fixed level, in `DRAWDOWN_LEVELS` order.
pub fn analyze_levels(series: &PriceSeries) -> Vec<LevelSummary> {
    // 各档位共用一次扫描结果
    let episodes: Vec<Episode> = scan_episodes(series.bars()).collect();
    DRAWDOWN_LEVELS
        .iter()
        .map(|&level| summarize_level(series, &episodes, level))
        .collect()
}

fn summarize_level(series: &PriceSeries, episodes: &[Episode], level: i32) -> LevelSummary {
    let cases = match_episodes(series.bars(), episodes, Decimal::from(level), LEVEL_TOLERANCE);

    LevelSummary {
        level,
        total_cases: cases.len(),
        average_stats: average_recovery_stats(&cases),
        sample_events: cases.into_iter().take(SAMPLE_EVENT_LIMIT).collect(),
    }
}

/// Per-horizon mean return and loss count, both over every case.
///
/// A case without a point for some horizon still counts in that horizon's
/// denominator.
fn average_recovery_stats(cases: &[DrawdownEvent]) -> Option<AverageRecoveryStats> {
    if cases.is_empty() {
        return None;
    }
    let count = cases.len() as f64;

    let horizons = RECOVERY_HORIZONS
        .iter()
        .map(|&months| {
            let returns: Vec<f64> = cases
                .iter()
                .filter_map(|case| case.recovery_at(months))
                .filter_map(|point| point.return_percent.to_f64())
                .collect();

            HorizonAverage {
                months,
                average_return: util::round_cents(returns.iter().sum::<f64>() / count),
                loss_count: returns.iter().filter(|r| **r < 0.0).count(),
            }
        })
        .collect();

    Some(AverageRecoveryStats { horizons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{daily_series, rise_fall_flat};
    use rust_decimal_macros::dec;

    fn analyze_level(series: &PriceSeries, level: i32) -> LevelSummary {
        let episodes: Vec<Episode> = scan_episodes(series.bars()).collect();
        summarize_level(series, &episodes, level)
    }

    /// 300-bar blocks: climb 1..=100, hold 90, drop to `trough` at bar 130, rebound to `trough + 5`.
    fn repeated_dips(troughs: &[Decimal]) -> PriceSeries {
        let mut closes = Vec::new();
        for trough in troughs {
            closes.extend((1..=100).map(Decimal::from));
            closes.extend(std::iter::repeat(dec!(90)).take(30));
            closes.push(*trough);
            closes.extend(std::iter::repeat(*trough + dec!(5)).take(169));
        }
        daily_series(&closes)
    }

    #[test]
    fn seven_levels_in_fixed_order() {
        let summaries = analyze_levels(&rise_fall_flat());
        let levels: Vec<i32> = summaries.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![-10, -15, -20, -25, -30, -35, -40]);
    }

    #[test]
    fn empty_level_has_absent_stats() {
        let summaries = analyze_levels(&rise_fall_flat());
        let ten = &summaries[0];
        assert_eq!(ten.total_cases, 0);
        assert!(ten.average_stats.is_none());
        assert!(ten.sample_events.is_empty());

        let quarter = &summaries[3];
        assert_eq!(quarter.total_cases, 1);
        let stats = quarter.average_stats.as_ref().unwrap();
        assert_eq!(stats.horizons.len(), 5);
        assert_eq!(stats.horizon(1).unwrap().average_return, 0.0);
        // six-month horizon is out of reach: no return, no loss
        assert_eq!(stats.horizon(6).unwrap().average_return, 0.0);
        assert_eq!(stats.horizon(6).unwrap().loss_count, 0);
    }

    #[test]
    fn shared_scan_matches_single_level_runs() {
        let series = repeated_dips(&[dec!(80), dec!(70), dec!(80)]);
        let summaries = analyze_levels(&series);

        for summary in &summaries {
            assert_eq!(*summary, analyze_level(&series, summary.level));
        }
        assert_eq!(summaries[2].total_cases, 2);
        assert_eq!(summaries[4].total_cases, 1);
    }

    #[test]
    fn samples_are_capped_but_totals_are_not() {
        let troughs = vec![dec!(80); 12];
        let series = repeated_dips(&troughs);
        let summary = analyze_level(&series, -20);

        assert_eq!(summary.total_cases, 12);
        assert_eq!(summary.sample_events.len(), 10);
        assert!(summary
            .sample_events
            .windows(2)
            .all(|pair| pair[0].start_date < pair[1].start_date));
    }

    #[test]
    fn averages_divide_by_every_case() {
        let series = repeated_dips(&[dec!(80), dec!(80)]);
        let summary = analyze_level(&series, -20);
        assert_eq!(summary.total_cases, 2);

        let stats = summary.average_stats.unwrap();
        // rebound to 85 from 80 is +6.25% a month later
        let one_month = stats.horizon(1).unwrap();
        assert_eq!(one_month.average_return, 6.25);
        assert_eq!(one_month.loss_count, 0);
    }
}
