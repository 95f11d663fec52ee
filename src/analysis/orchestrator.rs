use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{error, info};

use crate::analysis::{
    analyze_levels, current_drawdown, find_matching_drawdowns, trailing_window,
    CURRENT_MATCH_TOLERANCE,
};
use crate::errors::{GuideError, Result};
use crate::models::{AnalysisReport, DailyBar, PriceSeries};

const SUCCESS_MESSAGE: &str = "Analysis completed successfully";

/// Full drawdown report for one ticker.
///
/// Never fails: an empty series yields a "No data" report, and a failing
/// section is left absent with its error appended to the message while the
/// other sections are still filled in.
pub fn analyze(ticker: &str, series: &PriceSeries) -> AnalysisReport {
    if series.is_empty() {
        info!("No data available for {}", ticker);
        return AnalysisReport::no_data(ticker);
    }

    let mut failures: Vec<String> = Vec::new();

    let current = run_section(ticker, "current drawdown", &mut failures, || {
        current_drawdown(ticker, series)
    });

    let historical_drawdowns = match &current {
        Some(current) => run_section(ticker, "historical drawdowns", &mut failures, || {
            Ok(find_matching_drawdowns(
                series,
                current.drawdown_percent,
                CURRENT_MATCH_TOLERANCE,
            ))
        }),
        None => {
            failures.push("historical drawdowns skipped: current drawdown unavailable".to_string());
            None
        }
    };

    let drawdown_level_analyses = run_section(ticker, "drawdown levels", &mut failures, || {
        Ok(analyze_levels(series))
    });

    let one_year_chart = run_section(ticker, "one-year chart", &mut failures, || {
        trailing_window(series).ok_or_else(|| {
            GuideError::ComputationFailure("no bars in the trailing year".to_string())
        })
    });

    let date_range = run_section(ticker, "date range", &mut failures, || {
        series
            .first_date()
            .zip(series.last_date())
            .ok_or_else(|| GuideError::EmptySeries(ticker.to_string()))
    });

    let message = if failures.is_empty() {
        SUCCESS_MESSAGE.to_string()
    } else {
        format!("Analysis completed with errors: {}", failures.join("; "))
    };

    AnalysisReport {
        current_drawdown: current,
        historical_drawdowns,
        drawdown_level_analyses,
        one_year_chart,
        data_start_date: date_range.map(|(start, _)| start),
        data_end_date: date_range.map(|(_, end)| end),
        message,
    }
}

/// Validates raw bars before analysing them. Out-of-order input becomes an error report.
pub fn analyze_bars(ticker: &str, bars: Vec<DailyBar>) -> AnalysisReport {
    match PriceSeries::new(ticker, bars) {
        Ok(series) => analyze(ticker, &series),
        Err(e) => {
            error!("Error analyzing stock {}: {}", ticker, e);
            AnalysisReport::message_only(format!("Error: {}", e))
        }
    }
}

fn run_section<T>(
    ticker: &str,
    section: &str,
    failures: &mut Vec<String>,
    compute: impl FnOnce() -> Result<T>,
) -> Option<T> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(compute))
        .unwrap_or_else(|payload| Err(GuideError::ComputationFailure(panic_message(payload))));

    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Error analyzing {} for {}: {}", section, ticker, e);
            failures.push(format!("{} failed: {}", section, e));
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{daily_series, rise_fall_flat, start_date};
    use rust_decimal_macros::dec;

    #[test]
    fn empty_series_reports_no_data_only() {
        let report = analyze("QQQ", &PriceSeries::empty("QQQ"));
        assert!(report.message.contains("No data"));
        assert!(report.is_empty());
    }

    #[test]
    fn full_report_for_rise_fall_flat() {
        let report = analyze("TEST", &rise_fall_flat());

        assert_eq!(report.message, SUCCESS_MESSAGE);
        let current = report.current_drawdown.as_ref().unwrap();
        assert_eq!(current.drawdown_percent, dec!(-25.00));

        let historical = report.historical_drawdowns.as_ref().unwrap();
        assert_eq!(historical.len(), 1);
        assert_eq!(historical[0].drawdown_percent, dec!(-25.00));

        assert_eq!(report.drawdown_level_analyses.as_ref().unwrap().len(), 7);
        assert!(report.one_year_chart.is_some());
        assert_eq!(report.data_start_date, Some(start_date()));
        assert_eq!(report.data_end_date.map(|d| d.to_string()).as_deref(), Some("2021-02-03"));
    }

    #[test]
    fn failing_section_keeps_the_others() {
        let report = analyze("ZERO", &daily_series(&[dec!(0); 80]));

        assert!(report.current_drawdown.is_none());
        assert!(report.historical_drawdowns.is_none());
        assert!(report.message.starts_with("Analysis completed with errors"));
        assert!(report.message.contains("current drawdown failed"));
        assert!(report.drawdown_level_analyses.is_some());
        assert!(report.one_year_chart.is_some());
        assert!(report.data_start_date.is_some());
    }

    #[test]
    fn unordered_bars_become_an_error_report() {
        let day = |d| chrono::NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let bars = vec![
            DailyBar::from_close(day(2), dec!(10)),
            DailyBar::from_close(day(1), dec!(11)),
        ];
        let report = analyze_bars("VOO", bars);

        assert!(report.message.starts_with("Error:"));
        assert!(report.is_empty());
    }

    #[test]
    fn panics_are_contained() {
        let mut failures = Vec::new();
        let value: Option<u8> = run_section("X", "boom", &mut failures, || panic!("kaboom"));
        assert!(value.is_none());
        assert_eq!(failures, vec!["boom failed: Computation failure: kaboom".to_string()]);
    }
}
