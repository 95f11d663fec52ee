use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{GuideError, Result};

/// Half-up rounding (ties away from zero) to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Percent change from `from` to `to`, two decimal places.
///
/// The ratio is rounded half-up to four places before scaling, which equals
/// rounding the percentage to two places. `None` when `from` is zero.
pub fn percent_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    let ratio = (to - from).checked_div(from)?;
    let percent = round_half_up(ratio, 4) * Decimal::ONE_HUNDRED;
    Some(round_half_up(percent, 2))
}

/// Rounds to the nearest cent, ties toward positive infinity.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

// 日历月运算，月末日期按目标月份最后一天截断
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn sub_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(months))
}

/// Signed calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// 日期转换工具
pub fn parse_iso_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(GuideError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_change_rounds_half_up() {
        // 12.5 / 80 = 0.15625
        assert_eq!(percent_change(dec!(80), dec!(92.5)), Some(dec!(15.63)));
        // -0.15625 rounds away from zero
        assert_eq!(percent_change(dec!(80), dec!(67.5)), Some(dec!(-15.63)));
        assert_eq!(percent_change(dec!(200), dec!(150)), Some(dec!(-25.00)));
    }

    #[test]
    fn percent_change_from_zero_is_none() {
        assert_eq!(percent_change(Decimal::ZERO, dec!(5)), None);
    }

    #[test]
    fn rounding_is_idempotent() {
        for value in [dec!(15.63), dec!(-0.05), dec!(99.995), dec!(-12.345)] {
            let once = round_half_up(value, 2);
            assert_eq!(round_half_up(once, 2), once);
        }
        for value in [1.005_f64, -2.675, 33.333_333, -0.004] {
            let once = round_cents(value);
            assert_eq!(round_cents(once), once);
        }
    }

    #[test]
    fn round_cents_ties_go_up() {
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.12);
        assert_eq!(round_cents(4.0), 4.0);
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(add_months(jan31, 1), NaiveDate::from_ymd_opt(2023, 2, 28));
        let may31 = NaiveDate::from_ymd_opt(2023, 5, 31).unwrap();
        assert_eq!(sub_months(may31, 3), NaiveDate::from_ymd_opt(2023, 2, 28));
    }

    #[test]
    fn parses_trimmed_iso_dates() {
        assert_eq!(
            parse_iso_date(" 2025-11-14 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 14).unwrap()
        );
        assert!(parse_iso_date("14/11/2025").is_err());
    }
}
