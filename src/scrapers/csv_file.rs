//! Investing.com CSV exports.
//!
//! Column order is `Date, Price, Open, High, Low, Vol., Change %`, where
//! `Price` is the close.

use crate::errors::{GuideError, Result};
use crate::models::stock::DailyBar;
use crate::util;
use log::{info, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub fn read_csv_file(path: &Path) -> Result<Vec<DailyBar>> {
    info!("Reading {}", path.display());
    let file = File::open(path)?;
    parse_csv(file)
}

/// Parses every row it can; bad rows are logged and skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<DailyBar>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable row: {}", e);
                continue;
            }
        };
        match parse_record(&record) {
            Ok(bar) => bars.push(bar),
            Err(e) => warn!("Skipping row {:?}: {}", record, e),
        }
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        info!("Parsed {} records (from {} to {})", bars.len(), first.date, last.date);
    }
    Ok(bars)
}

fn parse_record(record: &csv::StringRecord) -> Result<DailyBar> {
    let field = |i: usize| {
        record
            .get(i)
            .ok_or_else(|| GuideError::DataError(format!("missing column {}", i)))
    };

    Ok(DailyBar {
        date: parse_date(field(0)?)?,
        close: parse_price(field(1)?)?,
        open: parse_price(field(2)?)?,
        high: parse_price(field(3)?)?,
        low: parse_price(field(4)?)?,
        volume: parse_volume(field(5)?)?,
    })
}

// "2025- 11- 14" -> 2025-11-14
fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
        .collect();
    util::parse_iso_date(&compact)
}

fn parse_price(value: &str) -> Result<Decimal> {
    let cleaned = value.replace(',', "");
    let price = Decimal::from_str(cleaned.trim())
        .map_err(|e| GuideError::DataError(format!("Invalid price {:?}: {}", value, e)))?;
    Ok(util::round_half_up(price, 2))
}

/// Expands K/M/B suffixes: "80.09M" -> 80090000.
pub fn parse_volume(value: &str) -> Result<u64> {
    let cleaned = value.trim().to_uppercase().replace(',', "");
    let (number, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], Decimal::ONE_THOUSAND),
        Some('M') => (&cleaned[..cleaned.len() - 1], Decimal::from(1_000_000u64)),
        Some('B') => (&cleaned[..cleaned.len() - 1], Decimal::from(1_000_000_000u64)),
        _ => (cleaned.as_str(), Decimal::ONE),
    };

    let invalid = || GuideError::DataError(format!("Invalid volume {:?}", value));
    let amount = Decimal::from_str(number)
        .map_err(|_| invalid())?
        .checked_mul(multiplier)
        .ok_or_else(invalid)?;
    amount.trunc().to_u64().ok_or_else(invalid)
}
