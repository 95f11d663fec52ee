//! Drawdown discovery and recovery statistics.
//!
//! Everything in here is pure: it reads a [`PriceSeries`](crate::models::PriceSeries)
//! and returns value objects. No I/O, no shared state.

pub mod chart;
pub mod current;
pub mod levels;
pub mod matcher;
pub mod orchestrator;
pub mod recovery;
pub mod scanner;

use rust_decimal::Decimal;

/// Bars on each side of a candidate peak that must not close higher.
pub const PEAK_WINDOW: usize = 30;
/// Exclusive bound, in bars after the peak, of the trough search.
pub const TROUGH_SEARCH_BARS: usize = 180;
/// Months after a trough at which the return is measured.
pub const RECOVERY_HORIZONS: [u32; 5] = [1, 3, 6, 12, 24];
/// How far a bar may sit from a horizon's target date and still count.
pub const MAX_HORIZON_DRIFT_DAYS: i64 = 15;
/// Fixed decline levels summarised for every ticker, in percent.
pub const DRAWDOWN_LEVELS: [i32; 7] = [-10, -15, -20, -25, -30, -35, -40];
pub const LEVEL_TOLERANCE: Decimal = Decimal::ONE;
pub const CURRENT_MATCH_TOLERANCE: Decimal = Decimal::TWO;
pub const SAMPLE_EVENT_LIMIT: usize = 10;
pub const CHART_MONTHS_BEFORE_PEAK: u32 = 3;
pub const CHART_MONTHS_AFTER_TROUGH: u32 = 12;
pub const TRAILING_WINDOW_DAYS: u64 = 365;

pub use chart::{event_window, trailing_window};
pub use current::current_drawdown;
pub use levels::analyze_levels;
pub use matcher::find_matching_drawdowns;
pub use orchestrator::{analyze, analyze_bars};
pub use recovery::project_recovery;
pub use scanner::{scan_episodes, Episode};
