use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Decline from the all-time-high close to the latest close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentDrawdown {
    pub ticker: String,
    pub current_price: Decimal,
    pub peak_price: Decimal,
    pub peak_date: NaiveDate,
    pub drawdown_percent: Decimal,
    pub days_since_peak: i64,
}

/// Return from a trough close measured `months` later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryPoint {
    pub months: u32,
    pub return_percent: Decimal,
}

/// Labeled close-price slice ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartWindow {
    pub labels: Vec<String>,
    pub prices: Vec<Decimal>,
    pub peak_price: Decimal,
    pub peak_date: String,
}

/// One historical peak-to-trough episode and what happened after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownEvent {
    pub start_date: NaiveDate,
    pub bottom_date: NaiveDate,
    pub drawdown_percent: Decimal,
    pub recovery_points: Vec<RecoveryPoint>,
    pub chart_window: Option<ChartWindow>,
}

impl DrawdownEvent {
    pub fn recovery_at(&self, months: u32) -> Option<&RecoveryPoint> {
        self.recovery_points.iter().find(|p| p.months == months)
    }
}

/// Mean return and loss count for one recovery horizon, taken over every case of a level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonAverage {
    pub months: u32,
    pub average_return: f64,
    pub loss_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRecoveryStats {
    pub horizons: Vec<HorizonAverage>,
}

impl AverageRecoveryStats {
    pub fn horizon(&self, months: u32) -> Option<&HorizonAverage> {
        self.horizons.iter().find(|h| h.months == months)
    }
}

/// Historical behaviour after declines of roughly `level` percent.
///
/// `average_stats` is `None` exactly when `total_cases == 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: i32,
    pub total_cases: usize,
    pub average_stats: Option<AverageRecoveryStats>,
    pub sample_events: Vec<DrawdownEvent>,
}

/// Everything known about one ticker. Absent fields mean the section was not computed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisReport {
    pub current_drawdown: Option<CurrentDrawdown>,
    pub historical_drawdowns: Option<Vec<DrawdownEvent>>,
    pub drawdown_level_analyses: Option<Vec<LevelSummary>>,
    pub one_year_chart: Option<ChartWindow>,
    pub data_start_date: Option<NaiveDate>,
    pub data_end_date: Option<NaiveDate>,
    pub message: String,
}

impl AnalysisReport {
    /// Report that carries only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn no_data(ticker: &str) -> Self {
        Self::message_only(format!("No data available for {}", ticker))
    }

    pub fn is_empty(&self) -> bool {
        self.current_drawdown.is_none()
            && self.historical_drawdowns.is_none()
            && self.drawdown_level_analyses.is_none()
            && self.one_year_chart.is_none()
            && self.data_start_date.is_none()
            && self.data_end_date.is_none()
    }
}
