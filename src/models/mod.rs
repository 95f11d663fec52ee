pub mod analysis;
pub mod stock;

pub use analysis::{
    AnalysisReport, AverageRecoveryStats, ChartWindow, CurrentDrawdown, DrawdownEvent,
    HorizonAverage, LevelSummary, RecoveryPoint,
};
pub use stock::{DailyBar, PriceSeries};
