// 公开导出的模块，供外部使用
pub mod analysis;
pub mod models;
pub mod data_provider;
pub mod errors;

// 命令行程序使用的模块
// 在库使用场景中，通常只需要 analysis 和 models
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use analysis::{analyze, analyze_bars};
pub use models::{AnalysisReport, DailyBar, PriceSeries};
pub use data_provider::{JsonSeriesStore, SeriesStore};
pub use errors::{Result, GuideError};
