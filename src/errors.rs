use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("No data available for {0}")]
    EmptySeries(String),

    #[error("Series for {ticker} is not strictly ordered by date at {date}")]
    UnorderedSeries { ticker: String, date: NaiveDate },

    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Price source error: {0}")]
    SourceError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, GuideError>;

// 用于从字符串创建错误
impl From<String> for GuideError {
    fn from(s: String) -> Self {
        GuideError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for GuideError {
    fn from(s: &str) -> Self {
        GuideError::Unknown(s.to_string())
    }
}
