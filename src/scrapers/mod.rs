pub mod base;
pub mod csv_file;
pub mod investing;

pub use base::PriceSource;
pub use investing::InvestingScraper;
