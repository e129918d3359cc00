pub mod collector;
pub mod regression;

pub use collector::{collect, failures, summarize, write_raw_csv, write_summary_csv, MetricRow, MetricSummary};
pub use regression::{Mae, RSquared, Rmse};
