pub mod executor;
pub mod options;
pub mod parallel;
pub mod traits;

pub use executor::run;
pub use options::{CancelToken, RunOptions};
pub use parallel::{run_with_workers, Parallelism};
pub use traits::{BoxError, Estimator, Extract, Metric};
