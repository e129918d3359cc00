pub mod error;
pub mod frame;
pub mod outcome;
pub mod partition;
pub mod seed;

pub use error::{EvalError, EvalResult};
pub use frame::Frame;
pub use outcome::{FailureNote, Prediction, ResampleResult};
pub use partition::{Partition, PartitionId};
pub use seed::stream_seed;
