pub mod codec;
pub mod progress;
pub mod scaler;
pub mod worker_pool;

pub use codec::{ImageCodec, PngCodec};
pub use progress::{estimate_eta, format_hms, Eta, ProgressReporter};
pub use scaler::{Downscaler, ScaleOutcome};
pub use worker_pool::{
    NoProgress, PoolReport, ProgressSink, Task, TaskFailure, TaskQueue, TaskQueueBuilder,
    WorkerPool,
};
