//! Fail-fast step runner and its dual-sink run log.

pub mod logging;
pub mod report;
pub mod runner;
pub mod step;

pub use logging::{format_duration, Level, LogEntry, RunLog};
pub use report::{PipelineReport, RunStatus, StepOutcome, StepRecord};
pub use runner::{execute_step, Pipeline, PipelineContext};
pub use step::{Step, StepFuture};
