use crate::pipeline::logging::format_duration;
use crate::result::Result;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use smol_str::SmolStr;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed { reason: String },
}

/// What remains of a step after it ran: its name, timing and outcome.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: SmolStr,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn succeeded(&self) -> bool {
        self.outcome == StepOutcome::Succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed { step: SmolStr, reason: String },
}

/** Summary of one pipeline run
 *
 * # Contents
 * - Wall-clock start of the run
 * - Executed steps in order, ending at the first failure if any
 * - Total duration and terminal status
 *
 * # Serialization
 * Written as JSON by `stepbuild build --report <file>`; durations are
 * milliseconds.
 */
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Local>,
    pub steps: Vec<StepRecord>,
    #[serde(rename = "total_ms", serialize_with = "as_millis")]
    pub total: Duration,
    #[serde(flatten)]
    pub status: RunStatus,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn failed_step(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Succeeded => None,
            RunStatus::Failed { step, .. } => Some(step.as_str()),
        }
    }

    /// 0 on success, 1 on any step failure.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    pub fn summary(&self) -> String {
        match &self.status {
            RunStatus::Succeeded => format!(
                "pipeline succeeded, {} steps, duration {}",
                self.steps.len(),
                format_duration(self.total)
            ),
            RunStatus::Failed { step, .. } => format!(
                "pipeline stopped at step {}, duration {}",
                step,
                format_duration(self.total)
            ),
        }
    }

    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        Ok(())
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
}
