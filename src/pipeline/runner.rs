use crate::pipeline::logging::{format_duration, RunLog};
use crate::pipeline::report::{PipelineReport, RunStatus, StepOutcome, StepRecord};
use crate::pipeline::step::{Step, StepFuture};
use chrono::Local;
use smol_str::SmolStr;
use std::time::Instant;

/// Anything a pipeline can run against. Steps receive the same context.
pub trait PipelineContext {
    fn log(&self) -> &RunLog;
}

/** Ordered, fail-fast list of steps
 *
 * # Execution Model
 * - Steps run one after another on the calling task, each awaited to
 *   completion before the next starts
 * - The first failing step ends the run; later steps are dropped unrun
 * - Nothing is retried and nothing is rolled back
 *
 * # Example
 * ```ignore
 * let report = Pipeline::new()
 *     .step("check environment", |ctx| Box::pin(check_environment(ctx)))
 *     .step("compile", |ctx| Box::pin(compile(ctx)))
 *     .run(&ctx)
 *     .await;
 * std::process::exit(report.exit_code());
 * ```
 */
pub struct Pipeline<'a, C: 'a> {
    steps: Vec<Step<'a, C>>,
}

impl<'a, C: 'a> Default for Pipeline<'a, C> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<'a, C: PipelineContext + 'a> Pipeline<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step<F>(mut self, name: impl Into<SmolStr>, action: F) -> Self
    where
        F: FnOnce(&'a C) -> StepFuture<'a> + 'a,
    {
        self.steps.push(Step::new(name, action));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name().as_str()).collect()
    }

    pub async fn run(self, ctx: &'a C) -> PipelineReport {
        let started_at = Local::now();
        let clock = Instant::now();
        let mut steps = Vec::with_capacity(self.steps.len());
        let mut status = RunStatus::Succeeded;

        log::debug!("Running pipeline with {} steps", self.steps.len());

        for step in self.steps {
            let record = execute_step(ctx, step).await;

            if let StepOutcome::Failed { reason } = &record.outcome {
                status = RunStatus::Failed {
                    step: record.name.clone(),
                    reason: reason.clone(),
                };
                steps.push(record);
                break;
            }

            steps.push(record);
        }

        PipelineReport {
            started_at,
            steps,
            total: clock.elapsed(),
            status,
        }
    }
}

/** Runs a single step and logs its start and outcome
 *
 * # Log Entries
 * - INFO `started step <name>` before the action runs
 * - INFO `step <name> succeeded, duration HH:MM:SS` on success
 * - WARN `<name>: <cause>` followed by ERROR `step <name> failed, duration
 *   HH:MM:SS` on failure
 */
pub async fn execute_step<'a, C: PipelineContext + 'a>(ctx: &'a C, step: Step<'a, C>) -> StepRecord {
    let log = ctx.log();
    let name = step.name().clone();

    log.info(format!("started step {}", name));
    let start = Instant::now();
    let result = step.run(ctx).await;
    let duration = start.elapsed();

    match result {
        Ok(()) => {
            log.info(format!(
                "step {} succeeded, duration {}",
                name,
                format_duration(duration)
            ));
            StepRecord {
                name,
                duration,
                outcome: StepOutcome::Succeeded,
            }
        }
        Err(e) => {
            log.warn(format!("{}: {}", name, e));
            log.error(format!(
                "step {} failed, duration {}",
                name,
                format_duration(duration)
            ));
            StepRecord {
                name,
                duration,
                outcome: StepOutcome::Failed {
                    reason: e.to_string(),
                },
            }
        }
    }
}
