//! Sequential fail-fast runner.
//!
//! States: `Step(i)` for each planned step, then `Succeeded` or `Failed`.
//! A step moves to the next on success; once its attempts are exhausted the
//! run moves to `Failed` and nothing after it executes.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use deploybuild_core::observability::AuditLog;

use crate::error::{RunError, StepFailure};
use crate::exec::{CommandExecutor, ExitOutcome, Invocation};
use crate::fingerprint::fingerprint_inputs;
use crate::plan::{BuildPlan, Step, StepId};
use crate::preflight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Step(usize),
    Succeeded,
    Failed,
}

impl Phase {
    pub fn start(total_steps: usize) -> Self {
        if total_steps == 0 {
            Self::Succeeded
        } else {
            Self::Step(0)
        }
    }

    /// Transition after the current step finished (`ok`) or exhausted its attempts.
    pub fn advance(self, ok: bool, total_steps: usize) -> Self {
        match self {
            Self::Step(_) if !ok => Self::Failed,
            Self::Step(i) if i + 1 >= total_steps => Self::Succeeded,
            Self::Step(i) => Self::Step(i + 1),
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Step(_))
    }
}

/// One spawned command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub command: String,
    /// `None` when the process could not be started.
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub id: StepId,
    pub attempts: Vec<AttemptReport>,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub phase: Phase,
    pub duration: Duration,
}

impl RunReport {
    /// Total number of commands spawned (or attempted) across all steps.
    pub fn command_count(&self) -> usize {
        self.steps.iter().map(|s| s.attempts.len()).sum()
    }
}

/// Modification time of `path`, `None` when it does not exist.
fn artifact_stamp(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

pub struct Runner<'a, E: CommandExecutor> {
    plan: &'a BuildPlan,
    executor: &'a E,
    audit: AuditLog,
}

impl<'a, E: CommandExecutor> Runner<'a, E> {
    /// Runner auditing to DEPLOYBUILD_AUDIT_LOG, if set.
    pub fn new(plan: &'a BuildPlan, executor: &'a E) -> Self {
        Self {
            plan,
            executor,
            audit: AuditLog::from_env(),
        }
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Run every step in order, stopping at the first exhausted failure.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let total = self.plan.steps.len();
        self.audit.run_started(
            &self.plan.workdir,
            &fingerprint_inputs(&self.plan.inputs),
        );
        tracing::info!(workdir = %self.plan.workdir.display(), steps = total, "Build start");

        let mut steps = Vec::with_capacity(total);
        let mut phase = Phase::start(total);
        while let Phase::Step(index) = phase {
            let step = &self.plan.steps[index];
            let mut report = StepReport {
                id: step.id,
                attempts: Vec::new(),
            };
            let result = self.run_step(step, &mut report);
            steps.push(report);
            phase = phase.advance(result.is_ok(), total);

            if let Err(failure) = result {
                let err = step.error(failure);
                self.audit.run_finished(
                    false,
                    err.exit_code(),
                    started.elapsed().as_millis() as u64,
                );
                return Err(err);
            }
        }

        let duration = started.elapsed();
        self.audit.run_finished(true, 0, duration.as_millis() as u64);
        tracing::info!(duration_ms = duration.as_millis() as u64, "Build succeeded");
        Ok(RunReport {
            steps,
            phase,
            duration,
        })
    }

    fn run_step(&self, step: &Step, report: &mut StepReport) -> Result<(), StepFailure> {
        preflight::check(&step.preflight)?;
        // The artifact must be written by this run, not left from an earlier one.
        let stamp_before = step.artifact.as_deref().and_then(artifact_stamp);

        let mut last_failure = None;
        for (attempt_no, invocation) in step.attempts.iter().enumerate() {
            if attempt_no > 0 {
                tracing::warn!(step = %step.id, command = %invocation, "Falling back");
            } else {
                tracing::info!(step = %step.id, command = %invocation, "Step start");
            }

            match self.attempt(step.id, attempt_no, invocation, report) {
                Ok(()) => {
                    return match step.artifact {
                        Some(ref artifact) => {
                            let stamp_after = artifact_stamp(artifact);
                            if stamp_after.is_none() || stamp_after == stamp_before {
                                Err(StepFailure::ArtifactMissing(artifact.clone()))
                            } else {
                                Ok(())
                            }
                        }
                        None => Ok(()),
                    };
                }
                Err(failure) => {
                    tracing::warn!(step = %step.id, "{}", failure);
                    last_failure = Some(failure);
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| StepFailure::Exited {
            command: step.id.to_string(),
            code: crate::error::EXIT_PREFLIGHT_FAILED,
        }))
    }

    fn attempt(
        &self,
        step: StepId,
        attempt_no: usize,
        invocation: &Invocation,
        report: &mut StepReport,
    ) -> Result<(), StepFailure> {
        let started = Instant::now();
        let result = self.executor.execute(invocation, &self.plan.workdir);
        let duration = started.elapsed();
        let command = invocation.to_string();

        let exit_code = result.as_ref().ok().map(|o: &ExitOutcome| o.code());
        self.audit.step_attempt(
            step.as_str(),
            attempt_no,
            &command,
            exit_code,
            duration.as_millis() as u64,
        );
        report.attempts.push(AttemptReport {
            command: command.clone(),
            exit_code,
            duration,
        });

        match result {
            Ok(outcome) if outcome.success() => Ok(()),
            Ok(outcome) => Err(StepFailure::Exited {
                command,
                code: outcome.code(),
            }),
            Err(e) => Err(StepFailure::Spawn {
                program: invocation.program.clone(),
                message: e.to_string(),
            }),
        }
    }
}
