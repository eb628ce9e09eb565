//! Fail-fast build runner: `pip install -r requirements.txt`, then `npm ci`
//! (falling back to `npm install`), then `npm run build:css`.

pub mod error;
pub mod exec;
pub mod fingerprint;
pub mod plan;
pub mod preflight;
pub mod runner;
pub mod tools;

pub use error::{RunError, StepFailure};
pub use exec::{CommandExecutor, ExitOutcome, Invocation, SystemExecutor};
pub use plan::{BuildPlan, Preflight, Step, StepId, StepKind};
pub use runner::{Phase, RunReport, Runner};
