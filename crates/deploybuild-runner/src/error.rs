//! Run errors: the two failure classes plus the concrete cause of a step failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::plan::StepId;

/// Exit code used when a tool cannot be started (shell "command not found").
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Exit code for failures detected before any tool ran.
pub const EXIT_PREFLIGHT_FAILED: i32 = 1;

/// Why a single step failed after all of its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    #[error("required input '{}' is missing", .0.display())]
    MissingInput(PathBuf),

    #[error("'{}' is not valid JSON: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("script '{script}' is not defined in '{}'", .manifest.display())]
    TaskUndefined { script: String, manifest: PathBuf },

    #[error("'{command}' exited with status {code}")]
    Exited { command: String, code: i32 },

    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("expected artifact '{}' was not written by the build task", .0.display())]
    ArtifactMissing(PathBuf),
}

impl StepFailure {
    /// Process exit status this failure surfaces to the caller.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exited { code, .. } => *code,
            Self::Spawn { .. } => EXIT_SPAWN_FAILED,
            Self::MissingInput(_)
            | Self::InvalidManifest { .. }
            | Self::TaskUndefined { .. }
            | Self::ArtifactMissing(_) => EXIT_PREFLIGHT_FAILED,
        }
    }
}

/// Errors that abort a build run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("dependency install failed ({step}): {failure}")]
    DependencyInstall { step: StepId, failure: StepFailure },

    #[error("build task '{task}' failed: {failure}")]
    BuildTask { task: String, failure: StepFailure },
}

impl RunError {
    pub fn failure(&self) -> &StepFailure {
        match self {
            Self::DependencyInstall { failure, .. } | Self::BuildTask { failure, .. } => failure,
        }
    }

    /// Non-zero exit status for the whole run.
    pub fn exit_code(&self) -> i32 {
        match self.failure().exit_code() {
            0 => EXIT_PREFLIGHT_FAILED,
            code => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_propagates_tool_status() {
        let err = RunError::DependencyInstall {
            step: StepId::PythonDeps,
            failure: StepFailure::Exited {
                command: "pip install -r requirements.txt".into(),
                code: 2,
            },
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_spawn_and_preflight() {
        let spawn = RunError::BuildTask {
            task: "build:css".into(),
            failure: StepFailure::Spawn {
                program: "npm".into(),
                message: "No such file or directory".into(),
            },
        };
        assert_eq!(spawn.exit_code(), 127);

        let missing = RunError::DependencyInstall {
            step: StepId::PythonDeps,
            failure: StepFailure::MissingInput(PathBuf::from("requirements.txt")),
        };
        assert_eq!(missing.exit_code(), 1);
        assert_eq!(
            missing.to_string(),
            "dependency install failed (python-deps): required input 'requirements.txt' is missing"
        );
    }
}
