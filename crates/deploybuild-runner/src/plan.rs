//! The build plan: three fixed steps, each with a preflight check and one or
//! more attempts (primary command first, fallbacks after).

use std::fmt;
use std::path::PathBuf;

use deploybuild_core::config::RunnerConfig;

use crate::error::{RunError, StepFailure};
use crate::exec::Invocation;
use crate::tools::{self, ToolCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    /// `pip install -r requirements.txt`
    PythonDeps,
    /// `npm ci`, falling back to `npm install`
    NodeDeps,
    /// `npm run build:css`
    BuildCss,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PythonDeps => "python-deps",
            Self::NodeDeps => "node-deps",
            Self::BuildCss => "build-css",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects which error class a failed step reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    DependencyInstall,
    BuildTask { task: String },
}

/// Checked before the first attempt of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    None,
    RequireFile(PathBuf),
    RequireNpmScript { manifest: PathBuf, script: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    pub kind: StepKind,
    pub preflight: Preflight,
    /// Primary command first; later entries run only if the previous one failed.
    pub attempts: Vec<Invocation>,
    /// File that must exist once the step succeeds.
    pub artifact: Option<PathBuf>,
}

impl Step {
    /// Wrap a failure in the error class of this step.
    pub fn error(&self, failure: StepFailure) -> RunError {
        match &self.kind {
            StepKind::DependencyInstall => RunError::DependencyInstall {
                step: self.id,
                failure,
            },
            StepKind::BuildTask { task } => RunError::BuildTask {
                task: task.clone(),
                failure,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub workdir: PathBuf,
    pub steps: Vec<Step>,
    /// Manifests fingerprinted into the audit log.
    pub inputs: Vec<PathBuf>,
}

impl BuildPlan {
    /// Resolve tools from the config (override or PATH) and build the plan.
    pub fn resolve(cfg: &RunnerConfig) -> Self {
        let pip = tools::resolve_pip(&cfg.tools);
        let npm = tools::resolve_npm(&cfg.tools);
        Self::standard(cfg, &pip, &npm)
    }

    /// The fixed three-step sequence.
    pub fn standard(cfg: &RunnerConfig, pip: &ToolCommand, npm: &ToolCommand) -> Self {
        let requirements = cfg.requirements_path();
        let package_json = cfg.package_json_path();
        let requirements_arg = cfg.requirements.to_string_lossy().into_owned();

        let python_deps = Step {
            id: StepId::PythonDeps,
            kind: StepKind::DependencyInstall,
            preflight: Preflight::RequireFile(requirements.clone()),
            attempts: vec![Invocation::new(
                pip.program.clone(),
                pip.args(["install", "-r", requirements_arg.as_str()]),
            )],
            artifact: None,
        };

        let node_deps = Step {
            id: StepId::NodeDeps,
            kind: StepKind::DependencyInstall,
            preflight: Preflight::None,
            attempts: vec![
                Invocation::new(npm.program.clone(), npm.args(["ci"])),
                Invocation::new(npm.program.clone(), npm.args(["install"])),
            ],
            artifact: None,
        };

        let build_css = Step {
            id: StepId::BuildCss,
            kind: StepKind::BuildTask {
                task: cfg.css_task.clone(),
            },
            preflight: Preflight::RequireNpmScript {
                manifest: package_json.clone(),
                script: cfg.css_task.clone(),
            },
            attempts: vec![Invocation::new(
                npm.program.clone(),
                npm.args(["run", cfg.css_task.as_str()]),
            )],
            artifact: cfg.css_output.as_deref().map(|p| cfg.in_workdir(p)),
        };

        Self {
            workdir: cfg.workdir.clone(),
            steps: vec![python_deps, node_deps, build_css],
            inputs: vec![requirements, package_json, cfg.package_lock_path()],
        }
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workdir: {}", self.workdir.display())?;
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {}", index + 1, step.id)?;
            for (n, attempt) in step.attempts.iter().enumerate() {
                let label = if n == 0 { "run" } else { "else" };
                writeln!(f, "   {label}: {attempt}")?;
            }
            if let Some(ref artifact) = step.artifact {
                writeln!(f, "   expect: {}", artifact.display())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> BuildPlan {
        let cfg = RunnerConfig::new("/srv/app");
        BuildPlan::standard(&cfg, &ToolCommand::bare("pip"), &ToolCommand::bare("npm"))
    }

    #[test]
    fn test_standard_plan_order_and_commands() {
        let plan = plan();
        let ids: Vec<StepId> = plan.steps.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![StepId::PythonDeps, StepId::NodeDeps, StepId::BuildCss]
        );

        let lines: Vec<Vec<String>> = plan
            .steps
            .iter()
            .map(|s| s.attempts.iter().map(ToString::to_string).collect())
            .collect();
        assert_eq!(lines[0], vec!["pip install -r requirements.txt"]);
        assert_eq!(lines[1], vec!["npm ci", "npm install"]);
        assert_eq!(lines[2], vec!["npm run build:css"]);
    }

    #[test]
    fn test_step_error_class() {
        let plan = plan();
        let failure = StepFailure::Exited {
            command: "x".into(),
            code: 1,
        };
        assert!(matches!(
            plan.steps[1].error(failure.clone()),
            RunError::DependencyInstall {
                step: StepId::NodeDeps,
                ..
            }
        ));
        assert!(matches!(
            plan.steps[2].error(failure),
            RunError::BuildTask { ref task, .. } if task == "build:css"
        ));
    }

    #[test]
    fn test_css_output_becomes_artifact() {
        let mut cfg = RunnerConfig::new("/srv/app");
        cfg.css_output = Some(PathBuf::from("app/static/css/output.css"));
        let npm = ToolCommand::parse("npx --yes npm").unwrap();
        let plan = BuildPlan::standard(&cfg, &ToolCommand::bare("pip"), &npm);

        assert_eq!(
            plan.steps[2].artifact,
            Some(PathBuf::from("/srv/app/app/static/css/output.css"))
        );
        assert_eq!(
            plan.steps[2].attempts[0].to_string(),
            "npx --yes npm run build:css"
        );
        assert!(plan.to_string().contains("   else: npx --yes npm install"));
    }
}
