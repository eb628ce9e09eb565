//! Structured configs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, paths, tools};
use super::loader::{env_bool, env_optional, env_or};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";
pub const DEFAULT_CSS_TASK: &str = "build:css";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("working directory '{0}' does not exist or is not a directory")]
    WorkdirMissing(PathBuf),

    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Resolve the working directory: CLI flag, then `DEPLOYBUILD_WORKDIR`, then cwd.
pub fn resolve_workdir(cli_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let dir = match cli_dir {
        Some(d) => d.to_path_buf(),
        None => match env_optional(paths::DEPLOYBUILD_WORKDIR, &[]) {
            Some(d) => PathBuf::from(d),
            None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        },
    };
    if !dir.is_dir() {
        return Err(ConfigError::WorkdirMissing(dir));
    }
    Ok(dir)
}

/// External tool overrides. `None` means resolve from PATH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolsConfig {
    pub pip: Option<String>,
    pub npm: Option<String>,
}

impl ToolsConfig {
    pub fn from_env() -> Self {
        Self {
            pip: env_optional(tools::DEPLOYBUILD_PIP, tools::PIP_ALIASES),
            npm: env_optional(tools::DEPLOYBUILD_NPM, tools::NPM_ALIASES),
        }
    }
}

/// Inputs of one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub workdir: PathBuf,
    /// Python manifest, relative to `workdir` unless absolute
    pub requirements: PathBuf,
    /// npm script that compiles the style sheet
    pub css_task: String,
    /// Artifact expected after the build task, if configured
    pub css_output: Option<PathBuf>,
    pub tools: ToolsConfig,
}

impl RunnerConfig {
    /// Defaults for `workdir` with no environment overrides applied.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            requirements: PathBuf::from(DEFAULT_REQUIREMENTS),
            css_task: DEFAULT_CSS_TASK.to_string(),
            css_output: None,
            tools: ToolsConfig::default(),
        }
    }

    pub fn from_env(workdir: impl Into<PathBuf>) -> Self {
        Self {
            requirements: PathBuf::from(env_or(paths::DEPLOYBUILD_REQUIREMENTS, &[], || {
                DEFAULT_REQUIREMENTS.to_string()
            })),
            css_task: env_or(paths::DEPLOYBUILD_CSS_TASK, &[], || {
                DEFAULT_CSS_TASK.to_string()
            }),
            css_output: env_optional(paths::DEPLOYBUILD_CSS_OUTPUT, &[]).map(PathBuf::from),
            tools: ToolsConfig::from_env(),
            ..Self::new(workdir)
        }
    }

    /// Absolute path of a workdir-relative input.
    pub fn in_workdir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        }
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.in_workdir(&self.requirements)
    }

    pub fn package_json_path(&self) -> PathBuf {
        self.workdir.join("package.json")
    }

    pub fn package_lock_path(&self) -> PathBuf {
        self.workdir.join("package-lock.json")
    }
}

/// Logging and audit settings
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            quiet: env_bool(obv_keys::DEPLOYBUILD_QUIET, &[], false),
            log_level: env_or(obv_keys::DEPLOYBUILD_LOG_LEVEL, &[], || {
                "deploybuild=info".to_string()
            }),
            log_json: env_bool(obv_keys::DEPLOYBUILD_LOG_JSON, &[], false),
            audit_log: env_optional(obv_keys::DEPLOYBUILD_AUDIT_LOG, &[]),
        })
    }
}
