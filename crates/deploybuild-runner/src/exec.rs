//! CommandExecutor trait: the seam between the runner and real processes.
//!
//! `SystemExecutor` spawns the tool with inherited stdio and blocks until it
//! exits. Tests substitute a scripted executor.

use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// One external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && !word.contains(char::is_whitespace) && !word.contains('\'') {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Exit status of a finished command, normalised to a shell-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(i32);

impl ExitOutcome {
    pub const SUCCESS: Self = Self(0);

    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn success(self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self(128 + signal);
            }
        }
        Self(1)
    }
}

/// Runs one invocation to completion.
pub trait CommandExecutor {
    /// Spawn `invocation` in `cwd` and wait for it. `Err` means the process
    /// could not be started at all.
    fn execute(&self, invocation: &Invocation, cwd: &Path) -> std::io::Result<ExitOutcome>;
}

/// Spawns real processes, inheriting stdin/stdout/stderr and the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, invocation: &Invocation, cwd: &Path) -> std::io::Result<ExitOutcome> {
        tracing::debug!(command = %invocation, cwd = %cwd.display(), "spawn");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(cwd)
            .status()?;
        Ok(status.into())
    }
}
