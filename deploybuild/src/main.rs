mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use deploybuild_core::config::{self, RunnerConfig};
use deploybuild_core::observability;
use deploybuild_runner::{BuildPlan, RunError, Runner, SystemExecutor};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<RunError>() {
                Some(run_err) => run_err.exit_code(),
                None => 1,
            };
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status_byte(code))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let workdir = config::resolve_workdir(cli.dir.as_deref())?;
    // .env must be loaded before logging reads its settings
    let loaded = config::load_dotenv_from_dir(&workdir);
    observability::init_tracing();
    tracing::debug!(loaded, dir = %workdir.display(), "Loaded .env");

    let workdir = workdir
        .canonicalize()
        .with_context(|| format!("Resolve working directory {}", workdir.display()))?;
    let cfg = RunnerConfig::from_env(workdir);
    let plan = BuildPlan::resolve(&cfg);

    if cli.dry_run {
        print!("{plan}");
        return Ok(());
    }

    let report = Runner::new(&plan, &SystemExecutor).run()?;
    tracing::debug!(commands = report.command_count(), "Run report");
    Ok(())
}

/// Map a shell-style status onto a process exit byte; failures never map to 0.
fn exit_status_byte(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(0) | Err(_) => 1,
        Ok(b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_byte() {
        assert_eq!(exit_status_byte(2), 2);
        assert_eq!(exit_status_byte(127), 127);
        assert_eq!(exit_status_byte(0), 1);
        assert_eq!(exit_status_byte(-1), 1);
        assert_eq!(exit_status_byte(300), 1);
    }

    #[test]
    fn test_dry_run_spawns_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            dir: Some(tmp.path().to_path_buf()),
            dry_run: true,
        };
        // No requirements.txt or package.json: a real run would fail preflight.
        run(cli).unwrap();
    }
}
