use clap::Parser;
use std::path::PathBuf;

/// Install Python and Node dependencies, then compile the Tailwind style sheet.
///
/// Runs `pip install -r requirements.txt`, `npm ci` (falling back to
/// `npm install`) and `npm run build:css` in order, stopping at the first
/// failure and exiting with that tool's status.
#[derive(Parser, Debug)]
#[command(name = "deploybuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (default: current directory)
    #[arg(short = 'C', long = "dir", value_name = "DIR", env = "DEPLOYBUILD_WORKDIR")]
    pub dir: Option<PathBuf>,

    /// Print the resolved commands without running them
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_a_full_run() {
        let cli = Cli::try_parse_from(["deploybuild"]).unwrap();
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_dir_and_dry_run() {
        let cli = Cli::try_parse_from(["deploybuild", "-C", "/srv/app", "--dry-run"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/srv/app")));
        assert!(cli.dry_run);
    }
}
