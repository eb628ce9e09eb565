//! Locate `pip` and `npm`.
//!
//! An explicit override wins. Otherwise the tool is looked up on PATH; pip
//! falls back to `python3 -m pip` / `python -m pip`. When nothing is found the
//! bare name is kept so the spawn fails with the usual "not found" status.

use std::path::PathBuf;

use deploybuild_core::config::ToolsConfig;

/// Program plus leading arguments (e.g. `python3 -m pip`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub prefix_args: Vec<String>,
}

impl ToolCommand {
    pub fn bare(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Split an override such as `"python3.12 -m pip"` on whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut words = raw.split_whitespace().map(String::from);
        let program = words.next()?;
        Some(Self {
            program,
            prefix_args: words.collect(),
        })
    }

    /// Full argument vector: prefix args followed by `args`.
    pub fn args<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        self.prefix_args
            .iter()
            .cloned()
            .chain(args.into_iter().map(String::from))
            .collect()
    }
}

fn path_string(p: PathBuf) -> String {
    p.to_string_lossy().into_owned()
}

fn system_lookup(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve pip with a custom PATH lookup.
pub fn resolve_pip_with<F>(override_cmd: Option<&str>, lookup: F) -> ToolCommand
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(cmd) = override_cmd.and_then(ToolCommand::parse) {
        return cmd;
    }
    for name in ["pip", "pip3"] {
        if let Some(path) = lookup(name) {
            return ToolCommand::bare(path_string(path));
        }
    }
    for name in ["python3", "python"] {
        if let Some(path) = lookup(name) {
            return ToolCommand {
                program: path_string(path),
                prefix_args: vec!["-m".to_string(), "pip".to_string()],
            };
        }
    }
    tracing::warn!("pip not found on PATH");
    ToolCommand::bare("pip")
}

/// Resolve npm with a custom PATH lookup.
pub fn resolve_npm_with<F>(override_cmd: Option<&str>, lookup: F) -> ToolCommand
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(cmd) = override_cmd.and_then(ToolCommand::parse) {
        return cmd;
    }
    match lookup("npm") {
        Some(path) => ToolCommand::bare(path_string(path)),
        None => {
            tracing::warn!("npm not found on PATH");
            ToolCommand::bare("npm")
        }
    }
}

pub fn resolve_pip(tools: &ToolsConfig) -> ToolCommand {
    resolve_pip_with(tools.pip.as_deref(), system_lookup)
}

pub fn resolve_npm(tools: &ToolsConfig) -> ToolCommand {
    resolve_npm_with(tools.npm.as_deref(), system_lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(names: &'static [&'static str]) -> impl Fn(&str) -> Option<PathBuf> {
        move |name| {
            names
                .iter()
                .any(|n| *n == name)
                .then(|| PathBuf::from(format!("/usr/bin/{name}")))
        }
    }

    #[test]
    fn test_override_wins() {
        let cmd = resolve_pip_with(Some("python3.12 -m pip"), only(&["pip"]));
        assert_eq!(cmd.program, "python3.12");
        assert_eq!(cmd.args(["install"]), vec!["-m", "pip", "install"]);
    }

    #[test]
    fn test_pip_fallback_chain() {
        assert_eq!(
            resolve_pip_with(None, only(&["pip3", "python3"])).program,
            "/usr/bin/pip3"
        );

        let via_python = resolve_pip_with(None, only(&["python"]));
        assert_eq!(via_python.program, "/usr/bin/python");
        assert_eq!(via_python.prefix_args, vec!["-m", "pip"]);

        assert_eq!(resolve_pip_with(None, only(&[])), ToolCommand::bare("pip"));
    }

    #[test]
    fn test_npm_resolution() {
        assert_eq!(resolve_npm_with(None, only(&["npm"])).program, "/usr/bin/npm");
        assert_eq!(resolve_npm_with(None, only(&[])), ToolCommand::bare("npm"));
        assert_eq!(
            resolve_npm_with(Some("  "), only(&[])),
            ToolCommand::bare("npm")
        );
    }
}
