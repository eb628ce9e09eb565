//! Environment variable keys.
//!
//! Primary keys use the `DEPLOYBUILD_*` prefix; the tool overrides also accept
//! the bare `PIP` / `NPM` names commonly exported by CI images.

/// Prefix shared by every primary key; also the `.env` import filter.
pub const PREFIX: &str = "DEPLOYBUILD_";

/// Working directory and input file names
pub mod paths {
    pub const DEPLOYBUILD_WORKDIR: &str = "DEPLOYBUILD_WORKDIR";

    pub const DEPLOYBUILD_REQUIREMENTS: &str = "DEPLOYBUILD_REQUIREMENTS";

    pub const DEPLOYBUILD_CSS_TASK: &str = "DEPLOYBUILD_CSS_TASK";

    /// Compiled style sheet checked after the build task (optional)
    pub const DEPLOYBUILD_CSS_OUTPUT: &str = "DEPLOYBUILD_CSS_OUTPUT";
}

/// External tool overrides
pub mod tools {
    pub const DEPLOYBUILD_PIP: &str = "DEPLOYBUILD_PIP";
    pub const PIP_ALIASES: &[&str] = &["PIP"];

    pub const DEPLOYBUILD_NPM: &str = "DEPLOYBUILD_NPM";
    pub const NPM_ALIASES: &[&str] = &["NPM"];
}

/// Logging and audit
pub mod observability {
    pub const DEPLOYBUILD_QUIET: &str = "DEPLOYBUILD_QUIET";

    pub const DEPLOYBUILD_LOG_LEVEL: &str = "DEPLOYBUILD_LOG_LEVEL";

    pub const DEPLOYBUILD_LOG_JSON: &str = "DEPLOYBUILD_LOG_JSON";

    pub const DEPLOYBUILD_AUDIT_LOG: &str = "DEPLOYBUILD_AUDIT_LOG";
}
