//! Environment variable loading
//!
//! Keeps the primary/alias fallback chain in one place so call sites never
//! repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, surrounding quotes are stripped
/// and an unquoted trailing `# comment` is dropped.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Whether a `.env` key belongs to the deploybuild config layer.
///
/// Only `DEPLOYBUILD_*` keys and the `PIP` / `NPM` tool aliases are taken;
/// the project's other settings (`NODE_ENV`, `npm_config_*`, secrets) stay
/// out of the environment that pip and npm inherit.
pub fn is_config_key(key: &str) -> bool {
    use super::env_keys::tools;
    key.starts_with(super::env_keys::PREFIX)
        || tools::PIP_ALIASES
            .iter()
            .chain(tools::NPM_ALIASES)
            .any(|alias| *alias == key)
}

/// Export the config keys of `<dir>/.env` without overriding variables that
/// are already set. Returns how many were exported.
pub fn apply_dotenv(dir: &Path) -> usize {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return 0;
    };
    let mut loaded = 0usize;
    for (key, value) in parse_dotenv(&content) {
        if is_config_key(&key) && env::var_os(&key).is_none() {
            env::set_var(&key, value);
            loaded += 1;
        }
    }
    loaded
}

/// [`apply_dotenv`] once per process; later calls return the first count.
///
/// Must be called before any threads are spawned.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    use std::sync::OnceLock;
    static LOADED: OnceLock<usize> = OnceLock::new();
    *LOADED.get_or_init(|| apply_dotenv(dir))
}

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary variable or the first set alias. Blank values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|key| {
            env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Parse a boolean variable: `0`/`false`/`no`/`off` are false, anything else is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}
