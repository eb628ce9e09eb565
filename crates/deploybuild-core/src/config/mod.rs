//! deploybuild configuration layer
//!
//! Every environment read goes through this module; runner code works with the
//! structured configs only.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `RunnerConfig`, `ToolsConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants and aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{apply_dotenv, env_bool, env_optional, env_or, is_config_key, load_dotenv_from_dir};
pub use schema::{
    resolve_workdir, ConfigError, ObservabilityConfig, RunnerConfig, ToolsConfig,
};
