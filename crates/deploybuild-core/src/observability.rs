//! Observability: tracing init and the JSONL audit log.
//!
//! Reads `config::ObservabilityConfig` for DEPLOYBUILD_QUIET, LOG_LEVEL,
//! LOG_JSON and AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Value};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call once at process startup.
///
/// `RUST_LOG` wins over DEPLOYBUILD_LOG_LEVEL; DEPLOYBUILD_QUIET=1 limits
/// output to WARN and above. Logs go to stderr so they interleave with the
/// child tools' own output in order.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "deploybuild=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
}

/// Append one JSON record as a line. Audit failures never abort a build.
pub fn append_jsonl(path: &Path, record: &Value) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| writeln!(f, "{}", record));
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "Audit log write failed");
    }
}

/// JSONL audit sink. Disabled when no path is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Path from DEPLOYBUILD_AUDIT_LOG, or disabled.
    pub fn from_env() -> Self {
        match ObservabilityConfig::from_env().audit_log.as_deref() {
            Some(path) => Self::to_path(path),
            None => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Write to `path`, creating its parent directory.
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(dir = %parent.display(), error = %e, "Audit log directory not created");
            }
        }
        Self { path: Some(path) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stamp `fields` with `ts` and `event` and append it.
    pub fn emit(&self, event: &str, mut fields: Value) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Value::Object(ref mut map) = fields {
            map.insert(
                "ts".to_string(),
                json!(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            );
            map.insert("event".to_string(), json!(event));
        }
        append_jsonl(path, &fields);
    }

    /// run_started, with SHA-256 fingerprints of the input manifests
    pub fn run_started(&self, workdir: &Path, fingerprints: &[(String, String)]) {
        let inputs: serde_json::Map<String, Value> = fingerprints
            .iter()
            .map(|(name, digest)| (name.clone(), json!(digest)))
            .collect();
        self.emit(
            "run_started",
            json!({
                "workdir": workdir.to_string_lossy(),
                "inputs": inputs,
            }),
        );
    }

    /// step_attempt: one external command finished or failed to spawn
    pub fn step_attempt(
        &self,
        step: &str,
        attempt: usize,
        command: &str,
        exit_code: Option<i32>,
        duration_ms: u64,
    ) {
        self.emit(
            "step_attempt",
            json!({
                "step": step,
                "attempt": attempt,
                "command": command,
                "exit_code": exit_code,
                "duration_ms": duration_ms,
            }),
        );
    }

    pub fn run_finished(&self, succeeded: bool, exit_code: i32, duration_ms: u64) {
        self.emit(
            "run_finished",
            json!({
                "succeeded": succeeded,
                "exit_code": exit_code,
                "duration_ms": duration_ms,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_jsonl_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        append_jsonl(&path, &json!({"event": "a"}));
        append_jsonl(&path, &json!({"event": "b", "exit_code": 1}));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "a");
        assert_eq!(lines[1]["exit_code"], 1);
    }

    fn read_records(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_audit_log_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("audit.jsonl");
        let audit = AuditLog::to_path(&path);

        audit.run_started(
            Path::new("/srv/app"),
            &[("requirements.txt".to_string(), "abc123".to_string())],
        );
        audit.step_attempt("node-deps", 1, "npm install", Some(0), 12);
        audit.step_attempt("node-deps", 0, "npm ci", None, 0);
        audit.run_finished(false, 127, 40);

        let records = read_records(&path);
        let events: Vec<&str> = records
            .iter()
            .map(|r| r["event"].as_str().unwrap())
            .collect();
        assert_eq!(
            events,
            vec!["run_started", "step_attempt", "step_attempt", "run_finished"]
        );
        assert_eq!(records[0]["workdir"], "/srv/app");
        assert_eq!(records[0]["inputs"]["requirements.txt"], "abc123");
        assert_eq!(records[1]["attempt"], 1);
        assert_eq!(records[1]["exit_code"], 0);
        assert!(records[2]["exit_code"].is_null());
        assert_eq!(records[3]["succeeded"], false);
        assert_eq!(records[3]["exit_code"], 127);
        assert!(records.iter().all(|r| r["ts"].is_string()));
    }

    #[test]
    fn test_disabled_audit_log_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let audit = AuditLog::disabled();
        audit.run_finished(true, 0, 1);
        assert!(audit.path().is_none());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
