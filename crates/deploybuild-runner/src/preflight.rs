//! Checks run before a step's first attempt, so a missing manifest or an
//! undefined npm script fails the step without spawning anything.

use std::path::Path;

use crate::error::StepFailure;
use crate::plan::Preflight;

pub fn check(preflight: &Preflight) -> Result<(), StepFailure> {
    match preflight {
        Preflight::None => Ok(()),
        Preflight::RequireFile(path) => {
            if path.is_file() {
                Ok(())
            } else {
                Err(StepFailure::MissingInput(path.clone()))
            }
        }
        Preflight::RequireNpmScript { manifest, script } => {
            require_npm_script(manifest, script)
        }
    }
}

fn require_npm_script(manifest: &Path, script: &str) -> Result<(), StepFailure> {
    let content = std::fs::read_to_string(manifest)
        .map_err(|_| StepFailure::MissingInput(manifest.to_path_buf()))?;
    let package: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| StepFailure::InvalidManifest {
            path: manifest.to_path_buf(),
            message: e.to_string(),
        })?;
    let defined = package
        .get("scripts")
        .and_then(|s| s.get(script))
        .and_then(|v| v.as_str())
        .is_some_and(|cmd| !cmd.trim().is_empty());
    if defined {
        Ok(())
    } else {
        Err(StepFailure::TaskUndefined {
            script: script.to_string(),
            manifest: manifest.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_require_file() {
        let tmp = tempfile::tempdir().unwrap();
        let req = tmp.path().join("requirements.txt");
        assert_eq!(
            check(&Preflight::RequireFile(req.clone())),
            Err(StepFailure::MissingInput(req.clone()))
        );
        fs::write(&req, "flask\n").unwrap();
        assert_eq!(check(&Preflight::RequireFile(req)), Ok(()));
    }

    #[test]
    fn test_require_npm_script() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("package.json");
        let pre = Preflight::RequireNpmScript {
            manifest: manifest.clone(),
            script: "build:css".to_string(),
        };

        assert!(matches!(check(&pre), Err(StepFailure::MissingInput(_))));

        fs::write(&manifest, r#"{"scripts": {"dev": "vite"}}"#).unwrap();
        assert!(matches!(
            check(&pre),
            Err(StepFailure::TaskUndefined { ref script, .. }) if script == "build:css"
        ));

        fs::write(
            &manifest,
            r#"{"scripts": {"build:css": "tailwindcss -i ./app/static/src/input.css -o ./app/static/css/output.css --minify"}}"#,
        )
        .unwrap();
        assert_eq!(check(&pre), Ok(()));
    }

    #[test]
    fn test_invalid_package_json() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("package.json");
        fs::write(&manifest, "{ not json").unwrap();
        let pre = Preflight::RequireNpmScript {
            manifest,
            script: "build:css".to_string(),
        };
        assert!(matches!(
            check(&pre),
            Err(StepFailure::InvalidManifest { .. })
        ));
    }
}
