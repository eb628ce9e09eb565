//! SHA-256 fingerprints of the input manifests, recorded in the audit log so
//! two runs can be compared.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// `(file name, hex digest)` for every input that exists; missing files are skipped.
pub fn fingerprint_inputs(paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let bytes = std::fs::read(path).ok()?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            Some((name, hex::encode(Sha256::digest(&bytes))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_skips_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let req = tmp.path().join("requirements.txt");
        std::fs::write(&req, "").unwrap();
        let prints = fingerprint_inputs(&[req, tmp.path().join("package-lock.json")]);
        assert_eq!(
            prints,
            vec![(
                "requirements.txt".to_string(),
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".to_string()
            )]
        );
    }
}
