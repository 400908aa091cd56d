//! Version manifest readers and reconciliation.
//!
//! A release run reads zero or more project manifests (package.json,
//! bower.json, Cargo.toml, ...) and must end up with exactly one version
//! string before anything mutates the repository. A missing manifest is a
//! question for the user; disagreeing manifests are a hard stop.

use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::prompt::Confirm;

/// Version (and optional project name) read from one manifest file.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestVersion {
    pub name: Option<String>,
    pub version: String,
}

/// Outcome of reconciling every configured manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVersion {
    pub version: String,
    pub project_name: Option<String>,
}

/// Reads one manifest, returning `Ok(None)` when the file does not exist.
///
/// `.json` files expect top-level `version`/`name` fields. `.toml` files may
/// carry them at the top level or under a `[package]` table (Cargo style).
pub fn read_manifest(path: &Path) -> Result<Option<ManifestVersion>> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "json" => parse_json(path, &raw).map(Some),
        "toml" => parse_toml(path, &raw).map(Some),
        other => Err(ReleaseError::version(format!(
            "unsupported manifest format '{}' for {}",
            other,
            path.display()
        ))),
    }
}

fn parse_json(path: &Path, raw: &str) -> Result<ManifestVersion> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ReleaseError::version(format!("can't parse {}: {}", path.display(), e)))?;

    let version = value
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ReleaseError::version(format!("no version field in {}", path.display()))
        })?;

    Ok(ManifestVersion {
        name: value
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        version: version.to_string(),
    })
}

fn parse_toml(path: &Path, raw: &str) -> Result<ManifestVersion> {
    let value: toml::Value = toml::from_str(raw)
        .map_err(|e| ReleaseError::version(format!("can't parse {}: {}", path.display(), e)))?;

    // Cargo-style manifests keep the fields under [package]
    let table = value.get("package").unwrap_or(&value);

    let version = table
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ReleaseError::version(format!("no version field in {}", path.display()))
        })?;

    Ok(ManifestVersion {
        name: table
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        version: version.to_string(),
    })
}

/// Reconciles every configured manifest into a single release version.
///
/// For each missing manifest the confirmation gate decides whether the
/// absence is acceptable; a "no" aborts the run. Zero readable versions
/// abort. Two manifests with different versions abort, whichever order they
/// were read in. The first manifest carrying a `name` supplies the project
/// display name.
pub fn resolve_versions(
    work_dir: &Path,
    manifests: &[String],
    gate: &dyn Confirm,
) -> Result<ResolvedVersion> {
    let mut found: Vec<(String, ManifestVersion)> = Vec::new();

    for manifest in manifests {
        let path = work_dir.join(manifest);
        match read_manifest(&path)? {
            Some(version) => found.push((manifest.clone(), version)),
            None => {
                let question = format!("No {} file found, is that normal?", manifest);
                if !gate.ask(&question, false)? {
                    return Err(ReleaseError::aborted(format!(
                        "stop release process without a {} file",
                        manifest
                    )));
                }
            }
        }
    }

    let (first_file, first) = match found.first() {
        Some(entry) => entry.clone(),
        None => {
            return Err(ReleaseError::version(
                "stop release process without any version manifest",
            ))
        }
    };

    for (file, other) in &found[1..] {
        if other.version != first.version {
            return Err(ReleaseError::version(format!(
                "version numbers differ: {} has {}, {} has {}",
                first_file, first.version, file, other.version
            )));
        }
    }

    semver::Version::parse(&first.version).map_err(|e| {
        ReleaseError::version(format!(
            "'{}' is not a semantic version: {}",
            first.version, e
        ))
    })?;

    let project_name = found.iter().find_map(|(_, m)| m.name.clone());

    Ok(ResolvedVersion {
        version: first.version,
        project_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedConfirm;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, content: &str) {
        fs::write(dir.path().join(file), content).unwrap();
    }

    #[test]
    fn test_read_json_manifest() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"name": "widget", "version": "1.2.0"}"#);

        let manifest = read_manifest(&dir.path().join("package.json"))
            .unwrap()
            .unwrap();
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.name.as_deref(), Some("widget"));
    }

    #[test]
    fn test_read_toml_manifest_package_table() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "Cargo.toml",
            "[package]\nname = \"widget\"\nversion = \"0.3.1\"\n",
        );

        let manifest = read_manifest(&dir.path().join("Cargo.toml"))
            .unwrap()
            .unwrap();
        assert_eq!(manifest.version, "0.3.1");
        assert_eq!(manifest.name.as_deref(), Some("widget"));
    }

    #[test]
    fn test_read_missing_manifest_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_manifest(&dir.path().join("package.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_read_invalid_json_is_version_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", "{ not json");

        let err = read_manifest(&dir.path().join("package.json")).unwrap_err();
        assert!(err.to_string().contains("can't parse"));
    }

    #[test]
    fn test_single_manifest_resolves_its_version() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"name": "widget", "version": "1.2.0"}"#);

        let gate = ScriptedConfirm::always(true);
        let resolved = resolve_versions(
            dir.path(),
            &["package.json".to_string(), "bower.json".to_string()],
            &gate,
        )
        .unwrap();

        assert_eq!(resolved.version, "1.2.0");
        assert_eq!(resolved.project_name.as_deref(), Some("widget"));
        // One question: the missing bower.json
        assert_eq!(gate.questions().len(), 1);
        assert!(gate.questions()[0].contains("bower.json"));
    }

    #[test]
    fn test_agreeing_manifests_resolve() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"version": "2.0.0"}"#);
        write(&dir, "bower.json", r#"{"name": "widget", "version": "2.0.0"}"#);

        let gate = ScriptedConfirm::always(false);
        let resolved = resolve_versions(
            dir.path(),
            &["package.json".to_string(), "bower.json".to_string()],
            &gate,
        )
        .unwrap();

        assert_eq!(resolved.version, "2.0.0");
        // Name comes from the first manifest that has one
        assert_eq!(resolved.project_name.as_deref(), Some("widget"));
        assert!(gate.questions().is_empty());
    }

    #[test]
    fn test_conflicting_manifests_abort_in_either_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"version": "1.2.0"}"#);
        write(&dir, "bower.json", r#"{"version": "1.3.0"}"#);

        for order in [
            ["package.json", "bower.json"],
            ["bower.json", "package.json"],
        ] {
            let manifests: Vec<String> = order.iter().map(|s| s.to_string()).collect();
            let gate = ScriptedConfirm::always(true);
            let err = resolve_versions(dir.path(), &manifests, &gate).unwrap_err();
            assert!(
                err.to_string().contains("version numbers differ"),
                "expected conflict error for order {:?}, got: {}",
                order,
                err
            );
        }
    }

    #[test]
    fn test_no_manifest_at_all_aborts() {
        let dir = TempDir::new().unwrap();
        let gate = ScriptedConfirm::always(true);

        let err = resolve_versions(
            dir.path(),
            &["package.json".to_string(), "bower.json".to_string()],
            &gate,
        )
        .unwrap_err();
        assert!(err.to_string().contains("without any version manifest"));
    }

    #[test]
    fn test_declined_missing_manifest_is_policy_abort() {
        let dir = TempDir::new().unwrap();
        let gate = ScriptedConfirm::always(false);

        let err = resolve_versions(dir.path(), &["package.json".to_string()], &gate).unwrap_err();
        assert!(err.is_policy_abort());
    }

    #[test]
    fn test_non_semver_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"version": "one.two"}"#);

        let gate = ScriptedConfirm::always(true);
        let err = resolve_versions(dir.path(), &["package.json".to_string()], &gate).unwrap_err();
        assert!(err.to_string().contains("not a semantic version"));
    }
}
