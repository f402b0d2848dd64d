//! Maps changed directories to the workspace crates that own them.
//!
//! Ownership follows manifest ancestry: walking up from a directory, the
//! nearest Cargo.toml marks the boundary, and its `[package]` section names
//! the owning crate. The walk never consults `cargo metadata`, so plain
//! diffs keep working even when the dependency table can't be built.

use serde::Deserialize;
use std::path::Path;

use crate::diag::Diag;

/// Outcome of resolving one directory. `Skipped` is a diagnostic, not an
/// error: plenty of directories legitimately belong to no crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Skipped(String),
}

/// The sliver of a manifest the resolver cares about. Everything else is
/// ignored, including `[workspace]` tables.
#[derive(Deserialize)]
struct Manifest {
    package: Option<PackageSection>,
}

#[derive(Deserialize)]
struct PackageSection {
    name: Option<String>,
}

/// Resolve a repository-relative directory to the crate that owns it.
pub fn resolve_dir(repo_root: &Path, dir: &str) -> Resolution {
    let start = if dir == "." {
        repo_root.to_path_buf()
    } else {
        repo_root.join(dir)
    };

    let mut current = start.as_path();
    loop {
        let manifest = current.join("Cargo.toml");
        if manifest.is_file() {
            return match package_name(&manifest) {
                Ok(Some(name)) => Resolution::Resolved(name),
                // A workspace-only manifest marks a boundary but owns no
                // source itself.
                Ok(None) => Resolution::Skipped(format!(
                    "{} has no [package] section",
                    manifest.display()
                )),
                Err(reason) => Resolution::Skipped(reason),
            };
        }
        if current == repo_root {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Resolution::Skipped(format!(
        "no Cargo.toml between {dir:?} and the repository root"
    ))
}

/// The crate id the repository root resolves to. Falls back to the
/// repository directory's name when the root manifest is virtual or absent.
pub fn root_unit(repo_root: &Path, diag: &Diag) -> String {
    let manifest = repo_root.join("Cargo.toml");
    if manifest.is_file() {
        if let Ok(Some(name)) = package_name(&manifest) {
            diag.debug(format!("root crate is {name:?}"));
            return name;
        }
    }
    let guess = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    diag.debug(format!(
        "no package in the root manifest, assuming root crate {guess:?}"
    ));
    guess
}

fn package_name(manifest: &Path) -> Result<Option<String>, String> {
    let content = std::fs::read_to_string(manifest)
        .map_err(|err| format!("can't read {}: {err}", manifest.display()))?;
    let parsed: Manifest = toml::from_str(&content)
        .map_err(|err| format!("can't parse {}: {err}", manifest.display()))?;
    Ok(parsed.package.and_then(|p| p.name))
}
