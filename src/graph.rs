//! Reverse dependency index over the workspace.
//!
//! Built fresh for every recursive query from `cargo metadata --no-deps`:
//! each member's dependency list (normal, dev, and build kinds merged) is
//! inverted into a "who depends on me" table. Nothing is cached between
//! queries.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::process::Command;

use crate::diag::Diag;
use crate::error::Error;

/// For each crate, the workspace crates whose build depends on it. A crate
/// nobody depends on has no entry.
pub type Dependents = BTreeMap<String, BTreeSet<String>>;

/// The slice of `cargo metadata` output the graph needs.
#[derive(Deserialize, Debug)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Deserialize, Debug)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize, Debug)]
struct Dependency {
    name: String,
}

/// Build the reverse dependency index for the whole workspace. Edges to
/// crates outside the workspace are dropped.
pub fn dependents(repo_root: &Path, diag: &Diag) -> Result<Dependents, Error> {
    let output = Command::new("cargo")
        .args(["metadata", "--no-deps", "--format-version", "1"])
        .current_dir(repo_root)
        .output()
        .map_err(|err| Error::Cargo {
            action: "enumerate workspace crates".to_string(),
            detail: format!("failed to run cargo: {err}"),
        })?;
    if !output.status.success() {
        return Err(Error::Cargo {
            action: "enumerate workspace crates".to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let metadata: Metadata = serde_json::from_slice(&output.stdout)?;
    let graph = invert(&metadata);
    diag.debug(format!(
        "inverted {} workspace members into {} dependency entries",
        metadata.packages.len(),
        graph.len()
    ));
    Ok(graph)
}

fn invert(metadata: &Metadata) -> Dependents {
    let members: HashSet<&str> = metadata.packages.iter().map(|p| p.name.as_str()).collect();
    let mut graph = Dependents::new();
    for pkg in &metadata.packages {
        for dep in &pkg.dependencies {
            if members.contains(dep.name.as_str()) {
                graph
                    .entry(dep.name.clone())
                    .or_default()
                    .insert(pkg.name.clone());
            }
        }
    }
    graph
}
