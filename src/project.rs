//! The change-impact engine: classifies changed files, maps them to the
//! crates that own them, and expands the result through the reverse
//! dependency graph.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::diag::Diag;
use crate::diff::{Diff, PathDiff, Status};
use crate::error::Error;
use crate::git::{FileChanges, Repository};
use crate::graph::{self, Dependents};
use crate::resolve::{self, Resolution};

/// A git repository of Rust source, viewed as a set of workspace crates.
pub struct Project {
    diag: Diag,
    repo: Repository,
    root_unit: String,
}

impl Project {
    pub fn new(diag: Diag, repo: Repository) -> Self {
        let root_unit = resolve::root_unit(repo.root(), &diag);
        Self {
            diag,
            repo,
            root_unit,
        }
    }

    /// Absolute path to the repository root.
    pub fn repo_root(&self) -> &Path {
        self.repo.root()
    }

    /// The files and crates directly modified since `base`.
    pub fn diff(&self, base: &str) -> Result<Diff, Error> {
        let raw = self.repo.changed_files(base)?;
        Ok(self.classify(&raw))
    }

    /// The files and crates directly modified since `base`, plus every
    /// crate that transitively depends on modified code.
    pub fn recursive_diff(&self, base: &str) -> Result<Diff, Error> {
        let mut diff = self.diff(base)?;
        let dependents = graph::dependents(self.repo.root(), &self.diag)?;
        diff.crates = expand(&diff.crates, &dependents);
        diff.recursive = true;
        Ok(diff)
    }

    /// Every file and crate in the project, reported as modified. Already
    /// exhaustive, so no dependency expansion is needed.
    pub fn all(&self) -> Result<Diff, Error> {
        let raw = self.repo.all_files()?;
        Ok(self.classify(&raw))
    }

    fn classify(&self, raw: &FileChanges) -> Diff {
        classify_changes(raw, self.repo.root(), &self.root_unit, &self.diag)
    }
}

/// Turn raw file changes into a direct diff: classified files plus the
/// crates owning the directories those files live in.
fn classify_changes(
    raw: &FileChanges,
    repo_root: &Path,
    root_unit: &str,
    diag: &Diag,
) -> Diff {
    let mut diff = Diff::default();

    // A path reported both deleted and modified collapses to deleted.
    let deleted: BTreeSet<&str> = raw.deleted.iter().map(String::as_str).collect();
    for path in &raw.modified {
        if !deleted.contains(path.as_str()) {
            diff.files.push(PathDiff::new(Status::Modified, path));
        }
    }
    for path in &raw.deleted {
        diff.files.push(PathDiff::new(Status::Deleted, path));
    }
    diff.files.sort();

    let mut dirs = BTreeSet::new();
    for path in raw.deleted.iter().chain(raw.modified.iter()) {
        dirs.insert(parent_dir(path));
    }

    let mut crates: HashMap<String, Status> = HashMap::new();
    for dir in dirs {
        // Fixture changes affect only the owning crate, not a crate of
        // their own.
        let dir = fold_fixture_dir(&dir);

        if !repo_root.join(&dir).exists() {
            // No identifier can be computed for a directory with no
            // content; synthesize one from the root crate id.
            merge(&mut crates, format!("{root_unit}/{dir}"), Status::Deleted);
            continue;
        }

        match resolve_dir(repo_root, &dir, root_unit) {
            Resolution::Resolved(name) => {
                merge(&mut crates, name, Status::Modified);
            }
            Resolution::Skipped(reason) => {
                diag.debug(format!("skipping directory {dir:?}: {reason}"));
            }
        }
    }

    diff.crates = crates
        .into_iter()
        .map(|(path, status)| PathDiff { status, path })
        .collect();
    diff.crates.sort();
    diff
}

fn resolve_dir(repo_root: &Path, dir: &str, root_unit: &str) -> Resolution {
    if dir == "." {
        // The repository root always maps to the project's own root id,
        // but only when it actually is a crate.
        return match resolve::resolve_dir(repo_root, dir) {
            Resolution::Resolved(_) => Resolution::Resolved(root_unit.to_string()),
            skipped => skipped,
        };
    }
    resolve::resolve_dir(repo_root, dir)
}

/// Expand directly affected crates through the reverse dependency index to
/// a fixed point. Newly discovered dependents enter as Modified and are
/// themselves expanded; a crate already present keeps its original status,
/// so a directly deleted crate is never demoted.
fn expand(direct: &[PathDiff], dependents: &Dependents) -> Vec<PathDiff> {
    let mut affected: HashMap<String, Status> = HashMap::new();
    let mut queue: Vec<String> = Vec::new();
    for pd in direct {
        affected.insert(pd.path.clone(), pd.status);
        queue.push(pd.path.clone());
    }

    while let Some(id) = queue.pop() {
        let Some(users) = dependents.get(&id) else {
            continue;
        };
        for user in users {
            if !affected.contains_key(user) {
                affected.insert(user.clone(), Status::Modified);
                queue.push(user.clone());
            }
        }
    }

    let mut crates: Vec<PathDiff> = affected
        .into_iter()
        .map(|(path, status)| PathDiff { status, path })
        .collect();
    crates.sort();
    crates
}

fn merge(crates: &mut HashMap<String, Status>, id: String, status: Status) {
    let entry = crates.entry(id).or_insert(status);
    if status > *entry {
        *entry = status;
    }
}

/// The directory containing `path`, or "." for top-level files. Git always
/// reports forward slashes.
fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}

/// A changed `testdata` directory counts as a change to its parent.
fn fold_fixture_dir(dir: &str) -> String {
    if dir == "testdata" {
        return ".".to_string();
    }
    match dir.rsplit_once('/') {
        Some((parent, "testdata")) => parent.to_string(),
        _ => dir.to_string(),
    }
}
