//! Shells out to git for everything the engine needs to know about the
//! working tree: the repository root, the files changed since a revision,
//! and the full file listing.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::diag::Diag;
use crate::error::Error;

/// Repository-relative paths changed between a base revision and the
/// working tree. Untracked files count as modified.
#[derive(Debug, Clone, Default)]
pub struct FileChanges {
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
}

/// Access to the handful of git queries the engine needs. The root is
/// discovered once and threaded into every subprocess explicitly.
pub struct Repository {
    root: PathBuf,
    diag: Diag,
}

impl Repository {
    /// Locate the enclosing repository. Fails when git is missing or the
    /// working directory is outside any work tree.
    pub fn discover(diag: Diag) -> Result<Self, Error> {
        let root = run_git(None, &["rev-parse", "--show-toplevel"], "determine repository root")?;
        let root = PathBuf::from(root);
        diag.debug(format!("repository root is {}", root.display()));
        Ok(Self { root, diag })
    }

    /// Absolute path to the repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files deleted or modified since `since`, relative to the repository
    /// root. Untracked files are reported as modified; renames are treated
    /// as a delete plus an add.
    pub fn changed_files(&self, since: &str) -> Result<FileChanges, Error> {
        let mut changes = FileChanges::default();

        let untracked = self.run(
            &["ls-files", "--others", "--exclude-standard"],
            "find untracked files",
        )?;
        for line in untracked.lines().filter(|l| !l.is_empty()) {
            changes.modified.push(line.to_string());
        }

        let action = format!("identify files modified since {since:?}");
        let listing = self.run(
            &[
                "diff",
                "--name-status",
                "--no-renames",
                "--ignore-submodules",
                since,
                "--",
            ],
            &action,
        )?;
        for line in listing.lines().filter(|l| !l.is_empty()) {
            let Some((code, path)) = line.split_once('\t') else {
                continue;
            };
            if code.starts_with('D') {
                changes.deleted.push(path.to_string());
            } else {
                changes.modified.push(path.to_string());
            }
        }

        changes.deleted.sort();
        changes.deleted.dedup();
        changes.modified.sort();
        changes.modified.dedup();
        self.diag
            .debug(format!("files deleted since {since:?}: {:?}", changes.deleted));
        self.diag.debug(format!(
            "files created or modified since {since:?}: {:?}",
            changes.modified
        ));
        Ok(changes)
    }

    /// Every tracked and untracked file in the repository, reported as
    /// modified.
    pub fn all_files(&self) -> Result<FileChanges, Error> {
        let listing = self.run(
            &[
                "ls-files",
                "--cached",
                "--modified",
                "--others",
                "--exclude-standard",
            ],
            "list repository files",
        )?;
        let mut changes = FileChanges::default();
        for line in listing.lines().filter(|l| !l.is_empty()) {
            changes.modified.push(line.to_string());
        }
        changes.modified.sort();
        changes.modified.dedup();
        self.diag.debug(format!(
            "found {} files in repository",
            changes.modified.len()
        ));
        Ok(changes)
    }

    #[cfg(test)]
    fn open(root: PathBuf, diag: Diag) -> Self {
        Self { root, diag }
    }

    fn run(&self, args: &[&str], action: &str) -> Result<String, Error> {
        run_git(Some(&self.root), args, action)
    }
}

fn run_git(cwd: Option<&Path>, args: &[&str], action: &str) -> Result<String, Error> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let output = cmd.output().map_err(|err| Error::Vcs {
        action: action.to_string(),
        detail: format!("failed to run git: {err}"),
    })?;
    if !output.status.success() {
        return Err(Error::Vcs {
            action: action.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
