//! File- and crate-level change classification shared by every query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a file or crate relative to the base revision.
///
/// The variant order doubles as a severity ranking, so sorting entries by
/// `(status, path)` gives byte-identical output for identical trees no
/// matter how the changes were discovered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Status {
    #[serde(rename = "?")]
    Unknown,
    #[serde(rename = "-")]
    Unchanged,
    #[serde(rename = "M")]
    Modified,
    #[serde(rename = "D")]
    Deleted,
}

impl Status {
    pub fn code(self) -> &'static str {
        match self {
            Status::Unknown => "?",
            Status::Unchanged => "-",
            Status::Modified => "M",
            Status::Deleted => "D",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single file or crate and its state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathDiff {
    pub status: Status,
    pub path: String,
}

impl PathDiff {
    pub fn new(status: Status, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }
}

/// The files and crates modified since the base revision. Recursive diffs
/// also include crates that depend on modified code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub files: Vec<PathDiff>,
    pub crates: Vec<PathDiff>,
    #[serde(skip)]
    pub(crate) recursive: bool,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.crates.is_empty()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        if self.is_empty() {
            return f.write_str("No changes.");
        }

        let mut out = String::new();
        if self.files.is_empty() {
            out.push_str("No modified or deleted files.\n");
        } else {
            let _ = writeln!(out, "{} modified or deleted files:", self.files.len());
            for pd in &self.files {
                let _ = writeln!(out, "\t{}\t{}", pd.status, pd.path);
            }
        }

        if self.crates.is_empty() {
            out.push_str("No affected crates.\n");
        } else {
            let label = if self.recursive {
                "affected"
            } else {
                "modified or deleted"
            };
            let _ = writeln!(out, "{} {} crates:", self.crates.len(), label);
            for pd in &self.crates {
                let _ = writeln!(out, "\t{}\t{}", pd.status, pd.path);
            }
        }

        f.write_str(out.trim_end())
    }
}
