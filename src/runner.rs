//! Runs the workspace test suite for the crates a diff selected.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::diag::Diag;
use crate::diff::{Diff, Status};

/// The flag surface of `ripple test` that maps onto cargo arguments.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub release: bool,
    /// Run only tests whose names match this filter.
    pub filter: Option<String>,
    /// List matching tests without running them.
    pub list: bool,
    /// Extra arguments handed to the test binaries, config first.
    pub extra: Vec<String>,
}

/// Run `cargo test` for every crate the diff marks Modified, with output
/// streamed straight through. Deleted crates have nothing left to test.
pub fn run_tests(repo_root: &Path, diff: &Diff, opts: &TestOptions, diag: &Diag) -> Result<()> {
    let selected = select_crates(diff);
    if selected.is_empty() {
        println!("No crates need testing.");
        return Ok(());
    }

    let args = build_args(&selected, opts);
    diag.debug(format!("running cargo {}", args.join(" ")));

    let status = Command::new("cargo")
        .args(&args)
        .current_dir(repo_root)
        .status()
        .context("failed to run cargo test")?;
    if !status.success() {
        bail!("cargo test failed ({status})");
    }
    Ok(())
}

fn select_crates(diff: &Diff) -> Vec<&str> {
    diff.crates
        .iter()
        .filter(|pd| pd.status == Status::Modified)
        .map(|pd| pd.path.as_str())
        .collect()
}

fn build_args(selected: &[&str], opts: &TestOptions) -> Vec<String> {
    let mut args = vec!["test".to_string()];
    for name in selected {
        args.push("-p".to_string());
        args.push((*name).to_string());
    }
    if opts.release {
        args.push("--release".to_string());
    }
    if let Some(filter) = &opts.filter {
        args.push(filter.clone());
    }
    if opts.list || !opts.extra.is_empty() {
        args.push("--".to_string());
        if opts.list {
            args.push("--list".to_string());
        }
        args.extend(opts.extra.iter().cloned());
    }
    args
}
