//! End-to-end tests for `ripple status` against seeded git workspaces.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn ripple_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ripple"))
}

fn run_git(repo: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("run git")
}

fn run_git_ok(repo: &Path, args: &[&str]) {
    let out = run_git(repo, args);
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
}

fn run_status(repo: &Path, args: &[&str]) -> Output {
    ripple_bin()
        .arg("status")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("run ripple status")
}

fn stdout_ok(out: &Output) -> String {
    assert!(
        out.status.success(),
        "ripple failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn write_member(repo: &Path, rel: &str, name: &str, deps: &str) {
    let dir = repo.join(rel);
    fs::create_dir_all(dir.join("src")).expect("mkdir member");
    fs::write(
        dir.join("Cargo.toml"),
        format!(
            "[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n{deps}"
        ),
    )
    .expect("write member manifest");
    fs::write(dir.join("src/lib.rs"), "").expect("write member lib");
}

/// A committed workspace with a root crate and a three-deep member chain:
/// alpha depends on beta depends on gamma.
fn seed_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path();

    run_git_ok(repo, &["init", "-q"]);
    run_git_ok(repo, &["config", "user.name", "Ripple Test"]);
    run_git_ok(repo, &["config", "user.email", "ripple@example.com"]);

    fs::write(
        repo.join("Cargo.toml"),
        "[package]\nname = \"wsroot\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n\
         [workspace]\nmembers = [\"crates/alpha\", \"crates/beta\", \"crates/gamma\"]\n",
    )
    .expect("write root manifest");
    fs::create_dir_all(repo.join("src")).expect("mkdir root src");
    fs::write(repo.join("src/lib.rs"), "").expect("write root lib");
    fs::write(repo.join(".gitignore"), "/target\nCargo.lock\n").expect("write gitignore");

    write_member(
        repo,
        "crates/alpha",
        "alpha",
        "\n[dependencies]\nbeta = { path = \"../beta\" }\n",
    );
    write_member(
        repo,
        "crates/beta",
        "beta",
        "\n[dependencies]\ngamma = { path = \"../gamma\" }\n",
    );
    write_member(repo, "crates/gamma", "gamma", "");

    run_git_ok(repo, &["add", "-A"]);
    run_git_ok(repo, &["commit", "-q", "-m", "seed"]);

    dir
}

fn crates_field(json: &str) -> Vec<(String, String)> {
    let value: serde_json::Value = serde_json::from_str(json).expect("parse status json");
    value["crates"]
        .as_array()
        .expect("crates array")
        .iter()
        .map(|e| {
            (
                e["status"].as_str().expect("status").to_string(),
                e["path"].as_str().expect("path").to_string(),
            )
        })
        .collect()
}

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(s, p)| (s.to_string(), p.to_string()))
        .collect()
}

#[test]
fn clean_tree_reports_no_changes() {
    let dir = seed_workspace();
    let out = run_status(dir.path(), &["-b", "HEAD"]);
    assert_eq!(stdout_ok(&out).trim(), "No changes.");
}

#[test]
fn clean_tree_is_idempotent() {
    let dir = seed_workspace();
    let first = run_status(dir.path(), &["-b", "HEAD", "--json"]);
    let second = run_status(dir.path(), &["-b", "HEAD", "--json"]);
    assert_eq!(stdout_ok(&first), stdout_ok(&second));
}

#[test]
fn direct_diff_reports_only_the_touched_crate() {
    let dir = seed_workspace();
    fs::write(dir.path().join("crates/beta/src/lib.rs"), "pub fn beta() {}\n")
        .expect("edit beta");

    let out = run_status(dir.path(), &["--direct", "-b", "HEAD", "--json"]);
    let json = stdout_ok(&out);
    assert_eq!(crates_field(&json), pairs(&[("M", "beta")]));
    assert!(json.contains(r#"{"status":"M","path":"crates/beta/src/lib.rs"}"#));
}

#[test]
fn recursive_diff_closes_over_multi_hop_dependents() {
    let dir = seed_workspace();
    fs::write(
        dir.path().join("crates/gamma/src/lib.rs"),
        "pub fn gamma() {}\n",
    )
    .expect("edit gamma");

    let out = run_status(dir.path(), &["-b", "HEAD", "--json"]);
    let crates = crates_field(&stdout_ok(&out));
    assert_eq!(
        crates,
        pairs(&[("M", "alpha"), ("M", "beta"), ("M", "gamma")]),
        "a gamma change must ripple through beta to alpha"
    );
}

#[test]
fn recursive_is_a_superset_of_direct() {
    let dir = seed_workspace();
    fs::write(
        dir.path().join("crates/beta/src/lib.rs"),
        "pub fn beta() {}\n",
    )
    .expect("edit beta");

    let direct = crates_field(&stdout_ok(&run_status(
        dir.path(),
        &["--direct", "-b", "HEAD", "--json"],
    )));
    let recursive = crates_field(&stdout_ok(&run_status(
        dir.path(),
        &["-b", "HEAD", "--json"],
    )));
    for entry in &direct {
        assert!(recursive.contains(entry), "missing {entry:?}");
    }
    assert_eq!(recursive, pairs(&[("M", "alpha"), ("M", "beta")]));
}

#[test]
fn untracked_files_count_as_modified() {
    let dir = seed_workspace();
    fs::write(dir.path().join("crates/gamma/src/new.rs"), "// wip\n").expect("add file");

    let out = run_status(dir.path(), &["--direct", "-b", "HEAD", "--json"]);
    let json = stdout_ok(&out);
    assert!(json.contains(r#"{"status":"M","path":"crates/gamma/src/new.rs"}"#));
    assert_eq!(crates_field(&json), pairs(&[("M", "gamma")]));
}

#[test]
fn testdata_changes_fold_into_the_owning_crate() {
    let dir = seed_workspace();
    fs::create_dir_all(dir.path().join("crates/beta/testdata")).expect("mkdir testdata");
    fs::write(dir.path().join("crates/beta/testdata/golden.json"), "{}\n").expect("add fixture");

    let out = run_status(dir.path(), &["--direct", "-b", "HEAD", "--json"]);
    let crates = crates_field(&stdout_ok(&out));
    assert_eq!(crates, pairs(&[("M", "beta")]), "no separate testdata crate");
}

#[test]
fn deleted_directory_is_reported_with_a_synthetic_id() {
    let dir = seed_workspace();
    fs::remove_dir_all(dir.path().join("crates/gamma/src")).expect("remove gamma src");

    let out = run_status(dir.path(), &["--direct", "-b", "HEAD", "--json"]);
    let json = stdout_ok(&out);
    assert!(json.contains(r#"{"status":"D","path":"crates/gamma/src/lib.rs"}"#));
    assert_eq!(
        crates_field(&json),
        pairs(&[("D", "wsroot/crates/gamma/src")])
    );
}

#[test]
fn all_lists_every_crate_without_the_dependency_graph() {
    let dir = seed_workspace();
    let out = run_status(dir.path(), &["--all", "--json"]);
    let crates = crates_field(&stdout_ok(&out));
    assert_eq!(
        crates,
        pairs(&[("M", "alpha"), ("M", "beta"), ("M", "gamma"), ("M", "wsroot")])
    );
}

#[test]
fn entries_are_sorted_by_severity_then_path() {
    let dir = seed_workspace();
    fs::write(
        dir.path().join("crates/alpha/src/lib.rs"),
        "pub fn alpha() {}\n",
    )
    .expect("edit alpha");
    fs::remove_dir_all(dir.path().join("crates/gamma/src")).expect("remove gamma src");

    let out = run_status(dir.path(), &["--direct", "-b", "HEAD", "--json"]);
    let crates = crates_field(&stdout_ok(&out));
    assert_eq!(
        crates,
        pairs(&[("M", "alpha"), ("D", "wsroot/crates/gamma/src")]),
        "Modified sorts before Deleted"
    );
}

#[test]
fn human_summary_shows_counts_and_status_codes() {
    let dir = seed_workspace();
    fs::write(
        dir.path().join("crates/beta/src/lib.rs"),
        "pub fn beta() {}\n",
    )
    .expect("edit beta");

    let out = run_status(dir.path(), &["-b", "HEAD"]);
    let text = stdout_ok(&out);
    assert!(text.contains("1 modified or deleted files:"));
    assert!(text.contains("\tM\tcrates/beta/src/lib.rs"));
    assert!(text.contains("2 affected crates:"));
    assert!(text.contains("\tM\talpha"));
    assert!(text.contains("\tM\tbeta"));
}

#[test]
fn outside_a_repository_fails_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = run_status(dir.path(), &["-b", "HEAD"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("repository root"),
        "stderr was: {stderr}"
    );
}
