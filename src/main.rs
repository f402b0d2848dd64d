mod config;
mod diag;
mod diff;
mod error;
mod git;
mod graph;
mod project;
mod resolve;
mod runner;

use anyhow::Result;
use clap::{Parser, Subcommand};

use diag::Diag;
use diff::Diff;
use git::Repository;
use project::Project;

#[derive(Parser)]
#[command(
    name = "ripple",
    version,
    about = "Git-aware change impact for Cargo workspaces",
    long_about = "Works out which workspace crates were directly or transitively affected by the changes since a base revision, and scopes cargo test to exactly those crates."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print debug diagnostics immediately instead of buffering them
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the files and crates affected since the base revision
    Status {
        /// Include only directly modified crates, skipping dependents
        #[arg(short, long)]
        direct: bool,

        /// List every crate in the workspace instead of diffing
        #[arg(short, long, conflicts_with = "direct")]
        all: bool,

        /// Revision to compare against (default: config, then origin/master)
        #[arg(short, long)]
        base: Option<String>,

        /// Format output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run cargo test for the affected crates
    Test {
        /// Include only directly modified crates, skipping dependents
        #[arg(short, long)]
        direct: bool,

        /// Test every crate in the workspace
        #[arg(short, long, conflicts_with = "direct")]
        all: bool,

        /// Revision to compare against (default: config, then origin/master)
        #[arg(short, long)]
        base: Option<String>,

        /// Test with optimizations enabled
        #[arg(long)]
        release: bool,

        /// Run only tests whose names match the filter
        #[arg(long, value_name = "FILTER")]
        run: Option<String>,

        /// List matching tests without running them
        #[arg(long)]
        list: bool,

        /// Extra arguments passed through to the test binaries
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Show the config file path and contents
    Config,
}

fn main() {
    let cli = Cli::parse();
    let diag = Diag::new(cli.verbose);
    if let Err(err) = run(cli, &diag) {
        diag.flush_debug();
        eprintln!("ripple: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, diag: &Diag) -> Result<()> {
    match cli.command {
        Commands::Status {
            direct,
            all,
            base,
            json,
        } => status(diag, direct, all, base, json),

        Commands::Test {
            direct,
            all,
            base,
            release,
            run,
            list,
            extra,
        } => test(diag, direct, all, base, release, run, list, extra),

        Commands::Config => config::show(),
    }
}

fn status(diag: &Diag, direct: bool, all: bool, base: Option<String>, json: bool) -> Result<()> {
    let cfg = config::Config::load()?;
    let project = open_project(diag)?;
    let base = base.unwrap_or(cfg.defaults.base);
    let diff = select_diff(&project, direct, all, &base)?;

    if json {
        println!("{}", serde_json::to_string(&diff)?);
    } else {
        println!("{diff}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn test(
    diag: &Diag,
    direct: bool,
    all: bool,
    base: Option<String>,
    release: bool,
    run: Option<String>,
    list: bool,
    extra: Vec<String>,
) -> Result<()> {
    let cfg = config::Config::load()?;
    let project = open_project(diag)?;
    let base = base.unwrap_or(cfg.defaults.base);
    let diff = select_diff(&project, direct, all, &base)?;

    let mut opts = runner::TestOptions {
        release,
        filter: run,
        list,
        extra: cfg.runner.args,
    };
    opts.extra.extend(extra);
    runner::run_tests(project.repo_root(), &diff, &opts, diag)
}

fn open_project(diag: &Diag) -> Result<Project> {
    let repo = Repository::discover(diag.clone())?;
    Ok(Project::new(diag.clone(), repo))
}

fn select_diff(project: &Project, direct: bool, all: bool, base: &str) -> Result<Diff, error::Error> {
    if all {
        project.all()
    } else if direct {
        project.diff(base)
    } else {
        project.recursive_diff(base)
    }
}
