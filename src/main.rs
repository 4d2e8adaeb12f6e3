use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_lineage::config;
use git_lineage::domain::Branch;
use git_lineage::git::{Git2Repository, Repository};
use git_lineage::metadata::RepositoryMetadata;
use git_lineage::ui;

#[derive(clap::Parser)]
#[command(
    name = "git-lineage",
    about = "Inspect version tags and branch relationships in a git repository"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, default_value = ".", help = "Path inside the repository")]
    path: String,

    #[arg(short, long, help = "Log analysis steps")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tags that parse as semantic versions
    Tags {
        #[arg(long, help = "Only tags on commits at or before this unix time")]
        older_than: Option<i64>,
    },
    /// List versions tagged on a branch's history
    BranchTags { branch: String },
    /// List branches containing a commit
    Containing {
        commit: String,
        #[arg(long, help = "Only consider branches with an upstream")]
        only_tracked: bool,
    },
    /// Show where one branch forked from another
    MergeBase { first: String, second: String },
    /// Show which branch a branch was created from
    Source {
        branch: String,
        #[arg(long, help = "Branches never to consider as a source")]
        exclude: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_branch<'a>(branches: &'a [Branch], name: &str) -> Result<&'a Branch> {
    branches
        .iter()
        .find(|b| b.friendly_name == name || b.canonical_name == name)
        .with_context(|| format!("Branch '{}' not found", name))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let prefix = config.tag_prefix()?;

    let repo = Git2Repository::open(&args.path).context("Git repository error")?;
    let branches = repo.branches()?;
    let mut metadata = RepositoryMetadata::new(&repo);

    match args.command {
        Command::Tags { older_than } => {
            let tags = metadata.valid_version_tags(&prefix, older_than)?;
            ui::display_tags(&tags);
        }
        Command::BranchTags { branch } => {
            let branch = find_branch(&branches, &branch)?;
            let versions = metadata.version_tags_on_branch(branch, &prefix)?;
            ui::display_versions(branch, &versions);
        }
        Command::Containing {
            commit,
            only_tracked,
        } => {
            let oid = repo.resolve_commit(&commit)?;
            let containing = metadata
                .branches_containing_commit(Some(oid), &branches, only_tracked)?
                .collect::<git_lineage::Result<Vec<_>>>()?;

            ui::display_heading(&format!("Branches containing {}", ui::short_id(oid)));
            ui::display_branches(&containing);
        }
        Command::MergeBase { first, second } => {
            let first = find_branch(&branches, &first)?;
            let second = find_branch(&branches, &second)?;
            let merge_base = metadata.find_merge_base(first, second)?;
            ui::display_merge_base(first, second, merge_base);
        }
        Command::Source { branch, exclude } => {
            let branch = find_branch(&branches, &branch)?;
            let excluded = exclude
                .iter()
                .map(|name| find_branch(&branches, name).cloned())
                .collect::<Result<Vec<_>>>()?;

            ui::display_status(&format!("Looking for the source of '{}'", branch));
            let source = metadata.find_branch_source(branch, &config, &excluded)?;
            ui::display_branch_source(branch, &source);
        }
    }

    Ok(())
}
