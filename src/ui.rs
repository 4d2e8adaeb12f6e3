//! Formatting of query results for the command line.
//!
//! `format_*` functions build plain strings and are tested directly;
//! `display_*` functions add color and print.

use crate::domain::{Branch, BranchCommit, SemanticVersion, Tag};
use console::style;
use git2::Oid;

/// Shortened commit id for display
pub fn short_id(oid: Oid) -> String {
    let full = oid.to_string();
    full[..7.min(full.len())].to_string()
}

pub fn format_tag_line(tag: &Tag, version: &SemanticVersion) -> String {
    format!("{:<24} {:<16} {}", tag.name, version, short_id(tag.target))
}

pub fn format_branch_line(branch: &Branch) -> String {
    match branch.tip {
        Some(tip) => format!("{:<32} {}", branch.friendly_name, short_id(tip)),
        None => format!("{:<32} (no tip)", branch.friendly_name),
    }
}

pub fn format_merge_base(first: &Branch, second: &Branch, merge_base: Option<Oid>) -> String {
    match merge_base {
        Some(oid) => format!("{} .. {}: {}", first, second, oid),
        None => format!("{} .. {}: no common history", first, second),
    }
}

pub fn format_branch_source(branch: &Branch, source: &BranchCommit) -> String {
    match (&source.branch, source.commit) {
        (Some(from), Some(commit)) => {
            format!("{} was branched from {} at {}", branch, from, short_id(commit))
        }
        _ => format!("{}: source branch could not be determined", branch),
    }
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a section heading in bold.
pub fn display_heading(title: &str) {
    println!("\n{}", style(title).bold());
}

/// Print version tags, one per line.
pub fn display_tags(tags: &[(Tag, SemanticVersion)]) {
    display_heading(&format!("{} version tags", tags.len()));
    for (tag, version) in tags {
        println!("  {}", format_tag_line(tag, version));
    }
}

/// Print versions in the order they were found.
pub fn display_versions(branch: &Branch, versions: &[SemanticVersion]) {
    display_heading(&format!("Versions on '{}'", branch));
    if versions.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for version in versions {
        println!("  {}", style(version).green());
    }
}

pub fn display_branches(branches: &[&Branch]) {
    for branch in branches {
        println!("  {}", format_branch_line(branch));
    }
}

pub fn display_merge_base(first: &Branch, second: &Branch, merge_base: Option<Oid>) {
    println!("{}", format_merge_base(first, second, merge_base));
}

pub fn display_branch_source(branch: &Branch, source: &BranchCommit) {
    let line = format_branch_source(branch, source);
    if source.is_empty() {
        println!("{}", style(line).yellow());
    } else {
        println!("{}", style(line).green());
    }
}
