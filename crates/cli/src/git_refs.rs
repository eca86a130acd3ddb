//! Branch and tag names of the repository containing a checkout.
//!
//! The repository is discovered upwards from the given path, so linked
//! worktrees and submodules (where `.git` is a file) resolve to their refs.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{BranchType, ErrorCode, Repository};

const HEADS: &str = "refs/heads/";

/// Local branch names in sorted order; empty outside a repository.
pub fn branch_names(repo_root: &Path) -> Result<Vec<String>> {
    let Some(repo) = discover(repo_root)? else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for entry in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = entry?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Tag names in sorted order; empty outside a repository.
pub fn tag_names(repo_root: &Path) -> Result<Vec<String>> {
    let Some(repo) = discover(repo_root)? else {
        return Ok(Vec::new());
    };

    let mut names: Vec<String> = repo.tag_names(None)?.iter().flatten().map(str::to_string).collect();
    names.sort();
    Ok(names)
}

/// Branch `HEAD` points at, including an unborn branch in a fresh repository.
pub fn head_branch(repo_root: &Path) -> Option<String> {
    let repo = discover(repo_root).ok()??;
    let head = repo.find_reference("HEAD").ok()?;
    head.symbolic_target()?.strip_prefix(HEADS).map(str::to_string)
}

fn discover(path: &Path) -> Result<Option<Repository>> {
    match Repository::discover(path) {
        Ok(repo) => Ok(Some(repo)),
        Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("Failed to open repository at {}", path.display())),
    }
}
