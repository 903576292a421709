//! Git operations for publishing a validated fix
//!
//! Provides branch, stage, commit, and push operations plus the
//! authenticated-remote rewrite used before pushing.

use anyhow::{Context, Result};
use git2::{IndexAddOption, Repository, Signature};
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

/// Generate a branch name that cannot collide with prior runs.
pub fn unique_fix_branch_name() -> String {
    format!("fix/{}", Uuid::new_v4())
}

/// Create a new branch from current HEAD
pub fn create_branch(repo_path: &Path, name: &str) -> Result<()> {
    let repo = Repository::open(repo_path).context("Failed to open repository")?;
    let head = repo.head()?;
    let commit = head.peel_to_commit()?;

    repo.branch(name, &commit, false)
        .context(format!("Failed to create branch '{}'", name))?;

    Ok(())
}

/// Checkout an existing branch
pub fn checkout_branch(repo_path: &Path, name: &str) -> Result<()> {
    let repo = Repository::open(repo_path)?;

    let (object, reference) = repo
        .revparse_ext(name)
        .context(format!("Branch '{}' not found", name))?;

    repo.checkout_tree(&object, None)?;

    match reference {
        Some(r) => repo.set_head(r.name().unwrap_or("HEAD"))?,
        None => repo.set_head_detached(object.id())?,
    }

    Ok(())
}

/// Create branch and checkout in one step
pub fn create_and_checkout_branch(repo_path: &Path, name: &str) -> Result<()> {
    create_branch(repo_path, name)?;
    checkout_branch(repo_path, name)?;
    Ok(())
}

/// Stage all working-tree changes, untracked files included.
pub fn stage_all(repo_path: &Path) -> Result<()> {
    let repo = Repository::open(repo_path)?;
    let mut index = repo.index()?;

    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;

    Ok(())
}

/// Commit staged changes
pub fn commit(repo_path: &Path, message: &str) -> Result<String> {
    let repo = Repository::open(repo_path)?;
    let mut index = repo.index()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let head = repo.head()?;
    let parent = head.peel_to_commit()?;

    // Author info from git config, with a fallback identity
    let config = repo.config()?;
    let name = config
        .get_string("user.name")
        .unwrap_or_else(|_| "patchpilot".to_string());
    let email = config
        .get_string("user.email")
        .unwrap_or_else(|_| "patchpilot@local".to_string());

    let sig = Signature::now(&name, &email)?;

    let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

    Ok(oid.to_string())
}

/// Rewrite the origin remote so a push can authenticate with the token.
pub fn set_authenticated_remote(
    repo_path: &Path,
    owner: &str,
    repo_name: &str,
    token: &str,
) -> Result<()> {
    let repo = Repository::open(repo_path).context("Failed to open repository")?;
    let url = format!("https://{}@github.com/{}/{}.git", token, owner, repo_name);
    repo.remote_set_url("origin", &url)
        .context("Failed to update origin URL")?;
    Ok(())
}

/// Push current branch to remote (shells out to git)
pub fn push_branch(repo_path: &Path, branch: &str) -> Result<()> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(["push", "-u", "origin", branch])
        .output()
        .context("Failed to execute git push")?;

    if output.status.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "git push failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ))
    }
}
