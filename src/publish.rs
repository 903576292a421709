//! Publishing a validated fix
//!
//! Turns the patched working tree into a pushed branch and an open pull
//! request. Only reachable after validation passes; every step is fatal
//! on failure and nothing is cleaned up afterwards — a half-published
//! run is left for the operator.

use crate::git_ops;
use crate::github;
use crate::plan::FixPlan;
use anyhow::{Context, Result};
use std::path::Path;

const COMMIT_MESSAGE: &str = "Apply automated build fix";
const BASE_BRANCH: &str = "main";

/// Push the working tree on a fresh branch and open a pull request.
///
/// Returns the created pull request's URL.
pub async fn publish_fix(repo_path: &Path, plan: &FixPlan) -> Result<String> {
    let token = github::resolve_token()?;
    let (owner, repo) = github::get_remote_info(repo_path)?;
    git_ops::set_authenticated_remote(repo_path, &owner, &repo, &token)?;

    let branch = git_ops::unique_fix_branch_name();
    git_ops::create_and_checkout_branch(repo_path, &branch)
        .context("Failed to create fix branch")?;

    // Stage everything, not just the plan's edits: validation may have
    // regenerated lockfiles or other derived state worth shipping.
    git_ops::stage_all(repo_path)?;
    git_ops::commit(repo_path, COMMIT_MESSAGE)?;
    git_ops::push_branch(repo_path, &branch)?;

    github::create_pull_request(
        &token,
        &owner,
        &repo,
        BASE_BRANCH,
        &branch,
        plan.title(),
        &render_pr_body(plan),
    )
    .await
}

/// Render the pull-request description from the fix plan.
pub fn render_pr_body(plan: &FixPlan) -> String {
    let analysis = if plan.analysis.is_empty() {
        "No detailed analysis provided"
    } else {
        plan.analysis.as_str()
    };
    let root_cause = if plan.root_cause.is_empty() {
        "Root cause not identified"
    } else {
        plan.root_cause.as_str()
    };

    let mut body = format!(
        "# {}\n\n## Analysis\n\n{}\n\n## Root Cause\n\n{}\n\n## Files Modified\n\n",
        plan.title(),
        analysis,
        root_cause
    );

    if plan.files_to_fix.is_empty() {
        body.push_str("No files were modified.\n\n");
    } else {
        for (i, edit) in plan.files_to_fix.iter().enumerate() {
            let explanation = if edit.explanation.is_empty() {
                "No explanation provided"
            } else {
                edit.explanation.as_str()
            };
            body.push_str(&format!(
                "### {}. `{}`\n\n**Why this file was changed:**\n{}\n\n",
                i + 1,
                edit.file_path,
                explanation
            ));
        }
    }

    if !plan.additional_notes.trim().is_empty() {
        body.push_str(&format!(
            "## Additional Notes\n\n{}\n\n",
            plan.additional_notes
        ));
    }

    body.push_str("---\n*This PR was automatically generated by an AI-powered error fixing system*\n");
    body
}
