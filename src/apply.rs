//! Patch application
//!
//! Writes each proposed edit's full content to its target path, in plan
//! order. There is no rollback: a failed write stops the run and leaves
//! earlier writes on disk for the operator to inspect, so the report
//! keeps a per-file ledger instead of a single boolean.

use crate::plan::FileEdit;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Per-run ledger of what the applier did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Relative paths written, in application order.
    pub written: Vec<String>,
    /// The first failing path and its error, if any. Edits after it were
    /// not attempted.
    pub failed: Option<(String, String)>,
}

impl ApplyReport {
    pub fn fully_applied(&self) -> bool {
        self.failed.is_none()
    }

    /// Human label distinguishing fully, partially, and not-at-all applied.
    pub fn status_label(&self) -> &'static str {
        match (&self.failed, self.written.is_empty()) {
            (None, _) => "fully applied",
            (Some(_), false) => "partially applied",
            (Some(_), true) => "nothing applied",
        }
    }
}

/// Apply every edit to disk under `root`, stopping at the first failure.
pub fn apply_plan(root: &Path, edits: &[FileEdit]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for edit in edits {
        match write_edit(root, edit) {
            Ok(()) => report.written.push(edit.file_path.clone()),
            Err(err) => {
                report.failed = Some((edit.file_path.clone(), err));
                break;
            }
        }
    }

    report
}

fn write_edit(root: &Path, edit: &FileEdit) -> Result<(), String> {
    let target = resolve_target(root, Path::new(&edit.file_path))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directories: {}", e))?;
    }

    fs::write(&target, &edit.corrected_content).map_err(|e| format!("Failed to write: {}", e))
}

/// Resolve a plan path against the project root, rejecting paths that
/// would land outside it.
fn resolve_target(root: &Path, candidate: &Path) -> Result<PathBuf, String> {
    if candidate.as_os_str().is_empty() {
        return Err("Path is empty".to_string());
    }
    if candidate.is_absolute() {
        return Err(format!(
            "Absolute paths are not allowed: {}",
            candidate.display()
        ));
    }
    if candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(format!(
            "Parent traversal is not allowed: {}",
            candidate.display()
        ));
    }

    Ok(root.join(candidate))
}
