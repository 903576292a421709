//! Terminal classification of a run
//!
//! Every run ends in exactly one of these outcomes, reported as a log
//! line and an exit code.

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The scan found nothing to show the model.
    NoSourceFiles,
    /// The language-model service could not be reached or rejected the
    /// request. Transport failures are terminal, never retried.
    DispatchFailed,
    /// The model's payload did not match the fix-plan schema.
    ParseFailed,
    /// A well-formed plan with no edits. Nothing was written to disk.
    NoEditsProposed,
    /// One of the edits could not be written. Earlier writes remain.
    PatchWriteFailed,
    /// The fixes were applied but the validation command still fails.
    /// Patched files are left in place for manual follow-up.
    ValidationFailed,
    /// Validation passed and the pull request was opened.
    Published { pr_url: String },
    /// Validation passed but branch push or PR creation failed.
    PublishFailed,
}

impl RunOutcome {
    /// Process exit code for this outcome.
    ///
    /// `ValidationFailed` exits 0: the pipeline itself completed and a
    /// still-failing build is an expected result, not an error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Published { .. } | RunOutcome::ValidationFailed => 0,
            _ => 1,
        }
    }

    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::NoSourceFiles => "no-source-files",
            RunOutcome::DispatchFailed => "dispatch-failed",
            RunOutcome::ParseFailed => "parse-failed",
            RunOutcome::NoEditsProposed => "no-edits-proposed",
            RunOutcome::PatchWriteFailed => "patch-write-failed",
            RunOutcome::ValidationFailed => "validation-failed",
            RunOutcome::Published { .. } => "published",
            RunOutcome::PublishFailed => "publish-failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            RunOutcome::Published {
                pr_url: "https://github.com/o/r/pull/1".to_string()
            }
            .exit_code(),
            0
        );
        assert_eq!(RunOutcome::ValidationFailed.exit_code(), 0);

        for failed in [
            RunOutcome::NoSourceFiles,
            RunOutcome::DispatchFailed,
            RunOutcome::ParseFailed,
            RunOutcome::NoEditsProposed,
            RunOutcome::PatchWriteFailed,
            RunOutcome::PublishFailed,
        ] {
            assert_eq!(failed.exit_code(), 1, "{} should exit 1", failed.label());
        }
    }

    #[test]
    fn test_labels_are_distinct() {
        let outcomes = [
            RunOutcome::NoSourceFiles,
            RunOutcome::DispatchFailed,
            RunOutcome::ParseFailed,
            RunOutcome::NoEditsProposed,
            RunOutcome::PatchWriteFailed,
            RunOutcome::ValidationFailed,
            RunOutcome::PublishFailed,
        ];
        let labels: std::collections::HashSet<_> =
            outcomes.iter().map(|o| o.label()).collect();
        assert_eq!(labels.len(), outcomes.len());
    }
}
