//! Fix plan decoding
//!
//! The model's answer is a single JSON object. Decoding is strict: an
//! absent optional field gets its default, anything structurally wrong
//! is a terminal parse failure. No best-effort repair.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One whole-file replacement proposed by the model.
///
/// `corrected_content` is always the complete new file content, never a
/// diff fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEdit {
    pub file_path: String,
    #[serde(default)]
    pub explanation: String,
    pub corrected_content: String,
}

/// The model's structured diagnosis and proposed patch set.
#[derive(Debug, Clone, Deserialize)]
pub struct FixPlan {
    #[serde(default)]
    pub summary_title: Option<String>,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub root_cause: String,
    #[serde(default)]
    pub files_to_fix: Vec<FileEdit>,
    #[serde(default)]
    pub additional_notes: String,
}

impl FixPlan {
    /// PR title with the documented fallback for an absent summary.
    pub fn title(&self) -> &str {
        self.summary_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Automated build fix")
    }
}

/// Strip markdown code fences from a response
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if trimmed.starts_with("```json") {
        trimmed.strip_prefix("```json").unwrap_or(trimmed)
    } else if trimmed.starts_with("```") {
        trimmed.strip_prefix("```").unwrap_or(trimmed)
    } else {
        trimmed
    };
    let clean = if clean.ends_with("```") {
        clean.strip_suffix("```").unwrap_or(clean)
    } else {
        clean
    };
    clean.trim()
}

/// Decode the dispatcher's payload into a [`FixPlan`].
///
/// Fence stripping is the only cleanup performed; the decode itself is
/// one strict pass and a malformed payload is fatal.
pub fn parse_fix_plan(payload: &str) -> Result<FixPlan> {
    let clean = strip_markdown_fences(payload);
    serde_json::from_str(clean).context("Model response does not match the fix-plan schema")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_plan() {
        let json = r#"{
            "summary_title": "Fix null deref",
            "analysis": "The handler dereferences a missing user.",
            "root_cause": "No null check before access",
            "files_to_fix": [
                {
                    "file_path": "src/handler.js",
                    "explanation": "Guard the lookup",
                    "corrected_content": "function f(u) { if (!u) return; }"
                }
            ],
            "additional_notes": "Consider adding a test."
        }"#;
        let plan = parse_fix_plan(json).unwrap();
        assert_eq!(plan.title(), "Fix null deref");
        assert_eq!(plan.files_to_fix.len(), 1);
        assert_eq!(plan.files_to_fix[0].file_path, "src/handler.js");
    }

    #[test]
    fn test_absent_optionals_get_defaults() {
        let json = r#"{"files_to_fix": []}"#;
        let plan = parse_fix_plan(json).unwrap();
        assert_eq!(plan.title(), "Automated build fix");
        assert!(plan.analysis.is_empty());
        assert!(plan.root_cause.is_empty());
        assert!(plan.additional_notes.is_empty());
    }

    #[test]
    fn test_missing_files_to_fix_is_empty_plan() {
        let plan = parse_fix_plan(r#"{"summary_title": "nothing to do"}"#).unwrap();
        assert!(plan.files_to_fix.is_empty());
    }

    #[test]
    fn test_markdown_fenced_payload_accepted() {
        let fenced = "```json\n{\"files_to_fix\": []}\n```";
        assert!(parse_fix_plan(fenced).is_ok());
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        assert!(parse_fix_plan("I could not produce JSON, sorry").is_err());
        assert!(parse_fix_plan("{\"files_to_fix\": [").is_err());
    }

    #[test]
    fn test_wrong_type_is_fatal() {
        // files_to_fix must be a sequence, not a string
        assert!(parse_fix_plan(r#"{"files_to_fix": "src/handler.js"}"#).is_err());
        // corrected_content is required per edit
        let missing_content = r#"{"files_to_fix": [{"file_path": "a.js", "explanation": "x"}]}"#;
        assert!(parse_fix_plan(missing_content).is_err());
    }

    #[test]
    fn test_blank_summary_title_falls_back() {
        let plan = parse_fix_plan(r#"{"summary_title": "   ", "files_to_fix": []}"#).unwrap();
        assert_eq!(plan.title(), "Automated build fix");
    }
}
