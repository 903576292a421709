//! Prompt assembly for the fix request
//!
//! Pure string building: the collected sources and the captured failure
//! output become one diagnostic request with a fixed response schema.

use crate::collect::SourceTree;

pub const FIX_SYSTEM: &str = "You are an expert software developer specializing in debugging build errors, test failures, and code issues across multiple programming languages and frameworks. You excel at analyzing error messages and providing precise fixes.";

const RESPONSE_SCHEMA: &str = r#"{
  "summary_title": "Short summary of the fix with max of 30 characters",
  "analysis": "Detailed explanation of what's causing the error",
  "root_cause": "Brief summary of the root cause",
  "files_to_fix": [
    {
      "file_path": "relative/path/to/file",
      "explanation": "Why this file needs to be changed",
      "corrected_content": "complete corrected file content here"
    }
  ],
  "additional_notes": "Any additional information or warnings"
}"#;

/// Build the user message for the fix request.
///
/// Deterministic given its inputs: files are embedded in the snapshot's
/// (sorted) order, the failure output verbatim, and a fixed instruction
/// block mandating the JSON response schema.
pub fn build_fix_prompt(sources: &SourceTree, failure_text: &str) -> String {
    let mut files_section = String::new();
    for (path, content) in sources {
        files_section.push_str(&format!("\n## File: {}\n```\n{}\n```\n", path, content));
    }

    format!(
        r#"I need help fixing build/test errors in my project.

## Project Context
This project contains source code that is failing to build or has failing tests. The project structure includes various source files, configuration files, and build scripts.

## Source Code Files
{files_section}

## Build/Test Error Output
```
{failure_text}
```

## Request
Please analyze the build/test error and the provided source code, then:

1. **Identify the root cause** of the error
2. **Explain what's wrong** in detail
3. **Provide the exact fix** with complete corrected code files
4. **Explain why** this fix resolves the issue

Important guidelines:
- Only modify EXISTING files shown in the source code above
- Provide complete file contents for any files that need changes
- Do NOT create new files unless absolutely necessary
- Focus on fixing the specific error reported
- Maintain the exact file structure and formatting
- For test failures, analyze what the test expects vs what the code provides

Please provide your response in the following JSON format:
{schema}

Make sure the JSON is valid and the corrected_content contains the complete source file with the fix applied.
"#,
        files_section = files_section,
        failure_text = failure_text,
        schema = RESPONSE_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SourceTree {
        let mut tree = SourceTree::new();
        tree.insert("src/main.rs".to_string(), "fn main() {}".to_string());
        tree.insert("Cargo.toml".to_string(), "[package]".to_string());
        tree
    }

    #[test]
    fn test_prompt_embeds_files_and_failure() {
        let prompt = build_fix_prompt(&sample_tree(), "error[E0308]: mismatched types");
        assert!(prompt.contains("## File: src/main.rs"));
        assert!(prompt.contains("fn main() {}"));
        assert!(prompt.contains("## File: Cargo.toml"));
        assert!(prompt.contains("error[E0308]: mismatched types"));
    }

    #[test]
    fn test_prompt_mandates_schema() {
        let prompt = build_fix_prompt(&sample_tree(), "boom");
        for key in [
            "summary_title",
            "analysis",
            "root_cause",
            "files_to_fix",
            "corrected_content",
            "additional_notes",
        ] {
            assert!(prompt.contains(key), "missing schema key {}", key);
        }
        assert!(prompt.contains("Only modify EXISTING files"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let tree = sample_tree();
        let a = build_fix_prompt(&tree, "boom");
        let b = build_fix_prompt(&tree, "boom");
        assert_eq!(a, b);
    }
}
