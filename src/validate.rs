//! Post-fix validation
//!
//! Re-runs the project's validation command against the patched tree.
//! The verdict comes from the exit status alone; output is captured only
//! so a failure can show a diagnostic tail.

use crate::util::truncate;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL_MS: u64 = 50;
const OUTPUT_TAIL_CHARS: usize = 1800;

/// Outcome of one validation run.
#[derive(Debug)]
pub struct Verdict {
    pub passed: bool,
    pub timed_out: bool,
    /// Truncated combined stdout/stderr, for the failure report only.
    pub output_tail: String,
}

/// Run `sh -c <command>` with `root` as working directory, bounded by
/// `timeout`. The child is killed and reaped if the bound is exceeded.
pub fn run_validation(root: &Path, command: &str, timeout: Duration) -> Result<Verdict, String> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to start validation command: {}", e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "Failed to capture stdout".to_string())?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| "Failed to capture stderr".to_string())?;

    let stdout_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let mut reader = BufReader::new(stdout);
        let _ = reader.read_to_end(&mut buf);
        buf
    });
    let stderr_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_end(&mut buf);
        buf
    });

    let start = Instant::now();
    let mut timed_out = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    timed_out = true;
                    let _ = child.kill();
                    break child.wait().ok();
                }
                thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
            }
            Err(e) => return Err(format!("Failed to wait for validation command: {}", e)),
        }
    };

    let stdout_bytes = stdout_handle.join().unwrap_or_default();
    let stderr_bytes = stderr_handle.join().unwrap_or_default();

    let mut combined = String::from_utf8_lossy(&stdout_bytes).to_string();
    let stderr_text = String::from_utf8_lossy(&stderr_bytes);
    if !stderr_text.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&stderr_text);
    }

    let passed = !timed_out && status.map(|s| s.success()).unwrap_or(false);

    Ok(Verdict {
        passed,
        timed_out,
        output_tail: truncate(combined.trim(), OUTPUT_TAIL_CHARS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minute() -> Duration {
        Duration::from_secs(60)
    }

    #[test]
    fn test_zero_exit_passes() {
        let dir = TempDir::new().unwrap();
        let verdict = run_validation(dir.path(), "exit 0", minute()).unwrap();
        assert!(verdict.passed);
        assert!(!verdict.timed_out);
    }

    #[test]
    fn test_nonzero_exit_fails() {
        let dir = TempDir::new().unwrap();
        let verdict = run_validation(dir.path(), "exit 3", minute()).unwrap();
        assert!(!verdict.passed);
        assert!(!verdict.timed_out);
    }

    #[test]
    fn test_verdict_ignores_output() {
        let dir = TempDir::new().unwrap();
        // Noisy but successful command must still pass
        let verdict = run_validation(dir.path(), "echo ERROR: scary; exit 0", minute()).unwrap();
        assert!(verdict.passed);
        assert!(verdict.output_tail.contains("ERROR: scary"));
    }

    #[test]
    fn test_runs_in_project_root() {
        let dir = TempDir::new().unwrap();
        let verdict = run_validation(dir.path(), "test -e marker", minute()).unwrap();
        assert!(!verdict.passed);

        std::fs::write(dir.path().join("marker"), "").unwrap();
        let verdict = run_validation(dir.path(), "test -e marker", minute()).unwrap();
        assert!(verdict.passed);
    }

    #[test]
    fn test_timeout_kills_and_fails() {
        let dir = TempDir::new().unwrap();
        let start = Instant::now();
        let verdict =
            run_validation(dir.path(), "sleep 30", Duration::from_millis(200)).unwrap();
        assert!(verdict.timed_out);
        assert!(!verdict.passed);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_failure_tail_captured() {
        let dir = TempDir::new().unwrap();
        let verdict = run_validation(dir.path(), "echo broken >&2; exit 1", minute()).unwrap();
        assert!(!verdict.passed);
        assert!(verdict.output_tail.contains("broken"));
    }
}
