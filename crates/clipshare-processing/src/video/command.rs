//! External tool runner with bounded diagnostic capture.

use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Number of trailing stderr characters kept for diagnostics.
pub const DIAGNOSTIC_TAIL_CHARS: usize = 500;

#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr_tail: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr_tail: String,
    },
}

impl ToolError {
    /// Bounded human-readable diagnostic for error responses.
    pub fn diagnostic(&self) -> String {
        match self {
            ToolError::Spawn { program, source } => {
                let message = format!("failed to execute {}: {}", program, source);
                tail_chars(&message, DIAGNOSTIC_TAIL_CHARS)
            }
            ToolError::Failed {
                program,
                status,
                stderr_tail,
            } => {
                if stderr_tail.trim().is_empty() {
                    format!("{} exited with {}", program, status)
                } else {
                    stderr_tail.clone()
                }
            }
        }
    }
}

/// Last `max_chars` characters of `s`, never splitting a character.
pub fn tail_chars(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    s.chars().skip(count - max_chars).collect()
}

/// Run `program` to completion and map its exit status.
///
/// The child is killed if the returned future is dropped, so an enclosing
/// timeout also bounds the tool.
pub async fn run_tool(program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
    let start = std::time::Instant::now();

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr_tail = tail_chars(stderr.trim_end(), DIAGNOSTIC_TAIL_CHARS);

    if !output.status.success() {
        tracing::warn!(
            program = %program,
            status = %output.status,
            stderr = %stderr_tail,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "External tool failed"
        );
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr_tail,
        });
    }

    tracing::debug!(
        program = %program,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "External tool finished"
    );

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr_tail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tail_chars_respects_char_boundaries() {
        assert_eq!(tail_chars("abc", 5), "abc");
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("ééééé", 2), "éé");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_captures_stdout() {
        let output = run_tool("sh", &args(&["-c", "echo 12.5"])).await.unwrap();
        assert_eq!(output.stdout.trim(), "12.5");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_failure_keeps_bounded_stderr() {
        let script = "echo 'Invalid data found' >&2; printf 'x%.0s' $(seq 1 600) >&2; exit 3";
        let err = run_tool("sh", &args(&["-c", script])).await.unwrap_err();

        match &err {
            ToolError::Failed {
                status,
                stderr_tail,
                ..
            } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr_tail.chars().count(), DIAGNOSTIC_TAIL_CHARS);
                assert!(!stderr_tail.contains("Invalid data found"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(err.diagnostic().chars().count() <= DIAGNOSTIC_TAIL_CHARS);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tool_failure_with_empty_stderr() {
        let err = run_tool("false", &[]).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
        assert!(err.diagnostic().contains("false exited with"));
    }

    #[tokio::test]
    async fn test_run_tool_missing_program() {
        let err = run_tool("clipshare-no-such-tool", &[]).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
        assert!(err.diagnostic().contains("clipshare-no-such-tool"));
    }
}
