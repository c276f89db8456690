//! The external highlighter as an abstract, optional capability.

use crate::error::RenderError;
use crate::options::DiffOptions;
use async_trait::async_trait;
use log::{debug, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default highlighter binary.
pub const DEFAULT_TOOL: &str = "delta";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Styles a unified diff stream.
///
/// Implementations must preserve the stream's line structure: every
/// output line keeps the `+`/`-`/`@@` prefix of its input line, so
/// the converted markup stays classifiable.
#[async_trait]
pub trait Highlighter: Send + Sync {
    async fn highlight(&self, unified: &str, options: &DiffOptions)
        -> Result<String, RenderError>;
}

/// Probe for the highlighter binary. Absence is reported as `false`,
/// never as an error.
pub async fn check_tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Word-level diff styling via the `delta` subprocess.
///
/// Driven with `--color-only` so the output is the input, colored:
/// no side-by-side reflow, no gutters, no stripped markers.
pub struct DeltaHighlighter {
    program: String,
    timeout: Duration,
}

impl DeltaHighlighter {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_TOOL)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the subprocess wall-clock timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DeltaHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Highlighter for DeltaHighlighter {
    async fn highlight(
        &self,
        unified: &str,
        options: &DiffOptions,
    ) -> Result<String, RenderError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--color-only", "--paging=never", "--no-gitconfig"]);
        if options.show_whitespace {
            cmd.args(["--whitespace-error-style", "reverse"]);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            "spawning {} for {} bytes of diff",
            self.program,
            unified.len()
        );
        let mut child = cmd.spawn().map_err(RenderError::Launch)?;

        // Feed stdin while draining stdout, or a large diff deadlocks
        // both processes on full pipes. A write error means the tool
        // exited early; the exit status check below covers that.
        let stdin = child.stdin.take();
        let feed = async {
            if let Some(mut stdin) = stdin {
                if let Err(err) = stdin.write_all(unified.as_bytes()).await {
                    debug!("stdin write to {} ended early: {}", self.program, err);
                }
            }
        };

        // On expiry the child is dropped with the timed-out future
        // and killed via kill_on_drop.
        let wait = async {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };
        let output = match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("{} timed out after {:?}", self.program, self.timeout);
                return Err(RenderError::Timeout(self.timeout));
            }
        };

        // Exit code 1 is the tool's "differences found", not a failure.
        match output.status.code() {
            Some(0) | Some(1) => {}
            code => {
                return Err(RenderError::ToolFailed {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Identity highlighter: the unstyled stream passes through as-is.
pub struct PlainHighlighter;

#[async_trait]
impl Highlighter for PlainHighlighter {
    async fn highlight(
        &self,
        unified: &str,
        _options: &DiffOptions,
    ) -> Result<String, RenderError> {
        Ok(unified.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_reports_missing_binary_as_false() {
        assert!(!check_tool_available("definitely-not-a-diff-tool").await);
    }

    #[tokio::test]
    async fn test_plain_highlighter_is_identity() {
        let unified = "@@ -1,1 +1,1 @@\n-a\n+b\n";
        let styled = PlainHighlighter
            .highlight(unified, &DiffOptions::default())
            .await
            .unwrap();
        assert_eq!(styled, unified);
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_launch_failure() {
        let highlighter = DeltaHighlighter::with_program("definitely-not-a-diff-tool");
        let err = highlighter
            .highlight("@@ -1,1 +1,1 @@\n-a\n+b\n", &DiffOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Launch(_)));
    }
}
