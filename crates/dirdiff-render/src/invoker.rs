//! Raw diff assembly for one file pair.

use crate::error::RenderError;
use crate::highlight::{check_tool_available, DeltaHighlighter, Highlighter, DEFAULT_TOOL};
use crate::options::DiffOptions;
use crate::unified::unified_diff_text;
use dirdiff_tree::compare;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Body of a raw diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    /// Unified diff text, styled when the external tool produced it.
    /// Empty when the files are identical.
    Text(String),
    /// Binary sentinel: non-text content on at least one side, no
    /// markup body.
    Binary,
}

/// Raw diff stream for one file pair, before markup conversion.
#[derive(Debug, Clone)]
pub struct RawDiff {
    pub content: RawContent,
    pub has_changes: bool,
    /// Set when the external highlighter could not be used and the
    /// unstyled built-in diff was served instead; the caller surfaces
    /// a one-time advisory.
    pub used_fallback: bool,
}

/// Produces raw diff streams, using the external highlighter when one
/// is available.
pub struct RenderInvoker {
    highlighter: Option<Arc<dyn Highlighter>>,
}

impl RenderInvoker {
    /// Probe for the default tool and configure accordingly.
    pub async fn detect() -> Self {
        if check_tool_available(DEFAULT_TOOL).await {
            info!("highlighting diffs with {}", DEFAULT_TOOL);
            Self {
                highlighter: Some(Arc::new(DeltaHighlighter::new())),
            }
        } else {
            info!("{} not found, serving plain diffs", DEFAULT_TOOL);
            Self { highlighter: None }
        }
    }

    /// Use a specific highlighter (tests substitute a fake here).
    pub fn with_highlighter(highlighter: Arc<dyn Highlighter>) -> Self {
        Self {
            highlighter: Some(highlighter),
        }
    }

    /// Never highlight; always serve the built-in diff.
    pub fn plain() -> Self {
        Self { highlighter: None }
    }

    pub fn has_highlighter(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Produce the raw diff stream for a file pair. Either side may
    /// be absent (added/deleted files); both absent is an error.
    pub async fn render(
        &self,
        left: Option<&Path>,
        right: Option<&Path>,
        options: &DiffOptions,
    ) -> Result<RawDiff, RenderError> {
        if left.is_none() && right.is_none() {
            return Err(RenderError::NothingToDiff);
        }

        for path in [left, right].into_iter().flatten() {
            if compare::is_binary(path)? {
                return self.binary_sentinel(left, right);
            }
        }

        let (old, new) = match (read_side(left)?, read_side(right)?) {
            (Some(old), Some(new)) => (old, new),
            // Not UTF-8 despite passing the probe: still binary.
            _ => return self.binary_sentinel(left, right),
        };

        let unified = unified_diff_text(&old, &new, options.collapsed);
        if unified.is_empty() {
            return Ok(RawDiff {
                content: RawContent::Text(String::new()),
                has_changes: false,
                used_fallback: false,
            });
        }

        match &self.highlighter {
            Some(highlighter) => match highlighter.highlight(&unified, options).await {
                Ok(styled) => Ok(RawDiff {
                    content: RawContent::Text(styled),
                    has_changes: true,
                    used_fallback: false,
                }),
                Err(err) => {
                    warn!("highlighter failed ({err}), serving plain diff");
                    Ok(RawDiff {
                        content: RawContent::Text(unified),
                        has_changes: true,
                        used_fallback: true,
                    })
                }
            },
            None => Ok(RawDiff {
                content: RawContent::Text(unified),
                has_changes: true,
                used_fallback: true,
            }),
        }
    }

    fn binary_sentinel(
        &self,
        left: Option<&Path>,
        right: Option<&Path>,
    ) -> Result<RawDiff, RenderError> {
        let has_changes = match (left, right) {
            (Some(left), Some(right)) => compare::files_differ(left, right)?,
            _ => true,
        };
        Ok(RawDiff {
            content: RawContent::Binary,
            has_changes,
            used_fallback: false,
        })
    }
}

/// Read one side as text. An absent side reads as empty; content that
/// is not valid UTF-8 reads as `None`.
fn read_side(path: Option<&Path>) -> Result<Option<String>, RenderError> {
    let Some(path) = path else {
        return Ok(Some(String::new()));
    };
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct FakeHighlighter;

    #[async_trait]
    impl Highlighter for FakeHighlighter {
        async fn highlight(
            &self,
            unified: &str,
            _options: &DiffOptions,
        ) -> Result<String, RenderError> {
            // Deterministic stand-in for delta: color every line red.
            Ok(unified
                .lines()
                .map(|line| format!("\x1b[31m{line}\x1b[0m\n"))
                .collect())
        }
    }

    struct FailingHighlighter;

    #[async_trait]
    impl Highlighter for FailingHighlighter {
        async fn highlight(
            &self,
            _unified: &str,
            _options: &DiffOptions,
        ) -> Result<String, RenderError> {
            Err(RenderError::ToolFailed {
                code: Some(2),
                stderr: "boom".into(),
            })
        }
    }

    fn fixture(contents: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, text) in contents {
            fs::write(dir.path().join(name), text).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_both_sides_absent_is_an_error() {
        let invoker = RenderInvoker::plain();
        let err = invoker
            .render(None, None, &DiffOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::NothingToDiff));
    }

    #[tokio::test]
    async fn test_plain_invoker_sets_fallback_advisory() {
        let dir = fixture(&[("a.txt", "hello\n"), ("b.txt", "hello world\n")]);
        let invoker = RenderInvoker::plain();
        let raw = invoker
            .render(
                Some(&dir.path().join("a.txt")),
                Some(&dir.path().join("b.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(raw.used_fallback);
        assert!(raw.has_changes);
        let RawContent::Text(text) = raw.content else {
            panic!("expected text content");
        };
        assert!(text.contains("-hello\n"));
        assert!(text.contains("+hello world\n"));
    }

    #[tokio::test]
    async fn test_identical_files_have_no_changes() {
        let dir = fixture(&[("a.txt", "same\n"), ("b.txt", "same\n")]);
        let invoker = RenderInvoker::plain();
        let raw = invoker
            .render(
                Some(&dir.path().join("a.txt")),
                Some(&dir.path().join("b.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(!raw.has_changes);
        assert_eq!(raw.content, RawContent::Text(String::new()));
    }

    #[tokio::test]
    async fn test_absent_side_diffs_against_empty() {
        let dir = fixture(&[("new.txt", "fresh\n")]);
        let invoker = RenderInvoker::plain();
        let raw = invoker
            .render(
                None,
                Some(&dir.path().join("new.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(raw.has_changes);
        let RawContent::Text(text) = raw.content else {
            panic!("expected text content");
        };
        assert!(text.contains("+fresh\n"));
    }

    #[tokio::test]
    async fn test_highlighter_output_is_used() {
        let dir = fixture(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
        let invoker = RenderInvoker::with_highlighter(Arc::new(FakeHighlighter));
        let raw = invoker
            .render(
                Some(&dir.path().join("a.txt")),
                Some(&dir.path().join("b.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(!raw.used_fallback);
        let RawContent::Text(text) = raw.content else {
            panic!("expected text content");
        };
        assert!(text.contains("\x1b[31m"));
    }

    #[tokio::test]
    async fn test_highlighter_failure_degrades_to_plain() {
        let dir = fixture(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
        let invoker = RenderInvoker::with_highlighter(Arc::new(FailingHighlighter));
        let raw = invoker
            .render(
                Some(&dir.path().join("a.txt")),
                Some(&dir.path().join("b.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(raw.used_fallback);
        let RawContent::Text(text) = raw.content else {
            panic!("expected text content");
        };
        assert!(text.contains("-one\n"));
        assert!(!text.contains('\x1b'));
    }

    #[tokio::test]
    async fn test_missing_tool_binary_degrades_to_plain() {
        let dir = fixture(&[("a.txt", "one\n"), ("b.txt", "two\n")]);
        let invoker = RenderInvoker::with_highlighter(Arc::new(
            DeltaHighlighter::with_program("definitely-not-a-diff-tool"),
        ));
        let raw = invoker
            .render(
                Some(&dir.path().join("a.txt")),
                Some(&dir.path().join("b.txt")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();

        assert!(raw.used_fallback);
        assert!(matches!(raw.content, RawContent::Text(_)));
    }

    #[tokio::test]
    async fn test_binary_sentinel() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), b"\x00\x01\x02").unwrap();
        fs::write(dir.path().join("b.bin"), b"\x00\x01\x03").unwrap();

        let invoker = RenderInvoker::plain();
        let raw = invoker
            .render(
                Some(&dir.path().join("a.bin")),
                Some(&dir.path().join("b.bin")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(raw.content, RawContent::Binary);
        assert!(raw.has_changes);

        fs::write(dir.path().join("c.bin"), b"\x00\x01\x02").unwrap();
        let raw = invoker
            .render(
                Some(&dir.path().join("a.bin")),
                Some(&dir.path().join("c.bin")),
                &DiffOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(raw.content, RawContent::Binary);
        assert!(!raw.has_changes);
    }
}
