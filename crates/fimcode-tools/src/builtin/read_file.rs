// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::ErrorKind;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::Tool;
use crate::{truncate_chars, ToolError, Workspace};

#[derive(Debug, Deserialize)]
pub struct ReadFileInput {
    pub path: String,
    /// Maximum number of lines to return
    #[serde(default)]
    pub limit: Option<usize>,
}

pub struct ReadFileTool {
    workspace: Workspace,
    max_output_chars: usize,
}

impl ReadFileTool {
    pub fn new(workspace: Workspace, max_output_chars: usize) -> Self {
        Self { workspace, max_output_chars }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    type Input = ReadFileInput;

    fn name(&self) -> &str { "read_file" }

    fn description(&self) -> &str {
        "读取文件内容。返回UTF-8文本。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "文件的相对路径" },
                "limit": { "type": "integer", "description": "最大读取行数（默认：全部）" }
            },
            "required": ["path"]
        })
    }

    async fn call(&self, input: ReadFileInput) -> Result<String, ToolError> {
        let resolved = self.workspace.resolve(&input.path)?;
        debug!(path = %resolved.display(), limit = ?input.limit, "read_file");

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ToolError::NotFound(input.path)),
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<&str> = content.split('\n').collect();
        let text = match input.limit {
            Some(limit) if limit > 0 && limit < lines.len() => {
                let mut kept = lines[..limit].join("\n");
                kept.push_str(&format!("\n... (还有 {} 行)", lines.len() - limit));
                kept
            }
            _ => content,
        };
        Ok(truncate_chars(&text, self.max_output_chars))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn setup(content: &str) -> (tempfile::TempDir, ReadFileTool) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), content).unwrap();
        let tool = ReadFileTool::new(Workspace::new(tmp.path()), 50_000);
        (tmp, tool)
    }

    fn input(path: &str, limit: Option<usize>) -> ReadFileInput {
        ReadFileInput { path: path.into(), limit }
    }

    #[tokio::test]
    async fn reads_whole_file() {
        let (_tmp, tool) = setup("a\nb\nc");
        assert_eq!(tool.call(input("notes.txt", None)).await.unwrap(), "a\nb\nc");
    }

    #[tokio::test]
    async fn limit_adds_remaining_marker() {
        let (_tmp, tool) = setup("1\n2\n3\n4\n5");
        let out = tool.call(input("notes.txt", Some(2))).await.unwrap();
        assert_eq!(out, "1\n2\n... (还有 3 行)");
    }

    #[tokio::test]
    async fn limit_at_or_above_line_count_returns_everything() {
        let (_tmp, tool) = setup("1\n2");
        assert_eq!(tool.call(input("notes.txt", Some(2))).await.unwrap(), "1\n2");
        assert_eq!(tool.call(input("notes.txt", Some(99))).await.unwrap(), "1\n2");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_tmp, tool) = setup("");
        let err = tool.call(input("ghost.rs", None)).await.unwrap_err();
        assert_eq!(err.render(), "错误：文件不存在 ghost.rs");
    }

    #[tokio::test]
    async fn escaping_the_workspace_is_refused() {
        let (_tmp, tool) = setup("");
        let err = tool.call(input("../secret", None)).await.unwrap_err();
        assert!(matches!(err, ToolError::Path(crate::PathError::Traversal)));
    }

    #[tokio::test]
    async fn output_is_capped_in_characters() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("long.txt"), "数据".repeat(100)).unwrap();
        let tool = ReadFileTool::new(Workspace::new(tmp.path()), 5);
        assert_eq!(tool.call(input("long.txt", None)).await.unwrap(), "数据数据数");
    }
}
