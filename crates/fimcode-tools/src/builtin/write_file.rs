// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::tool::Tool;
use crate::{ToolError, Workspace};

#[derive(Debug, Deserialize)]
pub struct WriteFileInput {
    pub path: String,
    pub content: String,
}

/// Creates or overwrites a whole file, creating parent directories.
pub struct WriteFileTool {
    workspace: Workspace,
}

impl WriteFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    type Input = WriteFileInput;

    fn name(&self) -> &str { "write_file" }

    fn description(&self) -> &str {
        "将内容写入文件。根据需要创建父目录。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "文件的相对路径" },
                "content": { "type": "string", "description": "要写入的内容" }
            },
            "required": ["path", "content"]
        })
    }

    async fn call(&self, input: WriteFileInput) -> Result<String, ToolError> {
        let resolved = self.workspace.resolve(&input.path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(path = %resolved.display(), "write_file");
        tokio::fs::write(&resolved, input.content.as_bytes()).await?;

        let bytes = input.content.len();
        info!(path = %input.path, bytes, "file written");
        Ok(format!("向 {} 写入了 {} 字节", input.path, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parents_and_reports_utf8_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(Workspace::new(tmp.path()));
        let out = tool
            .call(WriteFileInput { path: "deep/nested/测试.txt".into(), content: "你好".into() })
            .await
            .unwrap();
        assert_eq!(out, "向 deep/nested/测试.txt 写入了 6 字节");
        let on_disk = std::fs::read_to_string(tmp.path().join("deep/nested/测试.txt")).unwrap();
        assert_eq!(on_disk, "你好");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "old content").unwrap();
        let tool = WriteFileTool::new(Workspace::new(tmp.path()));
        tool.call(WriteFileInput { path: "a.txt".into(), content: "new".into() })
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path().join("a.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn empty_path_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(Workspace::new(tmp.path()));
        let err = tool
            .call(WriteFileInput { path: String::new(), content: "x".into() })
            .await
            .unwrap_err();
        assert_eq!(err.render(), "错误：路径不能为空");
    }
}
