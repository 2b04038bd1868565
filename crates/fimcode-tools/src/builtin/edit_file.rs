// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::ErrorKind;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::tool::Tool;
use crate::{ToolError, Workspace};

#[derive(Debug, Deserialize)]
pub struct EditFileInput {
    pub path: String,
    pub old_text: String,
    pub new_text: String,
}

/// Exact-text replacement.  Only the first occurrence is replaced.
pub struct EditFileTool {
    workspace: Workspace,
}

impl EditFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for EditFileTool {
    type Input = EditFileInput;

    fn name(&self) -> &str { "edit_file" }

    fn description(&self) -> &str {
        "替换文件中的精确文本。用于精确编辑。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "文件的相对路径" },
                "old_text": { "type": "string", "description": "要查找的精确文本（必须精确匹配）" },
                "new_text": { "type": "string", "description": "替换文本" }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn call(&self, input: EditFileInput) -> Result<String, ToolError> {
        let resolved = self.workspace.resolve(&input.path)?;

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ToolError::NotFound(input.path)),
            Err(e) => return Err(e.into()),
        };

        if !content.contains(&input.old_text) {
            return Err(ToolError::TextNotFound(input.path));
        }

        let updated = content.replacen(&input.old_text, &input.new_text, 1);
        tokio::fs::write(&resolved, updated).await?;
        info!(path = %input.path, "file edited");
        Ok(format!("已编辑 {}", input.path))
    }
}
