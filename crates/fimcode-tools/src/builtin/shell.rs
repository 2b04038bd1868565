// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fimcode_config::ToolsConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::debug;

use crate::tool::Tool;
use crate::{truncate_chars, CommandGuard, ToolError};

#[derive(Debug, Deserialize)]
pub struct ShellInput {
    pub command: String,
}

/// Built-in `bash` tool: runs one command line in the workspace root.
pub struct ShellTool {
    work_dir: PathBuf,
    guard: CommandGuard,
    timeout_secs: u64,
    max_output_chars: usize,
}

impl ShellTool {
    pub fn new(work_dir: impl Into<PathBuf>, cfg: &ToolsConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            guard: CommandGuard::new(cfg.deny_patterns.clone()),
            timeout_secs: cfg.timeout_secs,
            max_output_chars: cfg.max_output_chars,
        }
    }
}

#[async_trait]
impl Tool for ShellTool {
    type Input = ShellInput;

    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        "执行shell命令。常见模式：\n\
         - 读取: cat/head/tail, grep/find/rg/ls, wc -l\n\
         - 写入: echo 'content' > file, sed -i 's/old/new/g' file\n\
         输出为 stdout 加 stderr，超出上限会被截断。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": { "type": "string", "description": "要执行的shell命令" }
            },
            "required": ["command"]
        })
    }

    async fn call(&self, input: ShellInput) -> Result<String, ToolError> {
        self.guard.check(&input.command)?;
        debug!(cmd = %input.command, "executing bash tool");

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(&input.command).current_dir(&self.work_dir);
        // No terminal access for the child; a timed-out child is killed when
        // its future is dropped.
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }

        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), cmd.output())
            .await
            .map_err(|_| ToolError::Timeout(self.timeout_secs))??;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let trimmed = combined.trim();
        debug!(status = ?output.status.code(), bytes = trimmed.len(), "bash finished");

        if trimmed.is_empty() {
            Ok("(无输出)".to_string())
        } else {
            Ok(truncate_chars(trimmed, self.max_output_chars))
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
