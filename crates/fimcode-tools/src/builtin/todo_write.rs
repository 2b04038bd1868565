// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::tool::Tool;
use crate::{TodoItemInput, TodoManager, ToolError, ToolEvent};

#[derive(Debug, Deserialize)]
pub struct TodoWriteInput {
    pub items: Vec<TodoItemInput>,
}

/// Replaces the shared task list and returns its rendered view.
pub struct TodoWriteTool {
    todos: Arc<Mutex<TodoManager>>,
    event_tx: mpsc::Sender<ToolEvent>,
}

impl TodoWriteTool {
    pub fn new(todos: Arc<Mutex<TodoManager>>, event_tx: mpsc::Sender<ToolEvent>) -> Self {
        Self { todos, event_tx }
    }
}

#[async_trait]
impl Tool for TodoWriteTool {
    type Input = TodoWriteInput;

    fn name(&self) -> &str { "todo_write" }

    fn description(&self) -> &str {
        "更新任务列表。用于计划和跟踪进度。\n\
         每次调用都提交完整列表（替换现有列表）。最多 20 项，同一时间只能有一项 in_progress。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "description": "完整的任务列表(替换现有列表)",
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": { "type": "string", "description": "任务描述" },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"],
                                "description": "任务状态"
                            },
                            "activeForm": {
                                "type": "string",
                                "description": "现在时动作，例如：'正在读取文件'"
                            }
                        },
                        "required": ["content", "status", "activeForm"]
                    }
                }
            },
            "required": ["items"]
        })
    }

    async fn call(&self, input: TodoWriteInput) -> Result<String, ToolError> {
        debug!(count = input.items.len(), "todo_write");
        let mut todos = self.todos.lock().await;
        let rendered = todos.update(input.items)?;
        // Display only; a full or closed channel must not fail the update.
        let _ = self.event_tx.try_send(ToolEvent::TodoUpdate(todos.items().to_vec()));
        Ok(rendered)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
