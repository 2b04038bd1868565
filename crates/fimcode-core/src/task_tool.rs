// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info};

use fimcode_model::{Message, ModelProvider, Role};
use fimcode_tools::{Tool, ToolError, ToolEvent, ToolRegistry, ToolScope};

use crate::agent_types::AgentType;
use crate::conversation::{run_conversation, LoopOutput};
use crate::prompts::subagent_system_prompt;

/// Returned when the subagent's final message carries no text.
pub const NO_SUBAGENT_TEXT: &str = "(子代理未返回文本)";

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub description: String,
    pub prompt: String,
    pub agent_type: String,
}

/// Spawns a subagent with a fresh history and returns its final answer.
///
/// `base` must only contain base-scope tools; the subagent's registry is
/// carved out of it, which is what keeps nesting one level deep.
pub struct TaskTool {
    model: Arc<dyn ModelProvider>,
    base: Arc<ToolRegistry>,
    work_dir: PathBuf,
    max_tokens: u32,
    event_tx: mpsc::Sender<ToolEvent>,
}

impl TaskTool {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        base: Arc<ToolRegistry>,
        work_dir: impl Into<PathBuf>,
        max_tokens: u32,
        event_tx: mpsc::Sender<ToolEvent>,
    ) -> Self {
        Self { model, base, work_dir: work_dir.into(), max_tokens, event_tx }
    }
}

#[async_trait]
impl Tool for TaskTool {
    type Input = TaskInput;

    fn name(&self) -> &str { "Task" }

    fn description(&self) -> &str {
        "为专注的子任务生成一个子代理。\n\
         子代理在隔离上下文中运行 - 它们看不到父代理的历史记录。\n\
         使用这个工具来保持主对话的清洁。\n\
         \n\
         代理类型：\n\
         - explore: 探索代码、查找文件、搜索的只读代理\n\
         - code: 实现功能和修复错误的完整代理\n\
         - plan: 设计实现策略的规划代理\n\
         \n\
         使用示例：\n\
         - Task(explore): \"找到所有使用认证模块的文件\"\n\
         - Task(plan): \"设计数据库迁移策略\"\n\
         - Task(code): \"实现用户注册表单\""
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "简短的任务名称(3-5个词)用于进度显示"
                },
                "prompt": {
                    "type": "string",
                    "description": "给子代理的详细指令"
                },
                "agent_type": {
                    "type": "string",
                    "enum": AgentType::ALL.map(AgentType::as_str),
                    "description": "要生成的代理类型"
                }
            },
            "required": ["description", "prompt", "agent_type"]
        })
    }

    fn scope(&self) -> ToolScope {
        ToolScope::Orchestration
    }

    async fn call(&self, input: TaskInput) -> Result<String, ToolError> {
        let agent_type: AgentType = input
            .agent_type
            .parse()
            .map_err(|_| ToolError::InvalidAgentType(input.agent_type.clone()))?;

        let tools = agent_type.tool_set(&self.base);
        let system = subagent_system_prompt(&self.work_dir, agent_type);
        let mut history = vec![Message::user(input.prompt)];
        let label = agent_type.to_string();
        let started = Instant::now();

        info!(agent_type = %label, description = %input.description, tools = ?tools.names(), "task: spawning subagent");
        let _ = self.event_tx.try_send(ToolEvent::SubagentStarted {
            agent_type: label.clone(),
            description: input.description.clone(),
        });

        let tx = self.event_tx.clone();
        let (progress_type, progress_desc) = (label.clone(), input.description.clone());
        let progress = move |tool_calls: usize, elapsed: Duration| {
            let _ = tx.try_send(ToolEvent::SubagentProgress {
                agent_type: progress_type.clone(),
                description: progress_desc.clone(),
                tool_calls,
                elapsed,
            });
        };

        let stats = run_conversation(
            self.model.as_ref(),
            &mut history,
            &system,
            &tools,
            self.max_tokens,
            LoopOutput::Silent { progress: &progress },
        )
        .await
        .map_err(|e| ToolError::Subagent(format!("{e:#}")))?;

        debug!(rounds = stats.rounds, tool_calls = stats.tool_calls, "task: subagent finished");
        let _ = self.event_tx.try_send(ToolEvent::SubagentFinished {
            agent_type: label,
            description: input.description,
            tool_calls: stats.tool_calls,
            elapsed: started.elapsed(),
        });

        Ok(final_text(&history))
    }
}

/// Text of the last assistant message, or the no-output sentinel.
fn final_text(history: &[Message]) -> String {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .and_then(|m| m.joined_text("\n"))
        .unwrap_or_else(|| NO_SUBAGENT_TEXT.to_string())
}
