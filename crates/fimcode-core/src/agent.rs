// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::info;

use fimcode_config::Config;
use fimcode_model::{Message, ModelProvider};
use fimcode_runtime::SkillProvider;
use fimcode_tools::{TodoManager, ToolEvent, ToolRegistry};

use crate::conversation::{run_conversation, LoopOutput, LoopStats};
use crate::events::AgentEvent;
use crate::prompts::{primary_system_prompt, PromptContext};

/// The primary agent: model, full tool registry and the fixed system prompt.
///
/// The agent holds no conversation; callers own the history and pass it in,
/// so a REPL session and a one-shot run look the same from here.
pub struct Agent {
    model: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    skills: Arc<dyn SkillProvider>,
    todos: Arc<Mutex<TodoManager>>,
    /// Receiving end of the channel whose sender was handed to stateful
    /// tools (`todo_write`, `Task`).
    tool_event_rx: mpsc::Receiver<ToolEvent>,
    work_dir: PathBuf,
    system_prompt: String,
    max_tokens: u32,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        skills: Arc<dyn SkillProvider>,
        todos: Arc<Mutex<TodoManager>>,
        tool_event_rx: mpsc::Receiver<ToolEvent>,
        config: &Config,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        let work_dir = work_dir.into();
        let skill_descriptions = skills.descriptions();
        let system_prompt = primary_system_prompt(&PromptContext {
            work_dir: &work_dir,
            skill_descriptions: &skill_descriptions,
            append: config.agent.append_system_prompt.as_deref(),
        });
        Self {
            model,
            tools,
            skills,
            todos,
            tool_event_rx,
            work_dir,
            system_prompt,
            max_tokens: config.model.max_tokens,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn skills(&self) -> &Arc<dyn SkillProvider> {
        &self.skills
    }

    /// The task list shared by this agent and every subagent it spawns.
    pub fn todos(&self) -> Arc<Mutex<TodoManager>> {
        self.todos.clone()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Append `input` as a user message and run the loop.
    pub async fn submit(
        &mut self,
        history: &mut Vec<Message>,
        input: &str,
        tx: &mpsc::Sender<AgentEvent>,
    ) -> anyhow::Result<LoopStats> {
        history.push(Message::user(input));
        self.run(history, tx).await
    }

    /// Run the loop on an existing history until the model stops asking
    /// for tools.  `TurnComplete` is sent only on success.
    pub async fn run(
        &mut self,
        history: &mut Vec<Message>,
        tx: &mpsc::Sender<AgentEvent>,
    ) -> anyhow::Result<LoopStats> {
        info!(model = self.model.model_name(), messages = history.len(), "turn started");
        let stats = run_conversation(
            self.model.as_ref(),
            history,
            &self.system_prompt,
            &self.tools,
            self.max_tokens,
            LoopOutput::Stream { tx, tool_events: &mut self.tool_event_rx },
        )
        .await?;
        let _ = tx.send(AgentEvent::TurnComplete).await;
        Ok(stats)
    }
}
