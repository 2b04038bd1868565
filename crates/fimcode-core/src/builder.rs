// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Wiring of the primary agent.
//!
//! This is the single place where tools are registered.  The base set is
//! built first and frozen; the orchestration tools are layered on top, so
//! the `Task` tool only ever sees (and hands out) base tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use fimcode_config::Config;
use fimcode_model::ModelProvider;
use fimcode_runtime::{SkillLoader, SkillProvider};
use fimcode_tools::{
    EditFileTool, LoadSkillTool, ReadFileTool, ShellTool, TodoManager, TodoWriteTool, ToolEvent,
    ToolRegistry, Workspace, WriteFileTool,
};

use crate::agent::Agent;
use crate::task_tool::TaskTool;

/// Capacity of the tool-event channel between tools and the agent loop.
const TOOL_EVENT_CAPACITY: usize = 64;

/// Register the base tools: everything a subagent may be given.
pub fn build_base_registry(
    cfg: &Config,
    work_dir: &Path,
    todos: Arc<Mutex<TodoManager>>,
    tool_event_tx: mpsc::Sender<ToolEvent>,
) -> ToolRegistry {
    let workspace = Workspace::new(work_dir);

    let mut reg = ToolRegistry::new();
    reg.register(ShellTool::new(work_dir, &cfg.tools));
    reg.register(ReadFileTool::new(workspace.clone(), cfg.tools.max_output_chars));
    reg.register(WriteFileTool::new(workspace.clone()));
    reg.register(EditFileTool::new(workspace));
    reg.register(TodoWriteTool::new(todos, tool_event_tx));
    reg
}

pub struct AgentBuilder {
    config: Arc<Config>,
    work_dir: PathBuf,
    skills: Option<Arc<dyn SkillProvider>>,
}

impl AgentBuilder {
    pub fn new(config: Arc<Config>, work_dir: impl Into<PathBuf>) -> Self {
        Self { config, work_dir: work_dir.into(), skills: None }
    }

    /// Use `skills` instead of discovering them under `skills.dir`.
    pub fn with_skills(mut self, skills: Arc<dyn SkillProvider>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn build(self, model: Arc<dyn ModelProvider>) -> Agent {
        let cfg = &self.config;
        let skills: Arc<dyn SkillProvider> = match self.skills {
            Some(s) => s,
            None => Arc::new(SkillLoader::discover(&cfg.skills.resolve_dir(&self.work_dir))),
        };

        let (tool_event_tx, tool_event_rx) = mpsc::channel(TOOL_EVENT_CAPACITY);
        let todos = Arc::new(Mutex::new(TodoManager::new()));

        let base = build_base_registry(cfg, &self.work_dir, todos.clone(), tool_event_tx.clone());
        let mut full = base.clone();
        full.register(TaskTool::new(
            model.clone(),
            Arc::new(base),
            self.work_dir.clone(),
            cfg.agent.subagent_max_tokens,
            tool_event_tx,
        ));
        full.register(LoadSkillTool::new(skills.clone()));
        debug!(tools = ?full.names(), "tool registry ready");

        Agent::new(model, Arc::new(full), skills, todos, tool_event_rx, cfg, self.work_dir)
    }
}
