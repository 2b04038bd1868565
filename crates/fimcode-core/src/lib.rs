// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod agent;
mod agent_types;
mod builder;
mod conversation;
mod events;
mod prompts;
mod session;
mod state;
mod task_tool;

pub use agent::Agent;
pub use agent_types::{agent_descriptions, AgentType, AgentTypeConfig, AllowedTools, UnknownAgentType};
pub use builder::{build_base_registry, AgentBuilder};
pub use conversation::{run_conversation, LoopOutput, LoopStats};
pub use events::AgentEvent;
pub use prompts::{primary_system_prompt, subagent_system_prompt, PromptContext};
pub use session::{Session, SessionManager, SessionStats};
pub use state::{LoopState, NAG_THRESHOLD, TODO_REMINDER, TODO_TOOL};
pub use task_tool::{TaskTool, NO_SUBAGENT_TEXT};
