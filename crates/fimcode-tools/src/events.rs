// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Duration;

use crate::TodoItem;

/// Events emitted by tools to communicate state changes back to the agent loop.
/// The agent translates these into `AgentEvent` variants for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    TodoUpdate(Vec<TodoItem>),
    SubagentStarted {
        agent_type: String,
        description: String,
    },
    /// Fired after every tool call inside a running subagent.
    SubagentProgress {
        agent_type: String,
        description: String,
        tool_calls: usize,
        elapsed: Duration,
    },
    SubagentFinished {
        agent_type: String,
        description: String,
        tool_calls: usize,
        elapsed: Duration,
    },
}
