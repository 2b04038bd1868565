// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Duration;

use fimcode_tools::{TodoItem, ToolCall, ToolEvent};

/// Events emitted by the agent during a single turn.
/// The CLI subscribes to these to drive its output.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// A text block from the model
    Text(String),
    /// The model has requested a tool call
    ToolCallStarted(ToolCall),
    /// A tool call finished
    ToolCallFinished {
        call_id: String,
        tool_name: String,
        output: String,
        is_error: bool,
    },
    /// The todo list was updated
    TodoUpdate(Vec<TodoItem>),
    /// A task-list reminder was appended to this round's tool results
    TodoReminder,
    SubagentStarted {
        agent_type: String,
        description: String,
    },
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
    /// Token usage reported for one model call
    TokenUsage { input: u32, output: u32 },
    /// The agent has finished processing the current user turn
    TurnComplete,
}

impl From<ToolEvent> for AgentEvent {
    fn from(ev: ToolEvent) -> Self {
        match ev {
            ToolEvent::TodoUpdate(items) => AgentEvent::TodoUpdate(items),
            ToolEvent::SubagentStarted { agent_type, description } => {
                AgentEvent::SubagentStarted { agent_type, description }
            }
            ToolEvent::SubagentProgress { agent_type, description, tool_calls, elapsed } => {
                AgentEvent::SubagentProgress { agent_type, description, tool_calls, elapsed }
            }
            ToolEvent::SubagentFinished { agent_type, description, tool_calls, elapsed } => {
                AgentEvent::SubagentFinished { agent_type, description, tool_calls, elapsed }
            }
        }
    }
}
