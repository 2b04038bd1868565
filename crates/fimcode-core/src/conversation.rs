// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The model ↔ tool loop shared by the primary agent and subagents.
//!
//! The loop has no round limit: it runs until the model stops asking for
//! tools.  In interactive use the operator is the only timeout.

use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info};

use fimcode_model::{Block, CompletionRequest, Message, ModelProvider};
use fimcode_tools::{ToolCall, ToolEvent, ToolOutput, ToolRegistry};

use crate::events::AgentEvent;
use crate::state::{LoopState, TODO_REMINDER, TODO_TOOL};

/// Where a loop's intermediate output goes.
pub enum LoopOutput<'a> {
    /// Primary agent: text, tool activity and tool events become
    /// [`AgentEvent`]s.  Tool events are forwarded while the tool runs.
    Stream {
        tx: &'a mpsc::Sender<AgentEvent>,
        tool_events: &'a mut mpsc::Receiver<ToolEvent>,
    },
    /// Subagent: nothing is surfaced except `progress(tool_calls, elapsed)`
    /// after every tool call.
    Silent {
        progress: &'a (dyn Fn(usize, Duration) + Send + Sync),
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub rounds: u32,
    pub tool_calls: usize,
}

/// Drive `history` forward until the model produces a final answer.
///
/// Every tool call of a round is dispatched in the order the model emitted
/// it and answered with exactly one result block carrying the same id.  A
/// failing tool only ever produces error text; a failing model call is
/// returned as an error and ends the run.
pub async fn run_conversation(
    model: &dyn ModelProvider,
    history: &mut Vec<Message>,
    system: &str,
    tools: &ToolRegistry,
    max_tokens: u32,
    mut output: LoopOutput<'_>,
) -> anyhow::Result<LoopStats> {
    let started = Instant::now();
    let reminders_enabled = tools.contains(TODO_TOOL);
    let schemas = tools.schemas();
    let mut state = LoopState::new();
    let mut stats = LoopStats::default();

    while state.is_active {
        let round = state.begin_round();
        debug!(round, messages = history.len(), "conversation round");

        let req = CompletionRequest {
            system: system.to_string(),
            messages: history.clone(),
            tools: schemas.clone(),
            max_tokens,
        };
        let resp = model.complete(req).await.context("model completion failed")?;
        stats.rounds = round;

        if let LoopOutput::Stream { tx, .. } = &output {
            let _ = tx
                .send(AgentEvent::TokenUsage {
                    input: resp.usage.input_tokens,
                    output: resp.usage.output_tokens,
                })
                .await;
            for block in &resp.content {
                if let Some(text) = block.as_text() {
                    let _ = tx.send(AgentEvent::Text(text.to_string())).await;
                }
            }
        }

        let calls: Vec<ToolCall> = resp
            .content
            .iter()
            .filter_map(|b| match b {
                Block::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    args: input.clone(),
                }),
                _ => None,
            })
            .collect();
        let wants_tools = resp.requests_tools() && !calls.is_empty();
        history.push(Message::assistant(resp.content));

        if !wants_tools {
            info!(rounds = stats.rounds, tool_calls = stats.tool_calls, stop = %resp.stop_reason, "conversation finished");
            state.finish();
            break;
        }

        let mut results = Vec::with_capacity(calls.len() + 1);
        let mut used_todo = false;
        for call in &calls {
            used_todo |= call.name == TODO_TOOL;
            stats.tool_calls += 1;
            let out = run_tool(tools, call, &mut output, stats.tool_calls, started).await;
            results.push(Block::tool_result(out.call_id, out.content, out.is_error));
        }

        if state.record_round(used_todo) && reminders_enabled {
            debug!(rounds_without_todo = state.rounds_without_todo, "injecting todo reminder");
            results.insert(0, Block::text(TODO_REMINDER));
            if let LoopOutput::Stream { tx, .. } = &output {
                let _ = tx.send(AgentEvent::TodoReminder).await;
            }
        }
        history.push(Message::user_blocks(results));
    }

    Ok(stats)
}

async fn run_tool(
    tools: &ToolRegistry,
    call: &ToolCall,
    output: &mut LoopOutput<'_>,
    tool_calls: usize,
    started: Instant,
) -> ToolOutput {
    match output {
        LoopOutput::Stream { tx, tool_events } => {
            let _ = tx.send(AgentEvent::ToolCallStarted(call.clone())).await;

            let fut = tools.execute(call);
            tokio::pin!(fut);
            let out = loop {
                tokio::select! {
                    out = &mut fut => break out,
                    Some(ev) = tool_events.recv() => {
                        let _ = tx.send(ev.into()).await;
                    }
                }
            };
            while let Ok(ev) = tool_events.try_recv() {
                let _ = tx.send(ev.into()).await;
            }

            let _ = tx
                .send(AgentEvent::ToolCallFinished {
                    call_id: out.call_id.clone(),
                    tool_name: call.name.clone(),
                    output: out.content.clone(),
                    is_error: out.is_error,
                })
                .await;
            out
        }
        LoopOutput::Silent { progress } => {
            let out = tools.execute(call).await;
            (*progress)(tool_calls, started.elapsed());
            out
        }
    }
}
