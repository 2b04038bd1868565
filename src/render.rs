// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Plain-text rendering of [`AgentEvent`]s for the terminal.

use std::io::{self, Write};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use fimcode_core::AgentEvent;
use fimcode_tools::ToolCall;

/// Characters of a tool result shown after the call.
const PREVIEW_CHARS: usize = 200;

pub struct EventPrinter<W: Write> {
    out: W,
}

impl<W: Write> EventPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print(&mut self, event: &AgentEvent) -> io::Result<()> {
        match event {
            AgentEvent::Text(text) => write!(self.out, "{text}")?,
            AgentEvent::ToolCallStarted(call) => {
                match call.name.as_str() {
                    "Task" => writeln!(self.out, "\n> 任务： {}", str_arg(call, "description"))?,
                    "Skill" => writeln!(self.out, "\n> 正在加载技能: {}", str_arg(call, "skill"))?,
                    name => writeln!(self.out, "\n> {name}")?,
                }
            }
            AgentEvent::ToolCallFinished { tool_name, output, .. } => match tool_name.as_str() {
                "Task" => {}
                "Skill" => writeln!(self.out, "  技能已加载({} 字符)", output.chars().count())?,
                _ => writeln!(self.out, "  {}", preview(output))?,
            },
            AgentEvent::SubagentStarted { agent_type, description } => {
                write!(self.out, " [{agent_type}] {description} ...")?;
            }
            AgentEvent::SubagentProgress { agent_type, description, tool_calls, elapsed } => {
                write!(
                    self.out,
                    "\r [{agent_type}] {description} ... {tool_calls} 个工具, {:.1}秒",
                    elapsed.as_secs_f64()
                )?;
            }
            AgentEvent::SubagentFinished { agent_type, description, tool_calls, elapsed } => {
                writeln!(
                    self.out,
                    "\r  [{agent_type}] {description} - 完成 ({tool_calls} 个工具, {:.1}s)",
                    elapsed.as_secs_f64()
                )?;
            }
            AgentEvent::TodoUpdate(items) => debug!(items = items.len(), "todo list updated"),
            AgentEvent::TodoReminder => debug!("todo reminder sent"),
            AgentEvent::TokenUsage { input, output } => trace!(input, output, "token usage"),
            AgentEvent::TurnComplete => writeln!(self.out)?,
        }
        self.out.flush()
    }
}

fn str_arg<'a>(call: &'a ToolCall, key: &str) -> &'a str {
    call.args.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

/// First [`PREVIEW_CHARS`] characters, with `...` when cut.
fn preview(output: &str) -> String {
    match output.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &output[..idx]),
        None => output.to_string(),
    }
}

/// Print events to stdout until every sender is gone.
pub async fn print_events(mut rx: mpsc::Receiver<AgentEvent>) {
    let mut printer = EventPrinter::new(io::stdout());
    while let Some(event) = rx.recv().await {
        if let Err(e) = printer.print(&event) {
            debug!(error = %e, "stdout closed, dropping agent output");
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
