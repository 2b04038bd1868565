// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::Write;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use fimcode_config::{Config, APP_NAME};
use fimcode_core::{Agent, AgentEvent, SessionManager};
use fimcode_model::Message;

use crate::render::print_events;

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];

/// Capacity of the agent → printer channel.
const EVENT_CAPACITY: usize = 256;

/// `true` when `line` ends the session: empty input or an exit command.
pub fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || EXIT_COMMANDS.iter().any(|c| line.eq_ignore_ascii_case(c))
}

/// Run one turn, printing events as they arrive.
async fn run_turn(agent: &mut Agent, history: &mut Vec<Message>, input: &str) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<AgentEvent>(EVENT_CAPACITY);
    let printer = tokio::spawn(print_events(rx));
    let result = agent.submit(history, input, &tx).await;
    drop(tx);
    // The printer only ends once the channel is closed.
    let _ = printer.await;
    result.map(|_| ())
}

fn print_welcome(agent: &Agent) {
    let skills = agent.skills().names();
    let skills = if skills.is_empty() { "无".to_string() } else { skills.join(", ") };
    println!("\n{APP_NAME} - {}", agent.work_dir().display());
    println!("技能: {skills}");
    println!("输入任务请求，或输入 \"exit\" 退出\n");
}

/// Interactive session.  A failed turn is reported and the session goes on
/// with whatever the history holds at that point.
pub async fn run_repl(mut agent: Agent, config: &Config) -> anyhow::Result<()> {
    let mut sessions = SessionManager::new(agent.work_dir());
    let session_id = sessions.create(Some("REPL 会话")).id.clone();
    info!(session = %session_id, model = agent.model_name(), "repl started");

    print_welcome(&agent);

    let mut history = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("你：");
        std::io::stdout().flush().context("flushing prompt")?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        if is_exit(&line) {
            break;
        }

        match run_turn(&mut agent, &mut history, line.trim()).await {
            Ok(()) => sessions.increment_message_count(Some(&session_id)),
            Err(e) => {
                error!(error = %format!("{e:#}"), "turn failed");
                eprintln!("\n错误: {e:#}");
            }
        }
        println!();
        sessions.cleanup_expired(config.session.timeout());
    }

    println!("再见！");
    info!(session = %session_id, "repl finished");
    Ok(())
}

/// One-shot mode: a single turn on a fresh history.
pub async fn run_command(mut agent: Agent, task: &str) -> anyhow::Result<()> {
    let mut sessions = SessionManager::new(agent.work_dir());
    let session_id = sessions.create(Some("命令行会话")).id.clone();
    info!(session = %session_id, "running single command");

    let mut history = Vec::new();
    run_turn(&mut agent, &mut history, task).await?;
    sessions.increment_message_count(Some(&session_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands_are_case_insensitive() {
        for line in ["exit", "QUIT", " q ", "Exit", "", "   "] {
            assert!(is_exit(line), "{line:?}");
        }
        for line in ["quit now", "question", "退出"] {
            assert!(!is_exit(line), "{line:?}");
        }
    }
}
