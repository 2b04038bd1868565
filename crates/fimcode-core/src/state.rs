// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT

/// Name of the task-list tool whose use resets the reminder counter.
pub const TODO_TOOL: &str = "todo_write";

/// Rounds without a task-list update that are tolerated before reminding.
pub const NAG_THRESHOLD: u32 = 10;

pub const TODO_REMINDER: &str =
    "<reminder>已超过 10 轮没有更新待办事项。请更新待办事项。</reminder>";

/// Per-invocation bookkeeping of one conversation loop.
///
/// Created fresh for every run (primary turn or subagent) and dropped when
/// the loop returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    pub round: u32,
    pub rounds_without_todo: u32,
    pub is_active: bool,
}

impl LoopState {
    pub fn new() -> Self {
        Self { round: 0, rounds_without_todo: 0, is_active: true }
    }

    pub fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    /// Account for a completed tool round.  Returns `true` when the
    /// reminder is due.
    pub fn record_round(&mut self, used_todo: bool) -> bool {
        self.rounds_without_todo = if used_todo { 0 } else { self.rounds_without_todo + 1 };
        self.rounds_without_todo > NAG_THRESHOLD
    }

    pub fn finish(&mut self) {
        self.is_active = false;
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new()
    }
}
