// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod builtin;
mod error;
mod events;
mod guard;
mod registry;
mod todo;
mod tool;
mod workspace;

pub use builtin::{
    edit_file::EditFileTool, load_skill::LoadSkillTool, read_file::ReadFileTool,
    shell::ShellTool, todo_write::TodoWriteTool, write_file::WriteFileTool,
};
pub use error::ToolError;
pub use events::ToolEvent;
pub use guard::CommandGuard;
pub use registry::ToolRegistry;
pub use todo::{TodoError, TodoItem, TodoItemInput, TodoManager, TodoStatus, MAX_TODO_ITEMS};
pub use tool::{DynTool, Tool, ToolCall, ToolOutput, ToolScope};
pub use workspace::{PathError, Workspace};

/// Cap a tool result at `max_chars` characters (not bytes).
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
