// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

use crate::{PathError, TodoError};

/// Prefix the model sees on every failed tool result.
pub const ERROR_MARKER: &str = "错误：";

/// Every way a tool call can fail without aborting the conversation.
///
/// The `Display` text is the bare message; [`ToolError::render`] adds the
/// error marker when the failure becomes a tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("未知工具 '{0}'")]
    UnknownTool(String),

    #[error("工具 '{tool}' 参数无效: {reason}")]
    InvalidInput { tool: String, reason: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("文件不存在 {0}")]
    NotFound(String),

    #[error("在 {0} 中未找到文本")]
    TextNotFound(String),

    #[error("危险命令被阻止: {0}")]
    Blocked(String),

    #[error("命令超时 ({0} 秒)")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("未知的技能 '{name}'。可用技能：{available}")]
    UnknownSkill { name: String, available: String },

    #[error("无效的代理类型 '{0}'")]
    InvalidAgentType(String),

    #[error("子代理失败: {0}")]
    Subagent(String),

    #[error("工具执行异常: {0}")]
    Panicked(String),
}

impl ToolError {
    /// Model-facing text: the error marker followed by the message.
    pub fn render(&self) -> String {
        format!("{ERROR_MARKER}{self}")
    }
}
