// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The constrained task list behind the `todo_write` tool.
//!
//! The model always submits the whole list.  An update either passes every
//! check and replaces the stored list, or fails and leaves it untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on list length.
pub const MAX_TODO_ITEMS: usize = 20;

/// Rendered in place of an empty list.
pub const EMPTY_TODO_LIST: &str = "没有待办事项。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl FromStr for TodoStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        })
    }
}

/// A validated task-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    pub status: TodoStatus,
    /// Present-progressive description shown while the item is in progress.
    #[serde(rename = "activeForm")]
    pub active_form: String,
}

/// One entry as the model sent it.  Every field defaults so that missing
/// values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoItemInput {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "activeForm")]
    pub active_form: String,
}

impl TodoItemInput {
    pub fn new(content: &str, status: &str, active_form: &str) -> Self {
        Self {
            content: content.into(),
            status: status.into(),
            active_form: active_form.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("最多允许 {0} 项待办事项")]
    TooMany(usize),
    #[error("同一时间只能有一项任务进行中(in_progress)")]
    MultipleInProgress,
    #[error("第 {0} 项: 需要内容 (content)")]
    MissingContent(usize),
    #[error("第 {index} 项: 无效状态 '{status}'")]
    InvalidStatus { index: usize, status: String },
    #[error("第 {0} 项: 需要 activeForm")]
    MissingActiveForm(usize),
}

#[derive(Debug, Default)]
pub struct TodoManager {
    items: Vec<TodoItem>,
}

impl TodoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `items` and replace the list, returning the rendered view.
    ///
    /// On error the previous list is kept as it was.
    pub fn update(&mut self, items: Vec<TodoItemInput>) -> Result<String, TodoError> {
        match validate(items) {
            Ok(validated) => {
                debug!(count = validated.len(), "todo list replaced");
                self.items = validated;
                Ok(self.render())
            }
            Err(e) => {
                warn!(error = %e, "todo update rejected");
                Err(e)
            }
        }
    }

    /// One line per item in stored order, then a blank line and the
    /// completion summary.
    pub fn render(&self) -> String {
        if self.items.is_empty() {
            return EMPTY_TODO_LIST.to_string();
        }

        let mut lines: Vec<String> = self
            .items
            .iter()
            .map(|item| match item.status {
                TodoStatus::Completed => format!("[x] {}", item.content),
                TodoStatus::InProgress => format!("[>] {} <- {}", item.content, item.active_form),
                TodoStatus::Pending => format!("[ ] {}", item.content),
            })
            .collect();

        lines.push(format!("\n({}/{} 已完成)", self.completed_count(), self.items.len()));
        lines.join("\n")
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.status == TodoStatus::Completed).count()
    }

    pub fn in_progress(&self) -> Option<&TodoItem> {
        self.items.iter().find(|i| i.status == TodoStatus::InProgress)
    }
}

fn validate(items: Vec<TodoItemInput>) -> Result<Vec<TodoItem>, TodoError> {
    if items.len() > MAX_TODO_ITEMS {
        return Err(TodoError::TooMany(MAX_TODO_ITEMS));
    }

    let in_progress = items
        .iter()
        .filter(|i| i.status.parse::<TodoStatus>() == Ok(TodoStatus::InProgress))
        .count();
    if in_progress > 1 {
        return Err(TodoError::MultipleInProgress);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let index = i + 1;
            let content = raw.content.trim();
            if content.is_empty() {
                return Err(TodoError::MissingContent(index));
            }
            let status = raw
                .status
                .parse()
                .map_err(|_| TodoError::InvalidStatus { index, status: raw.status.clone() })?;
            let active_form = raw.active_form.trim();
            if active_form.is_empty() {
                return Err(TodoError::MissingActiveForm(index));
            }
            Ok(TodoItem {
                content: content.to_string(),
                status,
                active_form: active_form.to_string(),
            })
        })
        .collect()
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str, status: &str) -> TodoItemInput {
        TodoItemInput::new(content, status, &format!("正在{content}"))
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn single_pending_item_renders_exactly() {
        let mut m = TodoManager::new();
        let out = m
            .update(vec![TodoItemInput::new("写测试", "pending", "正在写测试")])
            .unwrap();
        assert_eq!(out, "[ ] 写测试\n\n(0/1 已完成)");
    }

    #[test]
    fn empty_list_renders_sentinel() {
        let mut m = TodoManager::new();
        assert_eq!(m.update(vec![]).unwrap(), EMPTY_TODO_LIST);
        assert_eq!(m.render(), "没有待办事项。");
    }

    #[test]
    fn mixed_statuses_render_in_order() {
        let mut m = TodoManager::new();
        let out = m
            .update(vec![
                item("读代码", "completed"),
                TodoItemInput::new("改代码", "in_progress", "正在修改代码"),
                item("跑测试", "pending"),
            ])
            .unwrap();
        assert_eq!(
            out,
            "[x] 读代码\n[>] 改代码 <- 正在修改代码\n[ ] 跑测试\n\n(1/3 已完成)"
        );
    }

    #[test]
    fn render_is_idempotent() {
        let mut m = TodoManager::new();
        m.update(vec![item("a", "pending"), item("b", "completed")]).unwrap();
        assert_eq!(m.render(), m.render());
    }

    // ── Normalisation ─────────────────────────────────────────────────────────

    #[test]
    fn text_fields_are_trimmed() {
        let mut m = TodoManager::new();
        m.update(vec![TodoItemInput::new("  写文档 ", "in_progress", " 正在写文档 ")]).unwrap();
        let stored = &m.items()[0];
        assert_eq!(stored.content, "写文档");
        assert_eq!(stored.status, TodoStatus::InProgress);
        assert_eq!(stored.active_form, "正在写文档");
        assert_eq!(m.in_progress().map(|i| i.content.as_str()), Some("写文档"));
    }

    #[test]
    fn status_must_match_exactly() {
        let mut m = TodoManager::new();
        m.update(vec![item("keep", "pending")]).unwrap();
        for status in ["IN_PROGRESS", "Pending", " completed"] {
            let err = m.update(vec![TodoItemInput::new("写测试", status, "正在写测试")]).unwrap_err();
            assert_eq!(err, TodoError::InvalidStatus { index: 1, status: status.into() });
        }
        assert_eq!(
            m.update(vec![TodoItemInput::new("写测试", "IN_PROGRESS", "正在写测试")])
                .unwrap_err()
                .to_string(),
            "第 1 项: 无效状态 'IN_PROGRESS'"
        );
        assert_eq!(m.items()[0].content, "keep");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn more_than_twenty_items_rejected_and_list_kept() {
        let mut m = TodoManager::new();
        m.update(vec![item("keep", "pending")]).unwrap();
        let too_many: Vec<_> = (0..21).map(|i| item(&format!("t{i}"), "pending")).collect();
        assert_eq!(m.update(too_many), Err(TodoError::TooMany(20)));
        assert_eq!(m.items().len(), 1);
        assert_eq!(m.items()[0].content, "keep");
    }

    #[test]
    fn exactly_twenty_items_accepted() {
        let mut m = TodoManager::new();
        let twenty: Vec<_> = (0..20).map(|i| item(&format!("t{i}"), "pending")).collect();
        assert!(m.update(twenty).is_ok());
    }

    #[test]
    fn two_in_progress_rejected() {
        let mut m = TodoManager::new();
        let err = m
            .update(vec![item("a", "in_progress"), item("b", "IN_PROGRESS")])
            .unwrap_err();
        assert_eq!(err, TodoError::MultipleInProgress);
        assert!(m.items().is_empty());
    }

    #[test]
    fn missing_content_reports_one_based_index() {
        let mut m = TodoManager::new();
        let err = m.update(vec![item("a", "pending"), item("  ", "pending")]).unwrap_err();
        assert_eq!(err.to_string(), "第 2 项: 需要内容 (content)");
    }

    #[test]
    fn invalid_status_is_quoted() {
        let mut m = TodoManager::new();
        let err = m.update(vec![item("a", "cancelled")]).unwrap_err();
        assert_eq!(err.to_string(), "第 1 项: 无效状态 'cancelled'");
    }

    #[test]
    fn missing_active_form_rejected() {
        let mut m = TodoManager::new();
        let err = m.update(vec![TodoItemInput::new("a", "pending", "")]).unwrap_err();
        assert_eq!(err, TodoError::MissingActiveForm(1));
    }

    #[test]
    fn failed_update_is_all_or_nothing() {
        let mut m = TodoManager::new();
        m.update(vec![item("first", "completed")]).unwrap();
        let before = m.render();
        // The first entry is valid, the second is not: nothing is applied.
        assert!(m.update(vec![item("new", "pending"), item("", "pending")]).is_err());
        assert_eq!(m.render(), before);
    }

    #[test]
    fn wire_format_uses_active_form_camel_case() {
        let parsed: TodoItemInput =
            serde_json::from_str(r#"{"content":"x","status":"pending","activeForm":"正在x"}"#).unwrap();
        assert_eq!(parsed.active_form, "正在x");
        let item = TodoItem {
            content: "x".into(),
            status: TodoStatus::InProgress,
            active_form: "y".into(),
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["activeForm"], "y");
        assert_eq!(v["status"], "in_progress");
    }
}
