// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Conversation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block of a message.
///
/// The serde shape is the Anthropic Messages wire format, so a `Message`
/// serializes directly into a request body entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse { id: id.into(), name: name.into(), input }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult { .. })
    }
}

/// A single conversation message.  Messages are never edited once they are
/// part of a history; the loop only appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Block>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: vec![Block::text(text)] }
    }

    pub fn user_blocks(content: Vec<Block>) -> Self {
        Self { role: Role::User, content }
    }

    pub fn assistant(content: Vec<Block>) -> Self {
        Self { role: Role::Assistant, content }
    }

    /// Iterate over the text blocks of this message.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(Block::as_text)
    }

    /// Text blocks joined with `sep`, or `None` when there are none.
    pub fn joined_text(&self, sep: &str) -> Option<String> {
        let parts: Vec<&str> = self.texts().collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(sep))
        }
    }

    /// The `(id, name, input)` triple of every tool-use block, in order.
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.content.iter().filter_map(|b| match b {
            Block::ToolUse { id, name, input } => Some((id.as_str(), name.as_str(), input)),
            _ => None,
        })
    }
}

// ─── Requests and responses ───────────────────────────────────────────────────

/// A tool declaration as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool input.
    pub parameters: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Why the model stopped generating.  Only [`StopReason::ToolUse`] asks the
/// caller to run tools and continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    Other(String),
}

impl StopReason {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "end_turn" => Self::EndTurn,
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndTurn => write!(f, "end_turn"),
            Self::ToolUse => write!(f, "tool_use"),
            Self::MaxTokens => write!(f, "max_tokens"),
            Self::StopSequence => write!(f, "stop_sequence"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: Vec<Block>,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl CompletionResponse {
    /// A terminal reply consisting of one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Block::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }

    /// A reply requesting tool execution.
    pub fn tool_use(content: Vec<Block>) -> Self {
        Self {
            content,
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        }
    }

    pub fn requests_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blocks_use_anthropic_wire_tags() {
        let v = serde_json::to_value(Block::tool_use("t1", "bash", json!({"command": "ls"}))).unwrap();
        assert_eq!(v["type"], "tool_use");
        assert_eq!(v["input"]["command"], "ls");

        let v = serde_json::to_value(Block::text("hi")).unwrap();
        assert_eq!(v, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn tool_result_omits_false_error_flag() {
        let ok = serde_json::to_value(Block::tool_result("t1", "done", false)).unwrap();
        assert!(ok.get("is_error").is_none());
        let err = serde_json::to_value(Block::tool_result("t1", "bad", true)).unwrap();
        assert_eq!(err["is_error"], true);
    }

    #[test]
    fn message_role_is_lowercase() {
        let v = serde_json::to_value(Message::user("q")).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["content"][0]["text"], "q");
    }

    #[test]
    fn joined_text_skips_tool_blocks() {
        let m = Message::assistant(vec![
            Block::text("a"),
            Block::tool_use("t", "bash", json!({})),
            Block::text("b"),
        ]);
        assert_eq!(m.joined_text("\n").as_deref(), Some("a\nb"));
        assert_eq!(m.tool_uses().count(), 1);
    }

    #[test]
    fn joined_text_none_without_text() {
        let m = Message::assistant(vec![Block::tool_use("t", "bash", json!({}))]);
        assert!(m.joined_text("\n").is_none());
    }

    #[test]
    fn stop_reason_round_trips_unknown_values() {
        assert_eq!(StopReason::from_wire("tool_use"), StopReason::ToolUse);
        let other = StopReason::from_wire("pause_turn");
        assert_eq!(other.to_string(), "pause_turn");
    }
}
