// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
/// YAML-configured mock model provider for end-to-end tests and demos.
///
/// The provider reads a YAML file that maps the latest user request to a
/// canned reply: either plain text, or a round of tool calls followed by a
/// text reply once the tool results come back.
///
/// # YAML format
///
/// ```yaml
/// responses:
///   - match_type: contains       # contains | equals | starts_with | regex | default
///     pattern: "ping"
///     reply: "pong"
///
///   - match_type: contains
///     pattern: "plan"
///     tool_calls:
///       - id: tc-1
///         tool: todo_write
///         args:
///           items:
///             - { content: "写测试", status: pending, activeForm: "正在写测试" }
///     after_tool_reply: "Plan recorded."
///
///   - match_type: default
///     reply: "I understand your request."
/// ```
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Block, CompletionRequest, CompletionResponse, Role};

// ─── YAML schema ─────────────────────────────────────────────────────────────

/// Root document.
#[derive(Debug, Deserialize)]
pub struct MockConfig {
    pub responses: Vec<ResponseRule>,
}

/// One entry in the responses list.
#[derive(Debug, Deserialize)]
pub struct ResponseRule {
    /// How to match the last user request.
    pub match_type: MatchType,
    /// Pattern string (ignored for `default`).
    #[serde(default)]
    pub pattern: String,
    /// Text reply when there are no tool calls, or after them when
    /// `after_tool_reply` is not set.
    pub reply: Option<String>,
    /// Tool calls to emit in the first round.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDef>,
    /// Text reply once the tool results have arrived.
    pub after_tool_reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    Equals,
    StartsWith,
    Regex,
    Default,
}

/// A single tool call defined in the YAML.
#[derive(Debug, Deserialize)]
pub struct ToolCallDef {
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// A model provider whose responses are driven by a YAML document.
pub struct YamlMockProvider {
    config: MockConfig,
}

impl YamlMockProvider {
    /// Load a provider from a YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mock responses file: {}", path.display()))?;
        Self::load(&text)
    }

    /// Load a provider from a YAML string.
    pub fn load(yaml: &str) -> anyhow::Result<Self> {
        let config: MockConfig = serde_yaml::from_str(yaml)
            .context("parsing mock responses YAML")?;
        Ok(Self { config })
    }

    fn find_rule(&self, user_text: &str) -> Option<&ResponseRule> {
        let lower = user_text.to_lowercase();
        let mut default_rule = None;

        for rule in &self.config.responses {
            let pattern = rule.pattern.to_lowercase();
            let hit = match rule.match_type {
                MatchType::Default => {
                    default_rule = default_rule.or(Some(rule));
                    false
                }
                MatchType::Contains => lower.contains(&pattern),
                MatchType::Equals => lower == pattern,
                MatchType::StartsWith => lower.starts_with(&pattern),
                MatchType::Regex => regex::Regex::new(&rule.pattern)
                    .map(|re| re.is_match(user_text))
                    .unwrap_or(false),
            };
            if hit {
                return Some(rule);
            }
        }

        default_rule
    }
}

#[async_trait]
impl crate::ModelProvider for YamlMockProvider {
    fn name(&self) -> &str { "yaml-mock" }
    fn model_name(&self) -> &str { "yaml-mock-model" }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        // Tool results are pending when the newest message carries them.
        let after_tools = req
            .messages
            .last()
            .is_some_and(|m| m.role == Role::User && m.content.iter().any(Block::is_tool_result));

        let last_user_text = req
            .messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::User)
            .find_map(|m| m.joined_text("\n"))
            .unwrap_or_default();

        debug!(after_tools, last_user = %last_user_text, "yaml mock complete()");

        let rule = self.find_rule(&last_user_text);

        let resp = if after_tools {
            let text = rule
                .and_then(|r| r.after_tool_reply.as_deref().or(r.reply.as_deref()))
                .unwrap_or("[no after-tool reply configured]");
            CompletionResponse::text(text)
        } else {
            match rule {
                None => CompletionResponse::text("[no mock rule matched]"),
                Some(r) if r.tool_calls.is_empty() => {
                    CompletionResponse::text(r.reply.as_deref().unwrap_or("[no reply configured]"))
                }
                Some(r) => CompletionResponse::tool_use(
                    r.tool_calls
                        .iter()
                        .map(|tc| Block::tool_use(&tc.id, &tc.tool, tc.args.clone()))
                        .collect(),
                ),
            }
        };
        Ok(resp)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
