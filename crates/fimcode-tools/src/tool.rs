// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ToolError;

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Opaque identifier returned by the model (forwarded verbatim)
    pub id: String,
    pub name: String,
    /// Raw JSON arguments, validated against the tool's input type on dispatch
    pub args: Value,
}

/// The result of executing a tool, ready to become a `tool_result` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    /// If true, the tool execution failed non-fatally (content is the error text).
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: content.into(), is_error: false }
    }

    /// Error result.  `err` is rendered with the model-facing error marker.
    pub fn err(call_id: impl Into<String>, err: &ToolError) -> Self {
        Self { call_id: call_id.into(), content: err.render(), is_error: true }
    }
}

/// Which agents may see a tool.
///
/// `Base` tools are handed to subagents.  `Orchestration` tools (subagent
/// spawning, skill loading) exist only in the primary agent's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolScope {
    Base,
    Orchestration,
}

/// Trait that every built-in tool implements.
///
/// `Input` is the tool's typed argument struct.  The registry deserializes
/// the model's JSON into it before `call` runs, so handlers never see
/// untyped arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    type Input: DeserializeOwned + Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;
    fn scope(&self) -> ToolScope {
        ToolScope::Base
    }
    async fn call(&self, input: Self::Input) -> Result<String, ToolError>;
}

/// Object-safe view of a [`Tool`], used for storage in the registry.
///
/// Implemented for every `Tool`; there is no reason to implement it by hand.
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn scope(&self) -> ToolScope;
    async fn call_json(&self, args: Value) -> Result<String, ToolError>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }
    fn description(&self) -> &str {
        Tool::description(self)
    }
    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }
    fn scope(&self) -> ToolScope {
        Tool::scope(self)
    }

    async fn call_json(&self, args: Value) -> Result<String, ToolError> {
        let input: T::Input = serde_json::from_value(args).map_err(|e| ToolError::InvalidInput {
            tool: Tool::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.call(input).await
    }
}
