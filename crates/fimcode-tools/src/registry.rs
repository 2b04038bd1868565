// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use fimcode_model::ToolSchema;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{DynTool, Tool, ToolCall, ToolError, ToolOutput, ToolScope};

/// Central registry holding all available tools.
///
/// Dispatch never fails outward: unknown names, bad arguments, handler
/// errors and handler panics all come back as error text.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tool` under its own name.  A duplicate name replaces the
    /// earlier entry and is logged.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.insert(Arc::new(tool));
    }

    /// Register an already shared tool.
    pub fn insert(&mut self, tool: Arc<dyn DynTool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "tool already registered, overwriting");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DynTool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Schemas for every registered tool, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        schemas_of(self.tools.values())
    }

    /// Schemas for the tools a subagent may receive.
    pub fn list_base(&self) -> Vec<ToolSchema> {
        schemas_of(self.tools.values().filter(|t| t.scope() == ToolScope::Base))
    }

    /// A registry holding only the base tools.
    pub fn base_view(&self) -> ToolRegistry {
        self.retain(|t| t.scope() == ToolScope::Base)
    }

    /// A registry holding only the named tools.  Unknown names are ignored.
    pub fn filtered(&self, names: &[&str]) -> ToolRegistry {
        self.retain(|t| names.iter().any(|n| *n == t.name()))
    }

    fn retain(&self, keep: impl Fn(&Arc<dyn DynTool>) -> bool) -> ToolRegistry {
        ToolRegistry {
            tools: self
                .tools
                .iter()
                .filter(|(_, t)| keep(t))
                .map(|(n, t)| (n.clone(), Arc::clone(t)))
                .collect(),
        }
    }

    /// Run a tool by name.  The handler runs in its own task so that a
    /// panic turns into [`ToolError::Panicked`].
    pub async fn try_dispatch(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        debug!(tool = %name, "dispatching tool");
        match tokio::spawn(async move { tool.call_json(args).await }).await {
            Ok(result) => result,
            Err(join) if join.is_panic() => Err(ToolError::Panicked(panic_message(join.into_panic()))),
            Err(join) => Err(ToolError::Panicked(join.to_string())),
        }
    }

    /// Run a tool by name and render any failure as error text.
    pub async fn dispatch(&self, name: &str, args: Value) -> String {
        match self.try_dispatch(name, args).await {
            Ok(text) => text,
            Err(e) => e.render(),
        }
    }

    /// Run a model-issued call, correlating the output with its id.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        match self.try_dispatch(&call.name, call.args.clone()).await {
            Ok(text) => ToolOutput::ok(&call.id, text),
            Err(e) => {
                debug!(tool = %call.name, error = %e, "tool returned error");
                ToolOutput::err(&call.id, &e)
            }
        }
    }
}

fn schemas_of<'a>(tools: impl Iterator<Item = &'a Arc<dyn DynTool>>) -> Vec<ToolSchema> {
    let mut schemas: Vec<ToolSchema> = tools
        .map(|t| ToolSchema {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters_schema(),
        })
        .collect();
    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    schemas
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
