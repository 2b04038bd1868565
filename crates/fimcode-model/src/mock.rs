// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use crate::{Block, CompletionRequest, CompletionResponse, Role, Usage};

/// Deterministic mock provider.  Echoes the last user text back as the
/// assistant response.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl crate::ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        let reply = req
            .messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::User)
            .find_map(|m| m.joined_text("\n"))
            .unwrap_or_else(|| "[no input]".to_string());

        let mut resp = CompletionResponse::text(format!("MOCK: {reply}"));
        resp.usage = Usage { input_tokens: 10, output_tokens: 10 };
        Ok(resp)
    }
}

enum Scripted {
    Reply(CompletionResponse),
    Fail(String),
}

/// A pre-scripted mock provider.  Each call to `complete` pops the next
/// scripted response from the front of the queue, so tests can specify exact
/// sequences (including tool calls and failures) without network access.
pub struct ScriptedMockProvider {
    scripts: Mutex<VecDeque<Scripted>>,
    name: String,
    /// Every `CompletionRequest` seen by this provider, in call order.
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedMockProvider {
    /// Build a provider from an ordered list of responses.
    pub fn new(scripts: Vec<CompletionResponse>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(Scripted::Reply).collect()),
            name: "scripted-mock".into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a failing call after the scripts added so far.
    pub fn then_fail(self, msg: impl Into<String>) -> Self {
        if let Ok(mut s) = self.scripts.lock() {
            s.push_back(Scripted::Fail(msg.into()));
        }
        self
    }

    /// Convenience: provider that always returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![CompletionResponse::text(reply)])
    }

    /// Convenience: provider that returns one tool call followed by a text reply.
    pub fn tool_then_text(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            CompletionResponse::tool_use(vec![Block::tool_use(tool_id, tool_name, input)]),
            CompletionResponse::text(final_text),
        ])
    }

    /// Snapshot of all recorded requests.
    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait]
impl crate::ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        &self.name
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(req);
        }
        let next = self
            .scripts
            .lock()
            .map_err(|_| anyhow!("script queue poisoned"))?
            .pop_front();
        match next {
            Some(Scripted::Reply(resp)) => Ok(resp),
            Some(Scripted::Fail(msg)) => Err(anyhow!(msg)),
            // Default fallback when all scripts are consumed
            None => Ok(CompletionResponse::text("[no more scripts]")),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Message, ModelProvider, StopReason};

    fn req(text: &str) -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message::user(text)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn mock_echoes_last_user_message() {
        let r = MockProvider.complete(req("hi")).await.unwrap();
        assert_eq!(r.content, vec![Block::text("MOCK: hi")]);
        assert_eq!(r.stop_reason, StopReason::EndTurn);
    }

    #[tokio::test]
    async fn mock_skips_tool_result_only_messages() {
        let mut r = req("question");
        r.messages.push(Message::assistant(vec![Block::tool_use("t", "bash", json!({}))]));
        r.messages.push(Message::user_blocks(vec![Block::tool_result("t", "out", false)]));
        let resp = MockProvider.complete(r).await.unwrap();
        assert_eq!(resp.content, vec![Block::text("MOCK: question")]);
    }

    #[tokio::test]
    async fn scripted_pops_in_order_then_falls_back() {
        let p = ScriptedMockProvider::tool_then_text("t1", "bash", json!({"command": "ls"}), "done");
        let first = p.complete(req("a")).await.unwrap();
        assert!(first.requests_tools());
        let second = p.complete(req("b")).await.unwrap();
        assert_eq!(second.content, vec![Block::text("done")]);
        let third = p.complete(req("c")).await.unwrap();
        assert_eq!(third.content, vec![Block::text("[no more scripts]")]);
    }

    #[tokio::test]
    async fn scripted_records_every_request() {
        let p = ScriptedMockProvider::always_text("x");
        p.complete(req("one")).await.unwrap();
        p.complete(req("two")).await.unwrap();
        let recorded = p.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(p.last_request().unwrap().messages[0], Message::user("two"));
    }

    #[tokio::test]
    async fn scripted_failure_is_returned_as_error() {
        let p = ScriptedMockProvider::new(vec![]).then_fail("401 unauthorized");
        let err = p.complete(req("x")).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
