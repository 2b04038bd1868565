use anyhow::{bail, Context};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{Block, CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};

/// Anthropic Messages API (or any gateway speaking the same wire format).
pub struct AnthropicProvider {
    model: String,
    api_key: Option<String>,
    base_url: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        temperature: Option<f32>,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| "https://api.anthropic.com".into())
            .trim_end_matches('/')
            .to_string();
        Self {
            model,
            api_key,
            base_url,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        if self.base_url.ends_with("/v1") {
            format!("{}/messages", self.base_url)
        } else {
            format!("{}/v1/messages", self.base_url)
        }
    }

    pub(crate) fn request_body(&self, req: &CompletionRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(wire_message).collect();

        let tools: Vec<Value> = req.tools.iter().map(|t| json!({
            "name": t.name,
            "description": t.description,
            "input_schema": t.parameters,
        })).collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": req.max_tokens,
        });
        if !req.system.is_empty() {
            body["system"] = json!(req.system);
        }
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }
        body
    }
}

/// Serialize one message.  The API requires tool results to lead a user
/// message, so text blocks (such as an injected reminder) are moved after
/// them on the wire; the stored history keeps its own order.
fn wire_message(m: &Message) -> Value {
    let blocks: Vec<&Block> = if m.role == Role::User {
        let (results, rest): (Vec<&Block>, Vec<&Block>) =
            m.content.iter().partition(|b| b.is_tool_result());
        results.into_iter().chain(rest).collect()
    } else {
        m.content.iter().collect()
    };
    json!({ "role": m.role, "content": blocks })
}

#[async_trait]
impl crate::ModelProvider for AnthropicProvider {
    fn name(&self) -> &str { "anthropic" }
    fn model_name(&self) -> &str { &self.model }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<CompletionResponse> {
        let key = self.api_key.as_deref().context("ANTHROPIC_AUTH_TOKEN not set")?;
        let body = self.request_body(&req);

        debug!(model = %self.model, messages = req.messages.len(), tools = req.tools.len(), "sending anthropic request");

        let resp = self.client
            .post(self.endpoint())
            .header("x-api-key", key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .context("Anthropic request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Anthropic error {status}: {text}");
        }

        let v: Value = resp.json().await.context("decoding Anthropic response")?;
        parse_response(&v)
    }
}

/// Convert a Messages API response body into a [`CompletionResponse`].
///
/// Block types other than `text` and `tool_use` (e.g. `thinking`) are
/// dropped; they carry nothing the loop can act on.
pub(crate) fn parse_response(v: &Value) -> anyhow::Result<CompletionResponse> {
    if v["type"].as_str() == Some("error") {
        let msg = v["error"]["message"].as_str().unwrap_or("unknown error");
        bail!("Anthropic error: {msg}");
    }
    let raw_blocks = v["content"].as_array().context("response has no content array")?;

    let mut content = Vec::with_capacity(raw_blocks.len());
    for b in raw_blocks {
        match b["type"].as_str().unwrap_or("") {
            "text" => content.push(Block::text(b["text"].as_str().unwrap_or(""))),
            "tool_use" => content.push(Block::tool_use(
                b["id"].as_str().unwrap_or(""),
                b["name"].as_str().unwrap_or(""),
                b.get("input").cloned().unwrap_or_else(|| json!({})),
            )),
            other => warn!(block_type = other, "skipping unsupported content block"),
        }
    }

    let stop_reason = v["stop_reason"]
        .as_str()
        .map(StopReason::from_wire)
        .unwrap_or(StopReason::EndTurn);

    let usage = Usage {
        input_tokens: v["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: v["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(CompletionResponse { content, stop_reason, usage })
}
