// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;

use crate::{CompletionRequest, CompletionResponse};

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name for status display.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Send a completion request and wait for the whole response.
    ///
    /// Errors are transport, authentication or API failures; they are fatal
    /// for the current turn and are never retried here.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<CompletionResponse>;
}
