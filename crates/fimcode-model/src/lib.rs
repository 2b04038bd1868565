// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod anthropic;
mod mock;
mod provider;
mod types;
mod yaml_mock;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, ScriptedMockProvider};
pub use provider::ModelProvider;
pub use types::*;
pub use yaml_mock::YamlMockProvider;

use anyhow::bail;
use fimcode_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Provider selection:
/// - `"anthropic"` → [`AnthropicProvider`]
/// - `"mock"` → [`YamlMockProvider`] if a responses file is configured,
///   otherwise [`MockProvider`] (echo-back)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    match cfg.provider.as_str() {
        "anthropic" => Ok(Box::new(AnthropicProvider::new(
            cfg.name.clone(),
            resolve_api_key(cfg),
            cfg.base_url.clone(),
            cfg.temperature,
        ))),
        "mock" => {
            // Prefer env var, then config field
            let responses_path = std::env::var("FIMCODE_MOCK_RESPONSES").ok()
                .or_else(|| cfg.mock_responses_file.clone());
            match responses_path {
                Some(path) => Ok(Box::new(YamlMockProvider::from_file(&path)?)),
                None => Ok(Box::new(MockProvider)),
            }
        }
        other => bail!("unknown model provider: {other}"),
    }
}

fn resolve_api_key(cfg: &ModelConfig) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    cfg.api_key_env
        .as_deref()
        .and_then(|env| std::env::var(env).ok())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_is_the_default_provider() {
        let p = from_config(&ModelConfig::default()).unwrap();
        assert_eq!(p.name(), "anthropic");
        assert_eq!(p.model_name(), fimcode_config::DEFAULT_MODEL);
    }

    #[test]
    fn mock_without_file_echoes() {
        let cfg = ModelConfig { provider: "mock".into(), ..ModelConfig::default() };
        assert_eq!(from_config(&cfg).unwrap().name(), "mock");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cfg = ModelConfig { provider: "carrier-pigeon".into(), ..ModelConfig::default() };
        let err = from_config(&cfg).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let cfg = ModelConfig {
            api_key: Some("k".into()),
            api_key_env: Some("FIMCODE_TEST_UNSET_KEY_VAR".into()),
            ..ModelConfig::default()
        };
        assert_eq!(resolve_api_key(&cfg).as_deref(), Some("k"));
    }
}
