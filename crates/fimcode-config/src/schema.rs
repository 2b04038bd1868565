// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application name shown in banners and used for the config directory.
pub const APP_NAME: &str = "FimCode";

/// Model used when neither the config files nor `FIMCODE_MODEL` name one.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Serde default helper returning `true`.
///
/// `#[serde(default)]` on a `bool` always falls back to `false`, so fields
/// that are enabled unless switched off need a named function.
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier: "anthropic" | "mock"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model name forwarded to the provider API
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Environment variable that holds the API key (read at runtime)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override for Anthropic-compatible gateways.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single completion of the primary loop
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature (0.0–1.0)
    #[serde(default)]
    pub temperature: Option<f32>,
    /// YAML file with canned responses, used when provider = "mock".
    #[serde(default)]
    pub mock_responses_file: Option<String>,
}

fn default_provider() -> String {
    "anthropic".into()
}
fn default_model_name() -> String {
    DEFAULT_MODEL.into()
}
fn default_api_key_env() -> Option<String> {
    Some("ANTHROPIC_AUTH_TOKEN".into())
}
fn default_max_tokens() -> u32 {
    8000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            name: default_model_name(),
            api_key_env: default_api_key_env(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: None,
            mock_responses_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// `max_tokens` for every completion issued by a subagent.
    #[serde(default = "default_max_tokens")]
    pub subagent_max_tokens: u32,
    /// Text appended after the rules section of the primary system prompt.
    #[serde(default)]
    pub append_system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            subagent_max_tokens: default_max_tokens(),
            append_system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Wall-clock limit for one `bash` invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Character cap applied to shell output and file reads
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
    /// Commands containing any of these substrings are refused
    #[serde(default = "default_deny_patterns")]
    pub deny_patterns: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    60
}
fn default_max_output_chars() -> usize {
    50_000
}
fn default_deny_patterns() -> Vec<String> {
    [
        "rm -rf /",
        "sudo",
        "shutdown",
        "reboot",
        "> /dev/",
        ":(){ :|: };",
        "mkfs",
        "dd if=/dev/zero",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_output_chars: default_max_output_chars(),
            deny_patterns: default_deny_patterns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Directory scanned for `*/SKILL.md`.  Relative paths are resolved
    /// against the working directory; `~` is expanded.
    #[serde(default = "default_skills_dir")]
    pub dir: String,
}

fn default_skills_dir() -> String {
    "skills".into()
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self { dir: default_skills_dir() }
    }
}

impl SkillsConfig {
    /// Absolute skills directory for a given working directory.
    pub fn resolve_dir(&self, work_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&self.dir);
        let path = PathBuf::from(expanded.as_ref());
        if path.is_absolute() {
            path
        } else {
            work_dir.join(path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when neither `RUST_LOG` nor `-v` is given
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write a daily log file
    #[serde(default = "default_true")]
    pub file: bool,
    /// Directory for log files; defaults to `~/.fimcode/logs`
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Resolved log directory, `None` when no home directory is known and
    /// no explicit directory was configured.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        match &self.dir {
            Some(d) => Some(PathBuf::from(shellexpand::tilde(d).as_ref())),
            None => dirs::home_dir().map(|h| h.join(".fimcode").join("logs")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which an inactive session may be cleaned up
    #[serde(default = "default_session_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_session_timeout_secs() -> u64 {
    30 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { timeout_secs: default_session_timeout_secs() }
    }
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_runtime_limits() {
        let cfg = Config::default();
        assert_eq!(cfg.model.provider, "anthropic");
        assert_eq!(cfg.model.name, DEFAULT_MODEL);
        assert_eq!(cfg.model.max_tokens, 8000);
        assert_eq!(cfg.agent.subagent_max_tokens, 8000);
        assert_eq!(cfg.tools.timeout_secs, 60);
        assert_eq!(cfg.tools.max_output_chars, 50_000);
        assert_eq!(cfg.session.timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn deny_patterns_cover_fork_bomb_and_mkfs() {
        let cfg = ToolsConfig::default();
        assert!(cfg.deny_patterns.iter().any(|p| p == ":(){ :|: };"));
        assert!(cfg.deny_patterns.iter().any(|p| p == "mkfs"));
    }

    #[test]
    fn empty_toml_deserializes_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.model.api_key_env.as_deref(), Some("ANTHROPIC_AUTH_TOKEN"));
        assert!(cfg.logging.file);
        assert_eq!(cfg.skills.dir, "skills");
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[tools]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(cfg.tools.timeout_secs, 5);
        assert_eq!(cfg.tools.max_output_chars, 50_000);
    }

    #[test]
    fn relative_skills_dir_resolves_against_work_dir() {
        let cfg = SkillsConfig::default();
        assert_eq!(cfg.resolve_dir(Path::new("/work")), PathBuf::from("/work/skills"));
    }

    #[test]
    fn absolute_skills_dir_is_kept() {
        let cfg = SkillsConfig { dir: "/opt/skills".into() };
        assert_eq!(cfg.resolve_dir(Path::new("/work")), PathBuf::from("/opt/skills"));
    }

    #[test]
    fn explicit_log_dir_wins() {
        let cfg = LoggingConfig { dir: Some("/var/log/fim".into()), ..LoggingConfig::default() };
        assert_eq!(cfg.resolve_dir(), Some(PathBuf::from("/var/log/fim")));
    }
}
