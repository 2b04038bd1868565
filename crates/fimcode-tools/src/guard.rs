// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use tracing::warn;

use crate::ToolError;

/// Substring deny-list applied to shell commands before they run.
#[derive(Debug, Clone)]
pub struct CommandGuard {
    patterns: Vec<String>,
}

impl CommandGuard {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// The first matching pattern blocks the command.
    pub fn check(&self, command: &str) -> Result<(), ToolError> {
        match self.patterns.iter().find(|p| !p.is_empty() && command.contains(p.as_str())) {
            Some(pattern) => {
                warn!(%pattern, "command blocked");
                Err(ToolError::Blocked(pattern.clone()))
            }
            None => Ok(()),
        }
    }
}

impl Default for CommandGuard {
    fn default() -> Self {
        Self::new(fimcode_config::ToolsConfig::default().deny_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_block_dangerous_commands() {
        let g = CommandGuard::default();
        for cmd in [
            "rm -rf /",
            "sudo apt install x",
            "shutdown -h now",
            "echo hi > /dev/sda",
            ":(){ :|: };:",
            "mkfs.ext4 /dev/sdb1",
            "dd if=/dev/zero of=x",
        ] {
            assert!(g.check(cmd).is_err(), "{cmd} should be blocked");
        }
    }

    #[test]
    fn harmless_commands_pass() {
        let g = CommandGuard::default();
        assert!(g.check("ls -la").is_ok());
        assert!(g.check("cargo test 2>&1 | tail -20").is_ok());
    }

    #[test]
    fn blocked_message_names_the_pattern() {
        let g = CommandGuard::new(vec!["curl".into()]);
        let err = g.check("curl http://x").unwrap_err();
        assert_eq!(err.to_string(), "危险命令被阻止: curl");
    }

    #[test]
    fn empty_pattern_never_matches() {
        let g = CommandGuard::new(vec![String::new()]);
        assert!(g.check("anything").is_ok());
    }
}
