// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::fmt;
use std::str::FromStr;

use fimcode_tools::ToolRegistry;
use thiserror::Error;

/// The kinds of subagent the `Task` tool can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentType {
    Explore,
    Code,
    Plan,
}

/// Which base tools a subagent receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedTools {
    /// Every base tool.
    All,
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTypeConfig {
    pub description: &'static str,
    pub tools: AllowedTools,
    pub prompt: &'static str,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("无效的代理类型 '{0}'")]
pub struct UnknownAgentType(pub String);

const READ_ONLY_TOOLS: &[&str] = &["bash", "read_file"];

impl AgentType {
    pub const ALL: [AgentType; 3] = [AgentType::Explore, AgentType::Code, AgentType::Plan];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentType::Explore => "explore",
            AgentType::Code => "code",
            AgentType::Plan => "plan",
        }
    }

    pub fn config(self) -> AgentTypeConfig {
        match self {
            AgentType::Explore => AgentTypeConfig {
                description: "探索代码、查找文件、搜索的只读代理",
                tools: AllowedTools::Only(READ_ONLY_TOOLS),
                prompt: "你是一个探索代理。搜索和分析，但绝不修改文件。返回简洁的摘要。",
            },
            AgentType::Code => AgentTypeConfig {
                description: "实现功能和修复错误的完整代理",
                tools: AllowedTools::All,
                prompt: "你是一个编码代理。高效地实现请求的更改。",
            },
            AgentType::Plan => AgentTypeConfig {
                description: "设计实现策略的规划代理",
                tools: AllowedTools::Only(READ_ONLY_TOOLS),
                prompt: "你是一个规划代理。分析代码库并输出编号的实现计划。不要进行更改。",
            },
        }
    }

    /// The subagent's registry.  It is always carved out of the base
    /// subset, so orchestration tools can never reach a subagent.
    pub fn tool_set(self, registry: &ToolRegistry) -> ToolRegistry {
        let base = registry.base_view();
        match self.config().tools {
            AllowedTools::All => base,
            AllowedTools::Only(names) => base.filtered(names),
        }
    }
}

impl FromStr for AgentType {
    type Err = UnknownAgentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownAgentType(s.to_string()))
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `- name: description` for every agent type, one per line.
pub fn agent_descriptions() -> String {
    AgentType::ALL
        .iter()
        .map(|t| format!("- {}: {}", t, t.config().description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_names() {
        for t in AgentType::ALL {
            assert_eq!(t.as_str().parse::<AgentType>().unwrap(), t);
        }
    }

    #[test]
    fn parse_is_case_sensitive_and_rejects_unknown() {
        assert_eq!("Explore".parse::<AgentType>(), Err(UnknownAgentType("Explore".into())));
        assert_eq!(
            "wizard".parse::<AgentType>().unwrap_err().to_string(),
            "无效的代理类型 'wizard'"
        );
    }

    #[test]
    fn descriptions_list_all_three_in_order() {
        assert_eq!(
            agent_descriptions(),
            "- explore: 探索代码、查找文件、搜索的只读代理\n\
             - code: 实现功能和修复错误的完整代理\n\
             - plan: 设计实现策略的规划代理"
        );
    }

    #[test]
    fn only_code_gets_every_tool() {
        assert_eq!(AgentType::Code.config().tools, AllowedTools::All);
        assert_eq!(AgentType::Explore.config().tools, AllowedTools::Only(&["bash", "read_file"]));
        assert_eq!(AgentType::Plan.config().tools, AllowedTools::Only(&["bash", "read_file"]));
    }
}
