// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Tool that loads a named skill's full content into the conversation.
//!
//! The body comes back as an ordinary tool result.  The system prompt only
//! ever lists skill names and descriptions, so loading a skill never
//! changes the cached prompt prefix.

use std::sync::Arc;

use async_trait::async_trait;
use fimcode_runtime::SkillProvider;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::tool::{Tool, ToolScope};
use crate::ToolError;

#[derive(Debug, Deserialize)]
pub struct LoadSkillInput {
    pub skill: String,
}

pub struct LoadSkillTool {
    skills: Arc<dyn SkillProvider>,
}

impl LoadSkillTool {
    pub fn new(skills: Arc<dyn SkillProvider>) -> Self {
        Self { skills }
    }
}

#[async_trait]
impl Tool for LoadSkillTool {
    type Input = LoadSkillInput;

    fn name(&self) -> &str { "Skill" }

    fn description(&self) -> &str {
        "加载技能以获取任务的专门知识。\n\n\
         可用时机：\n\
         - 当用户任务匹配技能描述时立即使用\n\
         - 在尝试特定领域工作之前（PDF、MCP等）\n\n\
         技能内容将被注入到对话中，给你详细的说明和对资源的访问权限。"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skill": { "type": "string", "description": "要加载的技能名称" }
            },
            "required": ["skill"]
        })
    }

    fn scope(&self) -> ToolScope {
        ToolScope::Orchestration
    }

    async fn call(&self, input: LoadSkillInput) -> Result<String, ToolError> {
        let Some(content) = self.skills.load(&input.skill) else {
            let names = self.skills.names();
            let available = if names.is_empty() { "无".to_string() } else { names.join(", ") };
            warn!(skill = %input.skill, "unknown skill requested");
            return Err(ToolError::UnknownSkill { name: input.skill, available });
        };

        info!(skill = %input.skill, chars = content.chars().count(), "skill loaded");
        Ok(format!(
            "<skill-loaded name=\"{}\">\n{}\n</skill-loaded>\n\n按照上面技能的说明完成用户的任务。\n",
            input.skill, content
        ))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fimcode_runtime::{Skill, SkillLoader};

    use super::*;

    fn skill(name: &str, body: &str) -> Skill {
        Skill {
            name: name.into(),
            description: format!("{name} skill"),
            body: body.into(),
            dir: PathBuf::from("/nonexistent/skills").join(name),
        }
    }

    fn tool_with(skills: Vec<Skill>) -> LoadSkillTool {
        LoadSkillTool::new(Arc::new(SkillLoader::from_skills(skills)))
    }

    #[tokio::test]
    async fn known_skill_is_wrapped_in_tags() {
        let t = tool_with(vec![skill("pdf", "Use pdftotext.")]);
        let out = t.call(LoadSkillInput { skill: "pdf".into() }).await.unwrap();
        assert_eq!(
            out,
            "<skill-loaded name=\"pdf\">\n# 技能: pdf\n\nUse pdftotext.\n</skill-loaded>\n\n按照上面技能的说明完成用户的任务。\n"
        );
    }

    #[tokio::test]
    async fn unknown_skill_lists_available_names() {
        let t = tool_with(vec![skill("pdf", ""), skill("mcp-builder", "")]);
        let err = t.call(LoadSkillInput { skill: "xyz".into() }).await.unwrap_err();
        assert_eq!(err.render(), "错误：未知的技能 'xyz'。可用技能：mcp-builder, pdf");
    }

    #[tokio::test]
    async fn unknown_skill_with_none_loaded() {
        let t = tool_with(vec![]);
        let err = t.call(LoadSkillInput { skill: "xyz".into() }).await.unwrap_err();
        assert_eq!(err.render(), "错误：未知的技能 'xyz'。可用技能：无");
    }

    #[test]
    fn skill_tool_is_not_a_base_tool() {
        assert_eq!(tool_with(vec![]).scope(), ToolScope::Orchestration);
    }
}
