// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::Path;

use crate::agent_types::{agent_descriptions, AgentType};

/// Inputs of the primary system prompt.
///
/// Everything here is fixed for the life of the process, so the prompt is
/// byte-identical across rounds and stays cacheable on the provider side.
#[derive(Debug)]
pub struct PromptContext<'a> {
    pub work_dir: &'a Path,
    /// Skill listing from the skill provider (names and descriptions only).
    pub skill_descriptions: &'a str,
    /// Text appended verbatim after the rules.
    pub append: Option<&'a str>,
}

/// The primary agent's system prompt.
pub fn primary_system_prompt(ctx: &PromptContext<'_>) -> String {
    let mut prompt = format!(
        "你是位于{work_dir}的编程代理。\n\
         循环：规划 -> 使用工具行动 -> 报告。\n\
         \n\
         **可用技能** (使用Skill工具调用，当任务匹配时)：\n\
         {skills}\n\
         \n\
         **可用的子代理**（使用Task工具进行专注的子任务）：\n\
         {agents}\n\
         \n\
         规则：\n\
         - 当任务匹配技能描述时立即使用Skill工具\n\
         - 对于需要专注探索或实现的子任务使用Task工具\n\
         - 使用todo_write跟踪多步骤工作\n\
         - 优先使用工具而不是解释。行动，而不仅仅是解释。\n\
         - 完成后，总结发生了什么变化。\n",
        work_dir = ctx.work_dir.display(),
        skills = ctx.skill_descriptions,
        agents = agent_descriptions(),
    );

    if let Some(extra) = ctx.append.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push('\n');
        prompt.push_str(extra);
        prompt.push('\n');
    }
    prompt
}

/// System prompt of a subagent.  No skill or subagent listing: a subagent
/// can use neither.
pub fn subagent_system_prompt(work_dir: &Path, agent_type: AgentType) -> String {
    format!(
        "你是一个在{}的{}子代理。\n{}\n完成任务并返回清晰、简洁的摘要。\n",
        work_dir.display(),
        agent_type,
        agent_type.config().prompt
    )
}
