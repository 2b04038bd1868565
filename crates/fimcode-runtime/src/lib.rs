// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod skills;

pub use skills::{parse_skill_file, ParsedSkill, Skill, SkillLoader, SkillProvider};
