// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Skill discovery and parsing.
//!
//! A skill is a **directory** under the skills root that contains a
//! `SKILL.md` file:
//!
//! ```text
//! skills/
//! ├── pdf/
//! │   ├── SKILL.md          → skill "pdf"
//! │   ├── scripts/          → helper scripts the model may run
//! │   ├── references/       → extra documentation
//! │   └── assets/           → templates, output files
//! └── mcp-builder/
//!     └── SKILL.md
//! ```
//!
//! Only names and descriptions are ever shown in the system prompt.  The
//! body is handed out on request through [`SkillProvider::load`], so the
//! prompt prefix stays stable and cacheable.
//!
//! ## SKILL.md format
//!
//! ```markdown
//! ---
//! name: pdf            # optional, defaults to the directory name
//! description: 处理 PDF 文件。用于读取、创建或合并 PDF。
//! ---
//!
//! # PDF 处理技能
//! ...
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

// ── Collaborator contract ─────────────────────────────────────────────────────

/// What the agent needs from a skill source.
pub trait SkillProvider: Send + Sync {
    /// `- name: description` lines for the system prompt, or a fixed
    /// placeholder when no skills exist.
    fn descriptions(&self) -> String;

    /// Expanded instructional text for `name`, `None` when unknown.
    fn load(&self, name: &str) -> Option<String>;

    /// Names of all loaded skills, sorted.
    fn names(&self) -> Vec<String>;
}

// ── Public types ──────────────────────────────────────────────────────────────

/// A parsed skill package.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    /// Frontmatter `name:`, or the directory name.
    pub name: String,
    pub description: String,
    /// SKILL.md body: everything after the closing `---` fence, trimmed.
    pub body: String,
    /// Skill directory (parent of `SKILL.md`).
    pub dir: PathBuf,
}

/// Resource folders listed when a skill is loaded, with their labels.
const RESOURCE_DIRS: [(&str, &str); 3] = [
    ("scripts", "脚本"),
    ("references", "参考文档"),
    ("assets", "资源"),
];

/// Shown in the system prompt when no skill was found.
pub const NO_SKILLS: &str = "(没有可用的技能)";

const MAX_SKILL_FILE_BYTES: u64 = 256 * 1024; // 256 KB

// ── Internal frontmatter schema ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawFrontmatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parsed frontmatter fields plus the SKILL.md body.
#[derive(Debug)]
pub struct ParsedSkill {
    pub name: Option<String>,
    pub description: String,
    pub body: String,
}

/// Parse a raw SKILL.md string into its frontmatter fields and body.
///
/// Returns `None` when the frontmatter fence is missing, the YAML is
/// malformed, or `description` is empty.
#[must_use]
pub fn parse_skill_file(raw: &str) -> Option<ParsedSkill> {
    let rest = raw.trim_start_matches('\n').strip_prefix("---")?;
    let close = rest.find("\n---")?;
    let yaml_block = &rest[..close];
    // Skip the closing fence and the remainder of its line.
    let after_fence = &rest[close + 4..];
    let body = after_fence
        .split_once('\n')
        .map(|(_, b)| b)
        .unwrap_or("")
        .trim()
        .to_string();

    let fm: RawFrontmatter = serde_yaml::from_str(yaml_block).ok()?;
    let description = fm.description.trim().to_string();
    if description.is_empty() {
        return None;
    }

    Some(ParsedSkill {
        name: fm.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        description,
        body,
    })
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Skills discovered once at startup from `<root>/*/SKILL.md`.
#[derive(Debug, Default)]
pub struct SkillLoader {
    skills: BTreeMap<String, Skill>,
}

impl SkillLoader {
    /// Scan `root`.  A missing or unreadable root yields an empty loader.
    pub fn discover(root: &Path) -> Self {
        let mut loader = Self::default();
        let entries = match std::fs::read_dir(root) {
            Ok(e) => e,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "no skills directory");
                return loader;
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let skill_md = dir.join("SKILL.md");
            if !skill_md.is_file() {
                continue;
            }
            if let Some(skill) = try_load_skill(&dir, &skill_md) {
                debug!(name = %skill.name, "loaded skill");
                loader.insert(skill);
            }
        }

        info!(count = loader.skills.len(), root = %root.display(), "skills loaded");
        loader
    }

    /// Build a loader from already-parsed skills.
    pub fn from_skills(skills: impl IntoIterator<Item = Skill>) -> Self {
        let mut loader = Self::default();
        for s in skills {
            loader.insert(s);
        }
        loader
    }

    fn insert(&mut self, skill: Skill) {
        if let Some(prev) = self.skills.insert(skill.name.clone(), skill) {
            warn!(name = %prev.name, dir = %prev.dir.display(), "duplicate skill name, keeping the later one");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillProvider for SkillLoader {
    fn descriptions(&self) -> String {
        if self.skills.is_empty() {
            return NO_SKILLS.to_string();
        }
        self.skills
            .values()
            .map(|s| format!("- {}: {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn load(&self, name: &str) -> Option<String> {
        let skill = self.skills.get(name)?;
        let mut content = format!("# 技能: {}\n\n{}", skill.name, skill.body);

        let resources: Vec<String> = RESOURCE_DIRS
            .iter()
            .filter_map(|(folder, label)| {
                let files = list_files(&skill.dir.join(folder));
                (!files.is_empty()).then(|| format!("- {label}: {}", files.join(", ")))
            })
            .collect();

        if !resources.is_empty() {
            content.push_str(&format!(
                "\n\n**{} 中可用的资源:**\n{}",
                skill.dir.display(),
                resources.join("\n")
            ));
        }
        Some(content)
    }

    fn names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }
}

/// Plain files directly inside `dir`, sorted.  Missing directories are empty.
fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    files
}

/// Load one skill directory, warning and skipping on any problem.
fn try_load_skill(dir: &Path, skill_md: &Path) -> Option<Skill> {
    let size = skill_md.metadata().map(|m| m.len()).unwrap_or(0);
    if size > MAX_SKILL_FILE_BYTES {
        warn!(path = %skill_md.display(), size, max = MAX_SKILL_FILE_BYTES, "skipping oversized SKILL.md");
        return None;
    }

    let raw = match std::fs::read_to_string(skill_md) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %skill_md.display(), error = %e, "failed to read SKILL.md");
            return None;
        }
    };

    let Some(parsed) = parse_skill_file(&raw) else {
        warn!(path = %skill_md.display(), "failed to parse SKILL.md frontmatter, skipping");
        return None;
    };

    let name = parsed.name.or_else(|| {
        dir.file_name().map(|n| n.to_string_lossy().into_owned())
    })?;

    Some(Skill {
        name,
        description: parsed.description,
        body: parsed.body,
        dir: dir.to_path_buf(),
    })
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_skill(root: &Path, dir: &str, md: &str) -> PathBuf {
        let d = root.join(dir);
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join("SKILL.md"), md).unwrap();
        d
    }

    // ── parse_skill_file ──────────────────────────────────────────────────────

    #[test]
    fn parse_skill_file_valid() {
        let raw = "---\nname: pdf\ndescription: 处理 PDF 文件。\n---\n\n# PDF\nBody here.";
        let parsed = parse_skill_file(raw).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("pdf"));
        assert_eq!(parsed.description, "处理 PDF 文件。");
        assert_eq!(parsed.body, "# PDF\nBody here.");
    }

    #[test]
    fn parse_skill_file_body_preserved_with_dashes() {
        let raw = "---\ndescription: Desc.\n---\n\nParagraph one.\n\n---\n\nParagraph two.";
        let parsed = parse_skill_file(raw).unwrap();
        assert!(parsed.body.contains("Paragraph one."));
        assert!(parsed.body.contains("Paragraph two."));
    }

    #[test]
    fn parse_skill_file_quoted_values() {
        let raw = "---\nname: \"git\"\ndescription: 'Git helper'\n---\nBody";
        let parsed = parse_skill_file(raw).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("git"));
        assert_eq!(parsed.description, "Git helper");
    }

    #[test]
    fn parse_skill_file_missing_description_returns_none() {
        assert!(parse_skill_file("---\nname: x\n---\nBody").is_none());
    }

    #[test]
    fn parse_skill_file_without_frontmatter_returns_none() {
        assert!(parse_skill_file("# Just a heading\n\nNo frontmatter.").is_none());
    }

    #[test]
    fn parse_skill_file_unclosed_fence_returns_none() {
        assert!(parse_skill_file("---\ndescription: d\nBody").is_none());
    }

    // ── SkillLoader ───────────────────────────────────────────────────────────

    #[test]
    fn discover_missing_root_is_empty() {
        let loader = SkillLoader::discover(Path::new("/nonexistent/fimcode/skills"));
        assert!(loader.is_empty());
        assert_eq!(loader.descriptions(), NO_SKILLS);
    }

    #[test]
    fn discover_loads_valid_and_skips_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf", "---\nname: pdf\ndescription: PDF 工具\n---\nUse pdftotext.");
        write_skill(tmp.path(), "broken", "no frontmatter at all");
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let loader = SkillLoader::discover(tmp.path());
        assert_eq!(loader.names(), vec!["pdf".to_string()]);
        assert_eq!(loader.descriptions(), "- pdf: PDF 工具");
    }

    #[test]
    fn name_falls_back_to_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "code-review", "---\ndescription: Review code\n---\nSteps.");
        let loader = SkillLoader::discover(tmp.path());
        assert!(loader.get("code-review").is_some());
    }

    #[test]
    fn descriptions_are_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "b", "---\ndescription: second\n---\n");
        write_skill(tmp.path(), "a", "---\ndescription: first\n---\n");
        let loader = SkillLoader::discover(tmp.path());
        assert_eq!(loader.descriptions(), "- a: first\n- b: second");
    }

    #[test]
    fn load_without_resources() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf", "---\ndescription: d\n---\nBody text");
        let loader = SkillLoader::discover(tmp.path());
        assert_eq!(loader.load("pdf").unwrap(), "# 技能: pdf\n\nBody text");
        assert!(loader.load("nope").is_none());
    }

    #[test]
    fn load_lists_resource_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_skill(tmp.path(), "pdf", "---\ndescription: d\n---\nBody");
        fs::create_dir_all(dir.join("scripts")).unwrap();
        fs::write(dir.join("scripts/merge.py"), "").unwrap();
        fs::write(dir.join("scripts/split.sh"), "").unwrap();
        fs::create_dir_all(dir.join("assets")).unwrap();
        fs::write(dir.join("assets/template.docx"), "").unwrap();

        let loader = SkillLoader::discover(tmp.path());
        let content = loader.load("pdf").unwrap();
        let expected_tail = format!(
            "\n\n**{} 中可用的资源:**\n- 脚本: merge.py, split.sh\n- 资源: template.docx",
            dir.display()
        );
        assert!(content.ends_with(&expected_tail), "content: {content}");
        assert!(!content.contains("参考文档"));
    }
}
