// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("路径不能为空")]
    Empty,
    #[error("路径包含非法字符")]
    IllegalChar,
    #[error("路径包含非法的目录遍历")]
    Traversal,
    #[error("路径超出工作区: {0}")]
    OutsideWorkspace(String),
}

/// The directory the file tools are confined to.
///
/// Resolution is purely lexical, so it works for files that do not exist
/// yet.  Symlinks inside the workspace are not followed.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = if root.is_relative() {
            std::env::current_dir().map(|cwd| cwd.join(&root)).unwrap_or(root)
        } else {
            root
        };
        Self { root: normalize(&root) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check `path` and resolve it against the workspace root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, PathError> {
        validate(path)?;
        let resolved = normalize(&self.root.join(path));
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(PathError::OutsideWorkspace(path.to_string()))
        }
    }
}

/// Reject empty paths, NUL bytes and relative paths that climb above
/// their own starting point.
fn validate(path: &str) -> Result<(), PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if path.contains('\0') {
        return Err(PathError::IllegalChar);
    }

    let mut depth: i64 = 0;
    for part in path.split(['/', '\\']) {
        match part {
            ".." => depth -= 1,
            "." | "" => {}
            _ => depth += 1,
        }
        if depth < 0 {
            return Err(PathError::Traversal);
        }
    }
    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ws() -> Workspace {
        Workspace::new("/work/project")
    }

    #[test]
    fn relative_path_resolves_under_root() {
        assert_eq!(ws().resolve("src/main.rs").unwrap(), PathBuf::from("/work/project/src/main.rs"));
    }

    #[test]
    fn dot_segments_are_normalised() {
        assert_eq!(ws().resolve("./a/./b/../c.txt").unwrap(), PathBuf::from("/work/project/a/c.txt"));
    }

    #[test]
    fn nonexistent_file_still_resolves() {
        assert!(ws().resolve("new/dir/file.txt").is_ok());
    }

    #[test]
    fn empty_path_rejected() {
        assert_eq!(ws().resolve(""), Err(PathError::Empty));
        assert_eq!(ws().resolve("   "), Err(PathError::Empty));
    }

    #[test]
    fn nul_byte_rejected() {
        assert_eq!(ws().resolve("a\0b"), Err(PathError::IllegalChar));
    }

    #[test]
    fn climbing_above_start_rejected() {
        assert_eq!(ws().resolve("../etc/passwd"), Err(PathError::Traversal));
        assert_eq!(ws().resolve("a/../../b"), Err(PathError::Traversal));
        assert_eq!(ws().resolve("a\\..\\..\\b"), Err(PathError::Traversal));
    }

    #[test]
    fn descending_then_climbing_within_bounds_is_fine() {
        assert!(ws().resolve("a/b/../../c").is_ok());
    }

    #[test]
    fn absolute_path_outside_root_rejected() {
        assert_eq!(
            ws().resolve("/etc/passwd"),
            Err(PathError::OutsideWorkspace("/etc/passwd".into()))
        );
    }

    #[test]
    fn absolute_path_inside_root_accepted() {
        assert_eq!(
            ws().resolve("/work/project/notes.md").unwrap(),
            PathBuf::from("/work/project/notes.md")
        );
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside() {
        // Component-wise comparison: /work/project2 is not inside /work/project.
        assert!(matches!(
            ws().resolve("/work/project2/x"),
            Err(PathError::OutsideWorkspace(_))
        ));
    }

    #[test]
    fn error_messages_match_model_contract() {
        assert_eq!(PathError::Empty.to_string(), "路径不能为空");
        assert_eq!(PathError::OutsideWorkspace("/x".into()).to_string(), "路径超出工作区: /x");
    }
}
