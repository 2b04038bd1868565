// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide default
    paths.push(PathBuf::from("/etc/fimcode/config.toml"));

    // 2. XDG / home
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/fimcode/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("fimcode/config.toml"));
    }

    // 3. Workspace-local
    paths.push(PathBuf::from(".fimcode/config.toml"));
    paths.push(PathBuf::from("fimcode.toml"));

    paths.dedup();
    paths
}

/// Load configuration by merging all discovered TOML files and then applying
/// the `ANTHROPIC_*` / `FIMCODE_*` environment overrides.
///
/// The `extra` argument may provide an explicit path (e.g. `--config` CLI flag).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = load_from(&config_search_paths(), extra)?;
    crate::apply_env_overrides(&mut config);
    Ok(config)
}

/// Merge the given search paths (missing files are skipped) plus an explicit
/// file, which must exist.  Environment overrides are not applied.
pub fn load_from(search_paths: &[PathBuf], extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in search_paths {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    let config: Config = merged.try_into().context("invalid configuration")?;
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                match d.get_mut(&k) {
                    Some(existing) => merge_toml(existing, v),
                    None => {
                        d.insert(k, v);
                    }
                }
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"x = 1"#);
        merge_toml(&mut dst, val(r#"x = 2"#));
        assert_eq!(dst["x"].as_integer(), Some(2));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val("a = 1\nb = 2");
        merge_toml(&mut dst, val("b = 99"));
        assert_eq!(dst["a"].as_integer(), Some(1));
        assert_eq!(dst["b"].as_integer(), Some(99));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val("[model]\nprovider = \"anthropic\"\nname = \"a\"");
        merge_toml(&mut dst, val("[model]\nname = \"b\""));
        assert_eq!(dst["model"]["provider"].as_str(), Some("anthropic"));
        assert_eq!(dst["model"]["name"].as_str(), Some("b"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_from(&[], Some(Path::new("/tmp/fimcode_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn no_files_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(&[dir.path().join("absent.toml")], None).unwrap();
        assert_eq!(cfg.model.provider, "anthropic");
        assert_eq!(cfg.tools.timeout_secs, 60);
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let low = write_file(&dir, "low.toml", "[model]\nname = \"low\"\nmax_tokens = 100\n");
        let high = write_file(&dir, "high.toml", "[model]\nname = \"high\"\n");
        let cfg = load_from(&[low, high], None).unwrap();
        assert_eq!(cfg.model.name, "high");
        assert_eq!(cfg.model.max_tokens, 100);
    }

    #[test]
    fn explicit_file_has_highest_priority() {
        let dir = tempfile::tempdir().unwrap();
        let layer = write_file(&dir, "layer.toml", "[tools]\ntimeout_secs = 10\n");
        let explicit = write_file(&dir, "explicit.toml", "[tools]\ntimeout_secs = 3\n");
        let cfg = load_from(&[layer], Some(&explicit)).unwrap();
        assert_eq!(cfg.tools.timeout_secs, 3);
    }

    #[test]
    fn malformed_layer_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_file(&dir, "bad.toml", "[model\n");
        let err = load_from(&[bad], None).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}
