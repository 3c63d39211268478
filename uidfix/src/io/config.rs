//! uidfix configuration (`uidfix.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::generator::{GeneratorMode, UidGenerator};

/// Environment variable that forces deterministic uid generation when set to
/// `1` or `true`.
pub const DETERMINISTIC_ENV: &str = "UIDFIX_DETERMINISTIC";

/// uidfix configuration (TOML).
///
/// Missing fields default to random generation with pretty output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UidfixConfig {
    pub generator: GeneratorConfig,

    /// Pretty-print JSON reports.
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `random` (32 characters) or `deterministic` (3 characters).
    pub mode: GeneratorMode,
}

impl Default for UidfixConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            pretty: true,
        }
    }
}

impl UidfixConfig {
    /// Generation mode after applying the environment override.
    pub fn effective_mode(&self, env_value: Option<&str>) -> GeneratorMode {
        match env_value.map(str::trim) {
            Some("1") | Some("true") => GeneratorMode::Deterministic,
            _ => self.generator.mode,
        }
    }

    /// Build a generator, honouring `UIDFIX_DETERMINISTIC`.
    pub fn generator(&self) -> UidGenerator {
        let env_value = std::env::var(DETERMINISTIC_ENV).ok();
        UidGenerator::new(self.effective_mode(env_value.as_deref()))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `UidfixConfig::default()`.
pub fn load_config(path: &Path) -> Result<UidfixConfig> {
    if !path.exists() {
        return Ok(UidfixConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: UidfixConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Write the default config unless `path` already exists; `force`
/// overwrites. Returns whether the file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        debug!(path = %path.display(), "config exists; leaving it alone");
        return Ok(false);
    }
    write_config(path, &UidfixConfig::default())?;
    Ok(true)
}

/// Write `cfg` through a sibling temp file, then rename it into place.
pub fn write_config(path: &Path, cfg: &UidfixConfig) -> Result<()> {
    let mut rendered = toml::to_string_pretty(cfg).context("serialize uidfix config")?;
    rendered.push('\n');
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let staged = path.with_extension("toml.tmp");
    fs::write(&staged, rendered).with_context(|| format!("write {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, UidfixConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("uidfix.toml");
        let cfg = UidfixConfig {
            generator: GeneratorConfig {
                mode: GeneratorMode::Deterministic,
            },
            pretty: false,
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("uidfix.toml");
        fs::write(&path, "[generator]\nmode = \"deterministic\"\n").expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded.generator.mode, GeneratorMode::Deterministic);
        assert!(loaded.pretty);
    }

    #[test]
    fn init_keeps_existing_config_unless_forced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("uidfix.toml");

        assert!(init_config(&path, false).expect("init"));
        assert_eq!(load_config(&path).expect("load"), UidfixConfig::default());

        fs::write(&path, "pretty = false\n").expect("edit");
        assert!(!init_config(&path, false).expect("init again"));
        assert!(!load_config(&path).expect("load edited").pretty);

        assert!(init_config(&path, true).expect("force"));
        assert!(load_config(&path).expect("load forced").pretty);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn env_override_forces_deterministic() {
        let cfg = UidfixConfig::default();
        assert_eq!(cfg.effective_mode(None), GeneratorMode::Random);
        assert_eq!(cfg.effective_mode(Some("1")), GeneratorMode::Deterministic);
        assert_eq!(cfg.effective_mode(Some("0")), GeneratorMode::Random);
    }
}
