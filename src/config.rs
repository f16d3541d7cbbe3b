/// Toolchain configuration for rectrace.
///
/// Read from the `[toolchain]` table of an optional TOML file; any field
/// left out keeps its default.
///
/// ```toml
/// [toolchain]
/// rustc = "/usr/local/bin/rustc"
/// edition = "2021"
/// optimize = true
/// extra_args = ["-C", "debug-assertions=on"]
/// ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Compiler program, `$RUSTC` or `rustc` by default.
    pub rustc: String,
    pub edition: String,
    /// Pass `-O` to the compiler.
    pub optimize: bool,
    pub extra_args: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rustc: std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string()),
            edition: "2021".to_string(),
            optimize: false,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    toolchain: HarnessConfig,
}

impl HarnessConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).context("Invalid rectrace config")?;
        Ok(file.toolchain)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Cannot read config file {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, rustc: Option<String>, edition: Option<String>) -> Self {
        if let Some(rustc) = rustc {
            self.rustc = rustc;
        }
        if let Some(edition) = edition {
            self.edition = edition;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_defaults() {
        let cfg = HarnessConfig::from_toml("[toolchain]\nedition = \"2018\"\n").unwrap();
        assert_eq!(cfg.edition, "2018");
        assert!(!cfg.optimize);
        assert!(cfg.extra_args.is_empty());
    }

    #[test]
    fn empty_file_is_default() {
        let cfg = HarnessConfig::from_toml("").unwrap();
        assert_eq!(cfg, HarnessConfig::default());
    }

    #[test]
    fn overrides_win() {
        let cfg = HarnessConfig::from_toml("[toolchain]\nrustc = \"a\"\n")
            .unwrap()
            .with_overrides(Some("b".to_string()), None);
        assert_eq!(cfg.rustc, "b");
        assert_eq!(cfg.edition, "2021");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(HarnessConfig::from_toml("[toolchain]\noptimize = \"yes\"\n").is_err());
    }

    #[test]
    fn load_without_path_uses_defaults() {
        let cfg = HarnessConfig::load(None).unwrap();
        assert_eq!(cfg.edition, "2021");
    }
}
